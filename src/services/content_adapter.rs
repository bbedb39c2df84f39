//! AI-backed content adaptation. Falls back to a deterministic transform
//! when the generative backend is absent, errors, or returns something
//! unusable; an adaptation request never fails outright.

use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

use crate::error::{EngineError, EngineResult};
use crate::services::llm_provider::AdaptationBackend;
use crate::types::{AdaptationRequest, AdaptationResult, AssistiveFeatures, Modality};

const FALLBACK_CONFIDENCE: f64 = 0.4;
const GENERATIVE_DEFAULT_CONFIDENCE: f64 = 0.65;
const HIGHLIGHT_MAX_CHARS: usize = 160;
const HIGHLIGHT_COUNT: usize = 3;

const SYSTEM_PROMPT: &str = "You adapt K-12 instructional content for neurodiverse learners. \
Respond with a single JSON object: {\"content\": string, \"summary\": string, \
\"highlights\": string[], \"modality\": \"visual\"|\"auditory\"|\"kinesthetic\"|\"mixed\", \
\"confidence\": number, \"metadata\": object}. No prose outside the JSON.";

#[derive(Clone)]
pub struct ContentAdapter {
    backend: Option<Arc<dyn AdaptationBackend>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerativePayload {
    content: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    highlights: Vec<String>,
    modality: Option<Modality>,
    confidence: Option<f64>,
    #[serde(default)]
    metadata: serde_json::Value,
}

impl ContentAdapter {
    pub fn new(backend: Option<Arc<dyn AdaptationBackend>>) -> Self {
        Self { backend }
    }

    pub async fn adapt(&self, request: &AdaptationRequest) -> EngineResult<AdaptationResult> {
        if request.base_content.trim().is_empty() {
            return Err(EngineError::validation("baseContent must not be empty"));
        }

        if let Some(backend) = self.backend.as_ref().filter(|b| b.is_available()) {
            let user_prompt = build_user_prompt(request);
            match backend.complete(SYSTEM_PROMPT, &user_prompt).await {
                Ok(raw) => match parse_generative(&raw, request) {
                    Ok(result) => return Ok(result),
                    Err(err) => {
                        warn!(error = %err, "generative adaptation unusable, using fallback");
                    }
                },
                Err(err) => {
                    warn!(error = %err, "generative backend failed, using fallback");
                }
            }
        }

        Ok(fallback_transform(request))
    }
}

fn build_user_prompt(request: &AdaptationRequest) -> String {
    let persona = &request.persona;
    let mut sections = Vec::new();

    if let Some(instructions) = &request.instructions {
        sections.push(format!("Instructions: {instructions}"));
    }
    if let Some(objective) = &request.objective {
        sections.push(format!("Learning objective: {objective}"));
    }
    sections.push(format!("Target modality: {}", request.modality.as_str()));
    if let Some(tone) = &request.tone {
        sections.push(format!("Tone: {tone}"));
    }
    if let Some(scaffolding) = &request.scaffolding_level {
        sections.push(format!("Scaffolding level: {scaffolding}"));
    }
    if !request.vocabulary.is_empty() {
        sections.push(format!("Vocabulary to use: {}", request.vocabulary.join(", ")));
    }
    if !request.examples.is_empty() {
        sections.push(format!(
            "Grounding examples:\n{}",
            request.examples.join("\n")
        ));
    }

    let diagnoses: Vec<&str> = persona
        .diagnoses
        .iter()
        .map(|d| match d {
            crate::types::Diagnosis::Adhd => "ADHD",
            crate::types::Diagnosis::Asd => "ASD",
            crate::types::Diagnosis::Dyslexia => "dyslexia",
            crate::types::Diagnosis::Dyscalculia => "dyscalculia",
        })
        .collect();
    sections.push(format!(
        "Learner: grade {}, learning style {:?}, diagnoses [{}], strengths [{}], challenges [{}]",
        persona.grade_level,
        persona.learning_style,
        diagnoses.join(", "),
        persona.strengths.join(", "),
        persona.challenges.join(", ")
    ));

    sections.push(format!("Base content:\n{}", request.base_content));
    sections.join("\n\n")
}

fn parse_generative(raw: &str, request: &AdaptationRequest) -> Result<AdaptationResult, String> {
    let json = extract_json_object(raw).ok_or_else(|| "no JSON object in response".to_string())?;
    let payload: GenerativePayload =
        serde_json::from_str(json).map_err(|e| format!("invalid adaptation JSON: {e}"))?;

    if payload.content.trim().is_empty() {
        return Err("empty adapted content".to_string());
    }

    let content = payload.content;
    let summary = if payload.summary.trim().is_empty() {
        default_summary(request)
    } else {
        payload.summary
    };
    let highlights = if payload.highlights.is_empty() {
        extract_highlights(&content)
    } else {
        payload
            .highlights
            .into_iter()
            .map(|h| truncate(&h, HIGHLIGHT_MAX_CHARS))
            .collect()
    };

    Ok(AdaptationResult {
        content,
        summary,
        highlights,
        modality: payload.modality.unwrap_or(request.modality),
        confidence: payload
            .confidence
            .unwrap_or(GENERATIVE_DEFAULT_CONFIDENCE)
            .clamp(0.0, 1.0),
        metadata: payload.metadata,
        applied_accommodations: vec![],
        assistive: AssistiveFeatures::default(),
    })
}

/// Deterministic degradation: banner, reframed learner reference, the
/// original base content, and a generic comprehension check.
pub fn fallback_transform(request: &AdaptationRequest) -> AdaptationResult {
    let tone = request.tone.as_deref().unwrap_or("supportive");
    let scaffolding = request.scaffolding_level.as_deref().unwrap_or("moderate");
    let banner = format!("[{tone} tone | {scaffolding} scaffolding]");
    let reframe = format!(
        "Let's work through this together, one step at a time (grade {} pacing).",
        request.persona.grade_level
    );
    let check = "Quick check: can you say what we just learned in your own words?";

    let content = format!(
        "{banner}\n{reframe}\n\n{}\n\n{check}",
        request.base_content.trim()
    );

    AdaptationResult {
        highlights: extract_highlights(&content),
        summary: default_summary(request),
        content,
        modality: request.modality,
        confidence: FALLBACK_CONFIDENCE,
        metadata: serde_json::json!({ "source": "fallback" }),
        applied_accommodations: vec![],
        assistive: AssistiveFeatures::default(),
    }
}

fn default_summary(request: &AdaptationRequest) -> String {
    match &request.objective {
        Some(objective) => format!(
            "{objective} ({} presentation)",
            request.modality.as_str()
        ),
        None => "Adapted practice content for this learner".to_string(),
    }
}

fn extract_highlights(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(HIGHLIGHT_COUNT)
        .map(|line| truncate(line, HIGHLIGHT_MAX_CHARS))
        .collect()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}

/// Models often wrap JSON in code fences or prose; take the outermost
/// object literal.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end >= start).then(|| &raw[start..=end])
}
