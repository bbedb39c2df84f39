use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 12;

pub fn clamp_level(level: f64) -> u8 {
    level.round().clamp(MIN_LEVEL as f64, MAX_LEVEL as f64) as u8
}

pub fn clamp_difficulty(difficulty: f64) -> f64 {
    difficulty.clamp(MIN_LEVEL as f64, MAX_LEVEL as f64)
}

/// Closed subject/domain enumeration. Subjects and focus domains share the
/// same variants; an unmapped subject is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Domain {
    Math,
    Reading,
    Writing,
    Science,
    Sel,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Math => "MATH",
            Self::Reading => "READING",
            Self::Writing => "WRITING",
            Self::Science => "SCIENCE",
            Self::Sel => "SEL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "MATH" => Some(Self::Math),
            "READING" => Some(Self::Reading),
            "WRITING" => Some(Self::Writing),
            "SCIENCE" => Some(Self::Science),
            "SEL" => Some(Self::Sel),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Math => "Math",
            Self::Reading => "Reading",
            Self::Writing => "Writing",
            Self::Science => "Science",
            Self::Sel => "Social-Emotional Learning",
        }
    }

    /// Default focus domain for a day with no scheduled lessons. Total over
    /// every subject by construction.
    pub fn default_focus(subject: Domain) -> Domain {
        match subject {
            Self::Math => Self::Math,
            Self::Reading => Self::Reading,
            Self::Writing => Self::Writing,
            Self::Science => Self::Science,
            Self::Sel => Self::Sel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LearningStyle {
    Visual,
    Auditory,
    Kinesthetic,
    #[default]
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    #[default]
    Visual,
    Auditory,
    Kinesthetic,
    Mixed,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visual => "visual",
            Self::Auditory => "auditory",
            Self::Kinesthetic => "kinesthetic",
            Self::Mixed => "mixed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Diagnosis {
    Adhd,
    Asd,
    Dyslexia,
    Dyscalculia,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerProfile {
    pub id: String,
    pub grade_level: u8,
    /// Assessed functional grade-equivalent; may diverge from grade level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_level: Option<u8>,
    #[serde(default)]
    pub domain_levels: HashMap<Domain, u8>,
    #[serde(default)]
    pub learning_style: LearningStyle,
    #[serde(default)]
    pub diagnoses: Vec<Diagnosis>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub challenges: Vec<String>,
}

impl LearnerProfile {
    pub fn has_diagnosis(&self, diagnosis: Diagnosis) -> bool {
        self.diagnoses.contains(&diagnosis)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub domain: Domain,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_grade: Option<u8>,
    /// Content-library module backing this skill, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: f64,
    pub estimated_minutes: i32,
    pub modality: Modality,
    pub visual_support: bool,
    pub audio_narration: bool,
    pub interactive: bool,
    pub visual_schedule: bool,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub scaffolding: Vec<String>,
    #[serde(default)]
    pub standards: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonActivity {
    pub skill_id: String,
    pub skill_name: String,
    pub domain: Domain,
    pub sequence: usize,
    #[serde(flatten)]
    pub activity: Activity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLesson {
    pub date: NaiveDate,
    pub focus_domain: Domain,
    pub lessons: Vec<LessonActivity>,
    pub total_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPlan {
    pub id: String,
    pub learner_id: String,
    pub subject: Domain,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: u32,
    pub learner: LearnerProfile,
    pub domain_levels: HashMap<Domain, u8>,
    pub daily_schedule: Vec<DailyLesson>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub accuracy: f64,
    pub time_per_question_ms: f64,
    pub consecutive_correct: u32,
    pub consecutive_incorrect: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_level: Option<u8>,
    pub sample_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResult {
    pub activity_id: String,
    pub accuracy: f64,
    pub time_per_question_ms: f64,
    pub duration_minutes: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentAction {
    Increase,
    Decrease,
    Maintain,
}

impl AdjustmentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increase => "INCREASE",
            Self::Decrease => "DECREASE",
            Self::Maintain => "MAINTAIN",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyAdjustment {
    pub action: AdjustmentAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_level: Option<u8>,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaffolding: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encouragement: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccommodationType {
    ExtendedTime,
    FrequentBreaks,
    VisualSchedule,
    AudioSupport,
    ChunkedContent,
    LargeText,
    ReducedDistraction,
    SimplifiedLanguage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AssistiveFeatures {
    pub large_font: bool,
    pub audio_narration: bool,
    pub chunked_content: bool,
    pub visual_schedule: bool,
    pub extended_time: bool,
    pub reduced_distraction: bool,
}

impl AssistiveFeatures {
    /// Derives the feature flags a renderer needs from the accommodations
    /// applied to an adaptation.
    pub fn from_accommodations(accommodations: &[AccommodationType]) -> Self {
        let mut features = Self::default();
        for accommodation in accommodations {
            match accommodation {
                AccommodationType::LargeText => features.large_font = true,
                AccommodationType::AudioSupport => features.audio_narration = true,
                AccommodationType::ChunkedContent | AccommodationType::SimplifiedLanguage => {
                    features.chunked_content = true
                }
                AccommodationType::VisualSchedule => features.visual_schedule = true,
                AccommodationType::ExtendedTime => features.extended_time = true,
                AccommodationType::ReducedDistraction | AccommodationType::FrequentBreaks => {
                    features.reduced_distraction = true
                }
            }
        }
        features
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LearnerPersona {
    pub grade_level: u8,
    #[serde(default)]
    pub learning_style: LearningStyle,
    #[serde(default)]
    pub diagnoses: Vec<Diagnosis>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub challenges: Vec<String>,
}

impl LearnerPersona {
    pub fn from_profile(profile: &LearnerProfile) -> Self {
        Self {
            grade_level: profile.grade_level,
            learning_style: profile.learning_style,
            diagnoses: profile.diagnoses.clone(),
            strengths: profile.strengths.clone(),
            challenges: profile.challenges.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptationRequest {
    pub base_content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
    #[serde(default)]
    pub persona: LearnerPersona,
    #[serde(default)]
    pub modality: Modality,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaffolding_level: Option<String>,
    #[serde(default)]
    pub vocabulary: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptationResult {
    pub content: String,
    pub summary: String,
    pub highlights: Vec<String>,
    pub modality: Modality,
    pub confidence: f64,
    #[serde(default)]
    pub metadata: serde_json::Value,
    #[serde(default)]
    pub applied_accommodations: Vec<AccommodationType>,
    #[serde(default)]
    pub assistive: AssistiveFeatures,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_level_bounds() {
        assert_eq!(clamp_level(0.2), 1);
        assert_eq!(clamp_level(3.5), 4);
        assert_eq!(clamp_level(14.9), 12);
    }

    #[test]
    fn test_domain_parse_round_trip() {
        for domain in [
            Domain::Math,
            Domain::Reading,
            Domain::Writing,
            Domain::Science,
            Domain::Sel,
        ] {
            assert_eq!(Domain::parse(domain.as_str()), Some(domain));
        }
        assert_eq!(Domain::parse("ASTRONOMY"), None);
    }

    #[test]
    fn test_assistive_features_from_accommodations() {
        let features = AssistiveFeatures::from_accommodations(&[
            AccommodationType::LargeText,
            AccommodationType::AudioSupport,
            AccommodationType::FrequentBreaks,
        ]);
        assert!(features.large_font);
        assert!(features.audio_narration);
        assert!(features.reduced_distraction);
        assert!(!features.chunked_content);
    }
}
