//! Candidate activity retrieval with a deterministic synthetic backstop.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::EngineResult;
use crate::storage::{ContentItem, ContentStore};
use crate::types::{clamp_difficulty, Activity, Domain, Modality, Skill};

const FALLBACK_MINUTES: i32 = 10;
const FALLBACK_STEP: f64 = 0.5;

#[derive(Clone)]
pub struct ContentLibrary {
    store: Arc<dyn ContentStore>,
}

impl ContentLibrary {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Authored skills for a subject, in the store's stable order.
    pub async fn skills_for_subject(&self, subject: Domain) -> EngineResult<Vec<Skill>> {
        self.store.skills_for_subject(subject).await
    }

    /// Stored activities for a skill, closest to the requested level
    /// first. The stable sort over the store's updated-desc order breaks
    /// distance ties toward fresher content. Empty is not an error.
    pub async fn activities_for_skill(
        &self,
        skill: &Skill,
        level: u8,
        limit: usize,
    ) -> EngineResult<Vec<Activity>> {
        let Some(module_id) = skill.module_id.as_deref() else {
            return Ok(Vec::new());
        };

        let mut items = self.store.items_for_module(module_id).await?;
        let target = level as f64;
        items.sort_by(|a, b| {
            let da = (a.difficulty - target).abs();
            let db = (b.difficulty - target).abs();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(items
            .into_iter()
            .take(limit)
            .map(item_to_activity)
            .collect())
    }

    /// Synthetic "practice burst" activities, difficulty stepping +0.5 per
    /// index. Never empty.
    pub fn fallback_activities(&self, subject: Domain, level: u8, limit: usize) -> Vec<Activity> {
        (0..limit.max(1))
            .map(|index| synthetic_activity(subject, level, index))
            .collect()
    }

    /// Single synthetic activity at the exact target level.
    pub fn fallback_activity(&self, subject: Domain, level: u8) -> Activity {
        synthetic_activity(subject, level, 0)
    }
}

fn synthetic_activity(subject: Domain, level: u8, index: usize) -> Activity {
    Activity {
        id: format!("fallback-{}", Uuid::new_v4()),
        title: format!("{} practice burst {}", subject.display_name(), index + 1),
        description: format!(
            "Short guided practice set for {} at level {level}",
            subject.display_name()
        ),
        difficulty: clamp_difficulty(level as f64 + FALLBACK_STEP * index as f64),
        estimated_minutes: FALLBACK_MINUTES,
        modality: match subject {
            Domain::Sel => Modality::Mixed,
            _ => Modality::Visual,
        },
        visual_support: true,
        audio_narration: subject == Domain::Reading,
        interactive: true,
        visual_schedule: false,
        resources: vec![],
        scaffolding: vec![],
        standards: vec![],
        content_id: None,
    }
}

fn item_to_activity(item: ContentItem) -> Activity {
    let has_tag = |tag: &str| item.tags.iter().any(|t| t.eq_ignore_ascii_case(tag));

    Activity {
        id: item.id.clone(),
        title: item.title,
        description: item.description,
        difficulty: clamp_difficulty(item.difficulty),
        estimated_minutes: item.estimated_minutes,
        modality: item.modality,
        visual_support: matches!(item.modality, Modality::Visual | Modality::Mixed)
            || has_tag("visual-support"),
        audio_narration: item.modality == Modality::Auditory || has_tag("audio"),
        interactive: has_tag("interactive"),
        visual_schedule: has_tag("visual-schedule"),
        resources: item.resources,
        scaffolding: item.scaffolding,
        standards: item.standard_code.into_iter().collect(),
        content_id: Some(item.id),
    }
}
