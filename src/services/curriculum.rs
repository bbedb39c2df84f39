//! Content lifecycle orchestration: shells, versions, publication,
//! AI adaptation with accommodations, and interaction logging.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::services::content_adapter::ContentAdapter;
use crate::storage::{
    AccommodationProvider, ContentStore, ContentVersion, CurriculumContent, EffectivenessTracker,
    InteractionRecord, VersionStatus,
};
use crate::types::{AdaptationRequest, AdaptationResult, Domain};

pub const SOURCE_AUTHOR: &str = "AUTHOR";
pub const SOURCE_AI: &str = "AI";

#[derive(Debug, Clone)]
pub struct CreateContentInput {
    pub title: String,
    pub subject: Domain,
    pub skill_id: Option<String>,
    pub standard_codes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewInteraction {
    pub learner_id: String,
    pub content_id: String,
    pub interaction_type: String,
    pub accuracy: Option<f64>,
    pub duration_ms: Option<i64>,
}

#[derive(Clone)]
pub struct CurriculumManager {
    content: Arc<dyn ContentStore>,
    adapter: ContentAdapter,
    accommodations: Arc<dyn AccommodationProvider>,
    tracker: Arc<dyn EffectivenessTracker>,
}

impl CurriculumManager {
    pub fn new(
        content: Arc<dyn ContentStore>,
        adapter: ContentAdapter,
        accommodations: Arc<dyn AccommodationProvider>,
        tracker: Arc<dyn EffectivenessTracker>,
    ) -> Self {
        Self {
            content,
            adapter,
            accommodations,
            tracker,
        }
    }

    /// Creates a content shell together with its initial version: version 1,
    /// ACTIVE, empty payload placeholder.
    pub async fn create_content_shell(
        &self,
        input: CreateContentInput,
    ) -> EngineResult<(CurriculumContent, ContentVersion)> {
        let content = CurriculumContent {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            subject: input.subject,
            skill_id: input.skill_id,
            standard_codes: input.standard_codes,
            created_at: Utc::now(),
        };
        self.content.create_content(content.clone()).await?;

        let version = self
            .content
            .create_version(
                &content.id,
                VersionStatus::Active,
                SOURCE_AUTHOR.to_string(),
                serde_json::json!({}),
            )
            .await?;

        info!(content_id = %content.id, "created content shell");
        Ok((content, version))
    }

    /// New DRAFT version with the next number for the content id.
    pub async fn create_version(
        &self,
        content_id: &str,
        source: &str,
        payload: serde_json::Value,
    ) -> EngineResult<ContentVersion> {
        self.content
            .create_version(content_id, VersionStatus::Draft, source.to_string(), payload)
            .await
    }

    /// Adapts a content item for a learner: generative (or fallback)
    /// rewrite, then accommodation application, then persistence of the
    /// adapted envelope as a DRAFT version tagged `source=AI`.
    pub async fn adapt_content(
        &self,
        content_id: &str,
        learner_id: &str,
        request: &AdaptationRequest,
    ) -> EngineResult<(AdaptationResult, ContentVersion)> {
        // Existence check up front; adaptation of a missing shell is NotFound.
        self.content.get_content(content_id).await?;

        let adapted = self.adapter.adapt(request).await?;
        let active = self.accommodations.active_accommodations(learner_id).await?;
        let adapted = self
            .accommodations
            .apply_accommodations(adapted, &active)
            .await?;

        let payload = serde_json::to_value(&adapted)
            .unwrap_or_else(|_| serde_json::json!({ "content": adapted.content }));
        let version = self
            .content
            .create_version(
                content_id,
                VersionStatus::Draft,
                SOURCE_AI.to_string(),
                payload,
            )
            .await?;

        info!(
            content_id,
            learner_id,
            version = version.version_number,
            confidence = adapted.confidence,
            "adapted content for learner"
        );
        Ok((adapted, version))
    }

    /// Transactional publication: archive the current ACTIVE version, then
    /// activate the target and stamp publication metadata.
    pub async fn publish_version(
        &self,
        content_id: &str,
        version_id: &str,
        reviewer: &str,
    ) -> EngineResult<ContentVersion> {
        let published = self
            .content
            .publish_version(content_id, version_id, reviewer)
            .await?;
        info!(
            content_id,
            version = published.version_number,
            reviewer,
            "published content version"
        );
        Ok(published)
    }

    pub async fn active_version(&self, content_id: &str) -> EngineResult<Option<ContentVersion>> {
        self.content.active_version(content_id).await
    }

    pub async fn versions_for_content(
        &self,
        content_id: &str,
    ) -> EngineResult<Vec<ContentVersion>> {
        self.content.versions_for_content(content_id).await
    }

    /// Records an interaction and notifies the effectiveness tracker in the
    /// background. A tracker failure is logged and never blocks the caller.
    pub async fn log_interaction(&self, input: NewInteraction) -> EngineResult<InteractionRecord> {
        let record = InteractionRecord {
            id: Uuid::new_v4().to_string(),
            learner_id: input.learner_id,
            content_id: input.content_id,
            interaction_type: input.interaction_type,
            accuracy: input.accuracy,
            duration_ms: input.duration_ms,
            occurred_at: Utc::now(),
        };
        self.content.insert_interaction(record.clone()).await?;

        let tracker = Arc::clone(&self.tracker);
        let notification = record.clone();
        tokio::spawn(async move {
            if let Err(err) = tracker.record_interaction(notification).await {
                warn!(error = %err, "effectiveness tracker notification failed");
            }
        });

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::{
        MemoryAccommodationProvider, MemoryContentStore, MemoryEffectivenessTracker,
    };
    use crate::types::{AccommodationType, LearnerPersona, Modality};

    fn manager() -> (
        CurriculumManager,
        Arc<MemoryContentStore>,
        Arc<MemoryAccommodationProvider>,
        Arc<MemoryEffectivenessTracker>,
    ) {
        let store = Arc::new(MemoryContentStore::new());
        let accommodations = Arc::new(MemoryAccommodationProvider::new());
        let tracker = Arc::new(MemoryEffectivenessTracker::new());
        let manager = CurriculumManager::new(
            Arc::clone(&store) as Arc<dyn ContentStore>,
            ContentAdapter::new(None),
            Arc::clone(&accommodations) as Arc<dyn AccommodationProvider>,
            Arc::clone(&tracker) as Arc<dyn EffectivenessTracker>,
        );
        (manager, store, accommodations, tracker)
    }

    fn shell_input() -> CreateContentInput {
        CreateContentInput {
            title: "Unit fractions".to_string(),
            subject: Domain::Math,
            skill_id: None,
            standard_codes: vec!["CCSS.MATH.3.NF.1".to_string()],
        }
    }

    fn adaptation_request() -> AdaptationRequest {
        AdaptationRequest {
            base_content: "A fraction names equal parts of a whole.".to_string(),
            instructions: None,
            objective: None,
            persona: LearnerPersona::default(),
            modality: Modality::Visual,
            tone: None,
            scaffolding_level: None,
            vocabulary: vec![],
            examples: vec![],
        }
    }

    #[tokio::test]
    async fn test_shell_creation_seeds_active_version_one() {
        let (manager, _, _, _) = manager();
        let (content, version) = manager
            .create_content_shell(shell_input())
            .await
            .expect("shell");

        assert_eq!(version.content_id, content.id);
        assert_eq!(version.version_number, 1);
        assert_eq!(version.status, VersionStatus::Active);
        assert_eq!(version.source, SOURCE_AUTHOR);
        assert_eq!(version.payload, serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_version_numbers_increment_per_content() {
        let (manager, _, _, _) = manager();
        let (content, _) = manager
            .create_content_shell(shell_input())
            .await
            .expect("shell");
        let (other, _) = manager
            .create_content_shell(shell_input())
            .await
            .expect("shell");

        let v2 = manager
            .create_version(&content.id, SOURCE_AUTHOR, serde_json::json!({"body": "a"}))
            .await
            .expect("v2");
        let v3 = manager
            .create_version(&content.id, SOURCE_AUTHOR, serde_json::json!({"body": "b"}))
            .await
            .expect("v3");
        let other_v2 = manager
            .create_version(&other.id, SOURCE_AUTHOR, serde_json::json!({}))
            .await
            .expect("other v2");

        assert_eq!(v2.version_number, 2);
        assert_eq!(v3.version_number, 3);
        // Numbering is scoped per content id.
        assert_eq!(other_v2.version_number, 2);
    }

    #[tokio::test]
    async fn test_adapt_content_persists_ai_draft_with_accommodations() {
        let (manager, _, accommodations, _) = manager();
        accommodations.set(
            "learner-1",
            vec![AccommodationType::LargeText, AccommodationType::AudioSupport],
        );
        let (content, _) = manager
            .create_content_shell(shell_input())
            .await
            .expect("shell");

        let (adapted, version) = manager
            .adapt_content(&content.id, "learner-1", &adaptation_request())
            .await
            .expect("adaptation");

        assert_eq!(version.status, VersionStatus::Draft);
        assert_eq!(version.source, SOURCE_AI);
        assert_eq!(version.version_number, 2);
        assert_eq!(adapted.applied_accommodations.len(), 2);
        assert!(adapted.assistive.large_font);
        assert!(adapted.assistive.audio_narration);
        // Persisted payload carries the accommodated envelope.
        assert_eq!(version.payload["appliedAccommodations"][0], "LARGE_TEXT");
    }

    #[tokio::test]
    async fn test_adapt_content_unknown_shell_is_not_found() {
        let (manager, _, _, _) = manager();
        let err = manager
            .adapt_content("missing", "learner-1", &adaptation_request())
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::EngineError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_publish_archives_previous_active() {
        let (manager, _, _, _) = manager();
        let (content, v1) = manager
            .create_content_shell(shell_input())
            .await
            .expect("shell");
        let v2 = manager
            .create_version(&content.id, SOURCE_AUTHOR, serde_json::json!({"body": "a"}))
            .await
            .expect("v2");

        let published = manager
            .publish_version(&content.id, &v2.id, "reviewer-9")
            .await
            .expect("publish");

        assert_eq!(published.status, VersionStatus::Active);
        assert!(published.published_at.is_some());
        assert_eq!(published.reviewed_by.as_deref(), Some("reviewer-9"));

        let versions = manager
            .versions_for_content(&content.id)
            .await
            .expect("versions");
        let old = versions.iter().find(|v| v.id == v1.id).expect("v1");
        assert_eq!(old.status, VersionStatus::Archived);

        let active = manager
            .active_version(&content.id)
            .await
            .expect("query")
            .expect("one active");
        assert_eq!(active.id, v2.id);
    }

    #[tokio::test]
    async fn test_log_interaction_survives_tracker_failure() {
        let (manager, store, _, tracker) = manager();
        let (content, _) = manager
            .create_content_shell(shell_input())
            .await
            .expect("shell");
        tracker.fail_next(true);

        let record = manager
            .log_interaction(NewInteraction {
                learner_id: "learner-1".to_string(),
                content_id: content.id.clone(),
                interaction_type: "ACTIVITY_COMPLETED".to_string(),
                accuracy: Some(0.8),
                duration_ms: Some(420_000),
            })
            .await
            .expect("interaction logged despite tracker failure");

        assert_eq!(record.content_id, content.id);
        assert_eq!(store.interactions().len(), 1);

        // Give the fire-and-forget task a moment; it must not have recorded.
        tokio::task::yield_now().await;
        assert!(tracker.recorded().is_empty());
    }
}
