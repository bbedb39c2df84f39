pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::types::{
    AccommodationType, AdaptationResult, Domain, LearnerProfile, Modality, Skill,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineResult {
    pub domain: Domain,
    /// Normalized score in [0, 1].
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineSession {
    pub id: String,
    pub learner_id: String,
    pub completed_at: DateTime<Utc>,
    pub results: Vec<BaselineResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    pub module_id: String,
    pub title: String,
    pub description: String,
    pub difficulty: f64,
    pub estimated_minutes: i32,
    pub modality: Modality,
    pub active: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_code: Option<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub scaffolding: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurriculumContent {
    pub id: String,
    pub title: String,
    pub subject: Domain,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_id: Option<String>,
    #[serde(default)]
    pub standard_codes: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VersionStatus {
    Draft,
    Active,
    Archived,
}

impl VersionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Active => "ACTIVE",
            Self::Archived => "ARCHIVED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentVersion {
    pub id: String,
    pub content_id: String,
    pub version_number: u32,
    pub status: VersionStatus,
    /// Provenance tag, e.g. "AUTHOR" or "AI".
    pub source: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    pub id: String,
    pub learner_id: String,
    pub content_id: String,
    pub interaction_type: String,
    pub accuracy: Option<f64>,
    pub duration_ms: Option<i64>,
    pub occurred_at: DateTime<Utc>,
}

/// Learner profile storage. Absent learners are a fatal `NotFound`.
#[async_trait]
pub trait LearnerStore: Send + Sync {
    async fn get_profile(&self, learner_id: &str) -> EngineResult<LearnerProfile>;
}

/// Baseline assessment storage.
#[async_trait]
pub trait AssessmentStore: Send + Sync {
    /// Most recent completed baseline session for the learner, if any.
    async fn latest_completed_baseline(
        &self,
        learner_id: &str,
    ) -> EngineResult<Option<BaselineSession>>;
}

/// Content storage: skills, modules, items, shells and versions.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn skills_for_subject(&self, subject: Domain) -> EngineResult<Vec<Skill>>;

    /// Active items for a module, most recently updated first.
    async fn items_for_module(&self, module_id: &str) -> EngineResult<Vec<ContentItem>>;

    async fn create_content(&self, content: CurriculumContent) -> EngineResult<()>;

    async fn get_content(&self, content_id: &str) -> EngineResult<CurriculumContent>;

    /// Persists a version, assigning the next version number for the
    /// content id atomically.
    async fn create_version(
        &self,
        content_id: &str,
        status: VersionStatus,
        source: String,
        payload: serde_json::Value,
    ) -> EngineResult<ContentVersion>;

    async fn get_version(&self, version_id: &str) -> EngineResult<ContentVersion>;

    async fn versions_for_content(&self, content_id: &str) -> EngineResult<Vec<ContentVersion>>;

    async fn active_version(&self, content_id: &str) -> EngineResult<Option<ContentVersion>>;

    /// Atomically archives any currently ACTIVE version of the content and
    /// activates the target version, stamping publication metadata. A
    /// racing reader must never observe zero ACTIVE versions mid-publish.
    async fn publish_version(
        &self,
        content_id: &str,
        version_id: &str,
        reviewer: &str,
    ) -> EngineResult<ContentVersion>;

    async fn insert_interaction(&self, record: InteractionRecord) -> EngineResult<()>;
}

/// External accommodation rules for a learner.
#[async_trait]
pub trait AccommodationProvider: Send + Sync {
    async fn active_accommodations(
        &self,
        learner_id: &str,
    ) -> EngineResult<Vec<AccommodationType>>;

    async fn apply_accommodations(
        &self,
        result: AdaptationResult,
        accommodations: &[AccommodationType],
    ) -> EngineResult<AdaptationResult>;
}

/// Effectiveness tracking collaborator. Notifications are fire-and-forget.
#[async_trait]
pub trait EffectivenessTracker: Send + Sync {
    async fn record_interaction(&self, record: InteractionRecord) -> EngineResult<()>;
}
