//! In-memory collaborator implementations. Backing store for tests and for
//! embedded deployments that run without the platform database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::types::{AccommodationType, AdaptationResult, AssistiveFeatures, Domain, LearnerProfile, Skill};

use super::{
    AccommodationProvider, AssessmentStore, BaselineSession, ContentItem, ContentStore,
    ContentVersion, CurriculumContent, EffectivenessTracker, InteractionRecord, LearnerStore,
    VersionStatus,
};

#[derive(Default)]
pub struct MemoryLearnerStore {
    profiles: RwLock<HashMap<String, LearnerProfile>>,
}

impl MemoryLearnerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, profile: LearnerProfile) {
        self.profiles.write().insert(profile.id.clone(), profile);
    }
}

#[async_trait]
impl LearnerStore for MemoryLearnerStore {
    async fn get_profile(&self, learner_id: &str) -> EngineResult<LearnerProfile> {
        self.profiles
            .read()
            .get(learner_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("learner", learner_id))
    }
}

#[derive(Default)]
pub struct MemoryAssessmentStore {
    sessions: RwLock<Vec<BaselineSession>>,
}

impl MemoryAssessmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: BaselineSession) {
        self.sessions.write().push(session);
    }
}

#[async_trait]
impl AssessmentStore for MemoryAssessmentStore {
    async fn latest_completed_baseline(
        &self,
        learner_id: &str,
    ) -> EngineResult<Option<BaselineSession>> {
        let sessions = self.sessions.read();
        Ok(sessions
            .iter()
            .filter(|s| s.learner_id == learner_id)
            .max_by_key(|s| s.completed_at)
            .cloned())
    }
}

#[derive(Default)]
struct ContentState {
    skills: HashMap<Domain, Vec<Skill>>,
    items: HashMap<String, Vec<ContentItem>>,
    contents: HashMap<String, CurriculumContent>,
    versions: HashMap<String, ContentVersion>,
    interactions: Vec<InteractionRecord>,
}

/// Single-mutex content store. Publication archives and activates under
/// one lock acquisition.
#[derive(Default)]
pub struct MemoryContentStore {
    inner: Mutex<ContentState>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_skill(&self, skill: Skill) {
        self.inner
            .lock()
            .skills
            .entry(skill.domain)
            .or_default()
            .push(skill);
    }

    pub fn insert_item(&self, item: ContentItem) {
        self.inner
            .lock()
            .items
            .entry(item.module_id.clone())
            .or_default()
            .push(item);
    }

    pub fn interactions(&self) -> Vec<InteractionRecord> {
        self.inner.lock().interactions.clone()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn skills_for_subject(&self, subject: Domain) -> EngineResult<Vec<Skill>> {
        Ok(self
            .inner
            .lock()
            .skills
            .get(&subject)
            .cloned()
            .unwrap_or_default())
    }

    async fn items_for_module(&self, module_id: &str) -> EngineResult<Vec<ContentItem>> {
        let inner = self.inner.lock();
        let mut items: Vec<ContentItem> = inner
            .items
            .get(module_id)
            .map(|items| items.iter().filter(|i| i.active).cloned().collect())
            .unwrap_or_default();
        items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(items)
    }

    async fn create_content(&self, content: CurriculumContent) -> EngineResult<()> {
        self.inner
            .lock()
            .contents
            .insert(content.id.clone(), content);
        Ok(())
    }

    async fn get_content(&self, content_id: &str) -> EngineResult<CurriculumContent> {
        self.inner
            .lock()
            .contents
            .get(content_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("content", content_id))
    }

    async fn create_version(
        &self,
        content_id: &str,
        status: VersionStatus,
        source: String,
        payload: serde_json::Value,
    ) -> EngineResult<ContentVersion> {
        let mut inner = self.inner.lock();
        if !inner.contents.contains_key(content_id) {
            return Err(EngineError::not_found("content", content_id));
        }
        let next_number = inner
            .versions
            .values()
            .filter(|v| v.content_id == content_id)
            .map(|v| v.version_number)
            .max()
            .unwrap_or(0)
            + 1;
        let version = ContentVersion {
            id: Uuid::new_v4().to_string(),
            content_id: content_id.to_string(),
            version_number: next_number,
            status,
            source,
            payload,
            created_at: Utc::now(),
            published_at: None,
            reviewed_by: None,
        };
        inner.versions.insert(version.id.clone(), version.clone());
        Ok(version)
    }

    async fn get_version(&self, version_id: &str) -> EngineResult<ContentVersion> {
        self.inner
            .lock()
            .versions
            .get(version_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("version", version_id))
    }

    async fn versions_for_content(&self, content_id: &str) -> EngineResult<Vec<ContentVersion>> {
        let inner = self.inner.lock();
        let mut versions: Vec<ContentVersion> = inner
            .versions
            .values()
            .filter(|v| v.content_id == content_id)
            .cloned()
            .collect();
        versions.sort_by_key(|v| v.version_number);
        Ok(versions)
    }

    async fn active_version(&self, content_id: &str) -> EngineResult<Option<ContentVersion>> {
        let inner = self.inner.lock();
        Ok(inner
            .versions
            .values()
            .find(|v| v.content_id == content_id && v.status == VersionStatus::Active)
            .cloned())
    }

    async fn publish_version(
        &self,
        content_id: &str,
        version_id: &str,
        reviewer: &str,
    ) -> EngineResult<ContentVersion> {
        let mut inner = self.inner.lock();
        if !inner
            .versions
            .get(version_id)
            .is_some_and(|v| v.content_id == content_id)
        {
            return Err(EngineError::not_found("version", version_id));
        }

        for version in inner.versions.values_mut() {
            if version.content_id == content_id
                && version.status == VersionStatus::Active
                && version.id != version_id
            {
                version.status = VersionStatus::Archived;
            }
        }

        let version = inner
            .versions
            .get_mut(version_id)
            .ok_or_else(|| EngineError::not_found("version", version_id))?;
        version.status = VersionStatus::Active;
        version.published_at = Some(Utc::now());
        version.reviewed_by = Some(reviewer.to_string());
        Ok(version.clone())
    }

    async fn insert_interaction(&self, record: InteractionRecord) -> EngineResult<()> {
        self.inner.lock().interactions.push(record);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryAccommodationProvider {
    by_learner: RwLock<HashMap<String, Vec<AccommodationType>>>,
}

impl MemoryAccommodationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, learner_id: &str, accommodations: Vec<AccommodationType>) {
        self.by_learner
            .write()
            .insert(learner_id.to_string(), accommodations);
    }
}

#[async_trait]
impl AccommodationProvider for MemoryAccommodationProvider {
    async fn active_accommodations(
        &self,
        learner_id: &str,
    ) -> EngineResult<Vec<AccommodationType>> {
        Ok(self
            .by_learner
            .read()
            .get(learner_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn apply_accommodations(
        &self,
        mut result: AdaptationResult,
        accommodations: &[AccommodationType],
    ) -> EngineResult<AdaptationResult> {
        result.applied_accommodations = accommodations.to_vec();
        result.assistive = AssistiveFeatures::from_accommodations(accommodations);
        Ok(result)
    }
}

/// Test tracker with a failure switch, so fire-and-forget behavior can be
/// exercised without a real analytics collaborator.
#[derive(Default)]
pub struct MemoryEffectivenessTracker {
    records: Mutex<Vec<InteractionRecord>>,
    fail_next: AtomicBool,
}

impl MemoryEffectivenessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, fail: bool) {
        self.fail_next.store(fail, Ordering::Relaxed);
    }

    pub fn recorded(&self) -> Vec<InteractionRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl EffectivenessTracker for MemoryEffectivenessTracker {
    async fn record_interaction(&self, record: InteractionRecord) -> EngineResult<()> {
        if self.fail_next.load(Ordering::Relaxed) {
            return Err(EngineError::Storage("effectiveness tracker offline".into()));
        }
        self.records.lock().push(record);
        Ok(())
    }
}
