//! Adaptive curriculum engine: multi-day lesson planning, the difficulty
//! adjustment loop, and mid-session activity substitution. Every operation
//! is an independent async call over injected collaborators; the engine
//! keeps no per-session state.

pub mod rollup;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::Rng;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::services::content_library::ContentLibrary;
use crate::services::difficulty::{
    base_scaffolds, baseline_domain_levels, build_daily_scaffolds, estimate_starting_level,
    merge_domain_levels,
};
use crate::storage::{AssessmentStore, LearnerStore};
use crate::types::{
    Activity, AdjustmentAction, DailyLesson, DifficultyAdjustment, Domain, LearnerProfile,
    LessonActivity, LessonPlan, PerformanceMetrics, Skill, MAX_LEVEL, MIN_LEVEL,
};

const DAILY_CANDIDATE_LIMIT: usize = 3;
const SUBSTITUTION_CANDIDATE_LIMIT: usize = 5;

const PROMOTION_STREAK: u32 = 5;
const PROMOTION_ACCURACY: f64 = 0.9;
const DEMOTION_STREAK: u32 = 3;
const DEMOTION_ACCURACY: f64 = 0.5;
const STEADY_ACCURACY: f64 = 0.7;
const SLOW_RESPONSE_MS: f64 = 90_000.0;

const ENCOURAGEMENTS: &[&str] = &[
    "You're doing great — keep that focus going!",
    "Nice steady work. One problem at a time.",
    "Strong effort! You're right where you should be.",
    "Keep it up — your practice is paying off.",
];

pub struct AdaptiveCurriculumEngine {
    learners: Arc<dyn LearnerStore>,
    assessments: Arc<dyn AssessmentStore>,
    library: ContentLibrary,
    config: EngineConfig,
}

impl AdaptiveCurriculumEngine {
    pub fn new(
        learners: Arc<dyn LearnerStore>,
        assessments: Arc<dyn AssessmentStore>,
        library: ContentLibrary,
    ) -> Self {
        Self::with_config(learners, assessments, library, EngineConfig::default())
    }

    pub fn with_config(
        learners: Arc<dyn LearnerStore>,
        assessments: Arc<dyn AssessmentStore>,
        library: ContentLibrary,
        config: EngineConfig,
    ) -> Self {
        Self {
            learners,
            assessments,
            library,
            config,
        }
    }

    /// Builds a lesson plan snapshot covering `duration_days` consecutive
    /// calendar days starting today. The plan is returned, not persisted;
    /// an unknown learner is fatal.
    pub async fn generate_lesson_plan(
        &self,
        learner_id: &str,
        subject: Domain,
        duration_days: Option<u32>,
    ) -> EngineResult<LessonPlan> {
        let duration_days = duration_days
            .filter(|d| *d > 0)
            .unwrap_or(self.config.default_plan_days);

        let learner = self.learners.get_profile(learner_id).await?;
        let baseline = self.assessments.latest_completed_baseline(learner_id).await?;

        let baseline_levels = baseline
            .as_ref()
            .map(baseline_domain_levels)
            .unwrap_or_default();
        let domain_levels = merge_domain_levels(&baseline_levels, &learner.domain_levels);

        let skills = self.library_skills(subject).await?;
        let start_date = Utc::now().date_naive();

        let mut daily_schedule = Vec::with_capacity(duration_days as usize);
        for day in 0..duration_days as usize {
            let skill = &skills[day % skills.len()];
            let level = estimate_starting_level(&learner, &domain_levels, subject, day);

            let mut candidates = self
                .library
                .activities_for_skill(skill, level, DAILY_CANDIDATE_LIMIT)
                .await?;
            if candidates.is_empty() {
                candidates = self
                    .library
                    .fallback_activities(subject, level, DAILY_CANDIDATE_LIMIT);
            }

            let scaffolds = build_daily_scaffolds(level, &learner);
            let lessons: Vec<LessonActivity> = candidates
                .into_iter()
                .enumerate()
                .map(|(sequence, mut activity)| {
                    if activity.scaffolding.is_empty() {
                        activity.scaffolding = scaffolds.clone();
                    }
                    LessonActivity {
                        skill_id: skill.id.clone(),
                        skill_name: skill.name.clone(),
                        domain: skill.domain,
                        sequence,
                        activity,
                    }
                })
                .collect();

            let focus_domain = lessons
                .first()
                .map(|lesson| lesson.domain)
                .unwrap_or(Domain::default_focus(subject));
            let total_minutes = lessons
                .iter()
                .map(|lesson| lesson.activity.estimated_minutes)
                .sum();

            daily_schedule.push(DailyLesson {
                date: start_date + Duration::days(day as i64),
                focus_domain,
                lessons,
                total_minutes,
            });
        }

        let plan = LessonPlan {
            id: Uuid::new_v4().to_string(),
            learner_id: learner_id.to_string(),
            subject,
            start_date,
            end_date: start_date + Duration::days(duration_days as i64 - 1),
            duration_days,
            domain_levels,
            learner,
            daily_schedule,
        };

        info!(
            learner_id,
            subject = subject.as_str(),
            days = duration_days,
            plan_id = %plan.id,
            "generated lesson plan"
        );
        Ok(plan)
    }

    /// Difficulty adjustment for one completed interaction. `session_id` is
    /// a correlation token only; the decision is a pure function of the
    /// metrics.
    pub fn adjust_difficulty(
        &self,
        session_id: &str,
        metrics: &PerformanceMetrics,
    ) -> DifficultyAdjustment {
        let adjustment = decide_adjustment(metrics);
        debug!(
            session_id,
            action = adjustment.action.as_str(),
            new_level = adjustment.new_level,
            "difficulty adjustment"
        );
        adjustment
    }

    /// Picks the next activity for a skill mid-session, skipping completed
    /// activities. Never returns empty: when every candidate is exhausted a
    /// synthetic activity at the target level is substituted.
    pub async fn select_next_activity(
        &self,
        skill: &Skill,
        learner: &LearnerProfile,
        completed_activity_ids: &[String],
    ) -> EngineResult<Activity> {
        let day_index = completed_activity_ids.len();
        let level = estimate_starting_level(learner, &HashMap::new(), skill.domain, day_index);

        let candidates = self
            .library
            .activities_for_skill(skill, level, SUBSTITUTION_CANDIDATE_LIMIT)
            .await?;

        if let Some(activity) = candidates
            .into_iter()
            .find(|activity| !completed_activity_ids.contains(&activity.id))
        {
            return Ok(activity);
        }

        debug!(
            skill_id = %skill.id,
            level,
            "all candidates completed, substituting synthetic activity"
        );
        Ok(self.library.fallback_activity(skill.domain, level))
    }

    async fn library_skills(&self, subject: Domain) -> EngineResult<Vec<Skill>> {
        let skills = self.library.skills_for_subject(subject).await?;
        if skills.is_empty() {
            Ok(vec![fallback_skill(subject)])
        } else {
            Ok(skills)
        }
    }
}

/// The ZPD transition table, evaluated top to bottom; the first matching
/// rule wins. Levels are clamped to [1, 12].
pub fn decide_adjustment(metrics: &PerformanceMetrics) -> DifficultyAdjustment {
    let level = metrics.current_level.unwrap_or(MIN_LEVEL);

    if metrics.consecutive_correct >= PROMOTION_STREAK && metrics.accuracy >= PROMOTION_ACCURACY {
        let new_level = level.saturating_add(1).min(MAX_LEVEL);
        return DifficultyAdjustment {
            action: AdjustmentAction::Increase,
            new_level: Some(new_level),
            reason: format!(
                "{} correct in a row at {:.0}% accuracy — ready for level {new_level}",
                metrics.consecutive_correct,
                metrics.accuracy * 100.0
            ),
            scaffolding: None,
            encouragement: None,
        };
    }

    if metrics.consecutive_incorrect >= DEMOTION_STREAK
        || metrics.accuracy < DEMOTION_ACCURACY
        || metrics.time_per_question_ms > SLOW_RESPONSE_MS
    {
        let new_level = level.saturating_sub(1).max(MIN_LEVEL);
        return DifficultyAdjustment {
            action: AdjustmentAction::Decrease,
            new_level: Some(new_level),
            reason: format!("Recent work is above the comfort zone — easing to level {new_level}"),
            scaffolding: Some(base_scaffolds(new_level)),
            encouragement: None,
        };
    }

    if metrics.accuracy >= STEADY_ACCURACY && metrics.accuracy < PROMOTION_ACCURACY {
        return DifficultyAdjustment {
            action: AdjustmentAction::Maintain,
            new_level: None,
            reason: "Working comfortably in the zone of proximal development".to_string(),
            scaffolding: None,
            encouragement: Some(pick_encouragement()),
        };
    }

    DifficultyAdjustment {
        action: AdjustmentAction::Maintain,
        new_level: None,
        reason: "Not enough evidence to adjust yet".to_string(),
        scaffolding: None,
        encouragement: None,
    }
}

fn pick_encouragement() -> String {
    let index = rand::rng().random_range(0..ENCOURAGEMENTS.len());
    ENCOURAGEMENTS[index].to_string()
}

fn fallback_skill(subject: Domain) -> Skill {
    Skill {
        id: format!("synthetic-{}", subject.as_str().to_lowercase()),
        name: format!("{} foundations", subject.display_name()),
        domain: subject,
        description: Some(format!(
            "Foundational {} practice used until the subject has authored skills",
            subject.display_name()
        )),
        target_grade: None,
        module_id: None,
    }
}
