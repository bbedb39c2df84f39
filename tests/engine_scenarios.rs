//! End-to-end scenarios for the adaptive curriculum engine over the
//! in-memory collaborator implementations.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};

use neuroleap_engine::engine::AdaptiveCurriculumEngine;
use neuroleap_engine::error::EngineError;
use neuroleap_engine::services::content_library::ContentLibrary;
use neuroleap_engine::storage::memory::{
    MemoryAssessmentStore, MemoryContentStore, MemoryLearnerStore,
};
use neuroleap_engine::storage::{
    BaselineResult, BaselineSession, ContentItem, ContentStore, LearnerStore,
};
use neuroleap_engine::types::{
    AdjustmentAction, Domain, LearnerProfile, LearningStyle, Modality, PerformanceMetrics, Skill,
};

struct Fixture {
    engine: AdaptiveCurriculumEngine,
    learners: Arc<MemoryLearnerStore>,
    assessments: Arc<MemoryAssessmentStore>,
    content: Arc<MemoryContentStore>,
}

fn fixture() -> Fixture {
    let learners = Arc::new(MemoryLearnerStore::new());
    let assessments = Arc::new(MemoryAssessmentStore::new());
    let content = Arc::new(MemoryContentStore::new());
    let library = ContentLibrary::new(Arc::clone(&content) as Arc<dyn ContentStore>);
    let engine = AdaptiveCurriculumEngine::new(
        Arc::clone(&learners) as Arc<dyn LearnerStore>,
        Arc::clone(&assessments) as _,
        library,
    );
    Fixture {
        engine,
        learners,
        assessments,
        content,
    }
}

fn learner(id: &str, grade: u8, actual: Option<u8>) -> LearnerProfile {
    LearnerProfile {
        id: id.to_string(),
        grade_level: grade,
        actual_level: actual,
        domain_levels: HashMap::new(),
        learning_style: LearningStyle::Visual,
        diagnoses: vec![],
        strengths: vec!["patterns".to_string()],
        challenges: vec!["working memory".to_string()],
    }
}

fn math_skill() -> Skill {
    Skill {
        id: "skill-mult".to_string(),
        name: "Multiplication facts".to_string(),
        domain: Domain::Math,
        description: None,
        target_grade: Some(3),
        module_id: Some("module-math-1".to_string()),
    }
}

fn item(id: &str, difficulty: f64) -> ContentItem {
    ContentItem {
        id: id.to_string(),
        module_id: "module-math-1".to_string(),
        title: format!("Activity {id}"),
        description: "Stored practice".to_string(),
        difficulty,
        estimated_minutes: 12,
        modality: Modality::Visual,
        active: true,
        tags: vec!["interactive".to_string()],
        standard_code: None,
        resources: vec![],
        scaffolding: vec![],
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn three_day_plan_without_baseline_tracks_actual_level() {
    let fx = fixture();
    fx.learners.insert(learner("learner-1", 5, Some(3)));

    let plan = fx
        .engine
        .generate_lesson_plan("learner-1", Domain::Math, Some(3))
        .await
        .expect("plan");

    assert_eq!(plan.daily_schedule.len(), 3);
    assert_eq!(plan.duration_days, 3);
    assert_eq!(plan.subject, Domain::Math);

    let start = plan.start_date;
    for (day, daily) in plan.daily_schedule.iter().enumerate() {
        assert_eq!(daily.date, start + Duration::days(day as i64));
        assert!(!daily.lessons.is_empty());
        assert_eq!(daily.focus_domain, Domain::Math);
        // Target level is 3, nudged to 4 on every third day; candidate
        // difficulties stay within one level of the day's target.
        let target = if day % 3 == 0 { 4.0 } else { 3.0 };
        for lesson in &daily.lessons {
            assert!(
                (lesson.activity.difficulty - target).abs() <= 1.0,
                "day {day} difficulty {} too far from target {target}",
                lesson.activity.difficulty
            );
            assert!(!lesson.activity.scaffolding.is_empty());
        }
        assert_eq!(
            daily.total_minutes,
            daily
                .lessons
                .iter()
                .map(|l| l.activity.estimated_minutes)
                .sum::<i32>()
        );
    }
}

#[tokio::test]
async fn plan_merges_baseline_with_profile_precedence() {
    let fx = fixture();
    let mut profile = learner("learner-2", 4, None);
    profile.domain_levels.insert(Domain::Reading, 9);
    fx.learners.insert(profile);
    fx.assessments.insert(BaselineSession {
        id: "baseline-1".to_string(),
        learner_id: "learner-2".to_string(),
        completed_at: Utc::now(),
        results: vec![
            BaselineResult {
                domain: Domain::Math,
                score: 0.5,
            },
            BaselineResult {
                domain: Domain::Reading,
                score: 0.25,
            },
        ],
    });

    let plan = fx
        .engine
        .generate_lesson_plan("learner-2", Domain::Math, Some(2))
        .await
        .expect("plan");

    // Baseline supplies MATH; the profile's explicit READING level wins.
    assert_eq!(plan.domain_levels.get(&Domain::Math), Some(&6));
    assert_eq!(plan.domain_levels.get(&Domain::Reading), Some(&9));
}

#[tokio::test]
async fn plan_prefers_stored_content_and_cycles_skills() {
    let fx = fixture();
    fx.learners.insert(learner("learner-3", 3, Some(3)));
    fx.content.insert_skill(math_skill());
    fx.content.insert_skill(Skill {
        id: "skill-frac".to_string(),
        name: "Fractions".to_string(),
        module_id: Some("module-math-2".to_string()),
        ..math_skill()
    });
    for (id, difficulty) in [("a", 3.0), ("b", 4.0), ("c", 8.0)] {
        fx.content.insert_item(item(id, difficulty));
    }

    let plan = fx
        .engine
        .generate_lesson_plan("learner-3", Domain::Math, Some(4))
        .await
        .expect("plan");

    // Day 0 and day 2 land on the first skill, day 1 and day 3 on the second.
    assert_eq!(plan.daily_schedule[0].lessons[0].skill_id, "skill-mult");
    assert_eq!(plan.daily_schedule[1].lessons[0].skill_id, "skill-frac");
    assert_eq!(plan.daily_schedule[2].lessons[0].skill_id, "skill-mult");

    // The first skill has stored content; its days use stored activities.
    let day0_ids: Vec<&str> = plan.daily_schedule[0]
        .lessons
        .iter()
        .map(|l| l.activity.id.as_str())
        .collect();
    assert!(day0_ids.contains(&"a") && day0_ids.contains(&"b"));

    // The second skill's module is empty; its days use the synthetic backstop.
    assert!(plan.daily_schedule[1].lessons[0]
        .activity
        .id
        .starts_with("fallback-"));
}

#[tokio::test]
async fn unknown_learner_is_fatal() {
    let fx = fixture();
    let err = fx
        .engine
        .generate_lesson_plan("nobody", Domain::Math, Some(3))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
}

#[tokio::test]
async fn streak_promotion_scenario() {
    let fx = fixture();
    let metrics = PerformanceMetrics {
        accuracy: 0.95,
        time_per_question_ms: 4_000.0,
        consecutive_correct: 5,
        consecutive_incorrect: 0,
        current_level: Some(6),
        sample_size: 8,
    };

    let adjustment = fx.engine.adjust_difficulty("session-1", &metrics);
    assert_eq!(adjustment.action, AdjustmentAction::Increase);
    assert_eq!(adjustment.new_level, Some(7));
}

#[tokio::test]
async fn struggling_learner_scenario_attaches_scaffolds() {
    let fx = fixture();
    let metrics = PerformanceMetrics {
        accuracy: 0.3,
        time_per_question_ms: 12_000.0,
        consecutive_correct: 0,
        consecutive_incorrect: 3,
        current_level: Some(4),
        sample_size: 8,
    };

    let adjustment = fx.engine.adjust_difficulty("session-1", &metrics);
    assert_eq!(adjustment.action, AdjustmentAction::Decrease);
    assert_eq!(adjustment.new_level, Some(3));
    assert!(adjustment
        .scaffolding
        .as_ref()
        .is_some_and(|s| !s.is_empty()));
}

#[tokio::test]
async fn substitution_skips_completed_activities() {
    let fx = fixture();
    for (id, difficulty) in [("a", 4.0), ("b", 4.0), ("c", 5.0)] {
        fx.content.insert_item(item(id, difficulty));
    }
    let profile = learner("learner-4", 4, Some(4));

    let next = fx
        .engine
        .select_next_activity(&math_skill(), &profile, &["a".to_string()])
        .await
        .expect("selection");
    assert_ne!(next.id, "a");
}

#[tokio::test]
async fn substitution_falls_back_when_all_candidates_completed() {
    let fx = fixture();
    let ids = ["a", "b", "c", "d", "e"];
    for id in ids {
        fx.content.insert_item(item(id, 4.0));
    }
    let completed: Vec<String> = ids.iter().map(|s| s.to_string()).collect();
    let profile = learner("learner-5", 4, Some(4));

    let next = fx
        .engine
        .select_next_activity(&math_skill(), &profile, &completed)
        .await
        .expect("selection");

    assert!(next.id.starts_with("fallback-"));
    // Five completed activities means day index 5: no stretch nudge, so the
    // substitute sits exactly at the learner's level.
    assert_eq!(next.difficulty, 4.0);
}
