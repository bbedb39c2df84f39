//! Zone-of-proximal-development difficulty policy: starting-level
//! estimation, scaffold construction and the baseline/profile merge.

use std::collections::HashMap;

use crate::storage::BaselineSession;
use crate::types::{clamp_level, Diagnosis, Domain, LearnerProfile};

// Every third session gets a +0.5 stretch before rounding.
const STRETCH_INTERVAL: usize = 3;
const STRETCH_NUDGE: f64 = 0.5;

pub fn estimate_starting_level(
    learner: &LearnerProfile,
    domain_levels: &HashMap<Domain, u8>,
    subject: Domain,
    day_index: usize,
) -> u8 {
    let base = domain_levels
        .get(&subject)
        .or_else(|| learner.domain_levels.get(&subject))
        .copied()
        .or(learner.actual_level)
        .unwrap_or(learner.grade_level) as f64;

    let nudged = if day_index % STRETCH_INTERVAL == 0 {
        base + STRETCH_NUDGE
    } else {
        base
    };

    clamp_level(nudged)
}

/// Level-referenced scaffolds attached to DECREASE adjustments and used as
/// the base of the per-day list.
pub fn base_scaffolds(level: u8) -> Vec<String> {
    vec![
        format!("Model one worked example at level {level} before independent practice"),
        format!("Chunk level-{level} tasks into steps of two or three moves"),
        "Offer a hint after the first incorrect attempt, then re-ask".to_string(),
    ]
}

/// Base scaffolds plus diagnosis-specific additions. Additions are
/// additive, so a learner tagged with both ADHD and ASD receives both sets.
pub fn build_daily_scaffolds(level: u8, profile: &LearnerProfile) -> Vec<String> {
    let mut scaffolds = base_scaffolds(level);

    if profile.has_diagnosis(Diagnosis::Adhd) {
        scaffolds.push("Schedule a movement break between activities".to_string());
        scaffolds.push("Run a visible micro-timer for each task chunk".to_string());
    }
    if profile.has_diagnosis(Diagnosis::Asd) {
        scaffolds.push("Preview the visual schedule before the first task".to_string());
        scaffolds.push("Use a concrete script for transitions between tasks".to_string());
    }

    scaffolds
}

/// Per-domain levels from a completed baseline: mean of `round(score * 12)`
/// clamped to [1, 12]. Domains with no results are omitted.
pub fn baseline_domain_levels(session: &BaselineSession) -> HashMap<Domain, u8> {
    let mut sums: HashMap<Domain, (f64, u32)> = HashMap::new();
    for result in &session.results {
        let level = clamp_level(result.score * 12.0) as f64;
        let entry = sums.entry(result.domain).or_insert((0.0, 0));
        entry.0 += level;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(domain, (sum, count))| (domain, clamp_level(sum / count as f64)))
        .collect()
}

/// Merge policy for domain levels: the learner profile's explicit levels
/// take precedence over baseline-derived levels on key collision.
pub fn merge_domain_levels(
    baseline: &HashMap<Domain, u8>,
    profile: &HashMap<Domain, u8>,
) -> HashMap<Domain, u8> {
    let mut merged = baseline.clone();
    for (domain, level) in profile {
        merged.insert(*domain, *level);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::BaselineResult;
    use crate::types::LearningStyle;
    use chrono::Utc;

    fn profile(actual_level: Option<u8>, diagnoses: Vec<Diagnosis>) -> LearnerProfile {
        LearnerProfile {
            id: "learner-1".to_string(),
            grade_level: 5,
            actual_level,
            domain_levels: HashMap::new(),
            learning_style: LearningStyle::Mixed,
            diagnoses,
            strengths: vec![],
            challenges: vec![],
        }
    }

    #[test]
    fn test_estimate_prefers_merged_levels() {
        let learner = profile(Some(3), vec![]);
        let mut merged = HashMap::new();
        merged.insert(Domain::Math, 7);
        assert_eq!(
            estimate_starting_level(&learner, &merged, Domain::Math, 1),
            7
        );
    }

    #[test]
    fn test_estimate_falls_back_through_actual_to_grade() {
        let merged = HashMap::new();
        assert_eq!(
            estimate_starting_level(&profile(Some(3), vec![]), &merged, Domain::Math, 1),
            3
        );
        assert_eq!(
            estimate_starting_level(&profile(None, vec![]), &merged, Domain::Math, 1),
            5
        );
    }

    #[test]
    fn test_estimate_stretch_every_third_day() {
        let learner = profile(Some(3), vec![]);
        let merged = HashMap::new();
        // Half-up rounding lifts day 0 and day 3 to 4.
        assert_eq!(
            estimate_starting_level(&learner, &merged, Domain::Math, 0),
            4
        );
        assert_eq!(
            estimate_starting_level(&learner, &merged, Domain::Math, 1),
            3
        );
        assert_eq!(
            estimate_starting_level(&learner, &merged, Domain::Math, 3),
            4
        );
    }

    #[test]
    fn test_estimate_clamps_at_top() {
        let learner = profile(Some(12), vec![]);
        let merged = HashMap::new();
        assert_eq!(
            estimate_starting_level(&learner, &merged, Domain::Math, 0),
            12
        );
    }

    #[test]
    fn test_scaffolds_diagnosis_additions_are_additive() {
        let base = build_daily_scaffolds(4, &profile(None, vec![]));
        assert_eq!(base.len(), 3);

        let adhd = build_daily_scaffolds(4, &profile(None, vec![Diagnosis::Adhd]));
        assert_eq!(adhd.len(), 5);

        let both = build_daily_scaffolds(4, &profile(None, vec![Diagnosis::Adhd, Diagnosis::Asd]));
        assert_eq!(both.len(), 7);
    }

    #[test]
    fn test_baseline_levels_average_per_domain() {
        let session = BaselineSession {
            id: "b-1".to_string(),
            learner_id: "learner-1".to_string(),
            completed_at: Utc::now(),
            results: vec![
                BaselineResult {
                    domain: Domain::Math,
                    score: 0.5,
                },
                BaselineResult {
                    domain: Domain::Math,
                    score: 0.25,
                },
                BaselineResult {
                    domain: Domain::Reading,
                    score: 0.0,
                },
            ],
        };

        let levels = baseline_domain_levels(&session);
        // round(0.5*12)=6, round(0.25*12)=3, mean 4.5 rounds to 5.
        assert_eq!(levels.get(&Domain::Math), Some(&5));
        // Score 0 clamps up to level 1.
        assert_eq!(levels.get(&Domain::Reading), Some(&1));
        assert!(!levels.contains_key(&Domain::Writing));
    }

    #[test]
    fn test_merge_profile_wins() {
        let mut baseline = HashMap::new();
        baseline.insert(Domain::Math, 4);
        baseline.insert(Domain::Reading, 6);
        let mut profile_levels = HashMap::new();
        profile_levels.insert(Domain::Math, 8);

        let merged = merge_domain_levels(&baseline, &profile_levels);
        assert_eq!(merged.get(&Domain::Math), Some(&8));
        assert_eq!(merged.get(&Domain::Reading), Some(&6));
    }
}
