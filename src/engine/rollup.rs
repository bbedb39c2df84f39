//! Per-session performance roll-up.

use crate::types::{ActivityResult, PerformanceMetrics};

/// A result at or above this accuracy extends the correct streak.
pub const CORRECT_STREAK_THRESHOLD: f64 = 0.75;
/// A result below this accuracy extends the incorrect streak.
pub const INCORRECT_STREAK_THRESHOLD: f64 = 0.5;

/// Folds one completed activity into the session metrics. Aggregates are
/// running means. A result in [0.5, 0.75) resets both streaks and
/// advances neither.
pub fn rollup(
    previous: &PerformanceMetrics,
    result: &ActivityResult,
    level: u8,
) -> PerformanceMetrics {
    let sample_size = previous.sample_size + 1;
    let n = sample_size as f64;

    let accuracy = (previous.accuracy * (n - 1.0) + result.accuracy) / n;
    let time_per_question_ms =
        (previous.time_per_question_ms * (n - 1.0) + result.time_per_question_ms) / n;

    let consecutive_correct = if result.accuracy >= CORRECT_STREAK_THRESHOLD {
        previous.consecutive_correct + 1
    } else {
        0
    };
    let consecutive_incorrect = if result.accuracy < INCORRECT_STREAK_THRESHOLD {
        previous.consecutive_incorrect + 1
    } else {
        0
    };

    PerformanceMetrics {
        accuracy,
        time_per_question_ms,
        consecutive_correct,
        consecutive_incorrect,
        current_level: previous.current_level.or(Some(level)),
        sample_size,
    }
}
