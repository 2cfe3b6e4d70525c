//! Effectiveness scoring for completed sessions.
//!
//! Pure, deterministic mapping from session statistics to a qualitative
//! label and a 0-100 score. No side effects, no I/O.
//!
//! The label and the score follow two different rules: the label depends
//! solely on total duration, while the score also subtracts skip and
//! rest-extension penalties. That asymmetry matches the shipped product
//! behavior and is kept as-is.

use crate::catalog::PLANNED_SESSION_EXERCISE_TIME_SEC;
use crate::types::EffectivenessLabel;

/// Session statistics consumed by the scorer
#[derive(Clone, Copy, Debug)]
pub struct EffectivenessInput {
    /// Planned exercise time budget; accepted for interface parity but not
    /// part of the current scoring arithmetic
    pub planned_exercise_sec: u32,
    /// Total elapsed seconds across exercise and rest phases, excluding pauses
    pub actual_duration_sec: u32,
    /// Exercise phases ended early via skip
    pub skips: u32,
    /// Explicit rest-extension actions
    pub rest_extensions: u32,
}

/// Scorer output: label plus clamped 0-100 score
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectivenessRating {
    pub effectiveness: EffectivenessLabel,
    pub score: u8,
}

/// Compute the effectiveness rating for a finished session
///
/// Score: base 100, reduced by overrun tier past the 600 s ideal
/// (-10 for up to 2 min over, -20 up to 3 min, -35 beyond), then -10 per
/// skip and -3 per rest extension, clamped to 0..=100.
///
/// Label tiers on duration alone: 10 min, 12 min, 13 min.
pub fn compute_effectiveness(input: &EffectivenessInput) -> EffectivenessRating {
    let ideal_sec = PLANNED_SESSION_EXERCISE_TIME_SEC;
    let overrun = input.actual_duration_sec.saturating_sub(ideal_sec);

    let mut score: i64 = 100;
    if overrun == 0 {
        // on or under ideal
    } else if overrun <= 120 {
        score -= 10;
    } else if overrun <= 180 {
        score -= 20;
    } else {
        score -= 35;
    }

    score -= i64::from(input.skips) * 10;
    score -= i64::from(input.rest_extensions) * 3;

    let score = score.clamp(0, 100) as u8;

    let effectiveness = if input.actual_duration_sec <= 600 {
        EffectivenessLabel::HighlyEffective
    } else if input.actual_duration_sec <= 720 {
        EffectivenessLabel::Effective
    } else if input.actual_duration_sec <= 780 {
        EffectivenessLabel::LessEffective
    } else {
        EffectivenessLabel::NotEffective
    };

    tracing::debug!(
        "Effectiveness: {}s actual, {} skips, {} extensions -> {} ({})",
        input.actual_duration_sec,
        input.skips,
        input.rest_extensions,
        effectiveness,
        score
    );

    EffectivenessRating {
        effectiveness,
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(actual: u32, skips: u32, extensions: u32) -> EffectivenessRating {
        compute_effectiveness(&EffectivenessInput {
            planned_exercise_sec: PLANNED_SESSION_EXERCISE_TIME_SEC,
            actual_duration_sec: actual,
            skips,
            rest_extensions: extensions,
        })
    }

    #[test]
    fn test_clean_natural_session_scores_100() {
        let rating = rate(510, 0, 0);
        assert_eq!(rating.score, 100);
        assert_eq!(rating.effectiveness, EffectivenessLabel::HighlyEffective);
    }

    #[test]
    fn test_exactly_ideal_duration_scores_100() {
        let rating = rate(600, 0, 0);
        assert_eq!(rating.score, 100);
        assert_eq!(rating.effectiveness, EffectivenessLabel::HighlyEffective);
    }

    #[test]
    fn test_small_overrun_tier() {
        // 50s over: -10; duration 650 <= 720 -> Effective
        let rating = rate(650, 0, 0);
        assert_eq!(rating.score, 90);
        assert_eq!(rating.effectiveness, EffectivenessLabel::Effective);
    }

    #[test]
    fn test_overrun_tier_boundaries() {
        assert_eq!(rate(720, 0, 0).score, 90); // overrun 120, still first tier
        assert_eq!(rate(721, 0, 0).score, 80); // overrun 121, second tier
        assert_eq!(rate(780, 0, 0).score, 80); // overrun 180
        assert_eq!(rate(781, 0, 0).score, 65); // overrun 181
    }

    #[test]
    fn test_penalties_stack_with_overrun() {
        // Overrun 200 > 180 -> base 65; -10 skip -> 55; -6 extensions -> 49
        let rating = rate(800, 1, 2);
        assert_eq!(rating.score, 49);
        assert_eq!(rating.effectiveness, EffectivenessLabel::NotEffective);
    }

    #[test]
    fn test_score_clamped_at_zero() {
        let rating = rate(900, 10, 10);
        assert_eq!(rating.score, 0);
    }

    #[test]
    fn test_label_boundaries() {
        assert_eq!(rate(600, 0, 0).effectiveness, EffectivenessLabel::HighlyEffective);
        assert_eq!(rate(601, 0, 0).effectiveness, EffectivenessLabel::Effective);
        assert_eq!(rate(720, 0, 0).effectiveness, EffectivenessLabel::Effective);
        assert_eq!(rate(721, 0, 0).effectiveness, EffectivenessLabel::LessEffective);
        assert_eq!(rate(780, 0, 0).effectiveness, EffectivenessLabel::LessEffective);
        assert_eq!(rate(781, 0, 0).effectiveness, EffectivenessLabel::NotEffective);
    }

    #[test]
    fn test_label_ignores_penalties() {
        // Heavy penalties tank the score but the label tracks duration only
        let rating = rate(510, 5, 5);
        assert_eq!(rating.effectiveness, EffectivenessLabel::HighlyEffective);
        assert_eq!(rating.score, 35);
    }
}
