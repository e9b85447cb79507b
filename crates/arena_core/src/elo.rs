//! Elo rating updates

use crate::error::{ArenaError, Result};
use crate::model::MatchOutcome;

/// Starting rating for new agents
pub const DEFAULT_RATING: f64 = 600.0;

/// K-factor for rating updates (higher = more volatile)
pub const K_FACTOR: f64 = 32.0;

/// Expected scores for both sides; always sums to 1.
pub fn expected_scores(rating_a: f64, rating_b: f64) -> (f64, f64) {
    let qa = 10.0_f64.powf(rating_a / 400.0);
    let qb = 10.0_f64.powf(rating_b / 400.0);
    let sum = qa + qb;
    (qa / sum, qb / sum)
}

/// Compute updated ratings for a settled outcome.
///
/// Pure; no clamping, ratings may go negative. `Unknown` is a programmer
/// error and fails with `InvalidOutcome`.
pub fn update_ratings(
    rating_a: f64,
    rating_b: f64,
    outcome: MatchOutcome,
    k: f64,
) -> Result<(f64, f64)> {
    let (score_a, score_b) = match outcome {
        MatchOutcome::LeftWon => (1.0, 0.0),
        MatchOutcome::RightWon => (0.0, 1.0),
        MatchOutcome::Draw => (0.5, 0.5),
        MatchOutcome::Unknown => return Err(ArenaError::InvalidOutcome(outcome)),
    };
    let (expected_a, expected_b) = expected_scores(rating_a, rating_b);
    Ok((
        rating_a + k * (score_a - expected_a),
        rating_b + k * (score_b - expected_b),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_scores_sum_to_one() {
        for (ra, rb) in [(600.0, 600.0), (600.0, 1000.0), (-50.0, 300.0), (0.0, 0.0)] {
            let (ea, eb) = expected_scores(ra, rb);
            assert!((ea + eb - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn equal_ratings_draw_is_a_no_op() {
        let (ra, rb) = update_ratings(600.0, 600.0, MatchOutcome::Draw, K_FACTOR).unwrap();
        assert_eq!(ra, 600.0);
        assert_eq!(rb, 600.0);
    }

    #[test]
    fn zero_sum_at_equal_k() {
        for outcome in [MatchOutcome::LeftWon, MatchOutcome::RightWon, MatchOutcome::Draw] {
            let (ra, rb) = update_ratings(640.0, 585.0, outcome, K_FACTOR).unwrap();
            let delta_a = ra - 640.0;
            let delta_b = rb - 585.0;
            assert!((delta_a + delta_b).abs() < 1e-9);
        }
    }

    #[test]
    fn symmetric_under_side_swap() {
        let (ra, rb) = update_ratings(700.0, 550.0, MatchOutcome::LeftWon, K_FACTOR).unwrap();
        let (rb2, ra2) = update_ratings(550.0, 700.0, MatchOutcome::RightWon, K_FACTOR).unwrap();
        assert!((ra - ra2).abs() < 1e-12);
        assert!((rb - rb2).abs() < 1e-12);
    }

    #[test]
    fn winner_gains_and_loser_drops() {
        let (ra, rb) = update_ratings(600.0, 600.0, MatchOutcome::LeftWon, K_FACTOR).unwrap();
        assert!(ra > 600.0);
        assert!(rb < 600.0);
        // Upset win moves more points than an expected win
        let (upset, _) = update_ratings(400.0, 800.0, MatchOutcome::LeftWon, K_FACTOR).unwrap();
        assert!(upset - 400.0 > ra - 600.0);
    }

    #[test]
    fn unknown_outcome_is_rejected() {
        let err = update_ratings(600.0, 600.0, MatchOutcome::Unknown, K_FACTOR).unwrap_err();
        assert!(matches!(err, ArenaError::InvalidOutcome(MatchOutcome::Unknown)));
    }
}
