//! The trust score: a deterministic additive fold of steering and outcome
//! signals into one [0,1] scalar.

use tillit_core::{OutcomeMetrics, SteeringMetrics};

/// A session counts as autonomous with at most one intervention.
pub const AUTONOMY_INTERVENTION_LIMIT: usize = 1;

/// Compute the trust score. Starts at 0.5 and applies capped adjustments;
/// the result is clamped to [0,1] for any input.
pub fn compute_trust_score(steering: &SteeringMetrics, outcome: &OutcomeMetrics) -> f64 {
    let mut score: f64 = 0.5;

    score -= (steering.intervention_count as f64 * 0.1).min(0.3);

    if steering.goal_shift_count == 0 {
        score += 0.1;
    } else {
        score -= (steering.goal_shift_count as f64 * 0.05).min(0.15);
    }

    if outcome.commit_count > 0 {
        score += 0.15;
    }
    if outcome.push_count > 0 {
        score += 0.10;
    }

    if outcome.rework_count == 0 {
        score += 0.10;
    } else {
        score -= (outcome.rework_count as f64 * 0.1).min(0.2);
    }

    score -= (outcome.blocker_count as f64 * 0.05).min(0.15);

    if outcome.ended_with_error {
        score -= 0.10;
    } else {
        score += 0.05;
    }

    score.clamp(0.0, 1.0)
}

/// The autonomy flag paired with the score.
pub fn is_autonomous(steering: &SteeringMetrics) -> bool {
    steering.intervention_count <= AUTONOMY_INTERVENTION_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steering(interventions: usize, goal_shifts: usize) -> SteeringMetrics {
        SteeringMetrics {
            user_message_count: interventions + 1,
            intervention_count: interventions,
            first_intervention_progress: None,
            time_to_first_intervention_ms: None,
            intervention_density: 0.0,
            goal_shift_count: goal_shifts,
        }
    }

    fn outcome() -> OutcomeMetrics {
        OutcomeMetrics {
            commit_count: 0,
            push_count: 0,
            error_count: 0,
            error_density: 0.0,
            ended_with_error: false,
            blocker_count: 0,
            rework_count: 0,
            decision_count: 0,
        }
    }

    #[test]
    fn clean_autonomous_session_scores_high() {
        let mut o = outcome();
        o.commit_count = 1;
        o.push_count = 1;
        // 0.5 + 0.1 + 0.15 + 0.10 + 0.10 + 0.05 = 1.0
        let score = compute_trust_score(&steering(0, 0), &o);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn interventions_subtract_capped() {
        let base = compute_trust_score(&steering(0, 0), &outcome());
        let three = compute_trust_score(&steering(3, 0), &outcome());
        let hundred = compute_trust_score(&steering(100, 0), &outcome());
        assert!((base - three - 0.3).abs() < 1e-9);
        // The cap means 3 and 100 interventions penalize identically.
        assert_eq!(three, hundred);
    }

    #[test]
    fn score_clamped_under_extreme_friction() {
        let mut o = outcome();
        o.blocker_count = 100;
        o.rework_count = 100;
        o.ended_with_error = true;
        let score = compute_trust_score(&steering(100, 100), &o);
        assert!((0.0..=1.0).contains(&score));
        assert_eq!(score, 0.0);
    }

    #[test]
    fn goal_shift_flips_bonus_to_penalty() {
        let none = compute_trust_score(&steering(0, 0), &outcome());
        let one = compute_trust_score(&steering(0, 1), &outcome());
        assert!((none - one - 0.15).abs() < 1e-9); // +0.1 becomes -0.05
    }

    #[test]
    fn ended_with_error_costs_fifteen_points_swing() {
        let mut o = outcome();
        let ok = compute_trust_score(&steering(0, 0), &o);
        o.ended_with_error = true;
        let bad = compute_trust_score(&steering(0, 0), &o);
        assert!((ok - bad - 0.15).abs() < 1e-9); // +0.05 becomes -0.10
    }

    #[test]
    fn autonomy_threshold_is_one_intervention() {
        assert!(is_autonomous(&steering(0, 0)));
        assert!(is_autonomous(&steering(1, 0)));
        assert!(!is_autonomous(&steering(2, 0)));
    }
}
