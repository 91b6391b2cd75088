//! Category-level trust aggregation.
//!
//! Groups per-session analyses by each category dimension (area, ticket
//! type, branch type, label, project) into statistical aggregates with a
//! sample-size-based confidence, plus a global baseline. A trust map is
//! always recomputed in full from a consistent snapshot of analyses —
//! there are no incremental updates.

use std::collections::HashMap;

use tillit_core::{SessionTrustAnalysis, TrustAggregate, TrustBaseline, TrustMap};

/// Sigmoid steepness and midpoint for sample-size confidence. Hand-tuned;
/// kept exact for parity with stored maps.
const CONFIDENCE_K: f64 = 0.2;
const CONFIDENCE_MIDPOINT: f64 = 5.0;

/// Convention when no session in a group has a measurable first
/// intervention: report the middle of the session.
const DEFAULT_FIRST_INTERVENTION_PROGRESS: f64 = 0.5;

/// Confidence in a group's averages as a sigmoid of its sample size:
/// `1 / (1 + e^(-k (n - midpoint)))`.
pub fn sample_confidence(total_sessions: usize) -> f64 {
    1.0 / (1.0 + (-CONFIDENCE_K * (total_sessions as f64 - CONFIDENCE_MIDPOINT)).exp())
}

fn aggregate_group(key: String, sessions: &[&SessionTrustAnalysis]) -> TrustAggregate {
    let total = sessions.len();
    let n = total as f64;

    let autonomous_sessions = sessions.iter().filter(|s| s.autonomous).count();
    let mean = |f: &dyn Fn(&SessionTrustAnalysis) -> f64| {
        sessions.iter().map(|s| f(s)).sum::<f64>() / n
    };
    let share = |f: &dyn Fn(&SessionTrustAnalysis) -> bool| {
        sessions.iter().filter(|s| f(s)).count() as f64 / n
    };

    let progress_samples: Vec<f64> = sessions
        .iter()
        .filter(|s| s.steering.intervention_count >= 1)
        .filter_map(|s| s.steering.first_intervention_progress)
        .collect();
    let avg_first_intervention_progress = if progress_samples.is_empty() {
        DEFAULT_FIRST_INTERVENTION_PROGRESS
    } else {
        progress_samples.iter().sum::<f64>() / progress_samples.len() as f64
    };

    TrustAggregate {
        total_sessions: total,
        autonomous_sessions,
        autonomous_rate: autonomous_sessions as f64 / n,
        avg_trust_score: mean(&|s| s.trust_score),
        avg_intervention_count: mean(&|s| s.steering.intervention_count as f64),
        avg_intervention_density: mean(&|s| s.steering.intervention_density),
        commit_rate: share(&|s| s.outcome.commit_count > 0),
        rework_rate: share(&|s| s.outcome.rework_count > 0),
        error_rate: share(&|s| s.outcome.ended_with_error),
        avg_first_intervention_progress,
        confidence: sample_confidence(total),
        key,
    }
}

/// Shared aggregation routine. The extractor returns every category key a
/// session belongs to: one key for single-key dimensions, several for
/// labels, none to leave the session out of the dimension entirely.
pub fn aggregate_by<F>(analyses: &[SessionTrustAnalysis], extract: F) -> Vec<TrustAggregate>
where
    F: Fn(&SessionTrustAnalysis) -> Vec<String>,
{
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<&SessionTrustAnalysis>> = HashMap::new();

    for analysis in analyses {
        for key in extract(analysis) {
            if !groups.contains_key(&key) {
                order.push(key.clone());
            }
            groups.entry(key).or_default().push(analysis);
        }
    }

    let mut aggregates: Vec<TrustAggregate> = order
        .into_iter()
        .map(|key| {
            let sessions = &groups[&key];
            aggregate_group(key, sessions)
        })
        .collect();

    // Largest groups first; key order breaks ties deterministically.
    aggregates.sort_by(|a, b| {
        b.total_sessions
            .cmp(&a.total_sessions)
            .then_with(|| a.key.cmp(&b.key))
    });
    aggregates
}

fn baseline(analyses: &[SessionTrustAnalysis]) -> TrustBaseline {
    if analyses.is_empty() {
        return TrustBaseline::default();
    }
    let n = analyses.len() as f64;
    TrustBaseline {
        total_sessions: analyses.len(),
        autonomous_rate: analyses.iter().filter(|s| s.autonomous).count() as f64 / n,
        avg_trust_score: analyses.iter().map(|s| s.trust_score).sum::<f64>() / n,
        avg_intervention_count: analyses
            .iter()
            .map(|s| s.steering.intervention_count as f64)
            .sum::<f64>()
            / n,
    }
}

/// Recompute the full trust map from a snapshot of session analyses.
///
/// `computed_at` is supplied by the caller so identical input always
/// produces an identical map. Empty input yields an all-zero map.
pub fn build_trust_map(analyses: &[SessionTrustAnalysis], computed_at: &str) -> TrustMap {
    tracing::debug!(sessions = analyses.len(), "rebuilding trust map");

    let single = |get: fn(&SessionTrustAnalysis) -> Option<&String>| {
        move |s: &SessionTrustAnalysis| get(s).cloned().into_iter().collect::<Vec<_>>()
    };

    TrustMap {
        by_area: aggregate_by(analyses, single(|s| s.characteristics.codebase_area.as_ref())),
        by_ticket_type: aggregate_by(analyses, single(|s| s.characteristics.ticket_type.as_ref())),
        by_branch_type: aggregate_by(analyses, single(|s| s.characteristics.branch_type.as_ref())),
        by_label: aggregate_by(analyses, |s| s.characteristics.labels.clone()),
        by_project: aggregate_by(analyses, single(|s| s.characteristics.project.as_ref())),
        baseline: baseline(analyses),
        computed_at: computed_at.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tillit_core::{OutcomeMetrics, SteeringMetrics, TaskCharacteristics};

    fn analysis(id: &str, area: &str, interventions: usize, trust: f64) -> SessionTrustAnalysis {
        SessionTrustAnalysis {
            session_id: id.to_string(),
            steering: SteeringMetrics {
                user_message_count: interventions + 1,
                intervention_count: interventions,
                first_intervention_progress: None,
                time_to_first_intervention_ms: None,
                intervention_density: 0.0,
                goal_shift_count: 0,
            },
            characteristics: TaskCharacteristics {
                codebase_area: Some(area.to_string()),
                branch_type: Some("feature".into()),
                subtask_count: 0,
                tool_diversity: 1,
                ticket_type: None,
                labels: Vec::new(),
                project: Some("tillit".into()),
            },
            outcome: OutcomeMetrics {
                commit_count: 1,
                push_count: 0,
                error_count: 0,
                error_density: 0.0,
                ended_with_error: false,
                blocker_count: 0,
                rework_count: 0,
                decision_count: 0,
            },
            trust_score: trust,
            autonomous: interventions <= 1,
        }
    }

    #[test]
    fn areas_group_and_count() {
        let analyses = vec![
            analysis("s1", "src/auth", 0, 0.9),
            analysis("s2", "src/auth", 2, 0.5),
            analysis("s3", "src/api", 0, 0.8),
        ];
        let map = build_trust_map(&analyses, "2026-02-01T00:00:00Z");
        assert_eq!(map.by_area.len(), 2);
        let auth = map.by_area.iter().find(|a| a.key == "src/auth").unwrap();
        assert_eq!(auth.total_sessions, 2);
        assert_eq!(auth.autonomous_sessions, 1);
        assert!((auth.autonomous_rate - 0.5).abs() < 1e-9);
        assert!((auth.avg_trust_score - 0.7).abs() < 1e-9);
        // Largest group sorts first.
        assert_eq!(map.by_area[0].key, "src/auth");
    }

    #[test]
    fn confidence_grows_with_sample_size() {
        assert!(sample_confidence(20) > 0.8);
        assert!(sample_confidence(2) < 0.6);
        assert!((sample_confidence(5) - 0.5).abs() < 1e-9); // midpoint
        for n in [0, 1, 5, 50, 500] {
            let c = sample_confidence(n);
            assert!((0.0..=1.0).contains(&c));
        }
    }

    #[test]
    fn labels_fan_one_session_into_many_groups() {
        let mut a = analysis("s1", "src/auth", 0, 0.9);
        a.characteristics.labels = vec!["backend".into(), "urgent".into()];
        let mut b = analysis("s2", "src/api", 0, 0.7);
        b.characteristics.labels = vec!["backend".into()];
        let map = build_trust_map(&[a, b], "2026-02-01T00:00:00Z");
        assert_eq!(map.by_label.len(), 2);
        assert_eq!(map.by_label[0].key, "backend");
        assert_eq!(map.by_label[0].total_sessions, 2);
        assert_eq!(map.by_label[1].key, "urgent");
        assert_eq!(map.by_label[1].total_sessions, 1);
    }

    #[test]
    fn progress_defaults_to_midpoint_without_samples() {
        let analyses = vec![analysis("s1", "src/auth", 0, 0.9)];
        let map = build_trust_map(&analyses, "t");
        assert_eq!(map.by_area[0].avg_first_intervention_progress, 0.5);
    }

    #[test]
    fn progress_averages_measured_sessions_only() {
        let mut a = analysis("s1", "src/auth", 2, 0.5);
        a.steering.first_intervention_progress = Some(0.2);
        let b = analysis("s2", "src/auth", 0, 0.9); // no intervention, no sample
        let map = build_trust_map(&[a, b], "t");
        assert!((map.by_area[0].avg_first_intervention_progress - 0.2).abs() < 1e-9);
    }

    #[test]
    fn empty_input_yields_empty_map() {
        let map = build_trust_map(&[], "2026-02-01T00:00:00Z");
        assert!(map.by_area.is_empty());
        assert!(map.by_label.is_empty());
        assert_eq!(map.baseline.total_sessions, 0);
        assert_eq!(map.baseline.avg_trust_score, 0.0);
        assert_eq!(map.computed_at, "2026-02-01T00:00:00Z");
    }

    #[test]
    fn baseline_covers_all_sessions_unfiltered() {
        let analyses = vec![
            analysis("s1", "src/auth", 0, 1.0),
            analysis("s2", "src/api", 4, 0.2),
        ];
        let map = build_trust_map(&analyses, "t");
        assert_eq!(map.baseline.total_sessions, 2);
        assert!((map.baseline.autonomous_rate - 0.5).abs() < 1e-9);
        assert!((map.baseline.avg_trust_score - 0.6).abs() < 1e-9);
        assert!((map.baseline.avg_intervention_count - 2.0).abs() < 1e-9);
    }

    #[test]
    fn rates_stay_in_unit_interval() {
        let analyses: Vec<_> = (0..7)
            .map(|i| analysis(&format!("s{i}"), "src/auth", i % 3, 0.5))
            .collect();
        let map = build_trust_map(&analyses, "t");
        let a = &map.by_area[0];
        for rate in [a.autonomous_rate, a.commit_rate, a.rework_rate, a.error_rate] {
            assert!((0.0..=1.0).contains(&rate));
        }
    }
}
