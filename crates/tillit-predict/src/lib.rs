//! Trust prediction for a not-yet-run task.
//!
//! Matches the task's characteristics against the aggregate map with
//! weighted factor fusion and degrades gracefully to the global baseline
//! when no category has enough history.

use serde::{Deserialize, Serialize};
use tillit_core::{TrustAggregate, TrustMap};

/// Minimum history a category needs before it may contribute a factor.
const MIN_FACTOR_SESSIONS: usize = 3;

/// Minimum history a category needs before it may produce an insight.
const MIN_INSIGHT_SESSIONS: usize = 5;

/// Confidence reported when the prediction fell back to the baseline.
const FALLBACK_CONFIDENCE: f64 = 0.3;

/// Per-dimension weight multipliers. Hand-tuned; kept exact for parity.
const AREA_MULTIPLIER: f64 = 1.0;
const TICKET_TYPE_MULTIPLIER: f64 = 0.8;
const BRANCH_TYPE_MULTIPLIER: f64 = 0.6;
const LABEL_MULTIPLIER: f64 = 0.5;

/// Characteristics of the task being asked about.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codebase_area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_type: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedApproach {
    Autonomous,
    LightMonitoring,
    DetailedBreakdown,
}

/// One matched category that contributed to the prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionFactor {
    pub dimension: String,
    pub value: String,
    pub trust_score: f64,
    pub weight: f64,
    pub sessions: usize,
}

/// A one-shot, stateless prediction result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustPrediction {
    pub predicted_trust: TrustLevel,
    pub predicted_trust_score: f64,
    pub confidence_score: f64,
    pub factors: Vec<PredictionFactor>,
    pub recommendation: String,
    pub suggested_approach: SuggestedApproach,
}

fn lookup<'a>(aggregates: &'a [TrustAggregate], key: &str) -> Option<&'a TrustAggregate> {
    aggregates
        .iter()
        .find(|a| a.key == key)
        .filter(|a| a.total_sessions >= MIN_FACTOR_SESSIONS)
}

fn trust_level(score: f64) -> TrustLevel {
    if score >= 0.7 {
        TrustLevel::High
    } else if score >= 0.4 {
        TrustLevel::Medium
    } else {
        TrustLevel::Low
    }
}

/// Predict how much supervision a task will need.
pub fn predict_trust(map: &TrustMap, query: &TaskQuery) -> TrustPrediction {
    let mut factors: Vec<PredictionFactor> = Vec::new();

    let mut add = |dimension: &str, value: Option<&str>, aggregates: &[TrustAggregate], multiplier: f64| {
        let value = match value {
            Some(v) => v,
            None => return,
        };
        if let Some(agg) = lookup(aggregates, value) {
            factors.push(PredictionFactor {
                dimension: dimension.to_string(),
                value: value.to_string(),
                trust_score: agg.avg_trust_score,
                weight: agg.confidence * multiplier,
                sessions: agg.total_sessions,
            });
        }
    };

    add("area", query.codebase_area.as_deref(), &map.by_area, AREA_MULTIPLIER);
    add(
        "ticket_type",
        query.ticket_type.as_deref(),
        &map.by_ticket_type,
        TICKET_TYPE_MULTIPLIER,
    );
    add(
        "branch_type",
        query.branch_type.as_deref(),
        &map.by_branch_type,
        BRANCH_TYPE_MULTIPLIER,
    );
    for label in &query.labels {
        add("label", Some(label), &map.by_label, LABEL_MULTIPLIER);
    }

    let total_weight: f64 = factors.iter().map(|f| f.weight).sum();
    let (predicted_trust_score, confidence_score) = if total_weight > 0.0 {
        let weighted: f64 = factors.iter().map(|f| f.trust_score * f.weight).sum();
        (weighted / total_weight, (total_weight / 2.0).min(1.0))
    } else {
        (map.baseline.avg_trust_score, FALLBACK_CONFIDENCE)
    };

    factors.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(std::cmp::Ordering::Equal));

    let predicted_trust = trust_level(predicted_trust_score);
    let (recommendation, suggested_approach) = recommend(map, predicted_trust, &factors);

    TrustPrediction {
        predicted_trust,
        predicted_trust_score,
        confidence_score,
        factors,
        recommendation,
        suggested_approach,
    }
}

fn recommend(
    map: &TrustMap,
    level: TrustLevel,
    factors: &[PredictionFactor],
) -> (String, SuggestedApproach) {
    match level {
        TrustLevel::High => {
            let message = factors
                .iter()
                .find(|f| f.trust_score >= 0.7)
                .map(|f| {
                    format!(
                        "Sessions in {} ({} so far) have run with little steering; let it run autonomously.",
                        f.value, f.sessions
                    )
                })
                .unwrap_or_else(|| {
                    "This kind of task usually runs smoothly without supervision.".to_string()
                });
            (message, SuggestedApproach::Autonomous)
        }
        TrustLevel::Low => {
            let message = factors
                .iter()
                .find(|f| f.trust_score < 0.4)
                .map(|f| {
                    format!(
                        "Sessions in {} have needed close steering; break the task into smaller, reviewable steps.",
                        f.value
                    )
                })
                .unwrap_or_else(|| {
                    format!(
                        "Similar tasks averaged {:.1} interventions; break the task into smaller, reviewable steps.",
                        map.baseline.avg_intervention_count
                    )
                });
            (message, SuggestedApproach::DetailedBreakdown)
        }
        TrustLevel::Medium => (
            "Check in on progress occasionally; history for this kind of task is mixed.".to_string(),
            SuggestedApproach::LightMonitoring,
        ),
    }
}

/// One human-readable insight per aggregate whose behavior deviates from
/// the global baseline, across all four category dimensions.
pub fn comparative_insights(map: &TrustMap) -> Vec<String> {
    let mut insights = Vec::new();
    let global_autonomous = map.baseline.autonomous_rate;

    let dimensions: [(&str, &[TrustAggregate]); 4] = [
        ("area", &map.by_area),
        ("ticket type", &map.by_ticket_type),
        ("branch type", &map.by_branch_type),
        ("label", &map.by_label),
    ];

    for (dimension, aggregates) in dimensions {
        for agg in aggregates {
            if agg.total_sessions < MIN_INSIGHT_SESSIONS {
                continue;
            }
            let pct = |r: f64| (r * 100.0).round();
            if agg.autonomous_rate < global_autonomous - 0.2 {
                insights.push(format!(
                    "{dimension} {}: only {}% of sessions run autonomously vs {}% overall; plan for closer supervision",
                    agg.key,
                    pct(agg.autonomous_rate),
                    pct(global_autonomous)
                ));
            } else if agg.autonomous_rate > global_autonomous + 0.2 {
                insights.push(format!(
                    "{dimension} {}: {}% of sessions run autonomously vs {}% overall; safe to supervise less",
                    agg.key,
                    pct(agg.autonomous_rate),
                    pct(global_autonomous)
                ));
            } else if agg.rework_rate > 0.3 && agg.rework_rate > global_autonomous * 0.5 {
                insights.push(format!(
                    "{dimension} {}: {}% of sessions needed rework; expect iteration",
                    agg.key,
                    pct(agg.rework_rate)
                ));
            }
        }
    }

    insights
}
