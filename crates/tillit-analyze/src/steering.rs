//! Human-steering metrics.
//!
//! The first user message is the initiating prompt; every later one is an
//! intervention. Where in the session the first intervention landed is a
//! strong supervision signal, so its relative progress is computed when the
//! timestamps allow it.

use tillit_core::ts;
use tillit_core::{AnnotationKind, EventType, Session, SteeringMetrics};

/// Interventions are normalized per 10k tokens so long and short sessions
/// compare. The constant is a historical scale factor, kept for
/// compatibility with existing stored analyses.
const DENSITY_SCALE: f64 = 10_000.0;

pub fn steering_metrics(session: &Session) -> SteeringMetrics {
    let user_timestamps: Vec<&str> = session
        .events
        .iter()
        .filter(|e| e.event_type == EventType::UserMessage)
        .map(|e| e.timestamp.as_str())
        .collect();

    let user_message_count = user_timestamps.len();
    let intervention_count = user_message_count.saturating_sub(1);

    let mut first_intervention_progress = None;
    let mut time_to_first_intervention_ms = None;
    if intervention_count >= 1 {
        let start = ts::parse_ms(&session.started_at);
        let second = ts::parse_ms(user_timestamps[1]);
        if let (Some(start), Some(second)) = (start, second) {
            let gap = second - start;
            time_to_first_intervention_ms = Some(gap);
            if session.duration_ms > 0 {
                first_intervention_progress = Some(gap as f64 / session.duration_ms as f64);
            }
        }
    }

    let intervention_density = if session.total_tokens > 0 {
        intervention_count as f64 / session.total_tokens as f64 * DENSITY_SCALE
    } else {
        0.0
    };

    let goal_shift_count = session
        .annotations
        .iter()
        .filter(|a| a.kind == AnnotationKind::GoalShift)
        .count();

    SteeringMetrics {
        user_message_count,
        intervention_count,
        first_intervention_progress,
        time_to_first_intervention_ms,
        intervention_density,
        goal_shift_count,
    }
}
