//! Per-session trust analysis: steering metrics, task characteristics,
//! outcome metrics, and the scalar trust score, combined into one
//! `SessionTrustAnalysis` record.
//!
//! Everything here is pure over the supplied `Session`; sessions can be
//! analyzed independently and in any order.

pub mod characteristics;
pub mod outcome;
pub mod score;
pub mod steering;

pub use characteristics::task_characteristics;
pub use outcome::outcome_metrics;
pub use score::{compute_trust_score, is_autonomous};
pub use steering::steering_metrics;

use tillit_core::{Session, SessionTrustAnalysis, TicketInfo};

/// Run the full per-session pipeline.
pub fn analyze_session(session: &Session, ticket_info: Option<&TicketInfo>) -> SessionTrustAnalysis {
    let steering = steering_metrics(session);
    let characteristics = task_characteristics(session, ticket_info);
    let outcome = outcome_metrics(session);
    let trust_score = compute_trust_score(&steering, &outcome);
    let autonomous = is_autonomous(&steering);

    SessionTrustAnalysis {
        session_id: session.id.clone(),
        steering,
        characteristics,
        outcome,
        trust_score,
        autonomous,
    }
}
