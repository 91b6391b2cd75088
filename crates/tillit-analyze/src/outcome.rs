//! Per-session success and friction metrics.

use tillit_core::{AnnotationKind, EventType, OutcomeMetrics, Session};
use tillit_extract::extract_session_outcomes;

const DENSITY_SCALE: f64 = 10_000.0;

/// Number of trailing events inspected for the ended-with-error signal.
const TAIL_WINDOW: usize = 5;

pub fn outcome_metrics(session: &Session) -> OutcomeMetrics {
    // Prefer the pre-computed outcomes structure when the ingest pipeline
    // supplied one; otherwise scan the git-op events directly.
    let (commit_count, push_count) = match &session.outcomes {
        Some(outcomes) => (outcomes.commits.len(), outcomes.pushes.len()),
        None => {
            let scanned = extract_session_outcomes(&session.events);
            (scanned.commits.len(), scanned.pushes.len())
        }
    };

    let error_count = session
        .events
        .iter()
        .filter(|e| e.event_type == EventType::Error)
        .count();

    let error_density = if session.total_tokens > 0 {
        error_count as f64 / session.total_tokens as f64 * DENSITY_SCALE
    } else {
        0.0
    };

    let tail_start = session.events.len().saturating_sub(TAIL_WINDOW);
    let ended_with_error = session.events[tail_start..]
        .iter()
        .any(|e| e.event_type == EventType::Error);

    let count_kind = |kind: AnnotationKind| {
        session
            .annotations
            .iter()
            .filter(|a| a.kind == kind)
            .count()
    };

    OutcomeMetrics {
        commit_count,
        push_count,
        error_count,
        error_density,
        ended_with_error,
        blocker_count: count_kind(AnnotationKind::Blocker),
        rework_count: count_kind(AnnotationKind::Rework),
        decision_count: count_kind(AnnotationKind::Decision),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{event, session_with_events, user_event};
    use serde_json::json;
    use tillit_core::{Annotation, CommitRecord, SessionOutcomes};

    fn error_event() -> tillit_core::Event {
        event(EventType::Error, "", json!({ "type": "error" }))
    }

    #[test]
    fn precomputed_outcomes_win_over_scanning() {
        let mut session = session_with_events(vec![event(
            EventType::GitOp,
            "",
            json!({ "tool_name": "Bash", "input": { "command": "git commit -m \"x\"" } }),
        )]);
        session.outcomes = Some(SessionOutcomes {
            commits: vec![
                CommitRecord {
                    message: "a".into(),
                    ticket_ids: vec![],
                    timestamp: String::new(),
                    event_index: 0,
                },
                CommitRecord {
                    message: "b".into(),
                    ticket_ids: vec![],
                    timestamp: String::new(),
                    event_index: 1,
                },
            ],
            pushes: Vec::new(),
            ticket_state_changes: Vec::new(),
        });
        let m = outcome_metrics(&session);
        assert_eq!(m.commit_count, 2); // from the structure, not the scan
        assert_eq!(m.push_count, 0);
    }

    #[test]
    fn fallback_scans_git_ops() {
        let session = session_with_events(vec![event(
            EventType::GitOp,
            "",
            json!({ "tool_name": "Bash",
                    "input": { "command": "git commit -m \"fix\" && git push" } }),
        )]);
        let m = outcome_metrics(&session);
        assert_eq!(m.commit_count, 1);
        assert_eq!(m.push_count, 1);
    }

    #[test]
    fn ended_with_error_looks_at_last_five() {
        // Error six events from the end is out of the window.
        let mut events = vec![error_event()];
        for _ in 0..6 {
            events.push(user_event(""));
        }
        assert!(!outcome_metrics(&session_with_events(events)).ended_with_error);

        // Error inside the window flips the flag.
        let mut events = vec![user_event(""), user_event("")];
        events.push(error_event());
        events.push(user_event(""));
        assert!(outcome_metrics(&session_with_events(events)).ended_with_error);
    }

    #[test]
    fn error_density_guards_zero_tokens() {
        let mut session = session_with_events(vec![error_event()]);
        session.total_tokens = 0;
        assert_eq!(outcome_metrics(&session).error_density, 0.0);

        session.total_tokens = 10_000;
        assert!((outcome_metrics(&session).error_density - 1.0).abs() < 1e-9);
    }

    #[test]
    fn friction_counts_by_annotation_kind() {
        let mut session = session_with_events(vec![]);
        let note = |kind| Annotation {
            kind,
            summary: String::new(),
            confidence: 0.8,
            event_index: None,
        };
        session.annotations = vec![
            note(AnnotationKind::Blocker),
            note(AnnotationKind::Blocker),
            note(AnnotationKind::Rework),
            note(AnnotationKind::Decision),
        ];
        let m = outcome_metrics(&session);
        assert_eq!(m.blocker_count, 2);
        assert_eq!(m.rework_count, 1);
        assert_eq!(m.decision_count, 1);
    }
}
