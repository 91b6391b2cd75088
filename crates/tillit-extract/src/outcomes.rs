//! One-pass session outcome scan: commits, pushes, ticket-state changes.

use tillit_core::{
    CommitRecord, Event, EventType, PushRecord, SessionOutcomes, TicketSourceKind,
    TicketStateChange,
};
use tillit_core::value;

use crate::gitcmd::{parse_commit_command, parse_push_command};
use crate::ticket::detect_ticket_tools;

/// Scan classified events for ground-truth outcome signals.
///
/// A single chained command (`git add && git commit && git push`) yields
/// both a commit and a push record for the same event index.
pub fn extract_session_outcomes(events: &[Event]) -> SessionOutcomes {
    let mut outcomes = SessionOutcomes::default();

    for (index, event) in events.iter().enumerate() {
        match event.event_type {
            EventType::GitOp => {
                let text = match value::extract_text(&event.raw) {
                    Some(t) => t,
                    None => continue,
                };
                if let Some(commit) = parse_commit_command(&text) {
                    outcomes.commits.push(CommitRecord {
                        message: commit.message,
                        ticket_ids: commit.ticket_ids,
                        timestamp: event.timestamp.clone(),
                        event_index: index,
                    });
                }
                if text.contains("git push") {
                    if let Some(push) = parse_push_command(&text) {
                        outcomes.pushes.push(PushRecord {
                            remote: push.remote,
                            branch: push.branch,
                            timestamp: event.timestamp.clone(),
                            event_index: index,
                        });
                    }
                }
            }
            EventType::ToolCall => {
                for call in detect_ticket_tools(&event.raw) {
                    let changes_state = matches!(
                        call.kind,
                        TicketSourceKind::McpUpdate | TicketSourceKind::McpComplete
                    );
                    if !changes_state {
                        continue;
                    }
                    if let (Some(ticket_id), Some(state)) = (call.ticket_id, call.state) {
                        outcomes.ticket_state_changes.push(TicketStateChange {
                            ticket_id,
                            completed: call.kind == TicketSourceKind::McpComplete,
                            state,
                            timestamp: event.timestamp.clone(),
                            event_index: index,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    outcomes
}
