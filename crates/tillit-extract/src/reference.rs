//! Per-ticket reference building.
//!
//! Folds every observed signal (branch name, commits, ticket-tool calls,
//! message mentions) into one `TicketReference` per distinct ticket, with a
//! worked/referenced relationship decided by the highest-priority source.

use std::collections::HashMap;

use tillit_core::{
    Event, EventType, TicketReference, TicketRelationship, TicketSource, TicketSourceKind,
};
use tillit_core::value;

use crate::gitcmd::parse_commit_command;
use crate::mention::extract_mentions;
use crate::ticket::{detect_ticket_tools, extract_ticket_ids};

struct SourceBag {
    order: Vec<String>,
    by_ticket: HashMap<String, Vec<TicketSource>>,
}

impl SourceBag {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            by_ticket: HashMap::new(),
        }
    }

    fn add(&mut self, ticket_id: String, source: TicketSource) {
        if !self.by_ticket.contains_key(&ticket_id) {
            self.order.push(ticket_id.clone());
        }
        self.by_ticket.entry(ticket_id).or_default().push(source);
    }
}

/// Build the session's ticket references from its events and branch name.
///
/// The returned list orders all `Worked` references before `Referenced`
/// ones, then by each reference's maximum source priority descending.
/// Within a reference, sources sort by descending event index, sources
/// without an index last.
pub fn build_ticket_references(events: &[Event], branch: Option<&str>) -> Vec<TicketReference> {
    let mut bag = SourceBag::new();

    if let Some(branch) = branch {
        for id in extract_ticket_ids(branch) {
            bag.add(
                id,
                TicketSource {
                    kind: TicketSourceKind::Branch,
                    event_index: None,
                    timestamp: String::new(),
                    context: Some(branch.to_string()),
                },
            );
        }
    }

    for (index, event) in events.iter().enumerate() {
        match event.event_type {
            EventType::GitOp => {
                let text = match value::extract_text(&event.raw) {
                    Some(t) => t,
                    None => continue,
                };
                if let Some(commit) = parse_commit_command(&text) {
                    for id in commit.ticket_ids {
                        bag.add(
                            id,
                            TicketSource {
                                kind: TicketSourceKind::Commit,
                                event_index: Some(index),
                                timestamp: event.timestamp.clone(),
                                context: Some(commit.message.clone()),
                            },
                        );
                    }
                }
            }
            EventType::ToolCall => {
                for call in detect_ticket_tools(&event.raw) {
                    if let Some(id) = call.ticket_id {
                        bag.add(
                            id,
                            TicketSource {
                                kind: call.kind,
                                event_index: Some(index),
                                timestamp: event.timestamp.clone(),
                                context: call.state.clone(),
                            },
                        );
                    }
                }
            }
            EventType::UserMessage | EventType::AssistantMessage => {
                for mention in extract_mentions(event) {
                    bag.add(
                        mention.ticket_id,
                        TicketSource {
                            kind: TicketSourceKind::Mention,
                            event_index: Some(index),
                            timestamp: event.timestamp.clone(),
                            context: mention.context,
                        },
                    );
                }
            }
            _ => {}
        }
    }

    let mut references: Vec<TicketReference> = bag
        .order
        .into_iter()
        .map(|ticket_id| {
            let mut sources = bag.by_ticket.remove(&ticket_id).unwrap_or_default();
            // Descending event index; indexless sources (branch) sort last.
            sources.sort_by(|a, b| match (a.event_index, b.event_index) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
            let worked = sources
                .iter()
                .max_by_key(|s| s.kind.priority())
                .map(|s| s.kind.is_worked())
                .unwrap_or(false);
            TicketReference {
                ticket_id,
                relationship: if worked {
                    TicketRelationship::Worked
                } else {
                    TicketRelationship::Referenced
                },
                sources,
            }
        })
        .collect();

    references.sort_by(|a, b| {
        let rank = |r: &TicketReference| match r.relationship {
            TicketRelationship::Worked => 0u8,
            TicketRelationship::Referenced => 1u8,
        };
        rank(a)
            .cmp(&rank(b))
            .then(b.max_priority().cmp(&a.max_priority()))
    });

    references
}

/// The first `Worked` reference, i.e. the ticket the session was about.
pub fn primary_ticket(references: &[TicketReference]) -> Option<&TicketReference> {
    references
        .iter()
        .find(|r| r.relationship == TicketRelationship::Worked)
}
