//! Structured event tags for timeline consumers.

use tillit_core::{Event, EventTag, EventType, TicketSourceKind};
use tillit_core::value;

use crate::gitcmd::{parse_commit_command, parse_push_command};
use crate::mention::extract_mentions;
use crate::ticket::detect_ticket_tools;

/// Derive the structured tags for one classified event.
pub fn derive_tags(event: &Event) -> Vec<EventTag> {
    let mut tags = Vec::new();

    match event.event_type {
        EventType::GitOp => {
            if let Some(text) = value::extract_text(&event.raw) {
                if let Some(commit) = parse_commit_command(&text) {
                    tags.push(EventTag::Commit {
                        message: commit.message,
                        ticket_ids: commit.ticket_ids,
                    });
                }
                if text.contains("git push") {
                    if let Some(push) = parse_push_command(&text) {
                        tags.push(EventTag::Push {
                            remote: push.remote,
                            branch: push.branch,
                        });
                    }
                }
            }
        }
        EventType::ToolCall => {
            for call in detect_ticket_tools(&event.raw) {
                let ticket_id = match call.ticket_id {
                    Some(id) => id,
                    None => continue,
                };
                let tag = match call.kind {
                    TicketSourceKind::McpCreate => EventTag::TicketCreated { ticket_id },
                    TicketSourceKind::McpUpdate | TicketSourceKind::McpComment => {
                        EventTag::TicketUpdated { ticket_id }
                    }
                    TicketSourceKind::McpComplete => EventTag::TicketCompleted { ticket_id },
                    TicketSourceKind::McpRead => EventTag::TicketRead { ticket_id },
                    _ => continue,
                };
                tags.push(tag);
            }
        }
        EventType::UserMessage | EventType::AssistantMessage => {
            for mention in extract_mentions(event) {
                tags.push(EventTag::TicketMentioned {
                    ticket_id: mention.ticket_id,
                });
            }
        }
        _ => {}
    }

    tags
}

/// Attach derived tags to every event in place.
pub fn attach_tags(events: &mut [Event]) {
    for event in events.iter_mut() {
        let tags = derive_tags(event);
        event.tags = tags;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(event_type: EventType, raw: serde_json::Value) -> Event {
        Event {
            event_type,
            timestamp: String::new(),
            token_count: 0,
            raw,
            tags: Vec::new(),
        }
    }

    #[test]
    fn git_op_gets_commit_and_push_tags() {
        let e = event(
            EventType::GitOp,
            json!({ "tool_name": "Bash",
                    "input": { "command": "git commit -m \"KUL-3: done\" && git push" } }),
        );
        let tags = derive_tags(&e);
        assert_eq!(tags.len(), 2);
        assert!(matches!(&tags[0], EventTag::Commit { ticket_ids, .. } if ticket_ids == &vec!["KUL-3".to_string()]));
        assert!(matches!(&tags[1], EventTag::Push { remote, branch }
            if remote == "origin" && branch == "current"));
    }

    #[test]
    fn ticket_tool_gets_lifecycle_tag() {
        let e = event(
            EventType::ToolCall,
            json!({ "tool_name": "mcp__linear__update_issue",
                    "input": { "id": "KUL-4", "state": "Done" } }),
        );
        assert_eq!(
            derive_tags(&e),
            vec![EventTag::TicketCompleted { ticket_id: "KUL-4".into() }]
        );
    }

    #[test]
    fn message_gets_mention_tags() {
        let e = event(
            EventType::UserMessage,
            json!({ "message": { "role": "user", "content": "check AUTH-11" } }),
        );
        assert_eq!(
            derive_tags(&e),
            vec![EventTag::TicketMentioned { ticket_id: "AUTH-11".into() }]
        );
    }

    #[test]
    fn attach_tags_fills_events_in_place() {
        let mut events = vec![
            event(
                EventType::GitOp,
                json!({ "tool_name": "Bash", "input": { "command": "git push origin main" } }),
            ),
            event(
                EventType::AssistantMessage,
                json!({ "message": { "role": "assistant", "content": "plain text" } }),
            ),
        ];
        attach_tags(&mut events);
        assert_eq!(events[0].tags.len(), 1);
        assert!(events[1].tags.is_empty());
    }
}
