//! Ticket mentions inside user and assistant messages.

use regex::Regex;
use tillit_core::value;
use tillit_core::{Event, EventType};

use crate::ticket::extract_ticket_ids;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub ticket_id: String,
    pub context: Option<String>,
}

/// Largest byte index `<= i` on a char boundary.
fn floor_char_boundary(s: &str, i: usize) -> usize {
    if i >= s.len() {
        return s.len();
    }
    let mut pos = i;
    while pos > 0 && !s.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Smallest byte index `>= i` on a char boundary.
fn ceil_char_boundary(s: &str, i: usize) -> usize {
    if i >= s.len() {
        return s.len();
    }
    let mut pos = i;
    while pos < s.len() && !s.is_char_boundary(pos) {
        pos += 1;
    }
    pos
}

/// The ±50-character window around the first case-insensitive occurrence of
/// `id` in `content`, or `None` when the id does not appear (content may
/// have been truncated for storage after the id list was extracted).
fn context_window(content: &str, id: &str) -> Option<String> {
    let pattern = Regex::new(&format!("(?i){}", regex::escape(id))).ok()?;
    let m = pattern.find(content)?;
    let start = floor_char_boundary(content, m.start().saturating_sub(50));
    let end = ceil_char_boundary(content, (m.end() + 50).min(content.len()));
    Some(content[start..end].trim().to_string())
}

/// Extract ticket mentions from a user or assistant message event.
///
/// A pre-extracted ticket-ID list on the raw record takes precedence over
/// re-scanning the visible content, which may have been truncated since.
/// The context falls back to the ticket ID itself when no window is found.
pub fn extract_mentions(event: &Event) -> Vec<Mention> {
    if !matches!(
        event.event_type,
        EventType::UserMessage | EventType::AssistantMessage
    ) {
        return Vec::new();
    }

    let content = value::extract_text(&event.raw);

    let ids: Vec<String> = match value::preextracted_ticket_ids(&event.raw) {
        Some(pre) => {
            let mut out: Vec<String> = Vec::new();
            for id in pre {
                let upper = id.to_uppercase();
                if !out.contains(&upper) {
                    out.push(upper);
                }
            }
            out
        }
        None => content
            .as_deref()
            .map(extract_ticket_ids)
            .unwrap_or_default(),
    };

    ids.into_iter()
        .map(|ticket_id| {
            let window = content
                .as_deref()
                .and_then(|c| context_window(c, &ticket_id));
            Mention {
                context: Some(window.unwrap_or_else(|| ticket_id.clone())),
                ticket_id,
            }
        })
        .collect()
}
