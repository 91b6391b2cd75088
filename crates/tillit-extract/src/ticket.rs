//! Ticket-ID pattern matching and ticket-tool call detection.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tillit_core::value;
use tillit_core::TicketSourceKind;

/// Ticket IDs look like `KUL-195`: 2-10 letters, hyphen, digits.
/// Matching is case-insensitive; results are uppercased.
static TICKET_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b([A-Z]{2,10}-\d+)\b").unwrap());

/// Tool-name prefixes of the external ticket system. Two spellings exist in
/// the wild for the same server, so both are accepted, case-insensitively.
const TICKET_TOOL_PREFIXES: [&str; 2] = ["mcp__linear", "linear-server"];

/// Ticket states that count as completion.
const COMPLETED_STATES: [&str; 5] = ["done", "completed", "closed", "finished", "resolved"];

/// Extract every ticket ID from free text, uppercased and deduplicated,
/// in order of first appearance.
pub fn extract_ticket_ids(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for m in TICKET_ID.find_iter(text) {
        let id = m.as_str().to_uppercase();
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

/// True iff the supplied state/status string means the ticket is done.
pub fn is_completed_state(state: &str) -> bool {
    COMPLETED_STATES
        .iter()
        .any(|s| state.eq_ignore_ascii_case(s))
}

/// A recognized call against the external ticket system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketToolCall {
    pub kind: TicketSourceKind,
    pub ticket_id: Option<String>,
    pub state: Option<String>,
}

fn is_ticket_tool(name: &str) -> bool {
    let lower = name.to_lowercase();
    TICKET_TOOL_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// Ticket ID from tool input: one of `id`/`issueId`/`identifier`, either a
/// direct `TEAM-123`-shaped string or text containing one.
fn ticket_id_from_input(input: &Value) -> Option<String> {
    let raw = value::get_str(input, &["id", "issueId", "identifier"])?;
    extract_ticket_ids(raw).into_iter().next()
}

/// Detect a ticket-tool invocation from a tool name and its input.
///
/// The operation is read off the name suffix (create/update/comment/read);
/// an update whose state is a completion state is promoted to `McpComplete`.
pub fn detect_ticket_tool(name: &str, input: &Value) -> Option<TicketToolCall> {
    if !is_ticket_tool(name) {
        return None;
    }
    let lower = name.to_lowercase();
    let state = value::get_str(input, &["state", "status"]).map(|s| s.to_string());

    let kind = if lower.contains("create") {
        TicketSourceKind::McpCreate
    } else if lower.contains("update") {
        if state.as_deref().map(is_completed_state).unwrap_or(false) {
            TicketSourceKind::McpComplete
        } else {
            TicketSourceKind::McpUpdate
        }
    } else if lower.contains("comment") {
        TicketSourceKind::McpComment
    } else if lower.contains("get") || lower.contains("read") || lower.contains("list") {
        TicketSourceKind::McpRead
    } else {
        return None;
    };

    Some(TicketToolCall {
        kind,
        ticket_id: ticket_id_from_input(input),
        state,
    })
}

/// All ticket-tool calls visible on a raw record: the top-level tool
/// invocation plus any nested `tool_use` items.
pub fn detect_ticket_tools(raw: &Value) -> Vec<TicketToolCall> {
    let mut out = Vec::new();
    if let (Some(name), Some(input)) = (value::top_tool_name(raw), value::top_tool_input(raw)) {
        if let Some(call) = detect_ticket_tool(name, input) {
            out.push(call);
        }
    }
    for item in value::tool_use_items(raw) {
        if let (Some(name), Some(input)) = (
            item.get("name").and_then(|n| n.as_str()),
            item.get("input"),
        ) {
            if let Some(call) = detect_ticket_tool(name, input) {
                out.push(call);
            }
        }
    }
    out
}
