//! Entry classification: one raw transcript record in, one typed event out
//! (or none — records that carry no analyzable signal are dropped, which is
//! intentional filtering rather than an error).

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tillit_core::value;
use tillit_core::{Event, EventType};

/// Recognized git subcommands for the strict pattern.
static GIT_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bgit\s+(push|pull|commit|checkout|merge|rebase|clone|fetch|add|reset|stash)\b",
    )
    .unwrap()
});

/// Broader fallback: any `git <subcommand>` invocation.
static GIT_ANY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bgit\s+[a-z][a-z-]*").unwrap());

/// Assistant content shapes that indicate planning rather than answering.
static PLANNING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\bplan(?:ning)?:").unwrap(),
        Regex::new(r"(?i)\bstep\s+\d+:").unwrap(),
        Regex::new(r"(?i)\b(?:first|then|next|finally)\b[\s\S]*\b(?:i'll|i will)\b").unwrap(),
        Regex::new(r"(?i)let me (?:think|plan|outline)").unwrap(),
    ]
});

/// Classify one raw transcript record into an event type.
///
/// Priority order, first match wins:
/// 1. explicit error marker or `error` field
/// 2. tool invocation/result shape (with git sub-classification)
/// 3. user message
/// 4. assistant message (with planning-mode heuristic)
/// 5. none — record is dropped
pub fn classify_type(entry: &Value) -> Option<EventType> {
    let record_type = value::entry_type(entry);

    if record_type == "error" || entry.get("error").is_some() {
        return Some(EventType::Error);
    }

    if value::has_tool_shape(entry) {
        if is_git_operation(entry) {
            return Some(EventType::GitOp);
        }
        return Some(EventType::ToolCall);
    }

    let role = value::role(entry);
    if role == Some("user") || record_type == "user" || record_type == "human" {
        return Some(EventType::UserMessage);
    }
    if role == Some("assistant") || record_type == "assistant" {
        let planning = value::extract_text(entry)
            .map(|text| is_planning_content(&text))
            .unwrap_or(false);
        return Some(if planning {
            EventType::PlanningMode
        } else {
            EventType::AssistantMessage
        });
    }

    tracing::debug!(record_type, "dropping unclassifiable record");
    None
}

/// Convert one raw record into a typed event, or drop it.
///
/// The event keeps the raw record, its verbatim timestamp (empty when
/// absent), and the summed token count. Tags start empty; callers that want
/// structured tags derive them from the extraction layer.
pub fn classify_entry(entry: &Value) -> Option<Event> {
    let event_type = classify_type(entry)?;
    Some(Event {
        event_type,
        timestamp: value::timestamp(entry),
        token_count: value::token_count(entry),
        raw: entry.clone(),
        tags: Vec::new(),
    })
}

/// Classify a whole record stream, silently dropping what cannot be typed.
pub fn classify_entries<'a, I>(entries: I) -> Vec<Event>
where
    I: IntoIterator<Item = &'a Value>,
{
    entries.into_iter().filter_map(classify_entry).collect()
}

/// A tool call is a git operation iff its tool name is `Bash` (top level or
/// inside nested `tool_use` items) and the extracted command matches a git
/// invocation. Content extraction already falls back to free text, which
/// covers records whose command field was stripped on ingest.
pub fn is_git_operation(entry: &Value) -> bool {
    let has_bash = value::tool_names(entry)
        .iter()
        .any(|n| n.eq_ignore_ascii_case("bash"));
    if !has_bash {
        return false;
    }
    match value::extract_text(entry) {
        Some(text) => GIT_COMMAND.is_match(&text) || GIT_ANY.is_match(&text),
        None => false,
    }
}

/// Planning-mode heuristic over assistant content.
pub fn is_planning_content(text: &str) -> bool {
    PLANNING_PATTERNS.iter().any(|p| p.is_match(text))
}
