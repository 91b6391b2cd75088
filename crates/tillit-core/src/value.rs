//! Accessor helpers over raw transcript records.
//!
//! A raw record is a loosely-structured `serde_json::Value`: tool input may
//! live at the top level or inside nested `tool_use` items of a message
//! content array, and field names vary between snake_case and camelCase.
//! Downstream correctness depends on the exact fallback search order here,
//! so callers go through these helpers instead of indexing the JSON
//! directly.

use serde_json::Value;

/// String field lookup trying each key in order.
pub fn get_str<'a>(v: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| v.get(k).and_then(|x| x.as_str()))
}

fn get_u64(v: &Value, keys: &[&str]) -> u64 {
    keys.iter()
        .find_map(|k| v.get(k).and_then(|x| x.as_u64()))
        .unwrap_or(0)
}

/// Top-level `type` of a record, empty string when absent.
pub fn entry_type(v: &Value) -> &str {
    v.get("type").and_then(|x| x.as_str()).unwrap_or("")
}

/// Record timestamp verbatim; empty string when absent, never inferred.
pub fn timestamp(v: &Value) -> String {
    get_str(v, &["timestamp"]).unwrap_or("").to_string()
}

/// Message role, from `message.role` or the top-level `role` field.
pub fn role(v: &Value) -> Option<&str> {
    v.get("message")
        .and_then(|m| m.get("role"))
        .and_then(|r| r.as_str())
        .or_else(|| get_str(v, &["role"]))
}

/// The `message.content` value, whatever its shape.
pub fn message_content(v: &Value) -> Option<&Value> {
    v.get("message").and_then(|m| m.get("content"))
}

/// Nested `tool_use` items inside the message content array.
pub fn tool_use_items(v: &Value) -> Vec<&Value> {
    message_content(v)
        .and_then(|c| c.as_array())
        .map(|arr| {
            arr.iter()
                .filter(|item| {
                    item.get("type").and_then(|t| t.as_str()) == Some("tool_use")
                })
                .collect()
        })
        .unwrap_or_default()
}

/// True when the record itself is a tool invocation or result, or its
/// message content array embeds one.
pub fn has_tool_shape(v: &Value) -> bool {
    matches!(entry_type(v), "tool_call" | "tool_use" | "tool_result")
        || message_content(v)
            .and_then(|c| c.as_array())
            .map(|arr| {
                arr.iter().any(|item| {
                    matches!(
                        item.get("type").and_then(|t| t.as_str()),
                        Some("tool_use") | Some("tool_result")
                    )
                })
            })
            .unwrap_or(false)
}

/// Top-level tool name of the record.
pub fn top_tool_name(v: &Value) -> Option<&str> {
    get_str(v, &["tool_name", "toolName", "name"])
}

/// Top-level tool input of the record.
pub fn top_tool_input(v: &Value) -> Option<&Value> {
    ["input", "tool_input", "toolInput"]
        .iter()
        .find_map(|k| v.get(*k))
}

/// Every tool name visible on the record: the top-level one plus names of
/// nested `tool_use` items.
pub fn tool_names(v: &Value) -> Vec<&str> {
    let mut names = Vec::new();
    if let Some(n) = top_tool_name(v) {
        names.push(n);
    }
    for item in tool_use_items(v) {
        if let Some(n) = item.get("name").and_then(|x| x.as_str()) {
            names.push(n);
        }
    }
    names
}

/// Extract the command or free-text content of a record.
///
/// Fallback order is load-bearing:
/// 1. direct `input.command`
/// 2. `input.command` of nested `tool_use` items
/// 3. top-level `content` string
/// 4. `message.content` string
/// 5. `message.content` array of text fragments joined by newline
pub fn extract_text(v: &Value) -> Option<String> {
    if let Some(cmd) = top_tool_input(v)
        .and_then(|i| i.get("command"))
        .and_then(|c| c.as_str())
    {
        return Some(cmd.to_string());
    }
    for item in tool_use_items(v) {
        if let Some(cmd) = item
            .get("input")
            .and_then(|i| i.get("command"))
            .and_then(|c| c.as_str())
        {
            return Some(cmd.to_string());
        }
    }
    if let Some(s) = v.get("content").and_then(|c| c.as_str()) {
        return Some(s.to_string());
    }
    match message_content(v) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Array(arr)) => {
            let texts: Vec<&str> = arr
                .iter()
                .filter_map(|item| item.get("text").and_then(|t| t.as_str()))
                .collect();
            if texts.is_empty() {
                None
            } else {
                Some(texts.join("\n"))
            }
        }
        _ => None,
    }
}

const PATH_KEYS: [&str; 4] = ["file_path", "path", "filePath", "filename"];

fn paths_from_input(input: &Value, out: &mut Vec<String>) {
    if let Some(p) = get_str(input, &PATH_KEYS) {
        out.push(p.to_string());
        return;
    }
    // Glob tools carry a `pattern`; the literal directory prefix before the
    // first wildcard segment is the touched path.
    if let Some(pattern) = input.get("pattern").and_then(|p| p.as_str()) {
        let segments: Vec<&str> = pattern.split('/').collect();
        let literal: Vec<&str> = segments
            .iter()
            .take_while(|seg| !seg.contains('*') && !seg.contains('?'))
            .copied()
            .collect();
        if !literal.is_empty() && literal.len() < segments.len() {
            out.push(literal.join("/"));
        }
    }
}

/// Every file path a tool call touches, from the top-level input and from
/// nested `tool_use` item inputs.
pub fn extract_file_paths(v: &Value) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(input) = top_tool_input(v) {
        paths_from_input(input, &mut out);
    }
    for item in tool_use_items(v) {
        if let Some(input) = item.get("input") {
            paths_from_input(input, &mut out);
        }
    }
    out
}

/// Sum the four usage counters, treating each missing one as 0.
/// Counters are searched on `usage` then `message.usage`.
pub fn token_count(v: &Value) -> u64 {
    let usage = v
        .get("usage")
        .or_else(|| v.get("message").and_then(|m| m.get("usage")));
    let usage = match usage {
        Some(u) => u,
        None => return 0,
    };
    get_u64(usage, &["input_tokens", "inputTokens"])
        + get_u64(usage, &["output_tokens", "outputTokens"])
        + get_u64(usage, &["cache_read_input_tokens", "cacheReadInputTokens"])
        + get_u64(
            usage,
            &["cache_creation_input_tokens", "cacheCreationInputTokens"],
        )
}

/// Pre-extracted ticket-ID list carried on the raw record, if the ingest
/// pipeline attached one before truncating content for storage.
pub fn preextracted_ticket_ids(v: &Value) -> Option<Vec<String>> {
    ["ticket_ids", "ticketIds", "extracted_ticket_ids"]
        .iter()
        .find_map(|k| v.get(*k))
        .and_then(|x| x.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|i| i.as_str().map(|s| s.to_string()))
                .collect()
        })
}
