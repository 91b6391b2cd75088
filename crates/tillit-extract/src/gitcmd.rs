//! Commit and push command parsing.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ticket::extract_ticket_ids;

/// Heredoc-quoted commit message, the form agents emit for multi-line
/// messages: `git commit -m "$(cat <<'EOF' ... EOF)"`. Tried first.
static COMMIT_HEREDOC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)git commit[^\n]*?-[a-zA-Z]*m\s+"\$\(\s*cat\s+<<'?EOF'?\s*\n(.*?)\n\s*EOF"#)
        .unwrap()
});

/// Simple `-m "..."` / `-m '...'` fallback. The flag may be combined
/// (`-am "..."`).
static COMMIT_SIMPLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"git commit[^\n]*?-[a-zA-Z]*m\s+(?:"([^"]+)"|'([^']+)')"#).unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub message: String,
    pub ticket_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushInfo {
    pub remote: String,
    pub branch: String,
}

/// Extract the commit message from a `git commit` command and scan it for
/// ticket IDs. Returns `None` when the command carries no message.
pub fn parse_commit_command(cmd: &str) -> Option<CommitInfo> {
    let message = if let Some(caps) = COMMIT_HEREDOC.captures(cmd) {
        caps.get(1)?.as_str().trim().to_string()
    } else {
        let caps = COMMIT_SIMPLE.captures(cmd)?;
        caps.get(1)
            .or_else(|| caps.get(2))?
            .as_str()
            .trim()
            .to_string()
    };
    if message.is_empty() {
        return None;
    }
    let ticket_ids = extract_ticket_ids(&message);
    Some(CommitInfo {
        message,
        ticket_ids,
    })
}

/// Parse `git push [flags] <remote> <branch>`.
///
/// A bare `git push` (no positional arguments) defaults to
/// `(origin, current)`.
pub fn parse_push_command(cmd: &str) -> Option<PushInfo> {
    let pos = cmd.find("git push")?;
    let rest = &cmd[pos + "git push".len()..];

    let mut positional: Vec<&str> = Vec::new();
    for token in rest.split_whitespace() {
        // A chained command ends the push invocation.
        if matches!(token, "&&" | "||" | ";" | "|") {
            break;
        }
        if token.starts_with('-') {
            continue;
        }
        positional.push(token);
        if positional.len() == 2 {
            break;
        }
    }

    Some(PushInfo {
        remote: positional.first().unwrap_or(&"origin").to_string(),
        branch: positional.get(1).unwrap_or(&"current").to_string(),
    })
}
