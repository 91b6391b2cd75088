//! Task-characteristic metrics: what kind of work the session was.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tillit_core::value;
use tillit_core::{
    EventType, Session, TaskCharacteristics, TicketInfo, TicketReference, TicketRelationship,
};

/// Branch prefixes checked in order; first match wins.
const BRANCH_PREFIXES: [(&str, &str); 11] = [
    ("feature/", "feature"),
    ("fix/", "fix"),
    ("bug/", "bug"),
    ("hotfix/", "hotfix"),
    ("release/", "release"),
    ("refactor/", "refactor"),
    ("test/", "test"),
    ("docs/", "docs"),
    ("doc/", "docs"),
    ("chore/", "chore"),
    ("claude/", "claude"),
];

static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\d+[.)]\s+").unwrap());
static BULLET_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s*[-*]\s+").unwrap());
static STEP_PHRASE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bstep\s+\d+\b").unwrap());

/// Classify a branch name into its type.
///
/// `None` branch stays `None`; a non-matching branch is `"other"`.
pub fn branch_type(branch: Option<&str>) -> Option<String> {
    let branch = branch?;
    for (prefix, name) in BRANCH_PREFIXES {
        if branch.starts_with(prefix) {
            return Some(name.to_string());
        }
    }
    if matches!(branch, "main" | "master" | "develop") {
        return Some(branch.to_string());
    }
    Some("other".to_string())
}

/// Normalize a touched file path to its area: strip the project root, keep
/// the first two path segments (one if only one exists, `"root"` if none).
pub fn normalize_area(path: &str, project_root: Option<&str>) -> String {
    let mut rest = path;
    if let Some(root) = project_root {
        if !root.is_empty() {
            if let Some(stripped) = rest.strip_prefix(root) {
                rest = stripped;
            }
        }
    }
    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
    match segments.len() {
        0 => "root".to_string(),
        1 => segments[0].to_string(),
        _ => format!("{}/{}", segments[0], segments[1]),
    }
}

/// The most frequently touched area across the session's tool calls.
/// Ties go to the area seen first, keeping the result deterministic.
pub fn codebase_area(session: &Session) -> Option<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for event in &session.events {
        if !matches!(
            event.event_type,
            EventType::ToolCall | EventType::GitOp
        ) {
            continue;
        }
        for path in value::extract_file_paths(&event.raw) {
            let area = normalize_area(&path, session.folder.as_deref());
            match counts.iter_mut().find(|(a, _)| *a == area) {
                Some((_, n)) => *n += 1,
                None => counts.push((area, 1)),
            }
        }
    }
    counts
        .into_iter()
        .reduce(|best, cand| if cand.1 > best.1 { cand } else { best })
        .map(|(area, _)| area)
}

/// Sum of numbered items, bullet items, and "step N" phrases across
/// planning-mode content.
pub fn subtask_count(session: &Session) -> usize {
    session
        .events
        .iter()
        .filter(|e| e.event_type == EventType::PlanningMode)
        .filter_map(|e| value::extract_text(&e.raw))
        .map(|text| {
            NUMBERED_ITEM.find_iter(&text).count()
                + BULLET_ITEM.find_iter(&text).count()
                + STEP_PHRASE.find_iter(&text).count()
        })
        .sum()
}

/// Count of distinct tool names across tool-call and git-op events.
/// A tool call whose name cannot be found still counts, as `"unknown"`.
pub fn tool_diversity(session: &Session) -> usize {
    let mut names: HashSet<String> = HashSet::new();
    for event in &session.events {
        if !matches!(
            event.event_type,
            EventType::ToolCall | EventType::GitOp
        ) {
            continue;
        }
        let found = value::tool_names(&event.raw);
        if found.is_empty() {
            names.insert("unknown".to_string());
        } else {
            for name in found {
                names.insert(name.to_string());
            }
        }
    }
    names.len()
}

fn push_marker(labels: &mut Vec<String>, marker: &str) {
    if !labels.iter().any(|l| l == marker) {
        labels.push(marker.to_string());
    }
}

/// Enrich a copy of the caller's labels with derived ticket markers.
/// The caller's collection is never mutated.
fn enriched_labels(base: &[String], references: Option<&[TicketReference]>) -> Vec<String> {
    let mut labels = base.to_vec();
    let refs = match references {
        Some(r) if !r.is_empty() => r,
        _ => return labels,
    };
    let worked = refs
        .iter()
        .filter(|r| r.relationship == TicketRelationship::Worked)
        .count();
    if worked > 0 {
        push_marker(&mut labels, "has_worked_ticket");
    }
    if refs.len() - worked > 0 {
        push_marker(&mut labels, "has_referenced_ticket");
    }
    if refs.len() > 1 {
        push_marker(&mut labels, "multi_ticket");
    }
    labels
}

fn project_from_folder(folder: Option<&str>) -> Option<String> {
    let folder = folder?;
    folder
        .split('/')
        .filter(|s| !s.is_empty())
        .next_back()
        .map(|s| s.to_string())
}

pub fn task_characteristics(
    session: &Session,
    ticket_info: Option<&TicketInfo>,
) -> TaskCharacteristics {
    let labels = enriched_labels(
        ticket_info.map(|t| t.labels.as_slice()).unwrap_or(&[]),
        session.ticket_references.as_deref(),
    );
    TaskCharacteristics {
        codebase_area: codebase_area(session),
        branch_type: branch_type(session.branch.as_deref()),
        subtask_count: subtask_count(session),
        tool_diversity: tool_diversity(session),
        ticket_type: ticket_info.and_then(|t| t.ticket_type.clone()),
        labels,
        project: project_from_folder(session.folder.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{empty_session, event, session_with_events};
    use serde_json::json;
    use tillit_core::{TicketSource, TicketSourceKind};

    #[test]
    fn branch_type_table() {
        assert_eq!(branch_type(Some("feature/add-login")).as_deref(), Some("feature"));
        assert_eq!(branch_type(Some("fix/null-deref")).as_deref(), Some("fix"));
        assert_eq!(branch_type(Some("docs/readme")).as_deref(), Some("docs"));
        assert_eq!(branch_type(Some("doc/readme")).as_deref(), Some("docs"));
        assert_eq!(branch_type(Some("claude/session-1")).as_deref(), Some("claude"));
        assert_eq!(branch_type(Some("main")).as_deref(), Some("main"));
        assert_eq!(branch_type(Some("develop")).as_deref(), Some("develop"));
        assert_eq!(branch_type(Some("random-branch")).as_deref(), Some("other"));
        assert_eq!(branch_type(None), None);
    }

    #[test]
    fn normalize_area_strips_root_and_keeps_two_segments() {
        assert_eq!(
            normalize_area("/home/dev/proj/src/auth/login.rs", Some("/home/dev/proj")),
            "src/auth"
        );
        assert_eq!(normalize_area("README.md", None), "README.md");
        assert_eq!(normalize_area("/home/dev/proj", Some("/home/dev/proj")), "root");
    }

    #[test]
    fn codebase_area_picks_most_frequent() {
        let session = session_with_events(vec![
            event(EventType::ToolCall, "", json!({ "input": { "file_path": "src/auth/a.rs" } })),
            event(EventType::ToolCall, "", json!({ "input": { "file_path": "src/auth/b.rs" } })),
            event(EventType::ToolCall, "", json!({ "input": { "file_path": "src/api/c.rs" } })),
        ]);
        assert_eq!(codebase_area(&session).as_deref(), Some("src/auth"));
    }

    #[test]
    fn codebase_area_tie_goes_to_first_seen() {
        let session = session_with_events(vec![
            event(EventType::ToolCall, "", json!({ "input": { "file_path": "src/api/a.rs" } })),
            event(EventType::ToolCall, "", json!({ "input": { "file_path": "src/auth/b.rs" } })),
        ]);
        assert_eq!(codebase_area(&session).as_deref(), Some("src/api"));
    }

    #[test]
    fn codebase_area_none_without_paths() {
        let session = session_with_events(vec![event(
            EventType::ToolCall,
            "",
            json!({ "tool_name": "Bash", "input": { "command": "ls" } }),
        )]);
        assert_eq!(codebase_area(&session), None);
    }

    #[test]
    fn subtasks_summed_over_planning_events() {
        let session = session_with_events(vec![event(
            EventType::PlanningMode,
            "",
            json!({ "message": { "role": "assistant", "content":
                "Plan:\n1. read config\n2. write tests\n- cleanup\nStep 3 comes later" } }),
        )]);
        // two numbered, one bullet, one "step 3"
        assert_eq!(subtask_count(&session), 4);
    }

    #[test]
    fn tool_diversity_counts_distinct_names() {
        let session = session_with_events(vec![
            event(EventType::ToolCall, "", json!({ "tool_name": "Edit", "input": {} })),
            event(EventType::ToolCall, "", json!({ "tool_name": "Edit", "input": {} })),
            event(EventType::GitOp, "", json!({ "tool_name": "Bash", "input": { "command": "git status" } })),
            event(EventType::ToolCall, "", json!({ "type": "tool_call" })), // unidentifiable
        ]);
        // Edit, Bash, unknown
        assert_eq!(tool_diversity(&session), 3);
    }

    #[test]
    fn labels_enriched_into_a_copy() {
        let mut session = empty_session();
        session.ticket_references = Some(vec![
            TicketReference {
                ticket_id: "KUL-1".into(),
                relationship: TicketRelationship::Worked,
                sources: vec![TicketSource {
                    kind: TicketSourceKind::Commit,
                    event_index: Some(0),
                    timestamp: String::new(),
                    context: None,
                }],
            },
            TicketReference {
                ticket_id: "API-2".into(),
                relationship: TicketRelationship::Referenced,
                sources: Vec::new(),
            },
        ]);
        let info = TicketInfo {
            ticket_type: Some("bug".into()),
            labels: vec!["backend".into()],
        };
        let ch = task_characteristics(&session, Some(&info));
        assert_eq!(
            ch.labels,
            vec!["backend", "has_worked_ticket", "has_referenced_ticket", "multi_ticket"]
        );
        // copy-on-enrich: the caller's labels are untouched
        assert_eq!(info.labels, vec!["backend"]);
    }

    #[test]
    fn no_references_means_no_markers() {
        let session = empty_session();
        let info = TicketInfo {
            ticket_type: None,
            labels: vec!["infra".into()],
        };
        let ch = task_characteristics(&session, Some(&info));
        assert_eq!(ch.labels, vec!["infra"]);
    }

    #[test]
    fn project_is_last_folder_segment() {
        let mut session = empty_session();
        session.folder = Some("/home/dev/checkout/tillit".into());
        let ch = task_characteristics(&session, None);
        assert_eq!(ch.project.as_deref(), Some("tillit"));
    }
}
