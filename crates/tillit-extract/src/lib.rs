//! Ground-truth extraction: scans a session's classified events for commits,
//! pushes, ticket-state transitions, and every ticket mention, and folds them
//! into per-ticket references with a worked/referenced relationship.

pub mod gitcmd;
pub mod mention;
pub mod outcomes;
pub mod reference;
pub mod tags;
pub mod ticket;

pub use gitcmd::{parse_commit_command, parse_push_command, CommitInfo, PushInfo};
pub use mention::{extract_mentions, Mention};
pub use outcomes::extract_session_outcomes;
pub use reference::{build_ticket_references, primary_ticket};
pub use tags::{attach_tags, derive_tags};
pub use ticket::{detect_ticket_tool, extract_ticket_ids, is_completed_state, TicketToolCall};
