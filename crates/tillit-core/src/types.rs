use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Events ──

/// Semantic classification of one transcript record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    UserMessage,
    AssistantMessage,
    ToolCall,
    GitOp,
    Error,
    PlanningMode,
}

/// Structured tag attached to an event for timeline consumers.
///
/// Closed set of variant shapes; one event may carry several
/// (e.g. a commit mentioning two tickets).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventTag {
    Commit { message: String, ticket_ids: Vec<String> },
    Push { remote: String, branch: String },
    TicketCreated { ticket_id: String },
    TicketUpdated { ticket_id: String },
    TicketCompleted { ticket_id: String },
    TicketRead { ticket_id: String },
    TicketMentioned { ticket_id: String },
}

/// A classified transcript event. Derived 1:1 (or 0:1) from a raw record.
///
/// `timestamp` is taken from the record verbatim and left empty when the
/// record has none; it is never inferred.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub timestamp: String,
    pub token_count: u64,
    pub raw: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<EventTag>,
}

// ── Annotations (produced by the LLM friction detector, consumed as-is) ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Decision,
    Blocker,
    Rework,
    GoalShift,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    pub kind: AnnotationKind,
    pub summary: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_index: Option<usize>,
}

// ── Ticket references ──

/// Where a ticket reference was observed, in descending priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketSourceKind {
    McpComplete,
    McpCreate,
    McpUpdate,
    Commit,
    McpComment,
    Branch,
    McpRead,
    Mention,
}

impl TicketSourceKind {
    /// Fixed priority table used for relationship selection and ordering.
    pub fn priority(self) -> u32 {
        match self {
            TicketSourceKind::McpComplete => 100,
            TicketSourceKind::McpCreate => 90,
            TicketSourceKind::McpUpdate => 80,
            TicketSourceKind::Commit => 70,
            TicketSourceKind::McpComment => 60,
            TicketSourceKind::Branch => 50,
            TicketSourceKind::McpRead => 20,
            TicketSourceKind::Mention => 10,
        }
    }

    /// Active work signals map to `Worked`; read-only signals to `Referenced`.
    pub fn is_worked(self) -> bool {
        !matches!(self, TicketSourceKind::McpRead | TicketSourceKind::Mention)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketRelationship {
    Worked,
    Referenced,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketSource {
    pub kind: TicketSourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_index: Option<usize>,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketReference {
    pub ticket_id: String,
    pub relationship: TicketRelationship,
    pub sources: Vec<TicketSource>,
}

impl TicketReference {
    /// Highest priority among this reference's sources (0 when empty).
    pub fn max_priority(&self) -> u32 {
        self.sources
            .iter()
            .map(|s| s.kind.priority())
            .max()
            .unwrap_or(0)
    }
}

// ── Ground-truth outcomes ──

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRecord {
    pub message: String,
    pub ticket_ids: Vec<String>,
    pub timestamp: String,
    pub event_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushRecord {
    pub remote: String,
    pub branch: String,
    pub timestamp: String,
    pub event_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketStateChange {
    pub ticket_id: String,
    pub state: String,
    pub completed: bool,
    pub timestamp: String,
    pub event_index: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionOutcomes {
    #[serde(default)]
    pub commits: Vec<CommitRecord>,
    #[serde(default)]
    pub pushes: Vec<PushRecord>,
    #[serde(default)]
    pub ticket_state_changes: Vec<TicketStateChange>,
}

// ── Session (supplied by the upstream ingestion pipeline) ──

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub started_at: String,
    pub ended_at: String,
    pub duration_ms: i64,
    pub total_tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_references: Option<Vec<TicketReference>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcomes: Option<SessionOutcomes>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Ticket metadata supplied by the ticket-sync collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_type: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
}

// ── Per-session derived metrics ──

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteeringMetrics {
    pub user_message_count: usize,
    pub intervention_count: usize,
    /// Where in the session (0..1) the first intervention landed.
    /// `None` when there was no intervention or the duration is unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_intervention_progress: Option<f64>,
    /// Raw millisecond gap from session start to the first intervention.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_to_first_intervention_ms: Option<i64>,
    /// Interventions per 10k tokens; 0 when the token total is unknown.
    pub intervention_density: f64,
    pub goal_shift_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCharacteristics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codebase_area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_type: Option<String>,
    pub subtask_count: usize,
    pub tool_diversity: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_type: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeMetrics {
    pub commit_count: usize,
    pub push_count: usize,
    pub error_count: usize,
    /// Errors per 10k tokens; 0 when the token total is unknown.
    pub error_density: f64,
    pub ended_with_error: bool,
    pub blocker_count: usize,
    pub rework_count: usize,
    pub decision_count: usize,
}

/// The complete per-session trust record. Created once by the analysis
/// pipeline and never mutated; a re-analysis replaces it wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTrustAnalysis {
    pub session_id: String,
    pub steering: SteeringMetrics,
    pub characteristics: TaskCharacteristics,
    pub outcome: OutcomeMetrics,
    pub trust_score: f64,
    pub autonomous: bool,
}

// ── Aggregates ──

/// One row per category value (e.g. `src/auth`). Recomputed fully on
/// every aggregation pass, never patched incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustAggregate {
    pub key: String,
    pub total_sessions: usize,
    pub autonomous_sessions: usize,
    pub autonomous_rate: f64,
    pub avg_trust_score: f64,
    pub avg_intervention_count: f64,
    pub avg_intervention_density: f64,
    pub commit_rate: f64,
    pub rework_rate: f64,
    pub error_rate: f64,
    pub avg_first_intervention_progress: f64,
    /// Sigmoid of sample size; expresses statistical reliability.
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrustBaseline {
    pub total_sessions: usize,
    pub autonomous_rate: f64,
    pub avg_trust_score: f64,
    pub avg_intervention_count: f64,
}

/// Atomic snapshot of all category aggregates plus the global baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustMap {
    pub by_area: Vec<TrustAggregate>,
    pub by_ticket_type: Vec<TrustAggregate>,
    pub by_branch_type: Vec<TrustAggregate>,
    pub by_label: Vec<TrustAggregate>,
    pub by_project: Vec<TrustAggregate>,
    pub baseline: TrustBaseline,
    pub computed_at: String,
}
