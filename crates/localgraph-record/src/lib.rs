//! localgraph-record: Tamper-evident records of graph discovery runs.
//!
//! A run record captures what a discovery run was asked to do, the
//! parameters it ran with, the decisions it made, and one action per
//! frontier layer or oracle failure. Each record is content-hashed with
//! BLAKE3 on finalization so that edits to a stored record are detectable.

pub mod hash;
pub mod session;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a run record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct RecordId(pub Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// A choice fixed for the run (policy, radius, oracle).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Decision {
    pub choice: String,
    pub rationale: String,
    pub timestamp: DateTime<Utc>,
}

/// Something the run did, such as probing one frontier layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Action {
    /// Kind of action (e.g. "frontier_layer", "oracle_failure").
    pub action_type: String,
    pub description: String,
    /// Structured details (layer, variables, counts, timings).
    pub details: serde_json::Value,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

/// The complete record of one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunRecord {
    pub id: RecordId,
    /// Which tool produced the record (e.g. "localgraph-discover").
    pub tool: String,
    /// What the run was asked to do.
    pub intent: String,
    /// Parameters the run started with.
    pub context: serde_json::Value,
    pub decisions: Vec<Decision>,
    pub actions: Vec<Action>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// BLAKE3 content hash (hex), set on finalization.
    pub content_hash: Option<String>,
}

impl RunRecord {
    /// BLAKE3 hash over every field except `content_hash`.
    pub fn compute_hash(&self) -> String {
        hash::compute_record_hash(self)
    }

    /// Whether the stored hash matches the current content.
    pub fn verify_integrity(&self) -> bool {
        self.content_hash
            .as_deref()
            .is_some_and(|stored| stored == self.compute_hash())
    }

    /// Number of actions that reported failure.
    pub fn failed_actions(&self) -> usize {
        self.actions.iter().filter(|a| !a.success).count()
    }
}
