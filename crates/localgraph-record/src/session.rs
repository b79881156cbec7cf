//! Builder-pattern session recorder for run records.
//!
//! ```no_run
//! # use localgraph_record::session::RunSession;
//! let mut session = RunSession::new("localgraph-discover", "Local graph around {0} to radius 2");
//! session.set_context(serde_json::json!({"targets": [0], "radius": 2}));
//! session.add_decision("union admission", "Configured policy for this run");
//! session.add_action("frontier_layer", "Probed 1 variable", serde_json::json!({"layer": 1}), true);
//! let record = session.finalize();
//! assert!(record.content_hash.is_some());
//! ```

use chrono::Utc;

use crate::{Action, Decision, RecordId, RunRecord};

/// Records a run incrementally; `finalize` seals it with a content hash.
pub struct RunSession {
    record: RunRecord,
}

impl RunSession {
    pub fn new(tool: &str, intent: &str) -> Self {
        Self {
            record: RunRecord {
                id: RecordId::new(),
                tool: tool.to_string(),
                intent: intent.to_string(),
                context: serde_json::Value::Null,
                decisions: Vec::new(),
                actions: Vec::new(),
                started_at: Utc::now(),
                completed_at: None,
                content_hash: None,
            },
        }
    }

    pub fn set_context(&mut self, context: serde_json::Value) {
        self.record.context = context;
    }

    pub fn add_decision(&mut self, choice: &str, rationale: &str) {
        self.record.decisions.push(Decision {
            choice: choice.to_string(),
            rationale: rationale.to_string(),
            timestamp: Utc::now(),
        });
    }

    pub fn add_action(
        &mut self,
        action_type: &str,
        description: &str,
        details: serde_json::Value,
        success: bool,
    ) {
        self.record.actions.push(Action {
            action_type: action_type.to_string(),
            description: description.to_string(),
            details,
            success,
            timestamp: Utc::now(),
        });
    }

    pub fn id(&self) -> RecordId {
        self.record.id
    }

    /// Set `completed_at` and compute the content hash.
    pub fn finalize(mut self) -> RunRecord {
        self.record.completed_at = Some(Utc::now());
        let hash = self.record.compute_hash();
        self.record.content_hash = Some(hash);
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalize_seals_record() {
        let mut session = RunSession::new("localgraph-discover", "test run");
        let id = session.id();
        session.add_action("frontier_layer", "layer 1", serde_json::json!({}), true);
        session.add_action("oracle_failure", "variable 3", serde_json::json!({}), false);

        let record = session.finalize();
        assert_eq!(record.id, id);
        assert!(record.completed_at.is_some());
        assert!(record.verify_integrity());
        assert_eq!(record.failed_actions(), 1);
    }
}
