//! Query ledger: one entry per variable the oracle has been asked about.
//!
//! The ledger is the visited set of a discovery run. It refuses to claim a
//! variable whose query already succeeded, so the "at most one successful
//! oracle query per variable" guarantee can be checked directly against it.
//! Failed and cancelled queries may be claimed again when a run is resumed.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use localgraph_core::VariableId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Variable {variable} was already answered by the oracle")]
    AlreadyAnswered { variable: VariableId },

    #[error("Variable {variable} already has a query in flight")]
    AlreadyPending { variable: VariableId },

    #[error("Variable {variable} has no query in flight")]
    NotPending { variable: VariableId },
}

/// State of a variable's oracle query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryStatus {
    Pending,
    Answered {
        neighbors: BTreeSet<VariableId>,
        elapsed_ms: u64,
    },
    Failed {
        reason: String,
    },
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryEntry {
    /// Layer (1-based) in which the variable was last claimed.
    pub layer: usize,
    /// Number of times the variable was claimed.
    pub attempts: u32,
    pub status: QueryStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryLedger {
    entries: BTreeMap<VariableId, QueryEntry>,
}

impl QueryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `variable` as about to be queried in `layer`.
    pub fn claim(&mut self, variable: VariableId, layer: usize) -> Result<(), LedgerError> {
        match self.entries.get_mut(&variable) {
            Some(entry) => match entry.status {
                QueryStatus::Answered { .. } => Err(LedgerError::AlreadyAnswered { variable }),
                QueryStatus::Pending => Err(LedgerError::AlreadyPending { variable }),
                QueryStatus::Failed { .. } | QueryStatus::Cancelled => {
                    entry.layer = layer;
                    entry.attempts += 1;
                    entry.status = QueryStatus::Pending;
                    Ok(())
                }
            },
            None => {
                self.entries.insert(
                    variable,
                    QueryEntry {
                        layer,
                        attempts: 1,
                        status: QueryStatus::Pending,
                    },
                );
                Ok(())
            }
        }
    }

    pub fn answer(
        &mut self,
        variable: VariableId,
        neighbors: BTreeSet<VariableId>,
        elapsed: Duration,
    ) -> Result<(), LedgerError> {
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.resolve(
            variable,
            QueryStatus::Answered {
                neighbors,
                elapsed_ms,
            },
        )
    }

    pub fn fail(&mut self, variable: VariableId, reason: &str) -> Result<(), LedgerError> {
        self.resolve(
            variable,
            QueryStatus::Failed {
                reason: reason.to_string(),
            },
        )
    }

    pub fn cancel(&mut self, variable: VariableId) -> Result<(), LedgerError> {
        self.resolve(variable, QueryStatus::Cancelled)
    }

    fn resolve(&mut self, variable: VariableId, status: QueryStatus) -> Result<(), LedgerError> {
        match self.entries.get_mut(&variable) {
            Some(entry) if entry.status == QueryStatus::Pending => {
                entry.status = status;
                Ok(())
            }
            _ => Err(LedgerError::NotPending { variable }),
        }
    }

    /// Whether the variable has been claimed in this run, whatever the outcome.
    pub fn is_visited(&self, variable: VariableId) -> bool {
        self.entries.contains_key(&variable)
    }

    pub fn is_answered(&self, variable: VariableId) -> bool {
        matches!(
            self.entries.get(&variable).map(|e| &e.status),
            Some(QueryStatus::Answered { .. })
        )
    }

    pub fn visited(&self) -> BTreeSet<VariableId> {
        self.entries.keys().copied().collect()
    }

    pub fn entry(&self, variable: VariableId) -> Option<&QueryEntry> {
        self.entries.get(&variable)
    }

    pub fn status(&self, variable: VariableId) -> Option<&QueryStatus> {
        self.entries.get(&variable).map(|e| &e.status)
    }

    pub fn attempts(&self, variable: VariableId) -> u32 {
        self.entries.get(&variable).map_or(0, |e| e.attempts)
    }

    /// Neighbor set the oracle reported, if answered.
    pub fn neighbors(&self, variable: VariableId) -> Option<&BTreeSet<VariableId>> {
        match self.status(variable) {
            Some(QueryStatus::Answered { neighbors, .. }) => Some(neighbors),
            _ => None,
        }
    }

    pub fn pending(&self) -> BTreeSet<VariableId> {
        self.with_status(|s| matches!(s, QueryStatus::Pending))
    }

    /// Variables whose last query failed or was cancelled.
    pub fn unresolved(&self) -> BTreeSet<VariableId> {
        self.with_status(|s| matches!(s, QueryStatus::Failed { .. } | QueryStatus::Cancelled))
    }

    pub fn answered_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| matches!(e.status, QueryStatus::Answered { .. }))
            .count()
    }

    pub fn total_attempts(&self) -> u64 {
        self.entries.values().map(|e| u64::from(e.attempts)).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn with_status(&self, pred: impl Fn(&QueryStatus) -> bool) -> BTreeSet<VariableId> {
        self.entries
            .iter()
            .filter(|(_, e)| pred(&e.status))
            .map(|(v, _)| *v)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_then_answer() {
        let mut ledger = QueryLedger::new();
        ledger.claim(4, 1).unwrap();
        assert!(ledger.is_visited(4));
        assert!(!ledger.is_answered(4));
        assert_eq!(ledger.pending(), BTreeSet::from([4]));

        ledger
            .answer(4, BTreeSet::from([1, 2]), Duration::from_millis(12))
            .unwrap();
        assert!(ledger.is_answered(4));
        assert_eq!(ledger.neighbors(4), Some(&BTreeSet::from([1, 2])));
        assert_eq!(ledger.answered_count(), 1);
        assert!(ledger.pending().is_empty());
    }

    #[test]
    fn test_answered_variable_cannot_be_claimed_again() {
        let mut ledger = QueryLedger::new();
        ledger.claim(0, 1).unwrap();
        ledger.answer(0, BTreeSet::new(), Duration::ZERO).unwrap();
        assert_eq!(
            ledger.claim(0, 2),
            Err(LedgerError::AlreadyAnswered { variable: 0 })
        );
        assert_eq!(ledger.attempts(0), 1);
    }

    #[test]
    fn test_double_claim_rejected() {
        let mut ledger = QueryLedger::new();
        ledger.claim(7, 1).unwrap();
        assert_eq!(
            ledger.claim(7, 1),
            Err(LedgerError::AlreadyPending { variable: 7 })
        );
    }

    #[test]
    fn test_failed_variable_can_be_retried() {
        let mut ledger = QueryLedger::new();
        ledger.claim(3, 2).unwrap();
        ledger.fail(3, "singular correlation matrix").unwrap();
        assert_eq!(ledger.unresolved(), BTreeSet::from([3]));
        assert!(ledger.is_visited(3));

        ledger.claim(3, 2).unwrap();
        assert_eq!(ledger.attempts(3), 2);
        ledger.answer(3, BTreeSet::from([5]), Duration::ZERO).unwrap();
        assert!(ledger.unresolved().is_empty());
        assert_eq!(ledger.total_attempts(), 2);
    }

    #[test]
    fn test_resolve_requires_pending() {
        let mut ledger = QueryLedger::new();
        assert_eq!(ledger.cancel(1), Err(LedgerError::NotPending { variable: 1 }));
        ledger.claim(1, 1).unwrap();
        ledger.cancel(1).unwrap();
        assert_eq!(ledger.cancel(1), Err(LedgerError::NotPending { variable: 1 }));
        assert_eq!(ledger.status(1), Some(&QueryStatus::Cancelled));
    }

    #[test]
    fn test_json_roundtrip_keeps_statuses() {
        let mut ledger = QueryLedger::new();
        ledger.claim(0, 1).unwrap();
        ledger.answer(0, BTreeSet::from([1]), Duration::from_millis(5)).unwrap();
        ledger.claim(1, 2).unwrap();
        ledger.fail(1, "timeout in R").unwrap();

        let json = serde_json::to_string(&ledger).unwrap();
        let parsed: QueryLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ledger);
    }
}
