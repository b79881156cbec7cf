//! Core value types: variables, edges, target sets and radius bounds.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// Dense variable index in `[0, p)`.
pub type VariableId = usize;

// ── Edge ──────────────────────────────────────────────────────────

/// An unordered pair of distinct variables, stored with `low < high`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub low: VariableId,
    pub high: VariableId,
}

impl Edge {
    /// Normalize `(i, j)` into an edge. Returns `None` for a self-pair.
    pub fn new(i: VariableId, j: VariableId) -> Option<Self> {
        match i.cmp(&j) {
            std::cmp::Ordering::Less => Some(Self { low: i, high: j }),
            std::cmp::Ordering::Greater => Some(Self { low: j, high: i }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Whether `v` is one of the endpoints.
    pub fn touches(&self, v: VariableId) -> bool {
        self.low == v || self.high == v
    }

    /// The endpoint opposite to `v`, if `v` is an endpoint.
    pub fn other(&self, v: VariableId) -> Option<VariableId> {
        if v == self.low {
            Some(self.high)
        } else if v == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.low, self.high)
    }
}

// ── Target Set ────────────────────────────────────────────────────

/// A non-empty set of variables anchoring a traversal.
///
/// Order is irrelevant and duplicates collapse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<VariableId>", into = "Vec<VariableId>")]
pub struct TargetSet(BTreeSet<VariableId>);

impl TargetSet {
    /// Build a target set, rejecting empty input.
    pub fn new(variables: impl IntoIterator<Item = VariableId>) -> Result<Self> {
        let set: BTreeSet<VariableId> = variables.into_iter().collect();
        if set.is_empty() {
            return Err(GraphError::EmptyTargetSet);
        }
        Ok(Self(set))
    }

    /// A target set holding a single anchor variable.
    pub fn single(variable: VariableId) -> Self {
        Self(BTreeSet::from([variable]))
    }

    pub fn contains(&self, variable: VariableId) -> bool {
        self.0.contains(&variable)
    }

    pub fn iter(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_set(&self) -> &BTreeSet<VariableId> {
        &self.0
    }

    /// Check every target lies in `[0, node_count)`.
    pub fn check_range(&self, node_count: usize) -> Result<()> {
        match self.0.iter().find(|&&v| v >= node_count) {
            Some(&variable) => Err(GraphError::VariableOutOfRange {
                variable,
                node_count,
            }),
            None => Ok(()),
        }
    }
}

impl TryFrom<Vec<VariableId>> for TargetSet {
    type Error = GraphError;

    fn try_from(value: Vec<VariableId>) -> Result<Self> {
        Self::new(value)
    }
}

impl From<TargetSet> for Vec<VariableId> {
    fn from(value: TargetSet) -> Self {
        value.0.into_iter().collect()
    }
}

// ── Radius ────────────────────────────────────────────────────────

/// A non-negative bound on BFS hops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Radius(usize);

impl Radius {
    /// Validate a signed radius; negative values are rejected.
    pub fn new(radius: i64) -> Result<Self> {
        usize::try_from(radius)
            .map(Self)
            .map_err(|_| GraphError::InvalidRadius { radius })
    }

    pub const fn hops(hops: usize) -> Self {
        Self(hops)
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

impl TryFrom<i64> for Radius {
    type Error = GraphError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Radius> for i64 {
    fn from(value: Radius) -> Self {
        i64::try_from(value.0).unwrap_or(i64::MAX)
    }
}

impl std::fmt::Display for Radius {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
