//! Symmetric adjacency relation over variables `[0, p)`.
//!
//! Edges are unordered pairs with an optional scalar weight (for example a
//! significance score). A neighbor index is kept in sync with the edge map so
//! that BFS can walk the relation without rescanning edges.

use std::collections::{BTreeMap, BTreeSet};

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::types::{Edge, VariableId};

/// Symmetric, loop-free adjacency relation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "AdjacencyRecord", into = "AdjacencyRecord")]
pub struct Adjacency {
    node_count: usize,
    edges: BTreeMap<Edge, Option<f64>>,
    neighbors: BTreeMap<VariableId, BTreeSet<VariableId>>,
}

impl Adjacency {
    /// An empty relation over `node_count` variables.
    pub fn new(node_count: usize) -> Self {
        Self {
            node_count,
            edges: BTreeMap::new(),
            neighbors: BTreeMap::new(),
        }
    }

    /// Build from unweighted pairs.
    pub fn from_edges(
        node_count: usize,
        pairs: impl IntoIterator<Item = (VariableId, VariableId)>,
    ) -> Result<Self> {
        let mut adjacency = Self::new(node_count);
        for (i, j) in pairs {
            adjacency.insert(i, j)?;
        }
        Ok(adjacency)
    }

    /// Build from a dense `p × p` 0/1 matrix. Nonzero entries in either
    /// triangle become an edge; the diagonal is ignored.
    pub fn from_binary_matrix(matrix: ArrayView2<'_, f64>) -> Result<Self> {
        let p = square_dimension(&matrix)?;
        let mut adjacency = Self::new(p);
        for i in 0..p {
            for j in (i + 1)..p {
                if matrix[[i, j]] != 0.0 || matrix[[j, i]] != 0.0 {
                    adjacency.insert(i, j)?;
                }
            }
        }
        Ok(adjacency)
    }

    /// Build from a dense weighted matrix, symmetrized by elementwise maximum.
    /// Entries equal to zero mean "no edge".
    pub fn from_weighted_matrix(matrix: ArrayView2<'_, f64>) -> Result<Self> {
        let p = square_dimension(&matrix)?;
        let mut adjacency = Self::new(p);
        for i in 0..p {
            for j in (i + 1)..p {
                let weight = matrix[[i, j]].max(matrix[[j, i]]);
                if weight != 0.0 {
                    adjacency.insert_weighted(i, j, weight)?;
                }
            }
        }
        Ok(adjacency)
    }

    /// Dense symmetric matrix; unweighted edges are written as 1.0.
    pub fn to_matrix(&self) -> Array2<f64> {
        let mut matrix = Array2::zeros((self.node_count, self.node_count));
        for (edge, weight) in &self.edges {
            let value = weight.unwrap_or(1.0);
            matrix[[edge.low, edge.high]] = value;
            matrix[[edge.high, edge.low]] = value;
        }
        matrix
    }

    /// Add an unweighted edge. Returns `true` if the edge is new.
    pub fn insert(&mut self, i: VariableId, j: VariableId) -> Result<bool> {
        self.insert_edge(i, j, None)
    }

    /// Add a weighted edge. An existing edge has its weight replaced.
    pub fn insert_weighted(&mut self, i: VariableId, j: VariableId, weight: f64) -> Result<bool> {
        self.insert_edge(i, j, Some(weight))
    }

    fn insert_edge(&mut self, i: VariableId, j: VariableId, weight: Option<f64>) -> Result<bool> {
        for v in [i, j] {
            if v >= self.node_count {
                return Err(GraphError::VariableOutOfRange {
                    variable: v,
                    node_count: self.node_count,
                });
            }
        }
        let edge = Edge::new(i, j).ok_or(GraphError::SelfLoop { variable: i })?;

        let is_new = match self.edges.get_mut(&edge) {
            Some(existing) => {
                if weight.is_some() {
                    *existing = weight;
                }
                false
            }
            None => {
                self.edges.insert(edge, weight);
                true
            }
        };

        if is_new {
            self.neighbors.entry(edge.low).or_default().insert(edge.high);
            self.neighbors.entry(edge.high).or_default().insert(edge.low);
        }
        Ok(is_new)
    }

    pub fn contains(&self, i: VariableId, j: VariableId) -> bool {
        Edge::new(i, j).is_some_and(|e| self.edges.contains_key(&e))
    }

    pub fn contains_edge(&self, edge: &Edge) -> bool {
        self.edges.contains_key(edge)
    }

    /// Weight of `(i, j)`; `None` if the edge is absent or unweighted.
    pub fn weight(&self, i: VariableId, j: VariableId) -> Option<f64> {
        Edge::new(i, j).and_then(|e| self.edges.get(&e).copied().flatten())
    }

    /// Neighbors of `v` in ascending order. Unknown variables have none.
    pub fn neighbors(&self, v: VariableId) -> impl Iterator<Item = VariableId> + '_ {
        self.neighbors.get(&v).into_iter().flatten().copied()
    }

    pub fn degree(&self, v: VariableId) -> usize {
        self.neighbors.get(&v).map_or(0, BTreeSet::len)
    }

    pub fn edges(&self) -> impl Iterator<Item = (Edge, Option<f64>)> + '_ {
        self.edges.iter().map(|(e, w)| (*e, *w))
    }

    pub fn edge_set(&self) -> BTreeSet<Edge> {
        self.edges.keys().copied().collect()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Variables incident on at least one edge.
    pub fn nodes(&self) -> BTreeSet<VariableId> {
        self.neighbors.keys().copied().collect()
    }

    /// A new relation over the same variables keeping only edges for which
    /// `keep` returns true. Weights are carried through.
    pub fn filter_edges(&self, mut keep: impl FnMut(&Edge) -> bool) -> Self {
        let mut out = Self::new(self.node_count);
        for (edge, weight) in &self.edges {
            if keep(edge) {
                out.edges.insert(*edge, *weight);
                out.neighbors.entry(edge.low).or_default().insert(edge.high);
                out.neighbors.entry(edge.high).or_default().insert(edge.low);
            }
        }
        out
    }

    /// Induced sub-relation on the given variables.
    pub fn induced(&self, nodes: &BTreeSet<VariableId>) -> Self {
        self.filter_edges(|e| nodes.contains(&e.low) && nodes.contains(&e.high))
    }

    /// Every edge of `self` is present in `other` (weights ignored).
    pub fn is_subset_of(&self, other: &Adjacency) -> bool {
        self.edges.keys().all(|e| other.edges.contains_key(e))
    }

    /// Number of edges present in both relations.
    pub fn intersection_count(&self, other: &Adjacency) -> usize {
        self.edges
            .keys()
            .filter(|e| other.edges.contains_key(e))
            .count()
    }

    /// Number of edges of `self` missing from `other`.
    pub fn difference_count(&self, other: &Adjacency) -> usize {
        self.edge_count() - self.intersection_count(other)
    }
}

fn square_dimension(matrix: &ArrayView2<'_, f64>) -> Result<usize> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(GraphError::DimensionMismatch(format!(
            "adjacency matrix must be square, got {rows}x{cols}"
        )));
    }
    Ok(rows)
}

// ── JSON representation ──────────────────────────────────────────

/// Wire form of an adjacency relation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjacencyRecord {
    pub node_count: usize,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

/// One edge in the wire form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: VariableId,
    pub target: VariableId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl TryFrom<AdjacencyRecord> for Adjacency {
    type Error = GraphError;

    fn try_from(record: AdjacencyRecord) -> Result<Self> {
        let mut adjacency = Adjacency::new(record.node_count);
        for edge in record.edges {
            adjacency.insert_edge(edge.source, edge.target, edge.weight)?;
        }
        Ok(adjacency)
    }
}

impl From<Adjacency> for AdjacencyRecord {
    fn from(adjacency: Adjacency) -> Self {
        AdjacencyRecord {
            node_count: adjacency.node_count,
            edges: adjacency
                .edges
                .into_iter()
                .map(|(e, weight)| EdgeRecord {
                    source: e.low,
                    target: e.high,
                    weight,
                })
                .collect(),
        }
    }
}
