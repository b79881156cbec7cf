//! Request and response types for the extraction commands.
//!
//! Radii arrive as signed integers so that a negative value is reported as
//! an invalid radius instead of a parse failure.

use std::collections::{BTreeMap, BTreeSet};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use localgraph_core::{Adjacency, GraphError, VariableId};

use crate::cluster::ClusterOptions;
use crate::evaluate::EdgeRecovery;

/// A graph as produced by some global estimation method: either an edge
/// list or a dense `p × p` matrix.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GraphInput {
    Edges(Adjacency),
    Matrix {
        matrix: Vec<Vec<f64>>,
        /// Keep matrix entries as edge weights (symmetrized by maximum).
        #[serde(default)]
        weighted: bool,
    },
}

impl GraphInput {
    pub fn into_adjacency(self) -> Result<Adjacency, GraphError> {
        match self {
            Self::Edges(adjacency) => Ok(adjacency),
            Self::Matrix { matrix, weighted } => {
                let rows = matrix.len();
                let cols = matrix.first().map_or(0, Vec::len);
                if let Some(row) = matrix.iter().position(|r| r.len() != cols) {
                    return Err(GraphError::DimensionMismatch(format!(
                        "matrix row {row} has {} entries, expected {cols}",
                        matrix[row].len()
                    )));
                }
                let dense = Array2::from_shape_vec((rows, cols), matrix.concat())
                    .map_err(|e| GraphError::DimensionMismatch(e.to_string()))?;
                if weighted {
                    Adjacency::from_weighted_matrix(dense.view())
                } else {
                    Adjacency::from_binary_matrix(dense.view())
                }
            }
        }
    }
}

// ── restrict ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct RestrictRequest {
    pub graph: GraphInput,
    pub seeds: Vec<VariableId>,
    pub radius: i64,
    #[serde(default)]
    pub exclude_seeds: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RestrictResponse {
    pub adjacency: Adjacency,
    /// Hop distance of every variable within the radius.
    pub distances: BTreeMap<VariableId, usize>,
    pub edge_count: usize,
}

// ── cluster ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ClusterRequest {
    pub graph: GraphInput,
    pub anchor: VariableId,
    pub radius: i64,
    #[serde(flatten)]
    pub options: ClusterOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClusterResponse {
    pub anchor: VariableId,
    pub radius: usize,
    pub nodes: BTreeSet<VariableId>,
    pub size: usize,
}

// ── layers ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct LayersRequest {
    pub graph: GraphInput,
    pub seeds: Vec<VariableId>,
    pub radius: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayersResponse {
    pub layers: BTreeMap<usize, BTreeSet<VariableId>>,
}

// ── evaluate ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluateRequest {
    pub estimated: GraphInput,
    pub truth: GraphInput,
    pub targets: Vec<VariableId>,
    /// Radii for local evaluation; global evaluation is always reported.
    #[serde(default)]
    pub radii: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveryReport {
    #[serde(flatten)]
    pub counts: EdgeRecovery,
    pub tpr: f64,
    pub fdp: f64,
}

impl From<EdgeRecovery> for RecoveryReport {
    fn from(counts: EdgeRecovery) -> Self {
        Self {
            counts,
            tpr: counts.tpr(),
            fdp: counts.fdp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalRecovery {
    pub radius: usize,
    #[serde(flatten)]
    pub report: RecoveryReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluateResponse {
    pub global: RecoveryReport,
    pub local: Vec<LocalRecovery>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_list_input() {
        let input: GraphInput = serde_json::from_str(
            r#"{"node_count": 3, "edges": [{"source": 0, "target": 2, "weight": 0.5}]}"#,
        )
        .unwrap();
        let adjacency = input.into_adjacency().unwrap();
        assert_eq!(adjacency.weight(2, 0), Some(0.5));
    }

    #[test]
    fn test_binary_matrix_input() {
        let input: GraphInput =
            serde_json::from_str(r#"{"matrix": [[0, 1, 0], [0, 0, 0], [0, 1, 0]]}"#).unwrap();
        let adjacency = input.into_adjacency().unwrap();
        assert_eq!(
            adjacency,
            Adjacency::from_edges(3, [(0, 1), (1, 2)]).unwrap()
        );
    }

    #[test]
    fn test_weighted_matrix_symmetrized_by_max() {
        let input: GraphInput = serde_json::from_str(
            r#"{"matrix": [[0, 0.2], [0.7, 0]], "weighted": true}"#,
        )
        .unwrap();
        let adjacency = input.into_adjacency().unwrap();
        assert_eq!(adjacency.weight(0, 1), Some(0.7));
    }

    #[test]
    fn test_ragged_matrix_rejected() {
        let input: GraphInput =
            serde_json::from_str(r#"{"matrix": [[0, 1], [1]]}"#).unwrap();
        assert!(matches!(
            input.into_adjacency(),
            Err(GraphError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_cluster_request_flattens_options() {
        let request: ClusterRequest = serde_json::from_str(
            r#"{"graph": {"node_count": 2}, "anchor": 1, "radius": 2, "exclude_anchor": true, "remove": [0]}"#,
        )
        .unwrap();
        assert!(request.options.exclude_anchor);
        assert_eq!(request.options.remove, BTreeSet::from([0]));
    }
}
