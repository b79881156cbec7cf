//! Edge recovery of an estimated graph against a reference graph.
//!
//! Used in simulations where the true graph is known. Evaluation is either
//! global (whole graphs) or local to a radius around the targets:
//! - global: TP = |est ∩ truth|, FP = |est − truth|, true edges = |truth|
//! - local: with `est_r` and `truth_r` the restrictions of each graph to the
//!   radius, TP = |est_r ∩ truth_r|, FP = |est_r − truth|,
//!   true edges = |truth_r|
//!
//! A locally estimated edge that exists in the truth, just not within the
//! radius of the true graph, counts as neither.

use serde::{Deserialize, Serialize};

use localgraph_core::{Adjacency, GraphError, Radius, TargetSet};

use crate::error::Result;
use crate::restrict::restrict;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecovery {
    pub true_positives: usize,
    pub false_positives: usize,
    /// Edges in the reference graph (or its restriction).
    pub true_edges: usize,
}

impl EdgeRecovery {
    /// True positive rate, `TP / max(true_edges, 1)`.
    pub fn tpr(&self) -> f64 {
        self.true_positives as f64 / self.true_edges.max(1) as f64
    }

    /// False discovery proportion, `FP / max(TP + FP, 1)`.
    pub fn fdp(&self) -> f64 {
        self.false_positives as f64 / (self.true_positives + self.false_positives).max(1) as f64
    }
}

pub fn edge_recovery(
    estimated: &Adjacency,
    truth: &Adjacency,
    targets: &TargetSet,
    radius: Option<Radius>,
) -> Result<EdgeRecovery> {
    if estimated.node_count() != truth.node_count() {
        return Err(GraphError::DimensionMismatch(format!(
            "estimated graph has {} variables, reference has {}",
            estimated.node_count(),
            truth.node_count()
        ))
        .into());
    }

    let recovery = match radius {
        None => EdgeRecovery {
            true_positives: estimated.intersection_count(truth),
            false_positives: estimated.difference_count(truth),
            true_edges: truth.edge_count(),
        },
        Some(radius) => {
            let estimated_local = restrict(estimated, targets, radius, false);
            let truth_local = restrict(truth, targets, radius, false);
            EdgeRecovery {
                true_positives: estimated_local.intersection_count(&truth_local),
                false_positives: estimated_local.difference_count(truth),
                true_edges: truth_local.edge_count(),
            }
        }
    };

    tracing::debug!(
        radius = ?radius.map(Radius::get),
        tp = recovery.true_positives,
        fp = recovery.false_positives,
        true_edges = recovery.true_edges,
        "Edge recovery"
    );

    Ok(recovery)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn truth() -> Adjacency {
        Adjacency::from_edges(6, [(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)]).unwrap()
    }

    #[test]
    fn test_global_counts() {
        let est = Adjacency::from_edges(6, [(0, 1), (1, 2), (0, 5), (3, 4)]).unwrap();
        let r = edge_recovery(&est, &truth(), &TargetSet::single(0), None).unwrap();
        assert_eq!(
            r,
            EdgeRecovery {
                true_positives: 3,
                false_positives: 1,
                true_edges: 5,
            }
        );
        assert!((r.tpr() - 0.6).abs() < 1e-12);
        assert!((r.fdp() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_local_counts() {
        // Within 1 hop of 0 in the estimate: 0-1 and the false 0-5.
        let est = Adjacency::from_edges(6, [(0, 1), (1, 2), (0, 5), (3, 4)]).unwrap();
        let r = edge_recovery(&est, &truth(), &TargetSet::single(0), Some(Radius::hops(1))).unwrap();
        assert_eq!(
            r,
            EdgeRecovery {
                true_positives: 1,
                false_positives: 1,
                true_edges: 1,
            }
        );
        assert_eq!(r.tpr(), 1.0);
        assert_eq!(r.fdp(), 0.5);
    }

    #[test]
    fn test_empty_graphs_do_not_divide_by_zero() {
        let empty = Adjacency::new(3);
        let r = edge_recovery(&empty, &empty, &TargetSet::single(0), None).unwrap();
        assert_eq!(r.tpr(), 0.0);
        assert_eq!(r.fdp(), 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let result = edge_recovery(
            &Adjacency::new(3),
            &Adjacency::new(4),
            &TargetSet::single(0),
            None,
        );
        assert!(result.is_err());
    }
}
