//! Single-anchor clustering.
//!
//! The cluster of an anchor is every variable within `radius` hops of it,
//! used to hand a node set to enrichment analysis. Variables listed in
//! `remove` (typically the study targets, such as a disease-status
//! indicator) are taken out of the graph before the walk, so the cluster
//! never grows through them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use localgraph_core::{hop_distances, Adjacency, Radius, TargetSet, VariableId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterOptions {
    /// Leave the anchor itself out of the cluster.
    #[serde(default)]
    pub exclude_anchor: bool,
    /// Variables removed from the graph before clustering. The anchor is
    /// never removed this way.
    #[serde(default)]
    pub remove: BTreeSet<VariableId>,
}

pub fn anchor_cluster(
    adjacency: &Adjacency,
    anchor: VariableId,
    radius: Radius,
    options: &ClusterOptions,
) -> BTreeSet<VariableId> {
    let removed = |v: VariableId| v != anchor && options.remove.contains(&v);
    let pruned;
    let graph = if options.remove.is_empty() {
        adjacency
    } else {
        pruned = adjacency.filter_edges(|e| !removed(e.low) && !removed(e.high));
        &pruned
    };

    let mut cluster = hop_distances(graph, &TargetSet::single(anchor), Some(radius)).nodes();
    if options.exclude_anchor {
        cluster.remove(&anchor);
    }

    tracing::debug!(anchor, radius = radius.get(), size = cluster.len(), "Anchor cluster");
    cluster
}

#[cfg(test)]
mod tests {
    use super::*;

    // 0 is a target linked to two otherwise separate groups.
    fn graph() -> Adjacency {
        Adjacency::from_edges(7, [(0, 1), (1, 2), (2, 3), (0, 4), (4, 5), (5, 6)]).unwrap()
    }

    #[test]
    fn test_cluster_within_radius() {
        let cluster = anchor_cluster(&graph(), 1, Radius::hops(2), &ClusterOptions::default());
        assert_eq!(cluster, BTreeSet::from([0, 1, 2, 3, 4]));
    }

    #[test]
    fn test_exclude_anchor() {
        let options = ClusterOptions {
            exclude_anchor: true,
            ..ClusterOptions::default()
        };
        let cluster = anchor_cluster(&graph(), 1, Radius::hops(1), &options);
        assert_eq!(cluster, BTreeSet::from([0, 2]));
    }

    #[test]
    fn test_removed_targets_block_the_walk() {
        let options = ClusterOptions {
            exclude_anchor: false,
            remove: BTreeSet::from([0]),
        };
        let cluster = anchor_cluster(&graph(), 1, Radius::hops(3), &options);
        assert_eq!(cluster, BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn test_anchor_is_never_removed() {
        let options = ClusterOptions {
            exclude_anchor: false,
            remove: BTreeSet::from([4]),
        };
        let cluster = anchor_cluster(&graph(), 4, Radius::hops(1), &options);
        assert_eq!(cluster, BTreeSet::from([0, 4, 5]));
    }

    #[test]
    fn test_radius_zero_is_anchor_only() {
        let cluster = anchor_cluster(&graph(), 6, Radius::hops(0), &ClusterOptions::default());
        assert_eq!(cluster, BTreeSet::from([6]));
    }
}
