//! Properties of radius extraction over known graphs.

use std::collections::{BTreeMap, BTreeSet};

use localgraph_core::{hop_distances, Adjacency, Radius, TargetSet};
use localgraph_extract::handlers::handle_restrict;
use localgraph_extract::types::RestrictRequest;
use localgraph_extract::{anchor_cluster, edge_recovery, radius_layers, restrict, ClusterOptions};

fn path_with_branch() -> Adjacency {
    Adjacency::from_edges(5, [(0, 1), (1, 2), (2, 3), (0, 4)]).unwrap()
}

/// Two hubs joined through a chain, plus a detached pair.
fn mixed() -> Adjacency {
    Adjacency::from_edges(
        10,
        [
            (0, 1),
            (0, 2),
            (0, 3),
            (1, 2),
            (3, 4),
            (4, 5),
            (5, 6),
            (5, 7),
            (6, 7),
            (8, 9),
        ],
    )
    .unwrap()
}

#[test]
fn test_radius_one_scenario() {
    let request: RestrictRequest = serde_json::from_value(serde_json::json!({
        "graph": {
            "node_count": 5,
            "edges": [
                {"source": 0, "target": 1},
                {"source": 1, "target": 2},
                {"source": 2, "target": 3},
                {"source": 0, "target": 4}
            ]
        },
        "seeds": [0],
        "radius": 1
    }))
    .unwrap();

    let response = handle_restrict(request).unwrap();
    assert_eq!(
        response.adjacency,
        Adjacency::from_edges(5, [(0, 1), (0, 4)]).unwrap()
    );
    assert_eq!(response.distances, BTreeMap::from([(0, 0), (1, 1), (4, 1)]));
    assert_eq!(response.edge_count, 2);
}

#[test]
fn test_restrict_is_idempotent() {
    let graph = mixed();
    for seeds in [vec![0], vec![5], vec![0, 8], vec![2, 6]] {
        let seeds = TargetSet::new(seeds).unwrap();
        for r in 0..5 {
            let radius = Radius::hops(r);
            let once = restrict(&graph, &seeds, radius, false);
            let twice = restrict(&once, &seeds, radius, false);
            assert_eq!(once, twice, "seeds {:?} radius {r}", seeds.as_set());
        }
    }
}

#[test]
fn test_restrict_grows_with_radius() {
    let graph = mixed();
    let seeds = TargetSet::single(3);
    for r in 0..6 {
        let smaller = restrict(&graph, &seeds, Radius::hops(r), false);
        let larger = restrict(&graph, &seeds, Radius::hops(r + 1), false);
        assert!(smaller.is_subset_of(&larger), "radius {r}");
    }
}

#[test]
fn test_restricted_edges_stay_within_radius() {
    let graph = mixed();
    let seeds = TargetSet::new([1, 6]).unwrap();
    let radius = Radius::hops(1);
    let distances = hop_distances(&graph, &seeds, None);

    let local = restrict(&graph, &seeds, radius, false);
    for (edge, _) in local.edges() {
        assert!(distances.within(edge.low, radius));
        assert!(distances.within(edge.high, radius));
    }
    // Every edge of the full graph between in-radius variables survives.
    for (edge, _) in graph.edges() {
        if distances.within(edge.low, radius) && distances.within(edge.high, radius) {
            assert!(local.contains_edge(&edge));
        }
    }
}

#[test]
fn test_radius_zero_keeps_only_seed_edges() {
    let graph = mixed();

    let local = restrict(&graph, &TargetSet::new([0, 1, 5]).unwrap(), Radius::hops(0), false);
    assert_eq!(local, Adjacency::from_edges(10, [(0, 1)]).unwrap());

    let lonely = restrict(&graph, &TargetSet::single(4), Radius::hops(0), false);
    assert!(lonely.is_empty());
}

#[test]
fn test_isolated_and_out_of_range_seeds() {
    let mut graph = path_with_branch();
    graph = graph.filter_edges(|e| !e.touches(3));

    let isolated = restrict(&graph, &TargetSet::single(3), Radius::hops(2), false);
    assert!(isolated.is_empty());
    assert_eq!(isolated.node_count(), 5);

    let outside = restrict(&graph, &TargetSet::single(42), Radius::hops(3), false);
    assert!(outside.is_empty());
}

#[test]
fn test_single_anchor_cluster_matches_restriction() {
    let graph = mixed();
    for anchor in 0..graph.node_count() {
        for r in 0..4 {
            let radius = Radius::hops(r);
            let cluster = anchor_cluster(&graph, anchor, radius, &ClusterOptions::default());
            let mut expected = restrict(&graph, &TargetSet::single(anchor), radius, false).nodes();
            expected.insert(anchor);
            assert_eq!(cluster, expected, "anchor {anchor} radius {r}");
        }
    }
}

#[test]
fn test_cluster_removal_blocks_the_walk() {
    let graph = mixed();
    let options = ClusterOptions {
        exclude_anchor: false,
        remove: BTreeSet::from([4]),
    };
    let cluster = anchor_cluster(&graph, 0, Radius::hops(4), &options);
    assert_eq!(cluster, BTreeSet::from([0, 1, 2, 3]));
}

#[test]
fn test_layers_partition_the_neighborhood() {
    let graph = mixed();
    let seeds = TargetSet::new([0, 8]).unwrap();
    let layers = radius_layers(&graph, &seeds, Radius::hops(3));

    assert_eq!(layers[&0], BTreeSet::from([0, 8]));
    assert_eq!(layers[&1], BTreeSet::from([1, 2, 3, 9]));
    assert_eq!(layers[&2], BTreeSet::from([4]));
    assert_eq!(layers[&3], BTreeSet::from([5]));

    let all: BTreeSet<_> = layers.values().flatten().copied().collect();
    let within = hop_distances(&graph, &seeds, Some(Radius::hops(3))).nodes();
    assert_eq!(all, within);
}

#[test]
fn test_local_recovery_ignores_errors_beyond_radius() {
    let truth = mixed();
    // Exact near the target, wrong far away.
    let mut estimated = restrict(&truth, &TargetSet::single(0), Radius::hops(1), false);
    estimated.insert(7, 9).unwrap();

    let targets = TargetSet::single(0);
    let global = edge_recovery(&estimated, &truth, &targets, None).unwrap();
    assert_eq!(global.false_positives, 1);
    assert!(global.tpr() < 1.0);

    let local = edge_recovery(&estimated, &truth, &targets, Some(Radius::hops(1))).unwrap();
    assert_eq!(local.true_positives, 4);
    assert_eq!(local.false_positives, 0);
    assert_eq!(local.tpr(), 1.0);
    assert_eq!(local.fdp(), 0.0);
}
