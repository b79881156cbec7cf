//! Restriction of a known graph to the neighborhood of a seed set.

use localgraph_core::{hop_distances, Adjacency, Radius, TargetSet};

/// Keep exactly the edges whose endpoints both lie within `radius` hops of
/// some seed. Distances are unweighted BFS hops over `adjacency`; weights are
/// carried through on kept edges.
///
/// Seeds without edges, or outside the variable range, are isolated rather
/// than an error. With `exclude_seeds`, every edge touching a seed is
/// dropped as well.
pub fn restrict(
    adjacency: &Adjacency,
    seeds: &TargetSet,
    radius: Radius,
    exclude_seeds: bool,
) -> Adjacency {
    let distances = hop_distances(adjacency, seeds, Some(radius));
    let keep = |v| match distances.get(v) {
        Some(0) => !exclude_seeds,
        Some(d) => d <= radius.get(),
        None => false,
    };
    let local = adjacency.filter_edges(|e| keep(e.low) && keep(e.high));

    tracing::debug!(
        seeds = seeds.len(),
        radius = radius.get(),
        reached = distances.len(),
        edges_in = adjacency.edge_count(),
        edges_out = local.edge_count(),
        "Restricted graph to radius"
    );

    local
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> Adjacency {
        Adjacency::from_edges(5, [(0, 1), (1, 2), (2, 3), (0, 4)]).unwrap()
    }

    #[test]
    fn test_radius_one_around_zero() {
        let local = restrict(&graph(), &TargetSet::single(0), Radius::hops(1), false);
        assert_eq!(local, Adjacency::from_edges(5, [(0, 1), (0, 4)]).unwrap());
    }

    #[test]
    fn test_boundary_edge_between_radius_nodes_is_kept() {
        // 1 and 2 both sit at distance 1 from 0.
        let triangle = Adjacency::from_edges(4, [(0, 1), (0, 2), (1, 2), (2, 3)]).unwrap();
        let local = restrict(&triangle, &TargetSet::single(0), Radius::hops(1), false);
        assert!(local.contains(1, 2));
        assert!(!local.contains(2, 3));
    }

    #[test]
    fn test_exclude_seeds() {
        let local = restrict(&graph(), &TargetSet::single(1), Radius::hops(2), true);
        // Distances from 1: {1:0, 0:1, 2:1, 3:2, 4:2}; edges touching 1 go.
        assert_eq!(local, Adjacency::from_edges(5, [(2, 3), (0, 4)]).unwrap());
    }

    #[test]
    fn test_weights_carried_through() {
        let mut weighted = Adjacency::new(3);
        weighted.insert_weighted(0, 1, 0.9).unwrap();
        weighted.insert_weighted(1, 2, 0.4).unwrap();
        let local = restrict(&weighted, &TargetSet::single(0), Radius::hops(1), false);
        assert_eq!(local.weight(0, 1), Some(0.9));
        assert!(!local.contains(1, 2));
    }

    #[test]
    fn test_large_radius_keeps_component() {
        let g = Adjacency::from_edges(7, [(0, 1), (1, 2), (2, 3), (0, 4), (5, 6)]).unwrap();
        let local = restrict(&g, &TargetSet::single(3), Radius::hops(100), false);
        assert_eq!(local.edge_count(), 4);
        assert!(!local.contains(5, 6));
    }
}
