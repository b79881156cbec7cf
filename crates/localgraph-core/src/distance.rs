//! Multi-source BFS hop distances.
//!
//! Shared by the radius extractor and by anything that needs to know how far
//! a variable sits from a target set. Edge weights never affect distance.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::adjacency::Adjacency;
use crate::types::{Radius, TargetSet, VariableId};

/// Hop distance from a seed set. Variables absent from the map are
/// unreachable within the bound (distance ∞).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DistanceMap {
    distances: BTreeMap<VariableId, usize>,
}

impl DistanceMap {
    /// Distance of `v`, or `None` when unreachable.
    pub fn get(&self, v: VariableId) -> Option<usize> {
        self.distances.get(&v).copied()
    }

    /// Whether `v` lies within `radius` hops.
    pub fn within(&self, v: VariableId, radius: Radius) -> bool {
        self.get(v).is_some_and(|d| d <= radius.get())
    }

    /// All reached variables with their distances, ascending by variable.
    pub fn iter(&self) -> impl Iterator<Item = (VariableId, usize)> + '_ {
        self.distances.iter().map(|(v, d)| (*v, *d))
    }

    pub fn nodes(&self) -> BTreeSet<VariableId> {
        self.distances.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Variables grouped by exact hop distance.
    pub fn layers(&self) -> BTreeMap<usize, BTreeSet<VariableId>> {
        let mut layers: BTreeMap<usize, BTreeSet<VariableId>> = BTreeMap::new();
        for (v, d) in &self.distances {
            layers.entry(*d).or_default().insert(*v);
        }
        layers
    }
}

/// BFS from every seed at once, stopping at `max_hops` when given.
///
/// Seeds always get distance 0, even when they have no edges or lie outside
/// the adjacency's variable range.
pub fn hop_distances(
    adjacency: &Adjacency,
    seeds: &TargetSet,
    max_hops: Option<Radius>,
) -> DistanceMap {
    let mut distances = BTreeMap::new();
    let mut queue: VecDeque<(VariableId, usize)> = VecDeque::new();

    for seed in seeds.iter() {
        distances.insert(seed, 0);
        queue.push_back((seed, 0));
    }

    while let Some((node, hops)) = queue.pop_front() {
        if max_hops.is_some_and(|r| hops >= r.get()) {
            continue;
        }
        for next in adjacency.neighbors(node) {
            if distances.contains_key(&next) {
                continue;
            }
            distances.insert(next, hops + 1);
            queue.push_back((next, hops + 1));
        }
    }

    DistanceMap { distances }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_with_branch() -> Adjacency {
        Adjacency::from_edges(5, [(0, 1), (1, 2), (2, 3), (0, 4)]).unwrap()
    }

    #[test]
    fn test_distances_bounded() {
        let adj = path_with_branch();
        let dist = hop_distances(&adj, &TargetSet::single(0), Some(Radius::hops(1)));
        assert_eq!(dist.get(0), Some(0));
        assert_eq!(dist.get(1), Some(1));
        assert_eq!(dist.get(4), Some(1));
        assert_eq!(dist.get(2), None);
        assert_eq!(dist.get(3), None);
    }

    #[test]
    fn test_distances_unbounded() {
        let adj = path_with_branch();
        let dist = hop_distances(&adj, &TargetSet::single(0), None);
        assert_eq!(dist.get(3), Some(3));
        assert_eq!(dist.len(), 5);
    }

    #[test]
    fn test_multi_source_takes_nearest_seed() {
        let adj = path_with_branch();
        let seeds = TargetSet::new([0, 3]).unwrap();
        let dist = hop_distances(&adj, &seeds, None);
        assert_eq!(dist.get(2), Some(1));
        assert_eq!(dist.get(1), Some(1));
        assert_eq!(dist.get(4), Some(1));
    }

    #[test]
    fn test_isolated_seed_has_zero_distance() {
        let adj = path_with_branch();
        let dist = hop_distances(&adj, &TargetSet::single(42), Some(Radius::hops(2)));
        assert_eq!(dist.get(42), Some(0));
        assert_eq!(dist.len(), 1);
    }

    #[test]
    fn test_layers_group_by_hops() {
        let adj = path_with_branch();
        let layers = hop_distances(&adj, &TargetSet::single(0), Some(Radius::hops(2))).layers();
        assert_eq!(layers[&0], BTreeSet::from([0]));
        assert_eq!(layers[&1], BTreeSet::from([1, 4]));
        assert_eq!(layers[&2], BTreeSet::from([2]));
        assert!(!layers.contains_key(&3));
    }
}
