//! Variables grouped by hop distance from a seed set.

use std::collections::{BTreeMap, BTreeSet};

use localgraph_core::{hop_distances, Adjacency, Radius, TargetSet, VariableId};

/// Layer `d` holds the variables at shortest distance exactly `d` from the
/// nearest seed, for `d` up to `radius`. Layer 0 is the seed set.
pub fn radius_layers(
    adjacency: &Adjacency,
    seeds: &TargetSet,
    radius: Radius,
) -> BTreeMap<usize, BTreeSet<VariableId>> {
    hop_distances(adjacency, seeds, Some(radius)).layers()
}
