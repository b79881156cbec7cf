//! Request handlers shared by the CLI and library callers.
//!
//! Each handler validates its request (non-empty seeds, non-negative radius)
//! before running the pure graph operation, so invalid input is reported
//! instead of showing up as an empty result.

use localgraph_core::{hop_distances, Radius, TargetSet};

use crate::cluster::anchor_cluster;
use crate::error::Result;
use crate::evaluate::edge_recovery;
use crate::layers::radius_layers;
use crate::restrict::restrict;
use crate::types::{
    ClusterRequest, ClusterResponse, EvaluateRequest, EvaluateResponse, LayersRequest,
    LayersResponse, LocalRecovery, RestrictRequest, RestrictResponse,
};

pub fn handle_restrict(request: RestrictRequest) -> Result<RestrictResponse> {
    let seeds = TargetSet::new(request.seeds)?;
    let radius = Radius::new(request.radius)?;
    let graph = request.graph.into_adjacency()?;

    let adjacency = restrict(&graph, &seeds, radius, request.exclude_seeds);
    let distances = hop_distances(&graph, &seeds, Some(radius))
        .iter()
        .filter(|&(_, d)| !(request.exclude_seeds && d == 0))
        .collect();

    Ok(RestrictResponse {
        edge_count: adjacency.edge_count(),
        adjacency,
        distances,
    })
}

pub fn handle_cluster(request: ClusterRequest) -> Result<ClusterResponse> {
    let radius = Radius::new(request.radius)?;
    let graph = request.graph.into_adjacency()?;

    let nodes = anchor_cluster(&graph, request.anchor, radius, &request.options);
    Ok(ClusterResponse {
        anchor: request.anchor,
        radius: radius.get(),
        size: nodes.len(),
        nodes,
    })
}

pub fn handle_layers(request: LayersRequest) -> Result<LayersResponse> {
    let seeds = TargetSet::new(request.seeds)?;
    let radius = Radius::new(request.radius)?;
    let graph = request.graph.into_adjacency()?;

    Ok(LayersResponse {
        layers: radius_layers(&graph, &seeds, radius),
    })
}

pub fn handle_evaluate(request: EvaluateRequest) -> Result<EvaluateResponse> {
    let targets = TargetSet::new(request.targets)?;
    let radii = request
        .radii
        .into_iter()
        .map(Radius::new)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let estimated = request.estimated.into_adjacency()?;
    let truth = request.truth.into_adjacency()?;

    let global = edge_recovery(&estimated, &truth, &targets, None)?.into();
    let local = radii
        .into_iter()
        .map(|radius| {
            edge_recovery(&estimated, &truth, &targets, Some(radius)).map(|counts| LocalRecovery {
                radius: radius.get(),
                report: counts.into(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(EvaluateResponse { global, local })
}
