//! localgraph-extract: Radius-bounded views of an already-known graph.
//!
//! Given a fully materialized adjacency relation (binary or weighted), this
//! crate re-derives bounded neighborhoods from it:
//! - `restrict`: the local graph within a radius of a seed set
//! - `anchor_cluster`: the variables within a radius of one anchor
//! - `radius_layers`: variables grouped by hop distance from the seeds
//! - `edge_recovery`: true/false positive counts against a reference graph,
//!   globally or inside a radius
//!
//! Everything here is a pure function of its inputs.

pub mod cluster;
pub mod error;
pub mod evaluate;
pub mod handlers;
pub mod layers;
pub mod restrict;
pub mod types;

pub use cluster::{anchor_cluster, ClusterOptions};
pub use error::ExtractError;
pub use evaluate::{edge_recovery, EdgeRecovery};
pub use layers::radius_layers;
pub use restrict::restrict;
