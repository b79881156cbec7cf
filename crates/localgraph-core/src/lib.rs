//! localgraph-core: Shared types, distances and error handling for localgraph.
//!
//! This crate provides the foundations used by both the discovery engine and
//! the radius extractor:
//! - Variables, unordered edges and the symmetric adjacency relation
//! - Target sets and radius bounds
//! - Multi-source BFS hop distances
//! - The observation matrix handed to neighbor oracles
//! - Oracle parameters passed as an explicit immutable value

pub mod adjacency;
pub mod config;
pub mod data;
pub mod distance;
pub mod error;
pub mod types;

pub use adjacency::Adjacency;
pub use config::OracleParams;
pub use data::DataMatrix;
pub use distance::{hop_distances, DistanceMap};
pub use error::{GraphError, Result};
pub use types::{Edge, Radius, TargetSet, VariableId};
