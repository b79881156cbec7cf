//! localgraph-discover: Radius-bounded local graph discovery.
//!
//! Builds a dependency graph only in the neighborhood of a target set by
//! asking a neighbor oracle about one variable at a time, expanding outward
//! one BFS layer per radius step. Each variable is queried at most once per
//! run; same-layer queries run concurrently and are merged by a single
//! writer. Failed or interrupted runs hand back a checkpoint that can be
//! resumed. Every run can leave a tamper-evident run record.

pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod oracle;
pub mod policy;
pub mod record;

pub use engine::{Discovery, EngineSettings, FrontierEngine, Interruption};
pub use error::DiscoverError;
pub use ledger::{QueryLedger, QueryStatus};
pub use oracle::{Oracle, OracleError};
pub use policy::AdmissionPolicy;

use std::sync::Arc;
use std::time::Duration;

use localgraph_core::{Adjacency, DataMatrix, OracleParams, Radius, TargetSet};

/// Discover the local graph around `targets` and return the adjacency with
/// the wall-clock time spent.
///
/// Convenience wrapper over [`FrontierEngine`] with default settings. Use the
/// engine directly for deadlines, concurrency limits, run records, or to
/// resume from a failed run.
pub async fn discover<O: Oracle + 'static>(
    data: Arc<DataMatrix>,
    targets: &TargetSet,
    radius: Radius,
    policy: AdmissionPolicy,
    oracle: O,
    params: OracleParams,
) -> error::Result<(Adjacency, Duration)> {
    let engine = FrontierEngine::new(oracle, params);
    let discovery = engine.discover(data, targets, radius, policy).await?;
    Ok((discovery.adjacency, discovery.elapsed))
}
