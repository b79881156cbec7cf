//! Run record helpers for discovery runs.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use localgraph_core::{OracleParams, Radius, VariableId};
use localgraph_record::session::RunSession;
use localgraph_record::store::{FileRecordStore, RecordStore, StoreError};
use localgraph_record::RunRecord;

use crate::engine::{Discovery, EngineSettings};

pub const TOOL_NAME: &str = "localgraph-discover";

/// Create a run session for a discovery run, fresh or resumed.
pub fn start_discovery_session(
    discovery: &Discovery,
    radius: Radius,
    params: &OracleParams,
    settings: &EngineSettings,
) -> RunSession {
    let targets: Vec<VariableId> = discovery.targets.iter().collect();
    let resumed = !discovery.ledger.is_empty();
    let mut session = RunSession::new(
        TOOL_NAME,
        &format!("Local graph around {targets:?} to radius {radius}"),
    );

    session.set_context(serde_json::json!({
        "targets": targets,
        "radius": radius.get(),
        "policy": discovery.policy,
        "params": params,
        "max_concurrent_queries": settings.max_concurrent_queries,
        "run_timeout_secs": settings.run_timeout.map(|t| t.as_secs()),
        "resumed": resumed,
        "layers_completed": discovery.layers_completed,
    }));

    session.add_decision(
        &format!("Use {} admission", discovery.policy),
        "Configured policy for this run",
    );
    if resumed {
        session.add_decision(
            &format!(
                "Re-query {} unresolved variables",
                discovery.ledger.unresolved().len()
            ),
            "Resuming from checkpoint; answered variables are kept",
        );
    }

    session
}

/// Record a completed layer.
pub fn record_layer(
    session: &mut RunSession,
    layer: usize,
    probed: usize,
    new_edges: usize,
    next_frontier_size: usize,
    elapsed_ms: u128,
) {
    session.add_action(
        "frontier_layer",
        &format!("Layer {layer}: probed {probed} variables, {new_edges} new edges"),
        serde_json::json!({
            "layer": layer,
            "probed": probed,
            "new_edges": new_edges,
            "next_frontier_size": next_frontier_size,
            "elapsed_ms": u64::try_from(elapsed_ms).unwrap_or(u64::MAX),
        }),
        true,
    );
}

/// Record a failed oracle query or a lost query task.
pub fn record_query_failure(
    session: &mut RunSession,
    layer: usize,
    variable: Option<VariableId>,
    error: &str,
) {
    let description = match variable {
        Some(v) => format!("Query for variable {v} failed: {error}"),
        None => format!("Layer {layer} failed: {error}"),
    };
    session.add_action(
        "oracle_query",
        &description,
        serde_json::json!({
            "layer": layer,
            "variable": variable,
            "error": error,
        }),
        false,
    );
}

/// Record a deadline interruption.
pub fn record_interruption(
    session: &mut RunSession,
    layer: usize,
    cancelled: &BTreeSet<VariableId>,
) {
    session.add_action(
        "deadline",
        &format!(
            "Run deadline reached in layer {layer}, {} queries cancelled",
            cancelled.len()
        ),
        serde_json::json!({
            "layer": layer,
            "cancelled": cancelled,
        }),
        false,
    );
}

/// Record the final state of a run that returned normally.
pub fn record_outcome(session: &mut RunSession, discovery: &Discovery) {
    session.add_action(
        "discovery_outcome",
        &format!(
            "{} edges over {} visited variables after {} layers",
            discovery.adjacency.edge_count(),
            discovery.ledger.len(),
            discovery.layers_completed
        ),
        serde_json::json!({
            "edges": discovery.adjacency.edge_count(),
            "visited": discovery.ledger.len(),
            "queries": discovery.query_count(),
            "layers_completed": discovery.layers_completed,
            "interrupted": discovery.interruption.is_some(),
            "elapsed_ms": u64::try_from(discovery.elapsed.as_millis()).unwrap_or(u64::MAX),
        }),
        discovery.interruption.is_none(),
    );
}

/// Finalize the session and store the record under `record_dir`.
pub fn finalize_and_store(
    session: RunSession,
    record_dir: &Path,
) -> Result<(RunRecord, PathBuf), StoreError> {
    let record = session.finalize();
    let path = FileRecordStore::new(record_dir)?.save(&record)?;
    tracing::info!(record_id = %record.id, path = %path.display(), "Run record stored");
    Ok((record, path))
}
