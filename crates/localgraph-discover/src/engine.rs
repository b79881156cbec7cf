//! Frontier discovery engine.
//!
//! Expands outward from the target set one BFS layer per radius step. At the
//! start of a layer the whole unvisited frontier is claimed in the
//! [`QueryLedger`], and its queries run as tokio tasks bounded by a
//! semaphore. Once the layer's answers are collected a single writer commits
//! them in ascending variable order, marking each variable visited as it is
//! committed; admission of a neighbor is decided against that running
//! visited set. The result therefore does not depend on the order in which
//! same-layer queries finish.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};

use localgraph_core::{
    Adjacency, DataMatrix, GraphError, OracleParams, Radius, TargetSet, VariableId,
};
use localgraph_record::session::RunSession;

use crate::error::{DiscoverError, Result};
use crate::ledger::{LedgerError, QueryLedger};
use crate::oracle::{validate_neighbors, Oracle, OracleError};
use crate::policy::{AdmissionPolicy, EdgeAdmission, ForwardAdmission, UnionAdmission};
use crate::record;

/// Run-level limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Oracle queries allowed in flight at once within a layer.
    pub max_concurrent_queries: usize,
    /// Wall-clock bound for one `discover` or `resume` call.
    pub run_timeout: Option<Duration>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_concurrent_queries: 4,
            run_timeout: None,
        }
    }
}

/// Why a run stopped before exhausting its radius.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interruption {
    /// Layer that was in progress when the deadline passed.
    pub layer: usize,
    /// Variables whose queries were cancelled (or never started).
    pub cancelled: BTreeSet<VariableId>,
}

/// State of a discovery run. Returned on success and carried by failures as
/// a checkpoint that [`FrontierEngine::resume`] continues from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discovery {
    pub policy: AdmissionPolicy,
    pub targets: TargetSet,
    /// Radius the run is driven to; `resume` continues to it by default.
    pub radius: Radius,
    pub adjacency: Adjacency,
    pub ledger: QueryLedger,
    /// Frontier of the layer after `layers_completed`.
    pub frontier: BTreeSet<VariableId>,
    /// Variables reached so far from the current frontier.
    pub next_frontier: BTreeSet<VariableId>,
    pub layers_completed: usize,
    /// Wall-clock time summed over every call that drove this run.
    pub elapsed: Duration,
    pub interruption: Option<Interruption>,
    /// Run record stored by the last `discover` or `resume` call. `None`
    /// when no record directory is configured or the record could not be
    /// written.
    #[serde(default)]
    pub run_record: Option<PathBuf>,
}

impl Discovery {
    pub fn start(
        policy: AdmissionPolicy,
        targets: TargetSet,
        radius: Radius,
        node_count: usize,
    ) -> Self {
        let frontier = targets.as_set().clone();
        Self {
            policy,
            targets,
            radius,
            adjacency: Adjacency::new(node_count),
            ledger: QueryLedger::new(),
            frontier,
            next_frontier: BTreeSet::new(),
            layers_completed: 0,
            elapsed: Duration::ZERO,
            interruption: None,
            run_record: None,
        }
    }

    /// No interruption and no failed or cancelled query.
    pub fn is_complete(&self) -> bool {
        self.interruption.is_none() && self.ledger.unresolved().is_empty()
    }

    /// Variables the oracle has been asked about.
    pub fn visited(&self) -> BTreeSet<VariableId> {
        self.ledger.visited()
    }

    /// Oracle calls issued, retries included.
    pub fn query_count(&self) -> u64 {
        self.ledger.total_attempts()
    }

    pub fn save_checkpoint(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        tracing::debug!(path = %path.as_ref().display(), "Checkpoint written");
        Ok(())
    }

    pub fn load_checkpoint(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Internal reason a layer loop stopped with an error.
enum RunHalt {
    Oracle {
        variable: VariableId,
        layer: usize,
        source: OracleError,
    },
    Panicked {
        layer: usize,
        reason: String,
    },
    Internal(DiscoverError),
}

impl From<LedgerError> for RunHalt {
    fn from(e: LedgerError) -> Self {
        Self::Internal(e.into())
    }
}

impl From<GraphError> for RunHalt {
    fn from(e: GraphError) -> Self {
        Self::Internal(e.into())
    }
}

/// How the collection phase of a layer ended.
enum LayerStop {
    Drained,
    Failed {
        variable: VariableId,
        source: OracleError,
    },
    Panicked(String),
    Deadline,
}

type QueryOutcome = (
    VariableId,
    Duration,
    std::result::Result<BTreeSet<VariableId>, OracleError>,
);

/// Drives discovery runs against one oracle.
pub struct FrontierEngine<O> {
    oracle: Arc<O>,
    params: Arc<OracleParams>,
    settings: EngineSettings,
    record_dir: Option<PathBuf>,
}

impl<O: Oracle + 'static> FrontierEngine<O> {
    pub fn new(oracle: O, params: OracleParams) -> Self {
        Self {
            oracle: Arc::new(oracle),
            params: Arc::new(params),
            settings: EngineSettings::default(),
            record_dir: None,
        }
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Store a run record for every run under `dir`.
    pub fn with_record_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.record_dir = Some(dir.into());
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Discover the local graph within `radius` layers of `targets`.
    pub async fn discover(
        &self,
        data: Arc<DataMatrix>,
        targets: &TargetSet,
        radius: Radius,
        policy: AdmissionPolicy,
    ) -> Result<Discovery> {
        targets.check_range(data.n_variables())?;
        let discovery = Discovery::start(policy, targets.clone(), radius, data.n_variables());
        self.drive(data, discovery).await
    }

    /// Continue a failed or interrupted run.
    ///
    /// Only variables whose last query failed or was cancelled are queried
    /// again. `radius` defaults to the checkpoint's own and may exceed it to
    /// explore further. An unfinished checkpoint cannot be resumed to a
    /// radius that stops before its unfinished layer.
    pub async fn resume(
        &self,
        data: Arc<DataMatrix>,
        mut checkpoint: Discovery,
        radius: Option<Radius>,
    ) -> Result<Discovery> {
        if checkpoint.adjacency.node_count() != data.n_variables() {
            return Err(GraphError::DimensionMismatch(format!(
                "checkpoint covers {} variables but data has {}",
                checkpoint.adjacency.node_count(),
                data.n_variables()
            ))
            .into());
        }
        let radius = radius.unwrap_or(checkpoint.radius);
        if !checkpoint.is_complete() && radius.get() <= checkpoint.layers_completed {
            return Err(DiscoverError::ResumeRadiusTooSmall {
                radius: radius.get(),
                unfinished_layer: checkpoint.layers_completed + 1,
            });
        }
        checkpoint.radius = radius;

        // A checkpoint written mid-layer by an external tool may still list
        // queries as pending.
        for variable in checkpoint.ledger.pending() {
            checkpoint.ledger.cancel(variable)?;
        }
        checkpoint.interruption = None;

        tracing::info!(
            layers_completed = checkpoint.layers_completed,
            answered = checkpoint.ledger.answered_count(),
            unresolved = checkpoint.ledger.unresolved().len(),
            "Resuming discovery"
        );

        self.drive(data, checkpoint).await
    }

    async fn drive(&self, data: Arc<DataMatrix>, mut discovery: Discovery) -> Result<Discovery> {
        let radius = discovery.radius;
        let started = Instant::now();
        let deadline = self.settings.run_timeout.map(|t| started + t);
        let mut session =
            record::start_discovery_session(&discovery, radius, &self.params, &self.settings);

        let outcome = match discovery.policy {
            AdmissionPolicy::Union => {
                self.run_layers::<UnionAdmission>(
                    &data,
                    &mut discovery,
                    radius,
                    deadline,
                    &mut session,
                )
                .await
            }
            AdmissionPolicy::Forward => {
                self.run_layers::<ForwardAdmission>(
                    &data,
                    &mut discovery,
                    radius,
                    deadline,
                    &mut session,
                )
                .await
            }
        };
        discovery.elapsed += started.elapsed();

        match &outcome {
            Ok(()) => record::record_outcome(&mut session, &discovery),
            Err(RunHalt::Oracle {
                variable,
                layer,
                source,
            }) => {
                let reason = source.to_string();
                record::record_query_failure(&mut session, *layer, Some(*variable), &reason);
            }
            Err(RunHalt::Panicked { layer, reason }) => {
                record::record_query_failure(&mut session, *layer, None, reason);
            }
            Err(RunHalt::Internal(e)) => {
                let layer = discovery.layers_completed + 1;
                record::record_query_failure(&mut session, layer, None, &e.to_string());
            }
        }
        discovery.run_record = None;
        if let Some(dir) = &self.record_dir {
            match record::finalize_and_store(session, dir) {
                Ok((_, path)) => discovery.run_record = Some(path),
                Err(e) => tracing::warn!(
                    dir = %dir.display(),
                    error = %e,
                    "Run record could not be stored"
                ),
            }
        }

        match outcome {
            Ok(()) => Ok(discovery),
            Err(RunHalt::Oracle {
                variable,
                layer,
                source,
            }) => Err(DiscoverError::OracleQueryFailed {
                variable,
                layer,
                source,
                partial: Box::new(discovery),
            }),
            Err(RunHalt::Panicked { layer, reason }) => Err(DiscoverError::QueryTaskPanicked {
                layer,
                reason,
                partial: Box::new(discovery),
            }),
            Err(RunHalt::Internal(e)) => Err(e),
        }
    }

    async fn run_layers<P: EdgeAdmission>(
        &self,
        data: &Arc<DataMatrix>,
        d: &mut Discovery,
        radius: Radius,
        deadline: Option<Instant>,
        session: &mut RunSession,
    ) -> std::result::Result<(), RunHalt> {
        while d.layers_completed < radius.get() {
            let layer = d.layers_completed + 1;
            let layer_start = Instant::now();
            let to_probe: BTreeSet<VariableId> = d
                .frontier
                .iter()
                .copied()
                .filter(|&v| !d.ledger.is_answered(v))
                .collect();

            if to_probe.is_empty() && d.next_frontier.is_empty() {
                tracing::info!(layer, "Frontier exhausted, stopping early");
                break;
            }

            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                tracing::warn!(
                    layer,
                    pending = to_probe.len(),
                    "Run deadline reached before layer start"
                );
                record::record_interruption(session, layer, &to_probe);
                d.interruption = Some(Interruption {
                    layer,
                    cancelled: to_probe,
                });
                return Ok(());
            }

            // Answered before this layer; grows as the layer is committed.
            let mut visited: BTreeSet<VariableId> =
                d.ledger.visited().difference(&to_probe).copied().collect();
            for &variable in &to_probe {
                d.ledger.claim(variable, layer)?;
            }

            tracing::info!(
                layer,
                policy = %P::POLICY,
                frontier_size = to_probe.len(),
                visited = visited.len(),
                "Probing layer"
            );

            let (answers, stop) = self.collect_layer(data, &to_probe, deadline).await;

            let mut new_edges = 0usize;
            for (&variable, (neighbors, elapsed)) in &answers {
                visited.insert(variable);
                for &j in neighbors {
                    let admission = P::admit(visited.contains(&j));
                    if admission.record_edge && d.adjacency.insert(variable, j)? {
                        new_edges += 1;
                    }
                    if admission.extend_frontier {
                        d.next_frontier.insert(j);
                    }
                }
                d.ledger.answer(variable, neighbors.clone(), *elapsed)?;
            }

            match stop {
                LayerStop::Drained => {}
                LayerStop::Failed { variable, source } => {
                    d.ledger.fail(variable, &source.to_string())?;
                    cancel_pending(d)?;
                    tracing::error!(layer, variable, error = %source, "Oracle query failed");
                    return Err(RunHalt::Oracle {
                        variable,
                        layer,
                        source,
                    });
                }
                LayerStop::Panicked(reason) => {
                    cancel_pending(d)?;
                    tracing::error!(layer, reason = %reason, "Oracle query task panicked");
                    return Err(RunHalt::Panicked { layer, reason });
                }
                LayerStop::Deadline => {
                    let cancelled = cancel_pending(d)?;
                    tracing::warn!(
                        layer,
                        cancelled = cancelled.len(),
                        committed = answers.len(),
                        "Run deadline reached, remaining queries cancelled"
                    );
                    record::record_interruption(session, layer, &cancelled);
                    d.interruption = Some(Interruption { layer, cancelled });
                    return Ok(());
                }
            }

            d.layers_completed = layer;
            d.frontier = std::mem::take(&mut d.next_frontier);

            let elapsed_ms = layer_start.elapsed().as_millis();
            tracing::info!(
                layer,
                probed = to_probe.len(),
                new_edges,
                next_frontier_size = d.frontier.len(),
                elapsed_ms,
                "Layer complete"
            );
            record::record_layer(
                session,
                layer,
                to_probe.len(),
                new_edges,
                d.frontier.len(),
                elapsed_ms,
            );
        }

        Ok(())
    }

    /// Run the queries of one layer and gather validated answers until all
    /// are in, one fails, or the deadline passes.
    async fn collect_layer(
        &self,
        data: &Arc<DataMatrix>,
        to_probe: &BTreeSet<VariableId>,
        deadline: Option<Instant>,
    ) -> (BTreeMap<VariableId, (BTreeSet<VariableId>, Duration)>, LayerStop) {
        let node_count = data.n_variables();
        let permits = Arc::new(Semaphore::new(self.settings.max_concurrent_queries.max(1)));
        let mut tasks: JoinSet<QueryOutcome> = JoinSet::new();

        for &variable in to_probe {
            let oracle = Arc::clone(&self.oracle);
            let params = Arc::clone(&self.params);
            let data = Arc::clone(data);
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                // The semaphore is never closed; a missing permit only means
                // the query runs unthrottled.
                let _permit = permits.acquire_owned().await.ok();
                let start = Instant::now();
                let result = oracle.query(&data, variable, &params).await;
                (variable, start.elapsed(), result)
            });
        }

        let mut answers = BTreeMap::new();
        let stop = loop {
            let joined = match deadline {
                Some(deadline) => match timeout_at(deadline, tasks.join_next()).await {
                    Ok(joined) => joined,
                    Err(_) => break LayerStop::Deadline,
                },
                None => tasks.join_next().await,
            };

            let Some(joined) = joined else {
                break LayerStop::Drained;
            };

            match joined {
                Ok((variable, elapsed, Ok(neighbors))) => {
                    match validate_neighbors(variable, neighbors, node_count) {
                        Ok(neighbors) => {
                            tracing::debug!(
                                variable,
                                neighbors = neighbors.len(),
                                elapsed_ms = elapsed.as_millis(),
                                "Oracle answered"
                            );
                            answers.insert(variable, (neighbors, elapsed));
                        }
                        Err(source) => break LayerStop::Failed { variable, source },
                    }
                }
                Ok((variable, _, Err(source))) => break LayerStop::Failed { variable, source },
                Err(e) => break LayerStop::Panicked(e.to_string()),
            }
        };

        // Aborts outstanding queries; command oracles kill their children
        // when the query future is dropped.
        tasks.shutdown().await;

        (answers, stop)
    }
}

/// Mark every still-pending query cancelled and return those variables.
fn cancel_pending(d: &mut Discovery) -> std::result::Result<BTreeSet<VariableId>, LedgerError> {
    let pending = d.ledger.pending();
    for &variable in &pending {
        d.ledger.cancel(variable)?;
    }
    Ok(pending)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::AdjacencyOracle;
    use localgraph_record::store::{FileRecordStore, RecordQuery, RecordStore};
    use ndarray::Array2;

    fn data(p: usize) -> Arc<DataMatrix> {
        Arc::new(DataMatrix::new(Array2::zeros((2, p))))
    }

    #[tokio::test]
    async fn test_discover_path_graph() {
        let truth = Adjacency::from_edges(5, [(0, 1), (1, 2), (2, 3), (3, 4)]).unwrap();
        let engine = FrontierEngine::new(AdjacencyOracle::new(truth), OracleParams::default());

        let discovery = engine
            .discover(
                data(5),
                &TargetSet::single(0),
                Radius::hops(2),
                AdmissionPolicy::Union,
            )
            .await
            .unwrap();

        let expected = Adjacency::from_edges(5, [(0, 1), (1, 2)]).unwrap();
        assert_eq!(discovery.adjacency, expected);
        assert_eq!(discovery.visited(), BTreeSet::from([0, 1]));
        assert_eq!(discovery.frontier, BTreeSet::from([2]));
        assert_eq!(discovery.layers_completed, 2);
        assert!(discovery.is_complete());
    }

    #[tokio::test]
    async fn test_stops_early_when_frontier_exhausted() {
        let truth = Adjacency::from_edges(4, [(0, 1)]).unwrap();
        let engine = FrontierEngine::new(AdjacencyOracle::new(truth), OracleParams::default());

        let discovery = engine
            .discover(
                data(4),
                &TargetSet::single(0),
                Radius::hops(10),
                AdmissionPolicy::Union,
            )
            .await
            .unwrap();

        assert_eq!(discovery.layers_completed, 2);
        assert!(discovery.frontier.is_empty());
        assert_eq!(discovery.query_count(), 2);
    }

    #[tokio::test]
    async fn test_checkpoint_roundtrip() {
        let truth = Adjacency::from_edges(3, [(0, 1), (1, 2)]).unwrap();
        let engine = FrontierEngine::new(AdjacencyOracle::new(truth), OracleParams::default());
        let discovery = engine
            .discover(
                data(3),
                &TargetSet::single(1),
                Radius::hops(1),
                AdmissionPolicy::Forward,
            )
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");
        discovery.save_checkpoint(&path).unwrap();
        let loaded = Discovery::load_checkpoint(&path).unwrap();
        assert_eq!(loaded, discovery);
    }

    #[tokio::test]
    async fn test_resume_rejects_other_dimensions() {
        let engine = FrontierEngine::new(
            AdjacencyOracle::new(Adjacency::new(3)),
            OracleParams::default(),
        );
        let checkpoint =
            Discovery::start(AdmissionPolicy::Union, TargetSet::single(0), Radius::hops(1), 3);
        let result = engine.resume(data(4), checkpoint, None).await;
        assert!(matches!(result, Err(DiscoverError::Graph(_))));
    }

    #[tokio::test]
    async fn test_run_record_written() {
        let truth = Adjacency::from_edges(3, [(0, 1)]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let engine = FrontierEngine::new(AdjacencyOracle::new(truth), OracleParams::default())
            .with_record_dir(dir.path());

        let discovery = engine
            .discover(
                data(3),
                &TargetSet::single(0),
                Radius::hops(1),
                AdmissionPolicy::Union,
            )
            .await
            .unwrap();

        let store = FileRecordStore::new(dir.path()).unwrap();
        let records = store.list(&RecordQuery::default()).unwrap();
        assert_eq!(records.len(), 1);
        let path = discovery.run_record.unwrap();
        assert!(path.ends_with(format!("{}.json", records[0].id)));
        assert_eq!(records[0].tool, "localgraph-discover");
        assert!(records[0].verify_integrity());
    }

    #[tokio::test]
    async fn test_lost_run_record_is_visible() {
        let truth = Adjacency::from_edges(3, [(0, 1)]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let blocked = dir.path().join("records");
        std::fs::write(&blocked, "not a directory").unwrap();
        let engine = FrontierEngine::new(AdjacencyOracle::new(truth), OracleParams::default())
            .with_record_dir(&blocked);

        let discovery = engine
            .discover(
                data(3),
                &TargetSet::single(0),
                Radius::hops(1),
                AdmissionPolicy::Union,
            )
            .await
            .unwrap();

        assert!(discovery.is_complete());
        assert_eq!(discovery.run_record, None);
    }
}
