//! Neighbor oracles.
//!
//! An oracle is the external statistical procedure that, given the data
//! matrix and a focal variable, estimates the focal variable's local
//! neighbor set. The engine only depends on the [`Oracle`] trait; three
//! implementations ship with the crate:
//! - [`CommandOracle`]: runs an external program per query
//! - [`CorrelationOracle`]: in-process marginal correlation screen
//! - [`AdjacencyOracle`]: answers from an already-known graph

pub mod command;
pub mod correlation;
pub mod known;

use std::collections::BTreeSet;
use std::future::Future;
use std::path::Path;

use thiserror::Error;

use localgraph_core::{DataMatrix, OracleParams, VariableId};

pub use command::CommandOracle;
pub use correlation::CorrelationOracle;
pub use known::AdjacencyOracle;

use crate::config::OracleConfig;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    #[error("Failed to launch oracle program {program}: {reason}")]
    Spawn { program: String, reason: String },

    #[error("Oracle program exited with code {code}: {stderr}")]
    Exited { code: i32, stderr: String },

    #[error("Malformed oracle response: {0}")]
    MalformedResponse(String),

    #[error("Oracle reported neighbor {neighbor} outside 0..{node_count}")]
    NeighborOutOfRange { neighbor: VariableId, node_count: usize },

    #[error("Unsupported oracle configuration: {0}")]
    Unsupported(String),

    #[error("Oracle query failed: {0}")]
    Failed(String),
}

/// Estimates the local neighbor set of one variable.
///
/// Implementations must be deterministic for identical inputs, or document
/// that they are not. Long-running queries are not an error; the engine
/// bounds total run time separately.
pub trait Oracle: Send + Sync {
    fn query(
        &self,
        data: &DataMatrix,
        focal: VariableId,
        params: &OracleParams,
    ) -> impl Future<Output = Result<BTreeSet<VariableId>, OracleError>> + Send;
}

/// Drop the focal variable from an answer and reject indices outside `[0, p)`.
pub fn validate_neighbors(
    focal: VariableId,
    mut neighbors: BTreeSet<VariableId>,
    node_count: usize,
) -> Result<BTreeSet<VariableId>, OracleError> {
    neighbors.remove(&focal);
    if let Some(&neighbor) = neighbors.range(node_count..).next() {
        return Err(OracleError::NeighborOutOfRange {
            neighbor,
            node_count,
        });
    }
    Ok(neighbors)
}

/// The oracle selected by configuration.
pub enum ConfiguredOracle {
    Correlation(CorrelationOracle),
    Command(CommandOracle),
}

impl ConfiguredOracle {
    /// Build the configured oracle. External programs load the data
    /// themselves from `data_path`.
    pub fn from_config(config: &OracleConfig, data_path: &Path) -> Result<Self, OracleError> {
        match config {
            OracleConfig::Correlation {
                min_abs_correlation,
            } => Ok(Self::Correlation(CorrelationOracle::new(*min_abs_correlation)?)),
            OracleConfig::Command { program, args } => Ok(Self::Command(CommandOracle::new(
                program,
                args.clone(),
                data_path,
            ))),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Correlation(_) => "correlation",
            Self::Command(_) => "command",
        }
    }
}

impl Oracle for ConfiguredOracle {
    async fn query(
        &self,
        data: &DataMatrix,
        focal: VariableId,
        params: &OracleParams,
    ) -> Result<BTreeSet<VariableId>, OracleError> {
        match self {
            Self::Correlation(oracle) => oracle.query(data, focal, params).await,
            Self::Command(oracle) => oracle.query(data, focal, params).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_drops_focal() {
        let cleaned = validate_neighbors(2, BTreeSet::from([1, 2, 3]), 5).unwrap();
        assert_eq!(cleaned, BTreeSet::from([1, 3]));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let result = validate_neighbors(0, BTreeSet::from([1, 9]), 5);
        assert_eq!(
            result,
            Err(OracleError::NeighborOutOfRange {
                neighbor: 9,
                node_count: 5
            })
        );
    }

    #[test]
    fn test_configured_oracle_from_config() {
        let oracle = ConfiguredOracle::from_config(
            &OracleConfig::Correlation {
                min_abs_correlation: 0.5,
            },
            Path::new("data.csv"),
        )
        .unwrap();
        assert_eq!(oracle.kind(), "correlation");

        let oracle = ConfiguredOracle::from_config(
            &OracleConfig::Command {
                program: "Rscript".to_string(),
                args: vec!["learn_nbr.R".to_string()],
            },
            Path::new("data.csv"),
        )
        .unwrap();
        assert_eq!(oracle.kind(), "command");
    }

    #[test]
    fn test_invalid_correlation_threshold_rejected() {
        let result = ConfiguredOracle::from_config(
            &OracleConfig::Correlation {
                min_abs_correlation: 1.5,
            },
            Path::new("data.csv"),
        );
        assert!(matches!(result, Err(OracleError::Unsupported(_))));
    }
}
