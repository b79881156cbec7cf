//! Error types for the localgraph-discover crate.

use thiserror::Error;

use localgraph_core::{GraphError, VariableId};

use crate::engine::Discovery;
use crate::ledger::LedgerError;
use crate::oracle::OracleError;

#[derive(Error, Debug)]
pub enum DiscoverError {
    /// The oracle failed for one variable. `partial` holds every answer
    /// committed before the failure and can be passed to
    /// [`FrontierEngine::resume`](crate::FrontierEngine::resume).
    #[error("Oracle query for variable {variable} failed in layer {layer}: {source}")]
    OracleQueryFailed {
        variable: VariableId,
        layer: usize,
        #[source]
        source: OracleError,
        partial: Box<Discovery>,
    },

    #[error("Oracle query task panicked in layer {layer}: {reason}")]
    QueryTaskPanicked {
        layer: usize,
        reason: String,
        partial: Box<Discovery>,
    },

    #[error(
        "Cannot resume to radius {radius}: layer {unfinished_layer} still has unresolved queries"
    )]
    ResumeRadiusTooSmall {
        radius: usize,
        unfinished_layer: usize,
    },

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DiscoverError {
    /// Checkpoint carried by a failed run, if any.
    pub fn partial(&self) -> Option<&Discovery> {
        match self {
            Self::OracleQueryFailed { partial, .. } | Self::QueryTaskPanicked { partial, .. } => {
                Some(partial)
            }
            _ => None,
        }
    }

    pub fn into_partial(self) -> Option<Discovery> {
        match self {
            Self::OracleQueryFailed { partial, .. } | Self::QueryTaskPanicked { partial, .. } => {
                Some(*partial)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DiscoverError>;
