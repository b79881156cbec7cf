//! Error types for the localgraph-extract crate.

use thiserror::Error;

use localgraph_core::GraphError;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
