use thiserror::Error;

/// Errors raised by the shared graph and data types.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Target set is empty: at least one target variable is required")]
    EmptyTargetSet,

    #[error("Invalid radius {radius}: radius must be non-negative")]
    InvalidRadius { radius: i64 },

    #[error("Variable {variable} is out of range for {node_count} variables")]
    VariableOutOfRange { variable: usize, node_count: usize },

    #[error("Self-loop on variable {variable} is not allowed")]
    SelfLoop { variable: usize },

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Unknown variable name: {name}")]
    UnknownVariable { name: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;
