//! External-program oracle.
//!
//! Runs the configured program once per query via `tokio::process::Command`.
//! The request is written to the child's stdin as JSON:
//!
//! ```text
//! {"focal": 3, "focal_name": "apoe", "data_path": "X.csv", "params": {...}}
//! ```
//!
//! and the child must print a JSON array of neighbor indices on stdout. The
//! child is killed if the query is cancelled.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use localgraph_core::{DataMatrix, OracleParams, VariableId};

use super::{Oracle, OracleError};

#[derive(Serialize)]
struct QueryRequest<'a> {
    focal: VariableId,
    focal_name: String,
    data_path: &'a Path,
    params: &'a OracleParams,
}

/// Wrapper around an external neighbor-estimation program.
pub struct CommandOracle {
    program: String,
    args: Vec<String>,
    data_path: PathBuf,
}

impl CommandOracle {
    pub fn new(program: &str, args: Vec<String>, data_path: &Path) -> Self {
        Self {
            program: program.to_string(),
            args,
            data_path: data_path.to_path_buf(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Oracle for CommandOracle {
    async fn query(
        &self,
        data: &DataMatrix,
        focal: VariableId,
        params: &OracleParams,
    ) -> Result<BTreeSet<VariableId>, OracleError> {
        let start = Instant::now();
        let request = serde_json::to_vec(&QueryRequest {
            focal,
            focal_name: data.name(focal),
            data_path: &self.data_path,
            params,
        })
        .map_err(|e| OracleError::Failed(e.to_string()))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| OracleError::Spawn {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // A program that ignores stdin may exit before reading it; its
            // exit status decides the outcome.
            if let Err(e) = stdin.write_all(&request).await {
                tracing::debug!(focal, error = %e, "Oracle program did not read request");
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| OracleError::Spawn {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(OracleError::Exited {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let neighbors = parse_neighbor_list(&output.stdout)?;

        tracing::debug!(
            focal,
            program = %self.program,
            neighbors = neighbors.len(),
            duration_ms = start.elapsed().as_millis(),
            "Oracle program answered"
        );

        Ok(neighbors)
    }
}

/// Parse a JSON array of neighbor indices.
pub fn parse_neighbor_list(stdout: &[u8]) -> Result<BTreeSet<VariableId>, OracleError> {
    let text = std::str::from_utf8(stdout)
        .map_err(|e| OracleError::MalformedResponse(e.to_string()))?
        .trim();
    if text.is_empty() {
        return Err(OracleError::MalformedResponse(
            "empty output, expected a JSON array".to_string(),
        ));
    }
    let list: Vec<VariableId> = serde_json::from_str(text)
        .map_err(|e| OracleError::MalformedResponse(format!("{e}: {text}")))?;
    Ok(list.into_iter().collect())
}
