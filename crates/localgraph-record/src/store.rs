//! Run record storage.
//!
//! [`FileRecordStore`] keeps one pretty-printed JSON file per run, grouped by
//! the tool that produced it:
//! ```text
//! {root}/
//!   localgraph-discover/
//!     {record_id}.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::{RecordId, RunRecord};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("No run record with id {0}")]
    NotFound(RecordId),

    #[error("Run record {0} was modified after it was finalized")]
    IntegrityViolation(RecordId),

    #[error("Refusing to store a run record that was never finalized")]
    NotFinalized,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Filters for [`RecordStore::list`]. The default matches every record.
#[derive(Debug, Default)]
pub struct RecordQuery {
    pub tool: Option<String>,
    pub started_after: Option<DateTime<Utc>>,
    pub started_before: Option<DateTime<Utc>>,
    /// Keep only runs with at least one failed action.
    pub failed_only: bool,
}

impl RecordQuery {
    fn matches(&self, record: &RunRecord) -> bool {
        self.tool.as_deref().map_or(true, |tool| record.tool == tool)
            && self.started_after.map_or(true, |t| record.started_at >= t)
            && self.started_before.map_or(true, |t| record.started_at <= t)
            && (!self.failed_only || record.failed_actions() > 0)
    }
}

pub trait RecordStore {
    /// Persist a finalized record and return where it was written.
    fn save(&self, record: &RunRecord) -> Result<PathBuf, StoreError>;

    /// Load one record. Fails if its content no longer matches its hash.
    fn get(&self, id: RecordId) -> Result<RunRecord, StoreError>;

    /// Records matching `query`, most recently started first.
    fn list(&self, query: &RecordQuery) -> Result<Vec<RunRecord>, StoreError>;
}

pub struct FileRecordStore {
    root: PathBuf,
}

impl FileRecordStore {
    /// Open (and create if missing) a store under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn tool_dirs(&self) -> Result<Vec<PathBuf>, StoreError> {
        let mut dirs = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }
        Ok(dirs)
    }

    fn locate(&self, id: RecordId) -> Result<PathBuf, StoreError> {
        let file_name = format!("{id}.json");
        for dir in self.tool_dirs()? {
            let candidate = dir.join(&file_name);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
        Err(StoreError::NotFound(id))
    }
}

fn read_record(path: &Path) -> Result<RunRecord, StoreError> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

impl RecordStore for FileRecordStore {
    fn save(&self, record: &RunRecord) -> Result<PathBuf, StoreError> {
        if record.content_hash.is_none() {
            return Err(StoreError::NotFinalized);
        }

        let dir = self.root.join(&record.tool);
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.json", record.id));
        fs::write(&path, serde_json::to_string_pretty(record)?)?;

        tracing::debug!(record_id = %record.id, path = %path.display(), "Run record saved");
        Ok(path)
    }

    fn get(&self, id: RecordId) -> Result<RunRecord, StoreError> {
        let record = read_record(&self.locate(id)?)?;
        if record.verify_integrity() {
            Ok(record)
        } else {
            Err(StoreError::IntegrityViolation(id))
        }
    }

    fn list(&self, query: &RecordQuery) -> Result<Vec<RunRecord>, StoreError> {
        let mut records = Vec::new();
        for dir in self.tool_dirs()? {
            for entry in fs::read_dir(dir)? {
                let path = entry?.path();
                if path.extension().is_some_and(|ext| ext == "json") {
                    let record = read_record(&path)?;
                    if query.matches(&record) {
                        records.push(record);
                    }
                }
            }
        }
        records.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(records)
    }
}
