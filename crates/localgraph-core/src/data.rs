//! Observation matrix handed to neighbor oracles.
//!
//! Reads a delimited table (one row per observation, one column per
//! variable) into an `ndarray` matrix. The header row, when present, supplies
//! the variable display names. The matrix is never mutated after load.

use std::path::Path;

use ndarray::{Array2, ArrayView1};

use crate::error::{GraphError, Result};
use crate::types::VariableId;

/// `n` observations × `p` variables.
#[derive(Debug, Clone, PartialEq)]
pub struct DataMatrix {
    values: Array2<f64>,
    names: Option<Vec<String>>,
}

impl DataMatrix {
    pub fn new(values: Array2<f64>) -> Self {
        Self {
            values,
            names: None,
        }
    }

    /// Attach variable names; there must be one per column.
    pub fn with_names(values: Array2<f64>, names: Vec<String>) -> Result<Self> {
        if names.len() != values.ncols() {
            return Err(GraphError::DimensionMismatch(format!(
                "{} names for {} variables",
                names.len(),
                values.ncols()
            )));
        }
        Ok(Self {
            values,
            names: Some(names),
        })
    }

    /// Load a CSV file whose first row holds the variable names.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let names: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let p = names.len();
        let mut buffer = Vec::new();
        let mut rows = 0usize;

        for (row, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() != p {
                return Err(GraphError::DimensionMismatch(format!(
                    "row {} has {} fields, expected {p}",
                    row + 1,
                    record.len()
                )));
            }
            for (col, field) in record.iter().enumerate() {
                let value = field.parse::<f64>().map_err(|_| {
                    GraphError::DimensionMismatch(format!(
                        "non-numeric value {field:?} at row {}, column {:?}",
                        row + 1,
                        names[col]
                    ))
                })?;
                buffer.push(value);
            }
            rows += 1;
        }

        let values = Array2::from_shape_vec((rows, p), buffer)
            .map_err(|e| GraphError::DimensionMismatch(e.to_string()))?;

        tracing::debug!(
            path = %path.display(),
            observations = rows,
            variables = p,
            "Loaded data matrix"
        );

        Self::with_names(values, names)
    }

    pub fn n_observations(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_variables(&self) -> usize {
        self.values.ncols()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn column(&self, variable: VariableId) -> ArrayView1<'_, f64> {
        self.values.column(variable)
    }

    /// Display name for `variable`, falling back to `V{index}`.
    pub fn name(&self, variable: VariableId) -> String {
        self.names
            .as_ref()
            .and_then(|names| names.get(variable).cloned())
            .unwrap_or_else(|| format!("V{variable}"))
    }

    /// Resolve a variable by display name or by decimal index.
    pub fn resolve(&self, key: &str) -> Result<VariableId> {
        if let Some(idx) = self
            .names
            .as_ref()
            .and_then(|names| names.iter().position(|n| n == key))
        {
            return Ok(idx);
        }
        match key.parse::<VariableId>() {
            Ok(idx) if idx < self.n_variables() => Ok(idx),
            Ok(idx) => Err(GraphError::VariableOutOfRange {
                variable: idx,
                node_count: self.n_variables(),
            }),
            Err(_) => Err(GraphError::UnknownVariable {
                name: key.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::io::Write;

    #[test]
    fn test_load_csv_with_header() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "age, ad_status, apoe").unwrap();
        writeln!(file, "71.0, 1, 0.5").unwrap();
        writeln!(file, "65.5, 0, 1.5").unwrap();

        let data = DataMatrix::from_csv_path(file.path()).unwrap();
        assert_eq!(data.n_observations(), 2);
        assert_eq!(data.n_variables(), 3);
        assert_eq!(data.name(1), "ad_status");
        assert_eq!(data.column(0)[1], 65.5);
        assert_eq!(data.resolve("apoe").unwrap(), 2);
        assert_eq!(data.resolve("0").unwrap(), 0);
    }

    #[test]
    fn test_load_csv_rejects_non_numeric() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "a,b").unwrap();
        writeln!(file, "1,oops").unwrap();
        assert!(matches!(
            DataMatrix::from_csv_path(file.path()),
            Err(GraphError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_resolve_unknown() {
        let data = DataMatrix::new(array![[1.0, 2.0]]);
        assert_eq!(data.name(1), "V1");
        assert!(matches!(
            data.resolve("missing"),
            Err(GraphError::UnknownVariable { .. })
        ));
        assert!(matches!(
            data.resolve("7"),
            Err(GraphError::VariableOutOfRange { variable: 7, node_count: 2 })
        ));
    }

    #[test]
    fn test_names_must_match_columns() {
        let result = DataMatrix::with_names(array![[1.0, 2.0]], vec!["x".to_string()]);
        assert!(result.is_err());
    }
}
