//! Marginal correlation screen.
//!
//! Reports every variable whose Pearson correlation with the focal variable
//! reaches `min_abs_correlation` in absolute value. This is a screening
//! oracle, not a conditional-independence procedure; it exists so that
//! discovery can run end to end without an external statistics package.

use std::collections::BTreeSet;

use localgraph_core::{DataMatrix, OracleParams, VariableId};

use super::{Oracle, OracleError};

pub struct CorrelationOracle {
    min_abs_correlation: f64,
}

impl CorrelationOracle {
    pub fn new(min_abs_correlation: f64) -> Result<Self, OracleError> {
        if !(0.0..=1.0).contains(&min_abs_correlation) {
            return Err(OracleError::Unsupported(format!(
                "min_abs_correlation must lie in [0, 1], got {min_abs_correlation}"
            )));
        }
        Ok(Self {
            min_abs_correlation,
        })
    }

    /// Correlated neighbors of `focal`.
    pub fn screen(
        &self,
        data: &DataMatrix,
        focal: VariableId,
    ) -> Result<BTreeSet<VariableId>, OracleError> {
        if data.n_observations() < 2 {
            return Err(OracleError::Failed(format!(
                "need at least two observations, got {}",
                data.n_observations()
            )));
        }
        if focal >= data.n_variables() {
            return Err(OracleError::Failed(format!(
                "focal variable {focal} outside 0..{}",
                data.n_variables()
            )));
        }

        let x = data.column(focal);
        let centered_x = &x - x.mean().unwrap_or(0.0);
        let ss_x = centered_x.dot(&centered_x);
        if ss_x == 0.0 {
            return Err(OracleError::Failed(format!(
                "variable {focal} has zero variance"
            )));
        }

        let mut neighbors = BTreeSet::new();
        for j in (0..data.n_variables()).filter(|&j| j != focal) {
            let y = data.column(j);
            let centered_y = &y - y.mean().unwrap_or(0.0);
            let ss_y = centered_y.dot(&centered_y);
            // Constant columns carry no dependence information.
            if ss_y == 0.0 {
                continue;
            }
            let r = centered_x.dot(&centered_y) / (ss_x * ss_y).sqrt();
            if r.abs() >= self.min_abs_correlation {
                neighbors.insert(j);
            }
        }
        Ok(neighbors)
    }
}

impl Oracle for CorrelationOracle {
    async fn query(
        &self,
        data: &DataMatrix,
        focal: VariableId,
        _params: &OracleParams,
    ) -> Result<BTreeSet<VariableId>, OracleError> {
        self.screen(data, focal)
    }
}
