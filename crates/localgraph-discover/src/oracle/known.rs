//! Oracle backed by an already-known graph.
//!
//! Used to replay discovery against a ground-truth graph in simulations, and
//! to compare local discovery with a graph produced by a global method.

use std::collections::BTreeSet;

use localgraph_core::{Adjacency, DataMatrix, OracleParams, VariableId};

use super::{Oracle, OracleError};

pub struct AdjacencyOracle {
    graph: Adjacency,
}

impl AdjacencyOracle {
    pub fn new(graph: Adjacency) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &Adjacency {
        &self.graph
    }
}

impl Oracle for AdjacencyOracle {
    async fn query(
        &self,
        data: &DataMatrix,
        focal: VariableId,
        _params: &OracleParams,
    ) -> Result<BTreeSet<VariableId>, OracleError> {
        if self.graph.node_count() != data.n_variables() {
            return Err(OracleError::Unsupported(format!(
                "known graph has {} variables but data has {}",
                self.graph.node_count(),
                data.n_variables()
            )));
        }
        Ok(self.graph.neighbors(focal).collect())
    }
}
