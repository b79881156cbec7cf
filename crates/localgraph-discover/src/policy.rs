//! Edge-admission policies.
//!
//! A policy decides, for each neighbor `j` the oracle reports for a focal
//! variable, whether the edge is recorded and whether `j` joins the next
//! frontier. The run-level [`AdmissionPolicy`] is dispatched once to a
//! monomorphized [`EdgeAdmission`] implementation, so each policy's rule lives
//! in exactly one place.

use serde::{Deserialize, Serialize};

/// Which edges a discovery run keeps.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum AdmissionPolicy {
    /// Keep every reported edge, including edges back into visited territory.
    #[default]
    Union,
    /// Keep only edges that extend the frontier into unvisited variables.
    Forward,
}

impl std::fmt::Display for AdmissionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Union => write!(f, "union"),
            Self::Forward => write!(f, "forward"),
        }
    }
}

/// Outcome of admitting one reported neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub record_edge: bool,
    pub extend_frontier: bool,
}

/// Per-policy admission rule.
pub trait EdgeAdmission {
    const POLICY: AdmissionPolicy;

    /// Decide for a neighbor, given whether it is already visited at the
    /// point the focal variable's answer is committed.
    fn admit(neighbor_visited: bool) -> Admission;
}

pub struct UnionAdmission;

impl EdgeAdmission for UnionAdmission {
    const POLICY: AdmissionPolicy = AdmissionPolicy::Union;

    fn admit(neighbor_visited: bool) -> Admission {
        Admission {
            record_edge: true,
            extend_frontier: !neighbor_visited,
        }
    }
}

pub struct ForwardAdmission;

impl EdgeAdmission for ForwardAdmission {
    const POLICY: AdmissionPolicy = AdmissionPolicy::Forward;

    fn admit(neighbor_visited: bool) -> Admission {
        Admission {
            record_edge: !neighbor_visited,
            extend_frontier: !neighbor_visited,
        }
    }
}
