//! Configuration for localgraph-discover.

use std::time::Duration;

use serde::Deserialize;

use localgraph_core::{OracleParams, Radius};

use crate::engine::EngineSettings;
use crate::policy::AdmissionPolicy;

/// Top-level discovery configuration.
///
/// Loaded from the `[discover]` section of `localgraph.toml` or
/// `LOCALGRAPH_DISCOVER__` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverConfig {
    /// Edge-admission policy (default: union).
    #[serde(default)]
    pub policy: AdmissionPolicy,

    /// Number of BFS layers to explore (default: 1).
    #[serde(default = "default_radius")]
    pub radius: i64,

    /// Maximum oracle queries in flight within one layer.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_queries: usize,

    /// Wall-clock bound for a whole run. Unbounded when unset.
    #[serde(default)]
    pub run_timeout_secs: Option<u64>,

    /// Directory for run records. No records are written when unset.
    #[serde(default)]
    pub record_dir: Option<String>,

    #[serde(default)]
    pub oracle: OracleConfig,

    /// Parameters forwarded to every oracle query.
    #[serde(default)]
    pub params: OracleParams,
}

/// Which neighbor oracle to use.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OracleConfig {
    /// In-process marginal correlation screen.
    Correlation {
        #[serde(default = "default_min_abs_correlation")]
        min_abs_correlation: f64,
    },
    /// External program, one process per query.
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

fn default_radius() -> i64 {
    1
}

fn default_max_concurrent() -> usize {
    4
}

fn default_min_abs_correlation() -> f64 {
    0.3
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self::Correlation {
            min_abs_correlation: default_min_abs_correlation(),
        }
    }
}

impl Default for DiscoverConfig {
    fn default() -> Self {
        Self {
            policy: AdmissionPolicy::default(),
            radius: default_radius(),
            max_concurrent_queries: default_max_concurrent(),
            run_timeout_secs: None,
            record_dir: None,
            oracle: OracleConfig::default(),
            params: OracleParams::default(),
        }
    }
}

impl DiscoverConfig {
    /// Load from `{file_prefix}.toml` (optional) and the environment.
    ///
    /// A missing `[discover]` section yields the defaults; a malformed one is
    /// an error.
    pub fn load(file_prefix: &str) -> Result<Self, config::ConfigError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("LOCALGRAPH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        match cfg.get::<DiscoverConfig>("discover") {
            Ok(c) => Ok(c),
            Err(config::ConfigError::NotFound(_)) => Ok(DiscoverConfig::default()),
            Err(e) => Err(e),
        }
    }

    pub fn radius(&self) -> localgraph_core::Result<Radius> {
        Radius::new(self.radius)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            max_concurrent_queries: self.max_concurrent_queries.max(1),
            run_timeout: self.run_timeout_secs.map(Duration::from_secs),
        }
    }
}
