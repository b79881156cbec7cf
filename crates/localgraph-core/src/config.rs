//! Oracle parameters.
//!
//! Which statistical test to run and at which significance level is passed
//! as an explicit immutable value into both the discovery engine and every
//! oracle call. Nothing reads it from ambient state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Parameters forwarded verbatim to the neighbor oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleParams {
    /// Local structure-learning method (e.g. "mmpc", "iamb").
    #[serde(default = "default_method")]
    pub method: String,

    /// Conditional-independence test variant, if the method takes one.
    #[serde(default)]
    pub test: Option<String>,

    /// Significance level.
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Method-specific options passed through untouched.
    #[serde(default)]
    pub options: BTreeMap<String, serde_json::Value>,
}

impl OracleParams {
    pub fn new(method: &str, alpha: f64) -> Self {
        Self {
            method: method.to_string(),
            test: None,
            alpha,
            options: BTreeMap::new(),
        }
    }

    pub fn with_test(mut self, test: &str) -> Self {
        self.test = Some(test.to_string());
        self
    }

    pub fn with_option(mut self, key: &str, value: serde_json::Value) -> Self {
        self.options.insert(key.to_string(), value);
        self
    }
}

fn default_method() -> String {
    "mmpc".to_string()
}

fn default_alpha() -> f64 {
    0.05
}

impl Default for OracleParams {
    fn default() -> Self {
        Self::new(&default_method(), default_alpha())
    }
}
