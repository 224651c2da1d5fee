//! Least-privilege policy configuration.

use serde::{Deserialize, Serialize};

/// Configuration for policy generation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PolicyConfig {
    /// Default forward traversal depth. Default: 4.
    pub default_max_depth: Option<u32>,
    /// Distinct resource ARNs above which a policy is no longer considered
    /// least-privilege. Default: 50.
    pub max_resources: Option<usize>,
    /// Follow NETWORK edges during traversal. Default: false.
    pub include_networking: Option<bool>,
    /// Return a baseline execution policy when nothing is discovered. Default: true.
    pub use_baseline_fallback: Option<bool>,
    /// Merge statements with identical actions and a shared ARN prefix. Default: true.
    pub merge_statements: Option<bool>,
}

impl PolicyConfig {
    pub fn effective_default_max_depth(&self) -> u32 {
        self.default_max_depth.unwrap_or(4)
    }

    pub fn effective_max_resources(&self) -> usize {
        self.max_resources.unwrap_or(50)
    }

    pub fn effective_include_networking(&self) -> bool {
        self.include_networking.unwrap_or(false)
    }

    pub fn effective_use_baseline_fallback(&self) -> bool {
        self.use_baseline_fallback.unwrap_or(true)
    }

    pub fn effective_merge_statements(&self) -> bool {
        self.merge_statements.unwrap_or(true)
    }
}
