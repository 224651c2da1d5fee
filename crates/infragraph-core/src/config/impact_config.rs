//! Blast radius configuration.

use serde::{Deserialize, Serialize};

/// Configuration for blast radius analysis.
///
/// Severity buckets are cut on the maximum depth-scaled criticality:
/// `score >= critical` is CRITICAL, `>= high` is HIGH, `>= medium` is MEDIUM.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ImpactConfig {
    /// Default traversal depth when the caller has no preference. Default: 5.
    pub default_max_depth: Option<u32>,
    /// Multiplier applied per hop beyond the first. Default: 0.7.
    pub depth_decay: Option<f64>,
    /// Score at or above which severity is CRITICAL. Default: 0.85.
    pub critical_threshold: Option<f64>,
    /// Score at or above which severity is HIGH. Default: 0.60.
    pub high_threshold: Option<f64>,
    /// Score at or above which severity is MEDIUM. Default: 0.30.
    pub medium_threshold: Option<f64>,
}

impl ImpactConfig {
    pub fn effective_default_max_depth(&self) -> u32 {
        self.default_max_depth.unwrap_or(5)
    }

    pub fn effective_depth_decay(&self) -> f64 {
        self.depth_decay.unwrap_or(0.7)
    }

    pub fn effective_critical_threshold(&self) -> f64 {
        self.critical_threshold.unwrap_or(0.85)
    }

    pub fn effective_high_threshold(&self) -> f64 {
        self.high_threshold.unwrap_or(0.60)
    }

    pub fn effective_medium_threshold(&self) -> f64 {
        self.medium_threshold.unwrap_or(0.30)
    }
}
