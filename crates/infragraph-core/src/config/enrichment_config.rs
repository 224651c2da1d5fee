//! Live-lookup enrichment configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the resource enricher.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Run live lookups after static assembly. Default: false.
    pub enabled: Option<bool>,
    /// Worker pool width. Default: 8.
    pub workers: Option<usize>,
    /// Per-lookup timeout in milliseconds. Default: 5000.
    pub timeout_ms: Option<u64>,
}

impl EnrichmentConfig {
    pub fn effective_enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }

    pub fn effective_workers(&self) -> usize {
        self.workers.unwrap_or(8)
    }

    pub fn effective_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(5_000))
    }
}
