//! Graph builder output types.

use infragraph_core::errors::EnrichmentError;

use crate::graph::{GraphStats, ResourceGraph};

/// Non-fatal problem recorded during assembly. The graph is usable regardless.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildWarning {
    /// A reference field could not be resolved and did not look like an
    /// out-of-scope resource either. The edge was dropped.
    #[error("Dropped reference {field}={value} on {resource_id}: no such resource")]
    DanglingReference {
        resource_id: String,
        field: String,
        value: String,
    },

    /// A second scanned record reused an id. The first record was kept.
    #[error("Duplicate resource id {id}; keeping the first record")]
    DuplicateResource { id: String },

    #[error("Ignored self reference {field} on {resource_id}")]
    SelfReference { resource_id: String, field: String },

    /// A live lookup failed, timed out, or was denied.
    #[error("Enrichment skipped for {resource_id}: {error}")]
    Enrichment {
        resource_id: String,
        error: EnrichmentError,
    },

    /// Enrichment was requested but no lookup capability is configured.
    #[error("Enrichment requested but no enricher is configured")]
    EnrichmentUnavailable,
}

/// A sealed graph plus everything noteworthy about how it was assembled.
#[derive(Debug, Clone)]
pub struct BuiltGraph {
    pub graph: ResourceGraph,
    pub warnings: Vec<BuildWarning>,
    pub stats: GraphStats,
}

impl BuiltGraph {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Warnings produced by live lookups.
    pub fn enrichment_failures(&self) -> impl Iterator<Item = &BuildWarning> {
        self.warnings
            .iter()
            .filter(|w| matches!(w, BuildWarning::Enrichment { .. }))
    }

    pub fn into_graph(self) -> ResourceGraph {
        self.graph
    }
}
