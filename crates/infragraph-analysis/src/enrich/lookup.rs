//! Capability-scoped live lookup interface.

use infragraph_core::errors::EnrichmentError;
use infragraph_core::types::collections::{FxHashMap, FxHashSet};

use crate::model::ConfigMap;

/// Describes a live resource. Implemented by per-service cloud clients
/// outside this crate.
///
/// Implementations are called from a worker pool and must be thread-safe.
/// A call that blocks past the enricher's timeout is abandoned.
pub trait ResourceLookup: Send + Sync {
    /// Whether this lookup can describe resources of `resource_type`.
    /// Unsupported types are skipped without a warning.
    fn supports(&self, resource_type: &str) -> bool {
        let _ = resource_type;
        true
    }

    /// Fetch the live configuration of one resource. Reference fields in
    /// the returned map are resolved like static configuration. An `arn`
    /// entry fills a missing node ARN.
    fn describe(&self, resource_type: &str, id: &str) -> Result<ConfigMap, EnrichmentError>;
}

/// In-memory lookup serving pre-recorded describe output.
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    entries: FxHashMap<String, ConfigMap>,
    denied: FxHashSet<String>,
    types: Option<FxHashSet<String>>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the describe output for `id`.
    pub fn with_entry(mut self, id: impl Into<String>, config: ConfigMap) -> Self {
        self.entries.insert(id.into(), config);
        self
    }

    /// Answer `AccessDenied` for `id`.
    pub fn deny(mut self, id: impl Into<String>) -> Self {
        self.denied.insert(id.into());
        self
    }

    /// Restrict support to the given types. By default every type is supported.
    pub fn supporting<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = Some(types.into_iter().map(Into::into).collect());
        self
    }
}

impl ResourceLookup for StaticLookup {
    fn supports(&self, resource_type: &str) -> bool {
        self.types
            .as_ref()
            .map_or(true, |types| types.contains(resource_type))
    }

    fn describe(&self, resource_type: &str, id: &str) -> Result<ConfigMap, EnrichmentError> {
        if self.denied.contains(id) {
            return Err(EnrichmentError::AccessDenied {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
            });
        }
        self.entries
            .get(id)
            .cloned()
            .ok_or_else(|| EnrichmentError::LookupFailed {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
                message: "resource not found".to_string(),
            })
    }
}
