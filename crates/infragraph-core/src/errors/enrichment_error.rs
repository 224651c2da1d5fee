//! Live-lookup enrichment errors.
//!
//! These never escape graph construction. The builder records each one as a
//! non-fatal warning and keeps going.

use super::error_code::{self, InfraErrorCode};

/// Errors that can occur during a single enrichment lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnrichmentError {
    #[error("Lookup failed for {resource_type} {id}: {message}")]
    LookupFailed {
        resource_type: String,
        id: String,
        message: String,
    },

    #[error("Access denied describing {resource_type} {id}")]
    AccessDenied { resource_type: String, id: String },

    #[error("Lookup for {id} timed out after {timeout_ms}ms")]
    Timeout { id: String, timeout_ms: u64 },

    #[error("No lookup capability for resource type {resource_type}")]
    Unsupported { resource_type: String },

    #[error("Enrichment cancelled before {id} was looked up")]
    Cancelled { id: String },

    #[error("Lookup worker for {id} panicked")]
    WorkerPanicked { id: String },
}

impl InfraErrorCode for EnrichmentError {
    fn error_code(&self) -> &'static str {
        error_code::ENRICHMENT_ERROR
    }
}
