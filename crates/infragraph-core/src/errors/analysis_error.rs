//! Blast radius and policy generation errors.

use super::error_code::{self, InfraErrorCode};
use super::GraphError;

/// Errors returned by the analyzers. All of them are raised before any
/// traversal work is done, except `NoDependenciesFound`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    /// Unknown root or principal id. Never retried.
    #[error("Resource not found: {id}")]
    NotFound { id: String },

    #[error("Validation failed for {field}: {message}")]
    Validation { field: String, message: String },

    /// Policy generation found nothing to grant and baseline fallback was off.
    #[error("No permission-bearing dependencies found for principal {principal_id}")]
    NoDependenciesFound { principal_id: String },

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

impl AnalysisError {
    /// Shorthand for a `Validation` error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl InfraErrorCode for AnalysisError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => error_code::NOT_FOUND,
            Self::Validation { .. } => error_code::VALIDATION_ERROR,
            Self::NoDependenciesFound { .. } => error_code::NO_DEPENDENCIES_FOUND,
            Self::Graph(e) => e.error_code(),
        }
    }
}
