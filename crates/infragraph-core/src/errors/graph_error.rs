//! Resource graph errors.

use super::error_code::{self, InfraErrorCode};

/// Errors raised by `ResourceGraph` construction and lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A mutator was called after `seal()`. This is a programmer error.
    #[error("Graph is sealed: {operation} is not allowed after seal()")]
    Sealed { operation: &'static str },

    #[error("Resource not found: {id}")]
    NodeNotFound { id: String },

    #[error("Duplicate resource id: {id}")]
    DuplicateNode { id: String },

    #[error("Edge {from} -> {to} references a resource missing from the graph")]
    MissingEndpoint { from: String, to: String },
}

impl InfraErrorCode for GraphError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Sealed { .. } => error_code::GRAPH_SEALED,
            Self::NodeNotFound { .. } => error_code::NOT_FOUND,
            Self::DuplicateNode { .. } | Self::MissingEndpoint { .. } => error_code::GRAPH_ERROR,
        }
    }
}
