//! InfraErrorCode trait for structured error reporting.

/// Every error enum implements this to expose a stable, machine-readable
/// code alongside its human-readable message.
pub trait InfraErrorCode {
    /// Returns the error code string (e.g., "GRAPH_SEALED").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

// Error code constants.
pub const GRAPH_SEALED: &str = "GRAPH_SEALED";
pub const GRAPH_ERROR: &str = "GRAPH_ERROR";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const NO_DEPENDENCIES_FOUND: &str = "NO_DEPENDENCIES_FOUND";
pub const ENRICHMENT_ERROR: &str = "ENRICHMENT_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
