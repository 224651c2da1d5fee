//! Error handling for infragraph.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod analysis_error;
pub mod config_error;
pub mod enrichment_error;
pub mod error_code;
pub mod graph_error;

pub use analysis_error::AnalysisError;
pub use config_error::ConfigError;
pub use enrichment_error::EnrichmentError;
pub use error_code::InfraErrorCode;
pub use graph_error::GraphError;
