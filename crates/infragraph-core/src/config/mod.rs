//! Configuration system for infragraph.
//! TOML-based, layered resolution: overrides > env > project file > defaults.

pub mod enrichment_config;
pub mod impact_config;
pub mod infragraph_config;
pub mod policy_config;

pub use enrichment_config::EnrichmentConfig;
pub use impact_config::ImpactConfig;
pub use infragraph_config::{ConfigOverrides, InfraGraphConfig};
pub use policy_config::PolicyConfig;
