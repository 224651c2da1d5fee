//! Impact analysis: blast radius and severity scoring.

pub mod blast_radius;
pub mod criticality;
pub mod types;

pub use blast_radius::BlastRadiusAnalyzer;
pub use criticality::CriticalityTable;
pub use types::{AffectedResource, ImpactReport, Severity};
