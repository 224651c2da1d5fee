//! Optional live enrichment of a statically scanned resource set.

pub mod enricher;
pub mod lookup;

pub use enricher::{Enrichment, ResourceEnricher};
pub use lookup::{ResourceLookup, StaticLookup};
