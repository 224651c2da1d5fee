//! Core types, traits, errors, config, and tracing for the infragraph engine.
//!
//! Nothing in here knows about resource graphs. The analysis crate builds on
//! these primitives.

pub mod config;
pub mod errors;
pub mod tracing;
pub mod traits;
pub mod types;
