//! Graph assembly from scanned resources.

pub mod graph_builder;
pub mod references;
pub mod types;

pub use graph_builder::GraphBuilder;
pub use types::{BuildWarning, BuiltGraph};
