//! Relation classifier: data-driven mapping from resource types to
//! relation kinds and traversal boundary classes.
//!
//! Adding a resource type means registering a rule. Traversal code never
//! branches on type names.

pub mod defaults;
pub mod pattern;
pub mod registry;

pub use pattern::TypePattern;
pub use registry::{Classification, RelationClassifier};
