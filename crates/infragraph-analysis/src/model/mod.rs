//! Resource and relation types shared by every subsystem.

pub mod relation;
pub mod resource;

pub use relation::{BoundaryClass, DependencyEdge, EdgeSource, RelationType};
pub use resource::{ConfigMap, RawResource, ResourceNode, TagMap, EXTERNAL_RESOURCE_TYPE};
