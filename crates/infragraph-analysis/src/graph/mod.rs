//! Resource graph: sealed arena of resources and typed edges.

pub mod cycles;
pub mod resource_graph;
pub mod types;

pub use resource_graph::ResourceGraph;
pub(crate) use resource_graph::Neighbor;
pub use types::GraphStats;
