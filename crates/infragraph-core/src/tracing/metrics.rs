//! Structured span field names used across infragraph.
//!
//! Consistent field names keep log queries stable across subsystems.

/// Graph builder: assembly time in milliseconds.
pub const GRAPH_BUILD_TIME: &str = "graph_build_time";

/// Graph builder: number of nodes in the sealed graph.
pub const GRAPH_NODE_COUNT: &str = "graph_node_count";

/// Graph builder: number of edges in the sealed graph.
pub const GRAPH_EDGE_COUNT: &str = "graph_edge_count";

/// Graph builder: number of out-of-scope placeholder nodes.
pub const EXTERNAL_NODE_COUNT: &str = "external_node_count";

/// Enricher: lookups issued.
pub const ENRICHMENT_LOOKUPS: &str = "enrichment_lookups";

/// Enricher: lookups that failed, timed out, or were denied.
pub const ENRICHMENT_FAILURES: &str = "enrichment_failures";

/// Blast radius: computation time in microseconds.
pub const BLAST_RADIUS_TIME: &str = "blast_radius_time";

/// Blast radius: number of affected resources.
pub const AFFECTED_COUNT: &str = "affected_count";

/// Policy generator: computation time in microseconds.
pub const POLICY_GENERATION_TIME: &str = "policy_generation_time";

/// Policy generator: number of statements emitted.
pub const STATEMENT_COUNT: &str = "statement_count";
