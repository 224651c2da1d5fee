//! Graph summary types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::RelationType;

/// Counts describing a graph, logged when the graph is sealed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    /// Out-of-scope placeholder nodes.
    pub external_nodes: usize,
    pub edges_by_relation: BTreeMap<RelationType, usize>,
}
