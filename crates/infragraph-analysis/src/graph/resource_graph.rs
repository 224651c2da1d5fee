//! ResourceGraph: petgraph arena with an id index and a one-way seal.

use infragraph_core::errors::GraphError;
use infragraph_core::types::collections::FxHashMap;
use petgraph::graph::{EdgeIndex, Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};

use crate::model::{DependencyEdge, RelationType, ResourceNode};

use super::types::GraphStats;

/// Typed dependency graph of scanned resources.
///
/// Nodes live in a flat arena (`petgraph::Graph`) and edges are index pairs.
/// Nothing is ever removed, so indices stay valid for the life of the graph.
/// After `seal()` every mutator fails with `GraphError::Sealed`.
#[derive(Debug, Clone, Default)]
pub struct ResourceGraph {
    graph: Graph<ResourceNode, DependencyEdge, Directed>,
    index: FxHashMap<String, NodeIndex>,
    arn_index: FxHashMap<String, NodeIndex>,
    sealed: bool,
}

impl ResourceGraph {
    /// Create an empty, unsealed graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource. Ids must be unique within the graph.
    pub fn add_node(&mut self, node: ResourceNode) -> Result<(), GraphError> {
        self.ensure_unsealed("add_node")?;
        if self.index.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode { id: node.id });
        }
        let id = node.id.clone();
        let arn = node.arn.clone();
        let idx = self.graph.add_node(node);
        self.index.insert(id, idx);
        if let Some(arn) = arn {
            self.arn_index.entry(arn).or_insert(idx);
        }
        Ok(())
    }

    /// Add a typed edge. Both endpoints must already be present.
    ///
    /// An edge identical in `(from, to, relation)` to an existing one is
    /// ignored; the first source recorded wins.
    pub fn add_edge(&mut self, edge: DependencyEdge) -> Result<(), GraphError> {
        self.ensure_unsealed("add_edge")?;
        let (from, to) = match (self.index.get(&edge.from_id), self.index.get(&edge.to_id)) {
            (Some(&from), Some(&to)) => (from, to),
            _ => {
                return Err(GraphError::MissingEndpoint {
                    from: edge.from_id,
                    to: edge.to_id,
                })
            }
        };
        let duplicate = self
            .graph
            .edges_connecting(from, to)
            .any(|e| e.weight().relation == edge.relation);
        if !duplicate {
            self.graph.add_edge(from, to, edge);
        }
        Ok(())
    }

    /// Freeze the graph. May be called once.
    pub fn seal(&mut self) -> Result<(), GraphError> {
        self.ensure_unsealed("seal")?;
        self.sealed = true;
        Ok(())
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    fn ensure_unsealed(&self, operation: &'static str) -> Result<(), GraphError> {
        if self.sealed {
            Err(GraphError::Sealed { operation })
        } else {
            Ok(())
        }
    }

    /// Look up a resource by id.
    pub fn node(&self, id: &str) -> Result<&ResourceNode, GraphError> {
        self.index
            .get(id)
            .map(|&idx| &self.graph[idx])
            .ok_or_else(|| GraphError::NodeNotFound { id: id.to_string() })
    }

    /// Look up a resource by ARN. The first node registered with an ARN owns it.
    pub fn node_by_arn(&self, arn: &str) -> Option<&ResourceNode> {
        self.arn_index.get(arn).map(|&idx| &self.graph[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Outgoing edges of `id` in insertion order. Empty for unknown ids.
    pub fn deps_of(&self, id: &str) -> Vec<&DependencyEdge> {
        self.directed_edges(id, Direction::Outgoing)
    }

    /// Incoming edges of `id` in insertion order. Empty for unknown ids.
    pub fn consumers_of(&self, id: &str) -> Vec<&DependencyEdge> {
        self.directed_edges(id, Direction::Incoming)
    }

    fn directed_edges(&self, id: &str, direction: Direction) -> Vec<&DependencyEdge> {
        match self.index.get(id) {
            Some(&idx) => self
                .sorted_edges(idx, direction)
                .into_iter()
                .map(|(_, edge)| edge)
                .collect(),
            None => Vec::new(),
        }
    }

    /// All edges from `from_id` to `to_id`, in insertion order.
    pub fn edges_between(&self, from_id: &str, to_id: &str) -> Vec<&DependencyEdge> {
        match (self.index.get(from_id), self.index.get(to_id)) {
            (Some(&from), Some(&to)) => {
                let mut edges: Vec<(EdgeIndex, &DependencyEdge)> = self
                    .graph
                    .edges_connecting(from, to)
                    .map(|e| (e.id(), e.weight()))
                    .collect();
                edges.sort_by_key(|(id, _)| *id);
                edges.into_iter().map(|(_, e)| e).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Highest-precedence relation among the edges `from_id -> to_id`.
    pub fn strongest_relation(&self, from_id: &str, to_id: &str) -> Option<RelationType> {
        self.edges_between(from_id, to_id)
            .into_iter()
            .map(|e| e.relation)
            .reduce(RelationType::strongest)
    }

    /// All resources in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &ResourceNode> {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &DependencyEdge> {
        self.graph.edge_indices().map(move |idx| &self.graph[idx])
    }

    /// Out-of-scope placeholder nodes.
    pub fn external_nodes(&self) -> impl Iterator<Item = &ResourceNode> {
        self.nodes().filter(|n| n.external)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Summary counts for logging and reports.
    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            nodes: self.node_count(),
            edges: self.edge_count(),
            external_nodes: self.external_nodes().count(),
            ..Default::default()
        };
        for edge in self.edges() {
            *stats.edges_by_relation.entry(edge.relation).or_insert(0) += 1;
        }
        stats
    }

    // ---- Index-level access for the analyzers ----

    pub(crate) fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub(crate) fn node_at(&self, idx: NodeIndex) -> &ResourceNode {
        &self.graph[idx]
    }

    pub(crate) fn inner(&self) -> &Graph<ResourceNode, DependencyEdge, Directed> {
        &self.graph
    }

    /// Neighbors of `idx` in `direction`, one entry per neighbor, in order of
    /// first edge insertion, each carrying the strongest relation joining them
    /// and every relation seen.
    pub(crate) fn neighbors(&self, idx: NodeIndex, direction: Direction) -> Vec<Neighbor> {
        let mut out: Vec<Neighbor> = Vec::new();
        let mut position: FxHashMap<NodeIndex, usize> = FxHashMap::default();
        for (_, edge) in self.sorted_edges_ref(idx, direction) {
            let other = match direction {
                Direction::Outgoing => edge.target(),
                Direction::Incoming => edge.source(),
            };
            let relation = edge.weight().relation;
            match position.get(&other) {
                Some(&pos) => {
                    let n = &mut out[pos];
                    n.relation = n.relation.strongest(relation);
                    if !n.relations.contains(&relation) {
                        n.relations.push(relation);
                    }
                }
                None => {
                    position.insert(other, out.len());
                    out.push(Neighbor {
                        index: other,
                        relation,
                        relations: vec![relation],
                    });
                }
            }
        }
        out
    }

    fn sorted_edges(&self, idx: NodeIndex, direction: Direction) -> Vec<(EdgeIndex, &DependencyEdge)> {
        self.sorted_edges_ref(idx, direction)
            .into_iter()
            .map(|(id, e)| (id, e.weight()))
            .collect()
    }

    fn sorted_edges_ref(
        &self,
        idx: NodeIndex,
        direction: Direction,
    ) -> Vec<(EdgeIndex, petgraph::graph::EdgeReference<'_, DependencyEdge>)> {
        // petgraph walks adjacency newest-first; callers want insertion order.
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, direction)
            .map(|e| (e.id(), e))
            .collect();
        edges.sort_by_key(|(id, _)| *id);
        edges
    }
}

/// A neighbor seen from one side of possibly several parallel edges.
#[derive(Debug, Clone)]
pub(crate) struct Neighbor {
    pub index: NodeIndex,
    /// Strongest relation by reporting precedence.
    pub relation: RelationType,
    /// Every distinct relation joining the pair.
    pub relations: Vec<RelationType>,
}
