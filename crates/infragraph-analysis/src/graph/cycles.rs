//! Cycle detection. Cycles are expected in infrastructure graphs
//! (mutual security-group references); these are informational only.

use petgraph::algo::{is_cyclic_directed, tarjan_scc};

use super::ResourceGraph;

impl ResourceGraph {
    /// Whether any directed cycle exists.
    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(self.inner())
    }

    /// Every strongly connected component that forms a cycle, as sorted id
    /// groups. Self-loops count as single-member cycles.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let graph = self.inner();
        let mut cycles: Vec<Vec<String>> = tarjan_scc(graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || scc.iter().any(|&idx| graph.find_edge(idx, idx).is_some())
            })
            .map(|scc| {
                let mut ids: Vec<String> =
                    scc.into_iter().map(|idx| graph[idx].id.clone()).collect();
                ids.sort();
                ids
            })
            .collect();
        cycles.sort();
        cycles
    }
}
