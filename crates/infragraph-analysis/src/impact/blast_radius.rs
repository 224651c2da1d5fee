//! Blast radius computation via reverse bounded BFS.

use std::collections::{BTreeMap, VecDeque};
use std::time::Instant;

use infragraph_core::config::ImpactConfig;
use infragraph_core::errors::AnalysisError;
use infragraph_core::tracing::metrics;
use infragraph_core::types::collections::{FxHashSet, SmallVec4};
use petgraph::graph::NodeIndex;
use petgraph::Direction;
use rayon::prelude::*;
use tracing::debug;

use crate::graph::ResourceGraph;
use crate::model::RelationType;

use super::criticality::CriticalityTable;
use super::types::{AffectedResource, ImpactReport, Severity};

/// Computes what breaks if a resource is changed or deleted.
///
/// Stateless between calls. One analyzer can serve any number of threads
/// over the same sealed graph.
#[derive(Debug, Clone)]
pub struct BlastRadiusAnalyzer {
    depth_decay: f64,
    critical_threshold: f64,
    high_threshold: f64,
    medium_threshold: f64,
    default_max_depth: u32,
    criticality: CriticalityTable,
}

impl Default for BlastRadiusAnalyzer {
    fn default() -> Self {
        Self::new(&ImpactConfig::default())
    }
}

impl BlastRadiusAnalyzer {
    pub fn new(config: &ImpactConfig) -> Self {
        Self {
            depth_decay: config.effective_depth_decay(),
            critical_threshold: config.effective_critical_threshold(),
            high_threshold: config.effective_high_threshold(),
            medium_threshold: config.effective_medium_threshold(),
            default_max_depth: config.effective_default_max_depth(),
            criticality: CriticalityTable::default(),
        }
    }

    pub fn with_criticality(mut self, table: CriticalityTable) -> Self {
        self.criticality = table;
        self
    }

    pub fn criticality(&self) -> &CriticalityTable {
        &self.criticality
    }

    /// `calculate` at the configured default depth.
    pub fn calculate_default(
        &self,
        graph: &ResourceGraph,
        root_id: &str,
    ) -> Result<ImpactReport, AnalysisError> {
        self.calculate(graph, root_id, self.default_max_depth)
    }

    /// Walk toward everything that depends on `root_id`, up to `max_depth` hops.
    pub fn calculate(
        &self,
        graph: &ResourceGraph,
        root_id: &str,
        max_depth: u32,
    ) -> Result<ImpactReport, AnalysisError> {
        if max_depth == 0 {
            return Err(AnalysisError::validation("max_depth", "must be at least 1"));
        }
        let root = graph
            .index_of(root_id)
            .ok_or_else(|| AnalysisError::NotFound {
                id: root_id.to_string(),
            })?;

        let start = Instant::now();
        let affected = self.traverse(graph, root, max_depth);

        let score = affected
            .iter()
            .map(|a| a.criticality)
            .fold(0.0_f64, f64::max);
        let any_user_facing = affected.iter().any(|a| a.user_facing);
        let severity = if affected.is_empty() {
            Severity::Low
        } else {
            self.severity_for(score, any_user_facing)
        };

        let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
        for a in &affected {
            *by_type.entry(a.resource_type.clone()).or_insert(0) += 1;
        }
        let max_depth_reached = affected.iter().map(|a| a.depth).max().unwrap_or(0);

        debug!(
            root = root_id,
            { metrics::AFFECTED_COUNT } = affected.len(),
            { metrics::BLAST_RADIUS_TIME } = start.elapsed().as_micros() as u64,
            severity = %severity,
            "blast radius computed"
        );

        Ok(ImpactReport {
            root_id: root_id.to_string(),
            affected,
            severity,
            score,
            max_depth_reached,
            by_type,
        })
    }

    /// Independent roots in parallel. Results are in input order.
    pub fn calculate_many(
        &self,
        graph: &ResourceGraph,
        root_ids: &[&str],
        max_depth: u32,
    ) -> Vec<Result<ImpactReport, AnalysisError>> {
        root_ids
            .par_iter()
            .map(|root| self.calculate(graph, root, max_depth))
            .collect()
    }

    /// Bucket a score. Any user-facing resource forces CRITICAL.
    pub fn severity_for(&self, score: f64, user_facing: bool) -> Severity {
        if user_facing || score >= self.critical_threshold {
            Severity::Critical
        } else if score >= self.high_threshold {
            Severity::High
        } else if score >= self.medium_threshold {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    /// Base criticality scaled by `decay^(depth-1)`.
    fn scaled(&self, resource_type: &str, depth: u32) -> f64 {
        let base = self.criticality.weight(resource_type);
        base * self.depth_decay.powi(depth.saturating_sub(1) as i32)
    }

    fn traverse(&self, graph: &ResourceGraph, root: NodeIndex, max_depth: u32) -> Vec<AffectedResource> {
        let mut visited = FxHashSet::default();
        let mut queue: VecDeque<(NodeIndex, u32, SmallVec4<RelationType>)> = VecDeque::new();
        let mut result = Vec::new();

        visited.insert(root);
        queue.push_back((root, 0, SmallVec4::new()));

        while let Some((current, depth, path)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            let parent_id = &graph.node_at(current).id;
            for dependent in graph.neighbors(current, Direction::Incoming) {
                if !visited.insert(dependent.index) {
                    continue;
                }
                let node = graph.node_at(dependent.index);
                let hop = depth + 1;
                let mut relation_path = path.clone();
                relation_path.push(dependent.relation);

                result.push(AffectedResource {
                    id: node.id.clone(),
                    resource_type: node.resource_type.clone(),
                    relation_path: relation_path.clone(),
                    depth: hop,
                    criticality: self.scaled(&node.resource_type, hop),
                    parent_id: parent_id.clone(),
                    user_facing: self.criticality.is_user_facing(&node.resource_type),
                });
                queue.push_back((dependent.index, hop, relation_path));
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_bucket_scores() {
        let a = BlastRadiusAnalyzer::default();
        assert_eq!(a.severity_for(0.9, false), Severity::Critical);
        assert_eq!(a.severity_for(0.6, false), Severity::High);
        assert_eq!(a.severity_for(0.31, false), Severity::Medium);
        assert_eq!(a.severity_for(0.1, false), Severity::Low);
        assert_eq!(a.severity_for(0.1, true), Severity::Critical);
    }

    #[test]
    fn decay_orders_direct_before_indirect() {
        let a = BlastRadiusAnalyzer::default();
        assert!(a.scaled("aws_instance", 1) > a.scaled("aws_instance", 2));
        assert_eq!(a.scaled("aws_instance", 1), 0.5);
    }
}
