//! GraphBuilder: resolves raw references into typed edges and seals the graph.

use std::time::Instant;

use infragraph_core::errors::GraphError;
use infragraph_core::tracing::metrics;
use infragraph_core::types::collections::{FxHashMap, FxHashSet};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::classifier::RelationClassifier;
use crate::enrich::ResourceEnricher;
use crate::graph::ResourceGraph;
use crate::model::{
    ConfigMap, DependencyEdge, EdgeSource, RawResource, ResourceNode, TagMap,
    EXTERNAL_RESOURCE_TYPE,
};

use super::references::{self, Reference};
use super::types::{BuildWarning, BuiltGraph};

/// Assembles one sealed `ResourceGraph` per scan snapshot.
///
/// Assembly order:
/// 1. optional live enrichment over the raw records
/// 2. one node per record (first record wins on duplicate ids)
/// 3. edges from static config, then from discovered config
/// 4. `seal()`
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    classifier: RelationClassifier,
    enricher: Option<ResourceEnricher>,
}

impl GraphBuilder {
    pub fn new(classifier: RelationClassifier) -> Self {
        Self {
            classifier,
            enricher: None,
        }
    }

    pub fn with_enricher(mut self, enricher: ResourceEnricher) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn classifier(&self) -> &RelationClassifier {
        &self.classifier
    }

    /// Build and seal a graph from scanned records.
    ///
    /// Only a broken internal invariant can fail here. Unresolved references,
    /// duplicate ids, and lookup failures are reported as warnings.
    pub fn build(&self, resources: &[RawResource], enrich: bool) -> Result<BuiltGraph, GraphError> {
        let start = Instant::now();
        let mut warnings = Vec::new();

        let discovered = self.run_enrichment(resources, enrich, &mut warnings);

        let mut assembly = Assembly::new(&self.classifier);
        let mut kept: Vec<&RawResource> = Vec::with_capacity(resources.len());
        for raw in resources {
            if assembly.graph.contains(&raw.id) {
                warn!(id = %raw.id, "duplicate resource id");
                warnings.push(BuildWarning::DuplicateResource { id: raw.id.clone() });
                continue;
            }
            let mut node = ResourceNode::from_raw(raw);
            if node.arn.is_none() {
                node.arn = discovered
                    .get(raw.id.as_str())
                    .and_then(|config| config.get("arn"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
            }
            assembly.add_resource(node)?;
            kept.push(raw);
        }

        for raw in &kept {
            let refs = references::extract(&raw.config, &raw.tags);
            assembly.link(raw, refs, EdgeSource::StaticConfig, &mut warnings)?;
        }
        for raw in &kept {
            if let Some(config) = discovered.get(raw.id.as_str()) {
                let refs = references::extract(config, &TagMap::new());
                assembly.link(raw, refs, EdgeSource::LiveLookup, &mut warnings)?;
            }
        }

        let mut graph = assembly.graph;
        graph.seal()?;
        let stats = graph.stats();

        info!(
            { metrics::GRAPH_NODE_COUNT } = stats.nodes,
            { metrics::GRAPH_EDGE_COUNT } = stats.edges,
            { metrics::EXTERNAL_NODE_COUNT } = stats.external_nodes,
            { metrics::GRAPH_BUILD_TIME } = start.elapsed().as_millis() as u64,
            warnings = warnings.len(),
            "resource graph sealed"
        );
        if graph.has_cycle() {
            debug!(cycles = ?graph.find_cycles(), "graph contains cycles");
        }

        Ok(BuiltGraph {
            graph,
            warnings,
            stats,
        })
    }

    fn run_enrichment(
        &self,
        resources: &[RawResource],
        enrich: bool,
        warnings: &mut Vec<BuildWarning>,
    ) -> FxHashMap<String, ConfigMap> {
        let mut discovered = FxHashMap::default();
        if !enrich {
            return discovered;
        }
        let Some(enricher) = &self.enricher else {
            warn!("enrichment requested without an enricher");
            warnings.push(BuildWarning::EnrichmentUnavailable);
            return discovered;
        };

        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let unique: Vec<RawResource> = resources
            .iter()
            .filter(|r| seen.insert(r.id.as_str()))
            .cloned()
            .collect();

        for enrichment in enricher.enrich(&unique) {
            match enrichment.outcome {
                Ok(config) => {
                    discovered.insert(enrichment.resource_id, config);
                }
                Err(error) => {
                    warn!(id = %enrichment.resource_id, error = %error, "enrichment failed");
                    warnings.push(BuildWarning::Enrichment {
                        resource_id: enrichment.resource_id,
                        error,
                    });
                }
            }
        }
        discovered
    }
}

/// Mutable state for one `build` call.
struct Assembly<'c> {
    classifier: &'c RelationClassifier,
    graph: ResourceGraph,
    /// Human names to ids, first owner wins.
    names: FxHashMap<String, String>,
}

impl<'c> Assembly<'c> {
    fn new(classifier: &'c RelationClassifier) -> Self {
        Self {
            classifier,
            graph: ResourceGraph::new(),
            names: FxHashMap::default(),
        }
    }

    fn add_resource(&mut self, node: ResourceNode) -> Result<(), GraphError> {
        if let Some(name) = &node.name {
            self.names
                .entry(name.clone())
                .or_insert_with(|| node.id.clone());
        }
        self.graph.add_node(node)
    }

    /// Resolution order: id, ARN, then an ARN's trailing name segment
    /// against ids and names.
    fn resolve(&self, value: &str) -> Option<String> {
        if self.graph.contains(value) {
            return Some(value.to_string());
        }
        if let Some(node) = self.graph.node_by_arn(value) {
            return Some(node.id.clone());
        }
        let unqualified = references::strip_qualifier(value).unwrap_or(value);
        if let Some(node) = self.graph.node_by_arn(unqualified) {
            return Some(node.id.clone());
        }
        let key = if references::is_arn(value) {
            references::arn_name(unqualified)?
        } else {
            value
        };
        if self.graph.contains(key) {
            return Some(key.to_string());
        }
        self.names.get(key).cloned()
    }

    fn placeholder(&mut self, value: &str) -> Result<String, GraphError> {
        if !self.graph.contains(value) {
            let resource_type = references::infer_type(value).unwrap_or(EXTERNAL_RESOURCE_TYPE);
            let arn = references::is_arn(value).then(|| value.to_string());
            debug!(value, resource_type, "out-of-scope reference");
            self.graph
                .add_node(ResourceNode::external(value, resource_type, arn))?;
        }
        Ok(value.to_string())
    }

    fn link(
        &mut self,
        raw: &RawResource,
        refs: Vec<Reference>,
        source: EdgeSource,
        warnings: &mut Vec<BuildWarning>,
    ) -> Result<(), GraphError> {
        for reference in refs {
            let target = match self.resolve(&reference.value) {
                Some(id) => id,
                None if references::is_recognized(&reference.value) => {
                    self.placeholder(&reference.value)?
                }
                None => {
                    warn!(
                        resource = %raw.id,
                        field = %reference.field,
                        value = %reference.value,
                        "dropping dangling reference"
                    );
                    warnings.push(BuildWarning::DanglingReference {
                        resource_id: raw.id.clone(),
                        field: reference.field,
                        value: reference.value,
                    });
                    continue;
                }
            };
            if target == raw.id {
                warnings.push(BuildWarning::SelfReference {
                    resource_id: raw.id.clone(),
                    field: reference.field,
                });
                continue;
            }

            let (from, to) = if reference.inverse {
                (target, raw.id.clone())
            } else {
                (raw.id.clone(), target)
            };
            let from_type = self.graph.node(&from)?.resource_type.clone();
            let to_type = self.graph.node(&to)?.resource_type.clone();
            let relation = self.classifier.classify(&from_type, &to_type).relation;
            self.graph
                .add_edge(DependencyEdge::new(from, to, relation, source))?;
        }
        Ok(())
    }
}
