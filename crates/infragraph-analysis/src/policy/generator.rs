//! LeastPrivilegePolicyGenerator: forward boundary-gated traversal.
//!
//! From the principal, follow `DEPENDENCY` and `IDENTITY` edges (plus
//! `NETWORK` when asked) breadth-first. The boundary class of each entered
//! node decides what happens next:
//!
//! | class        | statement | continue |
//! |--------------|-----------|----------|
//! | `TERMINAL`   | no        | no       |
//! | `DATA`       | yes       | no       |
//! | `SECURITY`   | yes       | no       |
//! | `TRANSITIVE` | no        | yes      |
//!
//! Security resources reachable from a granted data store, or from a node
//! entered over an identity edge, are pulled in regardless of depth.

use std::collections::{BTreeSet, VecDeque};
use std::time::Instant;

use infragraph_core::config::PolicyConfig;
use infragraph_core::errors::AnalysisError;
use infragraph_core::tracing::metrics;
use infragraph_core::types::collections::{FxHashMap, FxHashSet};
use petgraph::graph::NodeIndex;
use petgraph::Direction;
use tracing::{debug, info, warn};

use crate::classifier::RelationClassifier;
use crate::graph::{Neighbor, ResourceGraph};
use crate::model::{BoundaryClass, RelationType, ResourceNode};

use super::catalog::ActionCatalog;
use super::document::{IamPolicyDocument, PolicyRequest, PolicyStatement};
use super::merge;
use super::scope::PolicyScope;

/// Actions every execution role needs to write its own logs.
const BASELINE_ACTIONS: &[&str] = &[
    "logs:CreateLogGroup",
    "logs:CreateLogStream",
    "logs:PutLogEvents",
];

/// Baseline actions that write, whatever the requested scope.
const BASELINE_WRITE_ACTIONS: &[&str] = &["logs:CreateLogStream", "logs:PutLogEvents"];

/// Synthesizes the minimal policy a compute principal needs.
#[derive(Debug, Clone)]
pub struct LeastPrivilegePolicyGenerator {
    classifier: RelationClassifier,
    catalog: ActionCatalog,
    config: PolicyConfig,
}

impl Default for LeastPrivilegePolicyGenerator {
    fn default() -> Self {
        Self::new(RelationClassifier::default(), &PolicyConfig::default())
    }
}

/// One resource that will receive a statement.
#[derive(Debug)]
struct Grant {
    index: NodeIndex,
    /// Reached directly rather than pulled in beside a data store.
    direct: bool,
    /// `service.region.amazonaws.com` values for a ViaService condition.
    via_services: BTreeSet<String>,
}

/// Per-call traversal state.
struct Walk<'g> {
    graph: &'g ResourceGraph,
    grants: Vec<Grant>,
    slots: FxHashMap<NodeIndex, usize>,
    warnings: Vec<String>,
}

impl<'g> Walk<'g> {
    fn grant(&mut self, index: NodeIndex, via_service: Option<String>) {
        let slot = match self.slots.get(&index) {
            Some(&slot) => slot,
            None => {
                self.slots.insert(index, self.grants.len());
                self.grants.push(Grant {
                    index,
                    direct: false,
                    via_services: BTreeSet::new(),
                });
                self.grants.len() - 1
            }
        };
        let grant = &mut self.grants[slot];
        match via_service {
            Some(service) => {
                grant.via_services.insert(service);
            }
            None => grant.direct = true,
        }
    }
}

impl LeastPrivilegePolicyGenerator {
    pub fn new(classifier: RelationClassifier, config: &PolicyConfig) -> Self {
        Self {
            classifier,
            catalog: ActionCatalog::aws(),
            config: config.clone(),
        }
    }

    pub fn with_catalog(mut self, catalog: ActionCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    /// A request for `principal_id` filled from the configured defaults.
    pub fn request(&self, principal_id: impl Into<String>, scope: PolicyScope) -> PolicyRequest {
        PolicyRequest::new(principal_id, scope)
            .with_max_depth(self.config.effective_default_max_depth())
            .with_networking(self.config.effective_include_networking())
            .with_baseline_fallback(self.config.effective_use_baseline_fallback())
    }

    /// Generate from a scope given as text (`RUNTIME_READ`, `runtime-read`).
    pub fn generate_scoped(
        &self,
        graph: &ResourceGraph,
        principal_id: &str,
        scope: &str,
        max_depth: u32,
        include_networking: bool,
        use_baseline_fallback: bool,
    ) -> Result<IamPolicyDocument, AnalysisError> {
        let scope: PolicyScope = scope.parse()?;
        let request = PolicyRequest::new(principal_id, scope)
            .with_max_depth(max_depth)
            .with_networking(include_networking)
            .with_baseline_fallback(use_baseline_fallback);
        self.generate(graph, &request)
    }

    pub fn generate(
        &self,
        graph: &ResourceGraph,
        request: &PolicyRequest,
    ) -> Result<IamPolicyDocument, AnalysisError> {
        if request.max_depth == 0 {
            return Err(AnalysisError::validation("max_depth", "must be at least 1"));
        }
        let principal = graph
            .index_of(&request.principal_id)
            .ok_or_else(|| AnalysisError::NotFound {
                id: request.principal_id.clone(),
            })?;

        let start = Instant::now();
        let principal_node = graph.node_at(principal);
        let mut walk = Walk {
            graph,
            grants: Vec::new(),
            slots: FxHashMap::default(),
            warnings: Vec::new(),
        };
        if self.classifier.boundary_of(&principal_node.resource_type) != BoundaryClass::Terminal {
            walk.warnings.push(format!(
                "{} ({}) is not a compute principal",
                principal_node.id, principal_node.resource_type
            ));
        }

        self.traverse(&mut walk, principal, request);

        let statements = self.statements(&mut walk, request.scope);
        let Walk {
            grants, mut warnings, ..
        } = walk;

        if statements.is_empty() {
            if !request.use_baseline_fallback {
                return Err(AnalysisError::NoDependenciesFound {
                    principal_id: request.principal_id.clone(),
                });
            }
            info!(principal = %request.principal_id, "no dependencies found, using baseline policy");
            warnings.push(format!(
                "No permission-bearing dependencies found for {}; returning baseline execution policy",
                request.principal_id
            ));
            if !(request.scope.is_runtime() && request.scope.includes_write()) {
                warnings.push(format!(
                    "Baseline execution policy grants log-write actions ({}) under {}",
                    BASELINE_WRITE_ACTIONS.join(", "),
                    request.scope
                ));
            }
            return Ok(IamPolicyDocument {
                statements: vec![baseline_statement(principal_node)],
                is_least_privilege: true,
                warnings,
            });
        }

        let statements = if self.config.effective_merge_statements() {
            merge::merge_statements(statements)
        } else {
            statements
        };

        let cap = self.config.effective_max_resources();
        let mut is_least_privilege = true;
        if grants.len() > cap {
            is_least_privilege = false;
            warn!(
                principal = %request.principal_id,
                resources = grants.len(),
                cap,
                "policy resource cap exceeded"
            );
            warnings.push(format!(
                "Policy for {} covers {} resources, above the cap of {}",
                request.principal_id,
                grants.len(),
                cap
            ));
            for (prefix, count) in merge::resource_groupings(&statements) {
                warnings.push(format!("{count} resource ARNs under {prefix}"));
            }
        }

        debug!(
            principal = %request.principal_id,
            scope = %request.scope,
            { metrics::STATEMENT_COUNT } = statements.len(),
            { metrics::POLICY_GENERATION_TIME } = start.elapsed().as_micros() as u64,
            "policy generated"
        );

        Ok(IamPolicyDocument {
            statements,
            is_least_privilege,
            warnings,
        })
    }

    fn follows(&self, relation: RelationType, include_networking: bool) -> bool {
        match relation {
            RelationType::Dependency | RelationType::Identity => true,
            RelationType::Network => include_networking,
            RelationType::Manager | RelationType::Consumer => false,
        }
    }

    fn traverse(&self, walk: &mut Walk<'_>, principal: NodeIndex, request: &PolicyRequest) {
        let graph = walk.graph;
        let mut visited = FxHashSet::default();
        let mut queue: VecDeque<(NodeIndex, u32)> = VecDeque::new();
        visited.insert(principal);
        queue.push_back((principal, 0));

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= request.max_depth {
                continue;
            }
            for neighbor in graph.neighbors(current, Direction::Outgoing) {
                let Some(via_identity) = self.entry_kind(&neighbor, request.include_networking)
                else {
                    continue;
                };
                if !visited.insert(neighbor.index) {
                    continue;
                }
                let node = graph.node_at(neighbor.index);
                if node.external {
                    walk.warnings.push(format!(
                        "Skipped out-of-scope resource {} ({})",
                        node.id, node.resource_type
                    ));
                    continue;
                }
                match self.classifier.boundary_of(&node.resource_type) {
                    BoundaryClass::Terminal => {}
                    BoundaryClass::Data => {
                        walk.grant(neighbor.index, None);
                        let via = self.via_service(node);
                        self.pull_security(walk, neighbor.index, via);
                    }
                    BoundaryClass::Security => {
                        walk.grant(neighbor.index, None);
                        if via_identity {
                            self.pull_security(walk, neighbor.index, None);
                        }
                    }
                    BoundaryClass::Transitive => {
                        if via_identity {
                            self.pull_security(walk, neighbor.index, None);
                        }
                        queue.push_back((neighbor.index, depth + 1));
                    }
                }
            }
        }
    }

    /// `None` when no followed relation joins the pair, otherwise whether an
    /// identity edge is among them.
    fn entry_kind(&self, neighbor: &Neighbor, include_networking: bool) -> Option<bool> {
        let mut followed = neighbor
            .relations
            .iter()
            .filter(|&&r| self.follows(r, include_networking))
            .peekable();
        followed.peek()?;
        Some(followed.any(|&r| r == RelationType::Identity))
    }

    /// ViaService endpoint for keys protecting `node`, if its region is known.
    fn via_service(&self, node: &ResourceNode) -> Option<String> {
        let entry = self.catalog.get(&node.resource_type)?;
        if node.region.is_empty() {
            return None;
        }
        Some(format!("{}.{}.amazonaws.com", entry.service, node.region))
    }

    /// Grant every security resource reachable from `from` over dependency
    /// and identity edges, passing through transitive scaffolding only.
    fn pull_security(&self, walk: &mut Walk<'_>, from: NodeIndex, via: Option<String>) {
        let graph = walk.graph;
        let mut seen = FxHashSet::default();
        let mut queue = VecDeque::new();
        seen.insert(from);
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            for neighbor in graph.neighbors(current, Direction::Outgoing) {
                if self.entry_kind(&neighbor, false).is_none() || !seen.insert(neighbor.index) {
                    continue;
                }
                let node = graph.node_at(neighbor.index);
                if node.external {
                    continue;
                }
                match self.classifier.boundary_of(&node.resource_type) {
                    BoundaryClass::Security => walk.grant(neighbor.index, via.clone()),
                    BoundaryClass::Transitive => queue.push_back(neighbor.index),
                    BoundaryClass::Terminal | BoundaryClass::Data => {}
                }
            }
        }
    }

    fn statements(&self, walk: &mut Walk<'_>, scope: PolicyScope) -> Vec<PolicyStatement> {
        let graph = walk.graph;
        let mut statements = Vec::new();
        for grant in &walk.grants {
            let node = graph.node_at(grant.index);
            let Some(entry) = self.catalog.get(&node.resource_type) else {
                walk.warnings.push(format!(
                    "No action catalog entry for {} ({}); no statement emitted",
                    node.id, node.resource_type
                ));
                continue;
            };

            let mut actions = entry.actions_for(scope);
            let security = self.classifier.boundary_of(&node.resource_type) == BoundaryClass::Security;
            if actions.is_empty() && security {
                // Encryption dependencies are granted even when the scope selects nothing.
                actions = if scope.is_runtime() {
                    entry.read.clone()
                } else {
                    entry.infra_read.clone()
                };
            }
            if actions.is_empty() {
                continue;
            }

            let Some(arns) = entry.resource_arns(node, scope) else {
                walk.warnings.push(format!(
                    "No ARN known for {} ({}); statement skipped",
                    node.id, node.resource_type
                ));
                continue;
            };

            let mut statement = PolicyStatement::allow(actions, arns);
            if !grant.direct && entry.via_service_condition && !grant.via_services.is_empty() {
                statement = statement.with_condition(
                    "StringEquals",
                    format!("{}:ViaService", entry.service),
                    grant.via_services.iter().cloned().collect(),
                );
            }
            statements.push(statement);
        }
        statements
    }
}

fn baseline_statement(principal: &ResourceNode) -> PolicyStatement {
    let region = if principal.region.is_empty() {
        "*"
    } else {
        principal.region.as_str()
    };
    PolicyStatement::allow(
        BASELINE_ACTIONS.iter().copied(),
        [format!("arn:aws:logs:{region}:*:*")],
    )
}
