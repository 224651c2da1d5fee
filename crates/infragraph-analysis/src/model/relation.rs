//! Relation kinds, traversal boundary classes, and typed edges.

use serde::{Deserialize, Serialize};

/// How one resource relates to another along a directed edge `from -> to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationType {
    /// `from` controls the lifecycle of `to` (autoscaling group -> instance).
    Manager,
    /// `from` invokes or reads `to`.
    Consumer,
    /// `from` requires `to` to function.
    Dependency,
    /// `to` is placement context for `from` (VPC, subnet, security group).
    Network,
    /// `to` is permission context for `from` (IAM role, KMS key).
    Identity,
}

impl RelationType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Consumer => "consumer",
            Self::Dependency => "dependency",
            Self::Network => "network",
            Self::Identity => "identity",
        }
    }

    /// Reporting precedence when several edges join the same pair.
    /// MANAGER > DEPENDENCY > CONSUMER > NETWORK > IDENTITY.
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Manager => 5,
            Self::Dependency => 4,
            Self::Consumer => 3,
            Self::Network => 2,
            Self::Identity => 1,
        }
    }

    /// Pick the relation with the higher reporting precedence.
    pub fn strongest(self, other: RelationType) -> RelationType {
        if other.precedence() > self.precedence() {
            other
        } else {
            self
        }
    }

    /// All relation types, highest precedence first.
    pub fn all() -> &'static [RelationType] {
        &[
            Self::Manager,
            Self::Dependency,
            Self::Consumer,
            Self::Network,
            Self::Identity,
        ]
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether forward traversal may continue past a resource of a given type.
///
/// Derived per resource type by the classifier, never stored on nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoundaryClass {
    /// Another compute principal. Stop, grant nothing.
    Terminal,
    /// Store, queue, or table. Grant, then stop.
    Data,
    /// Key or secret. Always pulled in beside what it protects, then stop.
    Security,
    /// Network or placement scaffolding. Pass through, never grant.
    Transitive,
}

impl BoundaryClass {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Terminal => "terminal",
            Self::Data => "data",
            Self::Security => "security",
            Self::Transitive => "transitive",
        }
    }

    /// Whether reaching this class can contribute a policy statement.
    pub fn is_permission_target(&self) -> bool {
        matches!(self, Self::Data | Self::Security)
    }
}

impl std::fmt::Display for BoundaryClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Where an edge was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeSource {
    StaticConfig,
    LiveLookup,
}

/// A directed, typed relation between two resources in the same graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub from_id: String,
    pub to_id: String,
    pub relation: RelationType,
    pub source: EdgeSource,
}

impl DependencyEdge {
    pub fn new(
        from_id: impl Into<String>,
        to_id: impl Into<String>,
        relation: RelationType,
        source: EdgeSource,
    ) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            relation,
            source,
        }
    }

    /// Edge discovered from scanned configuration.
    pub fn static_config(
        from_id: impl Into<String>,
        to_id: impl Into<String>,
        relation: RelationType,
    ) -> Self {
        Self::new(from_id, to_id, relation, EdgeSource::StaticConfig)
    }
}
