//! Impact analysis types: affected resources and severity.

use std::collections::BTreeMap;

use infragraph_core::types::collections::SmallVec4;
use serde::{Deserialize, Serialize};

use crate::model::RelationType;

/// Overall blast radius severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A resource that would be affected by changing the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectedResource {
    pub id: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Relations walked from the root outward, one per hop. Each entry is the
    /// strongest relation joining the dependent to the resource before it.
    pub relation_path: SmallVec4<RelationType>,
    /// Hops from the root, starting at 1.
    pub depth: u32,
    /// Base criticality scaled by depth decay.
    pub criticality: f64,
    /// The resource through which this one was reached.
    pub parent_id: String,
    /// Load balancer, API gateway, or CDN distribution.
    pub user_facing: bool,
}

impl AffectedResource {
    /// Relation of the final hop.
    pub fn relation(&self) -> Option<RelationType> {
        self.relation_path.last().copied()
    }
}

/// Blast radius of a change to one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactReport {
    pub root_id: String,
    /// Breadth-first order: by depth, then by edge insertion order.
    pub affected: Vec<AffectedResource>,
    pub severity: Severity,
    /// Maximum depth-scaled criticality across `affected`. Zero when empty.
    pub score: f64,
    /// Deepest hop actually reached.
    pub max_depth_reached: u32,
    /// Affected count per resource type.
    pub by_type: BTreeMap<String, usize>,
}

impl ImpactReport {
    pub fn affected_count(&self) -> usize {
        self.affected.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.affected.iter().any(|a| a.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&AffectedResource> {
        self.affected.iter().find(|a| a.id == id)
    }

    /// Affected resources classified user-facing.
    pub fn user_facing(&self) -> impl Iterator<Item = &AffectedResource> {
        self.affected.iter().filter(|a| a.user_facing)
    }
}
