//! Three-layer classification registry.
//!
//! Relation lookup for a pair `(from_type, to_type)`:
//! 1. exact pair rule, then exact target-type rule
//! 2. first matching category pattern, in registration order
//! 3. default `DEPENDENCY`
//!
//! Boundary class is a property of the target type alone and skips the
//! pair layer: exact type rule, then pattern, then default `DATA`.

use infragraph_core::errors::AnalysisError;
use infragraph_core::types::collections::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::model::{BoundaryClass, RelationType};

use super::pattern::TypePattern;

/// Relation kind and boundary class for one `from -> to` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Classification {
    pub relation: RelationType,
    pub boundary: BoundaryClass,
}

impl Classification {
    pub const fn new(relation: RelationType, boundary: BoundaryClass) -> Self {
        Self { relation, boundary }
    }

    /// Fallback for types no rule mentions.
    pub const DEFAULT: Classification =
        Classification::new(RelationType::Dependency, BoundaryClass::Data);
}

#[derive(Debug, Clone)]
struct PatternRule {
    pattern: TypePattern,
    classification: Classification,
}

/// Registry of classification rules.
///
/// `RelationClassifier::default()` ships the AWS rule set from
/// [`super::defaults`]; `RelationClassifier::empty()` starts bare.
#[derive(Debug, Clone)]
pub struct RelationClassifier {
    pairs: FxHashMap<(String, String), RelationType>,
    types: FxHashMap<String, Classification>,
    patterns: Vec<PatternRule>,
    fallback: Classification,
}

impl RelationClassifier {
    /// A classifier with no rules: every pair is `DEPENDENCY`/`DATA`.
    pub fn empty() -> Self {
        Self {
            pairs: FxHashMap::default(),
            types: FxHashMap::default(),
            patterns: Vec::new(),
            fallback: Classification::DEFAULT,
        }
    }

    /// Register the relation for an exact `(from_type, to_type)` pair.
    /// Replaces any earlier rule for the same pair.
    pub fn register_pair(
        &mut self,
        from_type: impl Into<String>,
        to_type: impl Into<String>,
        relation: RelationType,
    ) -> &mut Self {
        self.pairs.insert((from_type.into(), to_type.into()), relation);
        self
    }

    /// Register relation and boundary for a target type regardless of source.
    /// Replaces any earlier rule for the same type.
    pub fn register_type(
        &mut self,
        resource_type: impl Into<String>,
        relation: RelationType,
        boundary: BoundaryClass,
    ) -> &mut Self {
        self.types
            .insert(resource_type.into(), Classification::new(relation, boundary));
        self
    }

    /// Register a category pattern such as `*_security_group`. Patterns are
    /// consulted in registration order; the first match wins.
    pub fn register_pattern(
        &mut self,
        pattern: &str,
        relation: RelationType,
        boundary: BoundaryClass,
    ) -> Result<&mut Self, AnalysisError> {
        let pattern = TypePattern::new(pattern)?;
        self.patterns.push(PatternRule {
            pattern,
            classification: Classification::new(relation, boundary),
        });
        Ok(self)
    }

    pub(crate) fn push_builtin_pattern(
        &mut self,
        pattern: &'static str,
        relation: RelationType,
        boundary: BoundaryClass,
    ) {
        self.patterns.push(PatternRule {
            pattern: TypePattern::builtin(pattern),
            classification: Classification::new(relation, boundary),
        });
    }

    /// Classify the edge `from_type -> to_type`.
    pub fn classify(&self, from_type: &str, to_type: &str) -> Classification {
        let boundary = self.boundary_of(to_type);
        if let Some(&relation) = self.pairs.get(&(from_type.to_string(), to_type.to_string())) {
            return Classification::new(relation, boundary);
        }
        Classification::new(self.type_rule(to_type).relation, boundary)
    }

    /// Boundary class of a resource type.
    pub fn boundary_of(&self, resource_type: &str) -> BoundaryClass {
        self.type_rule(resource_type).boundary
    }

    fn type_rule(&self, resource_type: &str) -> Classification {
        if let Some(&c) = self.types.get(resource_type) {
            return c;
        }
        self.patterns
            .iter()
            .find(|rule| rule.pattern.matches(resource_type))
            .map(|rule| rule.classification)
            .unwrap_or(self.fallback)
    }

    /// Number of registered rules across all layers.
    pub fn rule_count(&self) -> usize {
        self.pairs.len() + self.types.len() + self.patterns.len()
    }
}

impl Default for RelationClassifier {
    fn default() -> Self {
        super::defaults::aws_classifier()
    }
}
