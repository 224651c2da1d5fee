//! Per-type base criticality and the user-facing type set.

use infragraph_core::errors::AnalysisError;
use infragraph_core::types::collections::{FxHashMap, FxHashSet};

use crate::classifier::TypePattern;

/// Weight for types no rule mentions.
pub const DEFAULT_CRITICALITY: f64 = 0.3;

const EXACT_WEIGHTS: &[(&str, f64)] = &[
    ("aws_lb", 0.95),
    ("aws_alb", 0.95),
    ("aws_elb", 0.95),
    ("aws_api_gateway_rest_api", 0.95),
    ("aws_apigatewayv2_api", 0.95),
    ("aws_cloudfront_distribution", 0.95),
    ("aws_db_instance", 0.8),
    ("aws_rds_cluster", 0.8),
    ("aws_dynamodb_table", 0.75),
    ("aws_autoscaling_group", 0.7),
    ("aws_kms_key", 0.7),
    ("aws_ecs_service", 0.65),
    ("aws_s3_bucket", 0.6),
    ("aws_iam_role", 0.6),
    ("aws_secretsmanager_secret", 0.6),
    ("aws_lambda_function", 0.55),
    ("aws_sqs_queue", 0.55),
    ("aws_sns_topic", 0.55),
    ("aws_instance", 0.5),
    ("aws_ecs_task_definition", 0.5),
];

const PATTERN_WEIGHTS: &[(&str, f64)] = &[
    ("*_vpc", 0.4),
    ("*_subnet", 0.4),
    ("*_security_group", 0.4),
    ("*_route_table", 0.4),
    ("*_nat_gateway", 0.4),
    ("*_tag", 0.1),
    ("*_tags", 0.1),
];

const USER_FACING_TYPES: &[&str] = &[
    "aws_lb",
    "aws_alb",
    "aws_elb",
    "aws_api_gateway_rest_api",
    "aws_apigatewayv2_api",
    "aws_cloudfront_distribution",
];

const USER_FACING_PATTERNS: &[&str] = &["*_api_gateway_*", "*_cloudfront_*"];

/// Data-driven criticality lookup: exact type, then first matching pattern,
/// then the default weight. Weights are in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct CriticalityTable {
    exact: FxHashMap<String, f64>,
    patterns: Vec<(TypePattern, f64)>,
    default: f64,
    user_facing: FxHashSet<String>,
    user_facing_patterns: Vec<TypePattern>,
}

impl CriticalityTable {
    pub fn empty(default: f64) -> Self {
        Self {
            exact: FxHashMap::default(),
            patterns: Vec::new(),
            default: default.clamp(0.0, 1.0),
            user_facing: FxHashSet::default(),
            user_facing_patterns: Vec::new(),
        }
    }

    pub fn set_weight(&mut self, resource_type: impl Into<String>, weight: f64) -> &mut Self {
        self.exact.insert(resource_type.into(), weight.clamp(0.0, 1.0));
        self
    }

    pub fn add_pattern(&mut self, pattern: &str, weight: f64) -> Result<&mut Self, AnalysisError> {
        self.patterns
            .push((TypePattern::new(pattern)?, weight.clamp(0.0, 1.0)));
        Ok(self)
    }

    /// Mark a type as user-facing. Reaching one forces CRITICAL severity.
    pub fn mark_user_facing(&mut self, resource_type: impl Into<String>) -> &mut Self {
        self.user_facing.insert(resource_type.into());
        self
    }

    pub fn weight(&self, resource_type: &str) -> f64 {
        if let Some(&w) = self.exact.get(resource_type) {
            return w;
        }
        self.patterns
            .iter()
            .find(|(p, _)| p.matches(resource_type))
            .map_or(self.default, |&(_, w)| w)
    }

    pub fn is_user_facing(&self, resource_type: &str) -> bool {
        self.user_facing.contains(resource_type)
            || self
                .user_facing_patterns
                .iter()
                .any(|p| p.matches(resource_type))
    }
}

impl Default for CriticalityTable {
    fn default() -> Self {
        let mut table = Self::empty(DEFAULT_CRITICALITY);
        for &(t, w) in EXACT_WEIGHTS {
            table.set_weight(t, w);
        }
        for &(p, w) in PATTERN_WEIGHTS {
            table.patterns.push((TypePattern::builtin(p), w));
        }
        for &t in USER_FACING_TYPES {
            table.mark_user_facing(t);
        }
        table.user_facing_patterns = USER_FACING_PATTERNS
            .iter()
            .map(|p| TypePattern::builtin(p))
            .collect();
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_then_pattern_then_default() {
        let t = CriticalityTable::default();
        assert_eq!(t.weight("aws_lb"), 0.95);
        assert_eq!(t.weight("aws_default_security_group"), 0.4);
        assert_eq!(t.weight("aws_ec2_tag"), 0.1);
        assert_eq!(t.weight("aws_glue_job"), DEFAULT_CRITICALITY);
    }

    #[test]
    fn front_doors_are_user_facing() {
        let t = CriticalityTable::default();
        assert!(t.is_user_facing("aws_lb"));
        assert!(t.is_user_facing("aws_cloudfront_distribution"));
        assert!(t.is_user_facing("aws_api_gateway_stage"));
        assert!(!t.is_user_facing("aws_instance"));
    }

    #[test]
    fn weights_are_clamped() {
        let mut t = CriticalityTable::empty(0.2);
        t.set_weight("x", 4.0);
        assert_eq!(t.weight("x"), 1.0);
    }
}
