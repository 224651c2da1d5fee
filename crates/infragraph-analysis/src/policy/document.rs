//! IAM policy document types.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::scope::PolicyScope;

/// Condition block: operator -> key -> values, e.g.
/// `StringEquals -> kms:ViaService -> [s3.us-east-1.amazonaws.com]`.
pub type Conditions = BTreeMap<String, BTreeMap<String, Vec<String>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// One statement. `actions` and `resource_arns` are sorted and unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyStatement {
    pub effect: Effect,
    pub actions: Vec<String>,
    pub resource_arns: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub conditions: Conditions,
}

impl PolicyStatement {
    pub fn allow<A, R>(actions: A, resource_arns: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        let actions: BTreeSet<String> = actions.into_iter().map(Into::into).collect();
        let arns: BTreeSet<String> = resource_arns.into_iter().map(Into::into).collect();
        Self {
            effect: Effect::Allow,
            actions: actions.into_iter().collect(),
            resource_arns: arns.into_iter().collect(),
            conditions: Conditions::new(),
        }
    }

    pub fn with_condition(
        mut self,
        operator: impl Into<String>,
        key: impl Into<String>,
        values: Vec<String>,
    ) -> Self {
        self.conditions
            .entry(operator.into())
            .or_default()
            .insert(key.into(), values);
        self
    }
}

/// A generated policy plus how far it can be trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IamPolicyDocument {
    pub statements: Vec<PolicyStatement>,
    /// False when the resource cap was exceeded.
    pub is_least_privilege: bool,
    pub warnings: Vec<String>,
}

impl IamPolicyDocument {
    /// Distinct resource ARNs across all statements.
    pub fn resource_count(&self) -> usize {
        self.resource_arns().len()
    }

    pub fn resource_arns(&self) -> BTreeSet<&str> {
        self.statements
            .iter()
            .flat_map(|s| s.resource_arns.iter().map(String::as_str))
            .collect()
    }

    /// Distinct actions across all statements.
    pub fn actions(&self) -> BTreeSet<&str> {
        self.statements
            .iter()
            .flat_map(|s| s.actions.iter().map(String::as_str))
            .collect()
    }

    /// Whether any statement grants `action` on `arn`.
    pub fn grants(&self, action: &str, arn: &str) -> bool {
        self.statements.iter().any(|s| {
            s.effect == Effect::Allow
                && s.actions.iter().any(|a| a == action)
                && s.resource_arns.iter().any(|r| r == arn)
        })
    }

    /// AWS JSON policy shape (`Version`, `Statement`).
    pub fn to_aws_json(&self) -> serde_json::Value {
        let statements: Vec<serde_json::Value> = self
            .statements
            .iter()
            .map(|s| {
                let effect = match s.effect {
                    Effect::Allow => "Allow",
                    Effect::Deny => "Deny",
                };
                let mut obj = serde_json::json!({
                    "Effect": effect,
                    "Action": s.actions,
                    "Resource": s.resource_arns,
                });
                if !s.conditions.is_empty() {
                    obj["Condition"] = serde_json::json!(s.conditions);
                }
                obj
            })
            .collect();
        serde_json::json!({
            "Version": "2012-10-17",
            "Statement": statements,
        })
    }
}

/// Inputs to one `generate` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRequest {
    pub principal_id: String,
    pub scope: PolicyScope,
    pub max_depth: u32,
    pub include_networking: bool,
    pub use_baseline_fallback: bool,
}

impl PolicyRequest {
    /// Request with the default depth (4), no networking, baseline fallback on.
    pub fn new(principal_id: impl Into<String>, scope: PolicyScope) -> Self {
        Self {
            principal_id: principal_id.into(),
            scope,
            max_depth: 4,
            include_networking: false,
            use_baseline_fallback: true,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_networking(mut self, include: bool) -> Self {
        self.include_networking = include;
        self
    }

    pub fn with_baseline_fallback(mut self, enabled: bool) -> Self {
        self.use_baseline_fallback = enabled;
        self
    }
}
