//! Statement merging and resource-cap grouping.

use std::collections::{BTreeMap, BTreeSet};

use infragraph_core::types::collections::FxHashMap;

use super::document::{Conditions, Effect, PolicyStatement};

/// ARN up to and including the account field: `arn:aws:dynamodb:us-east-1:*`.
/// Non-ARN strings are their own prefix.
pub fn arn_prefix(arn: &str) -> String {
    let fields: Vec<&str> = arn.splitn(6, ':').collect();
    if fields.len() < 6 {
        return arn.to_string();
    }
    fields[..5].join(":")
}

type MergeKey = (Effect, Vec<String>, Conditions, String);

/// Merge statements with identical effect, actions, and conditions whose
/// first ARN shares a prefix. Order of first appearance is kept.
pub fn merge_statements(statements: Vec<PolicyStatement>) -> Vec<PolicyStatement> {
    let mut slots: FxHashMap<MergeKey, usize> = FxHashMap::default();
    let mut merged: Vec<(PolicyStatement, BTreeSet<String>)> = Vec::new();

    for statement in statements {
        let prefix = statement
            .resource_arns
            .first()
            .map(|a| arn_prefix(a))
            .unwrap_or_default();
        let key = (
            statement.effect,
            statement.actions.clone(),
            statement.conditions.clone(),
            prefix,
        );
        match slots.get(&key) {
            Some(&slot) => {
                merged[slot].1.extend(statement.resource_arns);
            }
            None => {
                slots.insert(key, merged.len());
                let arns: BTreeSet<String> = statement.resource_arns.iter().cloned().collect();
                merged.push((statement, arns));
            }
        }
    }

    merged
        .into_iter()
        .map(|(mut statement, arns)| {
            statement.resource_arns = arns.into_iter().collect();
            statement
        })
        .collect()
}

/// Distinct ARNs per prefix, largest group first.
pub fn resource_groupings(statements: &[PolicyStatement]) -> Vec<(String, usize)> {
    let mut groups: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
    for statement in statements {
        for arn in &statement.resource_arns {
            groups.entry(arn_prefix(arn)).or_default().insert(arn);
        }
    }
    let mut out: Vec<(String, usize)> = groups
        .into_iter()
        .map(|(prefix, arns)| (prefix, arns.len()))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}
