//! Reference extraction from raw resource configuration.
//!
//! A field is a reference candidate when its key looks like one (`*_id`,
//! `*_ids`, `*_arn`, `*_arns`, or a well-known key such as `role`), or when
//! its value is recognizably an ARN or an AWS resource id. Values may be a
//! string or an array of strings.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::model::{ConfigMap, TagMap};

static ARN_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^arn:aws[a-zA-Z-]*:[a-z0-9-]+:[a-z0-9-]*:[0-9]*:.+$").ok()
});

static AWS_ID_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(vpc|subnet|sg|i|vol|eni|igw|nat|rtb|acl|ami|snap|lt|eipalloc)-[0-9a-f]{8,17}$")
        .ok()
});

/// Keys that carry a reference without a telltale suffix.
const WELL_KNOWN_KEYS: &[&str] = &[
    "role",
    "security_groups",
    "target_group_arns",
    "event_source_arn",
    "kms_key_id",
    "vpc_security_group_ids",
    "load_balancers",
    "instance_profile",
    "iam_instance_profile",
    "launch_template",
];

/// Keys that identify the resource itself or an account.
const IGNORED_KEYS: &[&str] = &[
    "id",
    "arn",
    "invoke_arn",
    "owner_id",
    "account_id",
    "request_id",
    "client_id",
    "hosted_zone_id",
    "unique_id",
];

/// Tag whose value names the autoscaling group that launched an instance.
/// The edge it implies points from the group to the tagged resource.
pub const ASG_NAME_TAG: &str = "aws:autoscaling:groupName";

/// One reference found on a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Config key or tag name the value came from.
    pub field: String,
    pub value: String,
    /// The edge runs from the referenced resource to the holder.
    pub inverse: bool,
}

pub fn is_arn(value: &str) -> bool {
    ARN_RE.as_ref().is_some_and(|re| re.is_match(value))
}

pub fn is_aws_id(value: &str) -> bool {
    AWS_ID_RE.as_ref().is_some_and(|re| re.is_match(value))
}

/// Whether a value is recognizable on its own as pointing at a resource.
pub fn is_recognized(value: &str) -> bool {
    is_arn(value) || is_aws_id(value)
}

pub fn is_reference_key(key: &str) -> bool {
    if IGNORED_KEYS.contains(&key) {
        return false;
    }
    WELL_KNOWN_KEYS.contains(&key)
        || key.ends_with("_id")
        || key.ends_with("_ids")
        || key.ends_with("_arn")
        || key.ends_with("_arns")
}

/// Extract every reference from a config map and tag set, in key order.
pub fn extract(config: &ConfigMap, tags: &TagMap) -> Vec<Reference> {
    let mut refs = Vec::new();
    for (key, value) in config {
        if IGNORED_KEYS.contains(&key.as_str()) {
            continue;
        }
        let by_key = is_reference_key(key);
        for candidate in string_values(value) {
            if candidate.is_empty() {
                continue;
            }
            if by_key || is_recognized(candidate) {
                refs.push(Reference {
                    field: key.clone(),
                    value: candidate.to_string(),
                    inverse: false,
                });
            }
        }
    }
    if let Some(group) = tags.get(ASG_NAME_TAG) {
        if !group.is_empty() {
            refs.push(Reference {
                field: ASG_NAME_TAG.to_string(),
                value: group.clone(),
                inverse: true,
            });
        }
    }
    refs
}

fn string_values(value: &Value) -> Vec<&str> {
    match value {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

/// ARN without a trailing version or alias qualifier:
/// `arn:aws:lambda:r:1:function:worker:$LATEST` -> `arn:aws:lambda:r:1:function:worker`.
pub fn strip_qualifier(arn: &str) -> Option<&str> {
    let resource = arn.splitn(6, ':').nth(5)?;
    let (base, qualifier) = resource.rsplit_once(':')?;
    if qualifier.is_empty() || !base.contains(|c| c == ':' || c == '/') {
        return None;
    }
    Some(&arn[..arn.len() - qualifier.len() - 1])
}

/// Trailing name segment of an ARN: `arn:aws:iam::1:role/app` -> `app`.
pub fn arn_name(arn: &str) -> Option<&str> {
    let resource = arn.splitn(6, ':').nth(5)?;
    let name = resource.rsplit(|c| c == '/' || c == ':').next()?;
    (!name.is_empty()).then_some(name)
}

const ID_PREFIX_TYPES: &[(&str, &str)] = &[
    ("vpc", "aws_vpc"),
    ("subnet", "aws_subnet"),
    ("sg", "aws_security_group"),
    ("i", "aws_instance"),
    ("vol", "aws_ebs_volume"),
    ("eni", "aws_network_interface"),
    ("igw", "aws_internet_gateway"),
    ("nat", "aws_nat_gateway"),
    ("rtb", "aws_route_table"),
    ("acl", "aws_network_acl"),
    ("ami", "aws_ami"),
    ("snap", "aws_ebs_snapshot"),
    ("lt", "aws_launch_template"),
    ("eipalloc", "aws_eip"),
];

/// `(service, resource prefix, type)`. An empty prefix matches anything.
const ARN_TYPES: &[(&str, &str, &str)] = &[
    ("s3", "", "aws_s3_bucket"),
    ("kms", "key/", "aws_kms_key"),
    ("kms", "alias/", "aws_kms_alias"),
    ("iam", "role/", "aws_iam_role"),
    ("iam", "instance-profile/", "aws_iam_instance_profile"),
    ("iam", "policy/", "aws_iam_policy"),
    ("lambda", "function:", "aws_lambda_function"),
    ("dynamodb", "table/", "aws_dynamodb_table"),
    ("sqs", "", "aws_sqs_queue"),
    ("sns", "", "aws_sns_topic"),
    ("secretsmanager", "secret:", "aws_secretsmanager_secret"),
    ("rds", "db:", "aws_db_instance"),
    ("rds", "cluster:", "aws_rds_cluster"),
    ("logs", "log-group:", "aws_cloudwatch_log_group"),
    ("ssm", "parameter/", "aws_ssm_parameter"),
    ("kinesis", "stream/", "aws_kinesis_stream"),
    ("elasticloadbalancing", "loadbalancer/", "aws_lb"),
    ("elasticloadbalancing", "targetgroup/", "aws_lb_target_group"),
    ("ecr", "repository/", "aws_ecr_repository"),
    ("acm", "certificate/", "aws_acm_certificate"),
    ("ec2", "instance/", "aws_instance"),
    ("ec2", "security-group/", "aws_security_group"),
    ("ec2", "subnet/", "aws_subnet"),
    ("ec2", "vpc/", "aws_vpc"),
];

/// Best-effort resource type for an out-of-scope reference.
pub fn infer_type(value: &str) -> Option<&'static str> {
    if is_arn(value) {
        let mut parts = value.splitn(6, ':');
        let service = parts.nth(2)?;
        let resource = parts.nth(2)?;
        return ARN_TYPES
            .iter()
            .find(|(s, prefix, _)| *s == service && resource.starts_with(prefix))
            .map(|&(_, _, t)| t);
    }
    if is_aws_id(value) {
        let prefix = value.split('-').next()?;
        return ID_PREFIX_TYPES
            .iter()
            .find(|(p, _)| *p == prefix)
            .map(|&(_, t)| t);
    }
    None
}
