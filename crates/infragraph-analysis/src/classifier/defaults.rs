//! Built-in AWS classification rules.

use crate::model::{BoundaryClass, RelationType};

use super::registry::RelationClassifier;

use BoundaryClass::{Data, Security, Terminal, Transitive};
use RelationType::{Consumer, Dependency, Identity, Manager, Network};

/// Compute principals and the surfaces that front them. Traversal stops here.
const TERMINAL_TYPES: &[&str] = &[
    "aws_lambda_function",
    "aws_instance",
    "aws_ecs_service",
    "aws_ecs_task_definition",
    "aws_ecs_task",
    "aws_batch_job_definition",
    "aws_autoscaling_group",
    "aws_lb",
    "aws_alb",
    "aws_elb",
    "aws_api_gateway_rest_api",
    "aws_apigatewayv2_api",
    "aws_cloudfront_distribution",
];

const DATA_TYPES: &[&str] = &[
    "aws_s3_bucket",
    "aws_dynamodb_table",
    "aws_sqs_queue",
    "aws_sns_topic",
    "aws_kinesis_stream",
    "aws_db_instance",
    "aws_rds_cluster",
    "aws_ssm_parameter",
    "aws_efs_file_system",
    "aws_cloudwatch_log_group",
    "aws_ecr_repository",
];

const SECURITY_TYPES: &[(&str, RelationType)] = &[
    ("aws_secretsmanager_secret", Dependency),
    ("aws_acm_certificate", Dependency),
    ("aws_iam_policy", Identity),
];

/// Scaffolding that is passed through. Instance profiles lead to roles and
/// launch templates to profiles, so both continue.
const TRANSITIVE_TYPES: &[(&str, RelationType)] = &[
    ("aws_iam_instance_profile", Identity),
    ("aws_launch_template", Dependency),
    ("aws_lb_target_group", Dependency),
    ("aws_lambda_event_source_mapping", Dependency),
];

const NETWORK_PATTERNS: &[&str] = &[
    "*_vpc",
    "*_subnet",
    "*_security_group",
    "*_network_interface",
    "*_route_table",
    "*_nat_gateway",
    "*_internet_gateway",
    "*_vpc_endpoint",
    "*_network_acl",
];

const IDENTITY_PATTERNS: &[&str] = &["*_iam_role", "*_kms_key", "*_kms_alias"];

const PAIRS: &[(&str, &str, RelationType)] = &[
    ("aws_autoscaling_group", "aws_instance", Manager),
    ("aws_autoscaling_group", "aws_launch_template", Dependency),
    ("aws_lb", "aws_autoscaling_group", Manager),
    ("aws_alb", "aws_autoscaling_group", Manager),
    ("aws_lb", "aws_lb_target_group", Manager),
    ("aws_alb", "aws_lb_target_group", Manager),
    ("aws_lb_target_group", "aws_instance", Manager),
    ("aws_lb_target_group", "aws_autoscaling_group", Manager),
    ("aws_ecs_service", "aws_ecs_task_definition", Manager),
    ("aws_api_gateway_rest_api", "aws_lambda_function", Consumer),
    ("aws_apigatewayv2_api", "aws_lambda_function", Consumer),
    ("aws_cloudfront_distribution", "aws_s3_bucket", Consumer),
    ("aws_cloudfront_distribution", "aws_lb", Consumer),
    ("aws_cloudfront_distribution", "aws_api_gateway_rest_api", Consumer),
    ("aws_sns_topic", "aws_lambda_function", Consumer),
    ("aws_sns_topic", "aws_sqs_queue", Consumer),
    ("aws_lambda_event_source_mapping", "aws_lambda_function", Consumer),
];

/// The default AWS classifier.
pub fn aws_classifier() -> RelationClassifier {
    let mut c = RelationClassifier::empty();

    for &t in TERMINAL_TYPES {
        c.register_type(t, Dependency, Terminal);
    }
    for &t in DATA_TYPES {
        c.register_type(t, Dependency, Data);
    }
    for &(t, relation) in SECURITY_TYPES {
        c.register_type(t, relation, Security);
    }
    for &(t, relation) in TRANSITIVE_TYPES {
        c.register_type(t, relation, Transitive);
    }
    for &p in NETWORK_PATTERNS {
        c.push_builtin_pattern(p, Network, Transitive);
    }
    for &p in IDENTITY_PATTERNS {
        c.push_builtin_pattern(p, Identity, Security);
    }
    for &(from, to, relation) in PAIRS {
        c.register_pair(from, to, relation);
    }

    c
}
