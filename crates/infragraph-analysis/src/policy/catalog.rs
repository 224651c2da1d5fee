//! Per-type IAM action catalog.
//!
//! Runtime read and write sets never share an action, so a `RUNTIME_READ`
//! policy can be checked for containment by set difference.

use infragraph_core::types::collections::{FxHashMap, FxHashSet};

use crate::model::ResourceNode;

use super::scope::PolicyScope;

/// Actions and ARN shape for one resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEntry {
    /// IAM service prefix, also used for `kms:ViaService` conditions.
    pub service: String,
    pub read: Vec<String>,
    pub write: Vec<String>,
    pub infra_read: Vec<String>,
    pub infra_write: Vec<String>,
    /// Fallback ARN when the node has none. `{region}` and `{name}` are
    /// substituted; the account is wildcarded.
    pub arn_template: Option<String>,
    /// Appended to the ARN for object-level runtime actions (`/*` for S3).
    pub object_suffix: Option<String>,
    /// Grants pulled in beside a data store are limited to calls made
    /// through that store's service.
    pub via_service_condition: bool,
}

impl ActionEntry {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            read: Vec::new(),
            write: Vec::new(),
            infra_read: Vec::new(),
            infra_write: Vec::new(),
            arn_template: None,
            object_suffix: None,
            via_service_condition: false,
        }
    }

    pub fn with_read(mut self, actions: &[&str]) -> Self {
        self.read = owned(actions);
        self
    }

    pub fn with_write(mut self, actions: &[&str]) -> Self {
        self.write = owned(actions);
        self
    }

    pub fn with_infra(mut self, read: &[&str], write: &[&str]) -> Self {
        self.infra_read = owned(read);
        self.infra_write = owned(write);
        self
    }

    pub fn with_arn_template(mut self, template: impl Into<String>) -> Self {
        self.arn_template = Some(template.into());
        self
    }

    pub fn with_object_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.object_suffix = Some(suffix.into());
        self
    }

    pub fn with_via_service_condition(mut self) -> Self {
        self.via_service_condition = true;
        self
    }

    /// Actions granted under `scope`.
    pub fn actions_for(&self, scope: PolicyScope) -> Vec<String> {
        let (read, write) = if scope.is_runtime() {
            (&self.read, &self.write)
        } else {
            (&self.infra_read, &self.infra_write)
        };
        let mut actions = Vec::new();
        if scope.includes_read() {
            actions.extend(read.iter().cloned());
        }
        if scope.includes_write() {
            actions.extend(write.iter().cloned());
        }
        actions
    }

    /// ARNs a statement on `node` covers, or `None` when neither the node
    /// nor the template yields one.
    pub fn resource_arns(&self, node: &ResourceNode, scope: PolicyScope) -> Option<Vec<String>> {
        let arn = node.arn.clone().or_else(|| {
            self.arn_template.as_ref().map(|t| {
                t.replace("{region}", region_or_wildcard(&node.region))
                    .replace("{name}", node.label())
            })
        })?;
        let mut arns = vec![arn.clone()];
        if scope.is_runtime() {
            if let Some(suffix) = &self.object_suffix {
                arns.push(format!("{arn}{suffix}"));
            }
        }
        Some(arns)
    }
}

fn owned(actions: &[&str]) -> Vec<String> {
    actions.iter().map(|a| a.to_string()).collect()
}

fn region_or_wildcard(region: &str) -> &str {
    if region.is_empty() {
        "*"
    } else {
        region
    }
}

/// Registry of action entries keyed by resource type.
#[derive(Debug, Clone, Default)]
pub struct ActionCatalog {
    entries: FxHashMap<String, ActionEntry>,
}

impl ActionCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn register(&mut self, resource_type: impl Into<String>, entry: ActionEntry) -> &mut Self {
        self.entries.insert(resource_type.into(), entry);
        self
    }

    pub fn get(&self, resource_type: &str) -> Option<&ActionEntry> {
        self.entries.get(resource_type)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every runtime and infra write action in the catalog.
    pub fn write_actions(&self) -> FxHashSet<&str> {
        self.entries
            .values()
            .flat_map(|e| e.write.iter().chain(e.infra_write.iter()))
            .map(String::as_str)
            .collect()
    }

    /// The built-in AWS catalog.
    pub fn aws() -> Self {
        let mut c = Self::empty();
        c.register(
            "aws_s3_bucket",
            ActionEntry::new("s3")
                .with_read(&["s3:GetObject", "s3:ListBucket", "s3:GetBucketLocation"])
                .with_write(&["s3:PutObject", "s3:DeleteObject", "s3:AbortMultipartUpload"])
                .with_infra(
                    &["s3:GetBucketPolicy", "s3:GetBucketTagging", "s3:GetEncryptionConfiguration"],
                    &[
                        "s3:PutBucketPolicy",
                        "s3:PutBucketTagging",
                        "s3:PutEncryptionConfiguration",
                        "s3:DeleteBucket",
                    ],
                )
                .with_arn_template("arn:aws:s3:::{name}")
                .with_object_suffix("/*"),
        );
        c.register(
            "aws_dynamodb_table",
            ActionEntry::new("dynamodb")
                .with_read(&[
                    "dynamodb:GetItem",
                    "dynamodb:BatchGetItem",
                    "dynamodb:Query",
                    "dynamodb:Scan",
                    "dynamodb:DescribeTable",
                ])
                .with_write(&[
                    "dynamodb:PutItem",
                    "dynamodb:UpdateItem",
                    "dynamodb:DeleteItem",
                    "dynamodb:BatchWriteItem",
                ])
                .with_infra(
                    &["dynamodb:DescribeContinuousBackups", "dynamodb:ListTagsOfResource"],
                    &["dynamodb:UpdateTable", "dynamodb:DeleteTable", "dynamodb:TagResource"],
                )
                .with_arn_template("arn:aws:dynamodb:{region}:*:table/{name}"),
        );
        c.register(
            "aws_sqs_queue",
            ActionEntry::new("sqs")
                .with_read(&["sqs:ReceiveMessage", "sqs:GetQueueAttributes", "sqs:GetQueueUrl"])
                .with_write(&["sqs:SendMessage", "sqs:DeleteMessage", "sqs:ChangeMessageVisibility"])
                .with_infra(
                    &["sqs:ListQueueTags", "sqs:ListDeadLetterSourceQueues"],
                    &["sqs:SetQueueAttributes", "sqs:DeleteQueue", "sqs:TagQueue"],
                )
                .with_arn_template("arn:aws:sqs:{region}:*:{name}"),
        );
        c.register(
            "aws_sns_topic",
            ActionEntry::new("sns")
                .with_read(&["sns:GetTopicAttributes", "sns:ListSubscriptionsByTopic"])
                .with_write(&["sns:Publish"])
                .with_infra(
                    &["sns:ListTagsForResource"],
                    &["sns:SetTopicAttributes", "sns:DeleteTopic", "sns:Subscribe"],
                )
                .with_arn_template("arn:aws:sns:{region}:*:{name}"),
        );
        c.register(
            "aws_kinesis_stream",
            ActionEntry::new("kinesis")
                .with_read(&[
                    "kinesis:GetRecords",
                    "kinesis:GetShardIterator",
                    "kinesis:DescribeStream",
                    "kinesis:ListShards",
                ])
                .with_write(&["kinesis:PutRecord", "kinesis:PutRecords"])
                .with_infra(
                    &["kinesis:DescribeStreamSummary", "kinesis:ListTagsForStream"],
                    &["kinesis:UpdateShardCount", "kinesis:DeleteStream", "kinesis:AddTagsToStream"],
                )
                .with_arn_template("arn:aws:kinesis:{region}:*:stream/{name}"),
        );
        c.register(
            "aws_ssm_parameter",
            ActionEntry::new("ssm")
                .with_read(&["ssm:GetParameter", "ssm:GetParameters", "ssm:GetParametersByPath"])
                .with_write(&["ssm:PutParameter"])
                .with_infra(
                    &["ssm:ListTagsForResource"],
                    &["ssm:DeleteParameter", "ssm:AddTagsToResource", "ssm:LabelParameterVersion"],
                )
                .with_arn_template("arn:aws:ssm:{region}:*:parameter/{name}"),
        );
        c.register(
            "aws_secretsmanager_secret",
            ActionEntry::new("secretsmanager")
                .with_read(&["secretsmanager:GetSecretValue", "secretsmanager:DescribeSecret"])
                .with_write(&["secretsmanager:PutSecretValue", "secretsmanager:UpdateSecret"])
                .with_infra(
                    &["secretsmanager:GetResourcePolicy", "secretsmanager:ListSecretVersionIds"],
                    &[
                        "secretsmanager:RotateSecret",
                        "secretsmanager:DeleteSecret",
                        "secretsmanager:PutResourcePolicy",
                        "secretsmanager:TagResource",
                    ],
                ),
        );
        c.register(
            "aws_kms_key",
            ActionEntry::new("kms")
                .with_read(&["kms:Decrypt", "kms:DescribeKey"])
                .with_write(&["kms:Encrypt", "kms:GenerateDataKey", "kms:ReEncrypt*"])
                .with_infra(
                    &["kms:GetKeyPolicy", "kms:GetKeyRotationStatus", "kms:ListResourceTags"],
                    &[
                        "kms:PutKeyPolicy",
                        "kms:EnableKeyRotation",
                        "kms:ScheduleKeyDeletion",
                        "kms:TagResource",
                    ],
                )
                .with_arn_template("arn:aws:kms:{region}:*:key/{name}")
                .with_via_service_condition(),
        );
        c.register(
            "aws_db_instance",
            ActionEntry::new("rds")
                .with_read(&["rds-db:connect"])
                .with_infra(
                    &["rds:DescribeDBInstances", "rds:ListTagsForResource"],
                    &["rds:ModifyDBInstance", "rds:RebootDBInstance", "rds:DeleteDBInstance"],
                ),
        );
        c.register(
            "aws_rds_cluster",
            ActionEntry::new("rds")
                .with_read(&["rds-db:connect"])
                .with_write(&["rds-data:ExecuteStatement", "rds-data:BatchExecuteStatement"])
                .with_infra(
                    &["rds:DescribeDBClusters", "rds:ListTagsForResource"],
                    &["rds:ModifyDBCluster", "rds:DeleteDBCluster"],
                ),
        );
        c.register(
            "aws_cloudwatch_log_group",
            ActionEntry::new("logs")
                .with_read(&["logs:GetLogEvents", "logs:FilterLogEvents", "logs:DescribeLogStreams"])
                .with_write(&["logs:CreateLogStream", "logs:PutLogEvents"])
                .with_infra(
                    &["logs:ListTagsLogGroup"],
                    &["logs:PutRetentionPolicy", "logs:DeleteLogGroup", "logs:TagLogGroup"],
                )
                .with_arn_template("arn:aws:logs:{region}:*:log-group:{name}")
                .with_object_suffix(":*"),
        );
        c.register(
            "aws_efs_file_system",
            ActionEntry::new("elasticfilesystem")
                .with_read(&["elasticfilesystem:ClientMount", "elasticfilesystem:DescribeMountTargets"])
                .with_write(&["elasticfilesystem:ClientWrite"])
                .with_infra(
                    &["elasticfilesystem:DescribeFileSystemPolicy"],
                    &["elasticfilesystem:UpdateFileSystem", "elasticfilesystem:DeleteFileSystem"],
                ),
        );
        c.register(
            "aws_ecr_repository",
            ActionEntry::new("ecr")
                .with_read(&[
                    "ecr:BatchGetImage",
                    "ecr:GetDownloadUrlForLayer",
                    "ecr:BatchCheckLayerAvailability",
                ])
                .with_write(&[
                    "ecr:PutImage",
                    "ecr:InitiateLayerUpload",
                    "ecr:UploadLayerPart",
                    "ecr:CompleteLayerUpload",
                ])
                .with_infra(
                    &["ecr:DescribeRepositories", "ecr:GetRepositoryPolicy"],
                    &["ecr:SetRepositoryPolicy", "ecr:DeleteRepository", "ecr:PutLifecyclePolicy"],
                ),
        );
        c.register(
            "aws_iam_role",
            ActionEntry::new("iam").with_infra(
                &["iam:GetRole", "iam:ListAttachedRolePolicies"],
                &["iam:PassRole", "iam:UpdateRole"],
            ),
        );
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_read_and_write_sets_are_disjoint() {
        let catalog = ActionCatalog::aws();
        let writes = catalog.write_actions();
        for entry in catalog.entries.values() {
            for a in entry.read.iter().chain(entry.infra_read.iter()) {
                assert!(!writes.contains(a.as_str()), "{a} is both read and write");
            }
        }
    }

    #[test]
    fn s3_runtime_scope_covers_objects() {
        let catalog = ActionCatalog::aws();
        let s3 = catalog.get("aws_s3_bucket").unwrap();
        let node = ResourceNode::new("b1", "aws_s3_bucket", "us-east-1");
        let arns = s3.resource_arns(&node, PolicyScope::RuntimeRead).unwrap();
        assert_eq!(arns, ["arn:aws:s3:::b1", "arn:aws:s3:::b1/*"]);
        let infra = s3.resource_arns(&node, PolicyScope::InfraRead).unwrap();
        assert_eq!(infra, ["arn:aws:s3:::b1"]);
    }

    #[test]
    fn full_scope_is_union() {
        let catalog = ActionCatalog::aws();
        let sqs = catalog.get("aws_sqs_queue").unwrap();
        let full = sqs.actions_for(PolicyScope::RuntimeFull);
        assert_eq!(full.len(), sqs.read.len() + sqs.write.len());
    }
}
