//! Property tests over random resource graphs.

use proptest::prelude::*;

use infragraph_analysis::model::{DependencyEdge, RelationType, ResourceNode};
use infragraph_analysis::policy::{ActionCatalog, ActionEntry};
use infragraph_analysis::{
    BlastRadiusAnalyzer, LeastPrivilegePolicyGenerator, PolicyRequest, PolicyScope,
    RelationClassifier, ResourceGraph,
};
use infragraph_core::errors::AnalysisError;

const TYPES: &[&str] = &[
    "aws_lambda_function",
    "aws_instance",
    "aws_ecs_service",
    "aws_s3_bucket",
    "aws_dynamodb_table",
    "aws_sqs_queue",
    "aws_kms_key",
    "aws_secretsmanager_secret",
    "aws_security_group",
    "aws_subnet",
    "aws_iam_role",
    "aws_iam_instance_profile",
    "aws_launch_template",
    "aws_lb",
    "aws_autoscaling_group",
    "aws_glue_job",
];

const RELATIONS: &[RelationType] = &[
    RelationType::Dependency,
    RelationType::Identity,
    RelationType::Network,
    RelationType::Manager,
    RelationType::Consumer,
];

const MAX_NODES: usize = 24;

type Shape = (Vec<&'static str>, Vec<(usize, usize, RelationType)>);

/// Node types plus edges between random node indices, cycles included.
fn graph_strategy() -> impl Strategy<Value = Shape> {
    prop::collection::vec(prop::sample::select(TYPES), 2..MAX_NODES).prop_flat_map(|types| {
        let n = types.len();
        let edges = prop::collection::vec((0..n, 0..n, prop::sample::select(RELATIONS)), 0..n * 3);
        (Just(types), edges)
    })
}

fn build((types, edges): &Shape) -> ResourceGraph {
    let mut g = ResourceGraph::new();
    for (i, ty) in types.iter().enumerate() {
        g.add_node(ResourceNode::new(format!("r{i}"), *ty, "us-east-1"))
            .unwrap();
    }
    for &(from, to, relation) in edges {
        if from != to {
            g.add_edge(DependencyEdge::static_config(
                format!("r{from}"),
                format!("r{to}"),
                relation,
            ))
            .unwrap();
        }
    }
    g.seal().unwrap();
    g
}

/// The AWS catalog plus an entry for compute types, so a leak across a
/// terminal boundary would show up as a statement.
fn leaky_catalog() -> ActionCatalog {
    let mut catalog = ActionCatalog::aws();
    catalog.register(
        "aws_lambda_function",
        ActionEntry::new("lambda")
            .with_read(&["lambda:GetFunction"])
            .with_arn_template("arn:aws:lambda:{region}:*:function:{name}"),
    );
    catalog.register(
        "aws_instance",
        ActionEntry::new("ec2")
            .with_read(&["ec2:DescribeInstances"])
            .with_arn_template("arn:aws:ec2:{region}:*:instance/{name}"),
    );
    catalog
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn root_never_in_its_own_report(shape in graph_strategy(), depth in 1u32..8) {
        let g = build(&shape);
        let analyzer = BlastRadiusAnalyzer::default();
        for i in 0..shape.0.len() {
            let root = format!("r{i}");
            let report = analyzer.calculate(&g, &root, depth).unwrap();
            prop_assert!(!report.contains(&root));
        }
    }

    #[test]
    fn depth_bound_and_single_visit(shape in graph_strategy(), depth in 1u32..8) {
        let g = build(&shape);
        let report = BlastRadiusAnalyzer::default().calculate(&g, "r0", depth).unwrap();
        prop_assert!(report.affected.iter().all(|a| a.depth >= 1 && a.depth <= depth));
        prop_assert!(report.affected_count() < shape.0.len());

        let mut ids: Vec<&str> = report.affected.iter().map(|a| a.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(ids.len(), report.affected_count());
    }

    #[test]
    fn blast_radius_is_idempotent(shape in graph_strategy(), depth in 1u32..8) {
        let g = build(&shape);
        let analyzer = BlastRadiusAnalyzer::default();
        let first = analyzer.calculate(&g, "r1", depth).unwrap();
        let second = analyzer.calculate(&g, "r1", depth).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn ring_of_security_groups_terminates(n in 2usize..MAX_NODES, depth in 1u32..64) {
        let types = vec!["aws_security_group"; n];
        let edges: Vec<_> = (0..n).map(|i| (i, (i + 1) % n, RelationType::Network)).collect();
        let g = build(&(types, edges));
        let report = BlastRadiusAnalyzer::default().calculate(&g, "r0", depth).unwrap();
        prop_assert_eq!(report.affected_count(), (n - 1).min(depth as usize));
    }

    #[test]
    fn runtime_read_never_grants_writes(shape in graph_strategy(), networking in any::<bool>()) {
        let g = build(&shape);
        let generator = LeastPrivilegePolicyGenerator::default();
        let writes = generator.catalog().write_actions();
        for i in 0..shape.0.len() {
            let request = PolicyRequest::new(format!("r{i}"), PolicyScope::RuntimeRead)
                .with_networking(networking)
                .with_baseline_fallback(false);
            match generator.generate(&g, &request) {
                Ok(doc) => {
                    for action in doc.actions() {
                        prop_assert!(!writes.contains(action), "{} granted under RUNTIME_READ", action);
                    }
                }
                Err(AnalysisError::NoDependenciesFound { .. }) => {}
                Err(other) => return Err(TestCaseError::fail(format!("unexpected error {other}"))),
            }
        }
    }

    #[test]
    fn compute_principals_never_reach_each_other(shape in graph_strategy(), networking in any::<bool>()) {
        let g = build(&shape);
        let generator = LeastPrivilegePolicyGenerator::new(RelationClassifier::default(), &Default::default())
            .with_catalog(leaky_catalog());
        for i in 0..shape.0.len() {
            let request = PolicyRequest::new(format!("r{i}"), PolicyScope::RuntimeFull)
                .with_networking(networking);
            let doc = generator.generate(&g, &request).unwrap();
            let actions = doc.actions();
            prop_assert!(!actions.contains("lambda:GetFunction"));
            prop_assert!(!actions.contains("ec2:DescribeInstances"));
        }
    }

    #[test]
    fn baseline_always_yields_a_statement(shape in graph_strategy(), scope_index in 0usize..6) {
        let g = build(&shape);
        let scope = PolicyScope::all()[scope_index];
        let generator = LeastPrivilegePolicyGenerator::default();
        for i in 0..shape.0.len() {
            let doc = generator
                .generate(&g, &PolicyRequest::new(format!("r{i}"), scope))
                .unwrap();
            prop_assert!(!doc.statements.is_empty());
        }
    }
}
