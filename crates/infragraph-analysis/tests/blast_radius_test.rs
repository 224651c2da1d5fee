//! Blast radius: validation, depth bound, cycles, scoring, severity.

use infragraph_analysis::impact::{BlastRadiusAnalyzer, CriticalityTable, Severity};
use infragraph_analysis::model::{DependencyEdge, RelationType, ResourceNode};
use infragraph_analysis::ResourceGraph;
use infragraph_core::config::ImpactConfig;
use infragraph_core::errors::AnalysisError;

// ═══════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════

fn sealed(nodes: &[(&str, &str)], edges: &[(&str, &str, RelationType)]) -> ResourceGraph {
    let mut g = ResourceGraph::new();
    for (id, ty) in nodes {
        g.add_node(ResourceNode::new(*id, *ty, "us-east-1")).unwrap();
    }
    for (from, to, relation) in edges {
        g.add_edge(DependencyEdge::static_config(*from, *to, *relation)).unwrap();
    }
    g.seal().unwrap();
    g
}

/// `n0 <- n1 <- n2 <- ... <- n{len-1}`, all instances.
fn chain(len: usize) -> ResourceGraph {
    let ids: Vec<String> = (0..len).map(|i| format!("n{i}")).collect();
    let nodes: Vec<(&str, &str)> = ids.iter().map(|id| (id.as_str(), "aws_instance")).collect();
    let edges: Vec<(&str, &str, RelationType)> = (1..len)
        .map(|i| (ids[i].as_str(), ids[i - 1].as_str(), RelationType::Dependency))
        .collect();
    sealed(&nodes, &edges)
}

// ═══════════════════════════════════════════════════════════════════════════
// Contract errors
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn unknown_root_is_not_found() {
    let g = chain(2);
    let err = BlastRadiusAnalyzer::default().calculate(&g, "nope", 3).unwrap_err();
    assert_eq!(err, AnalysisError::NotFound { id: "nope".into() });
}

#[test]
fn zero_depth_is_validation_error() {
    let g = chain(2);
    let err = BlastRadiusAnalyzer::default().calculate(&g, "n0", 0).unwrap_err();
    assert!(matches!(err, AnalysisError::Validation { ref field, .. } if field == "max_depth"));
}

// ═══════════════════════════════════════════════════════════════════════════
// Traversal
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn isolated_root_has_empty_low_report() {
    let g = sealed(&[("alone", "aws_s3_bucket")], &[]);
    let report = BlastRadiusAnalyzer::default().calculate(&g, "alone", 5).unwrap();
    assert!(report.affected.is_empty());
    assert_eq!(report.severity, Severity::Low);
    assert_eq!(report.score, 0.0);
    assert_eq!(report.max_depth_reached, 0);
}

#[test]
fn depth_bound_is_respected() {
    let g = chain(10);
    let report = BlastRadiusAnalyzer::default().calculate(&g, "n0", 3).unwrap();
    let ids: Vec<&str> = report.affected.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["n1", "n2", "n3"]);
    assert!(report.affected.iter().all(|a| a.depth <= 3));
    assert_eq!(report.max_depth_reached, 3);
}

#[test]
fn walks_dependents_not_dependencies() {
    let g = sealed(
        &[("fn", "aws_lambda_function"), ("b", "aws_s3_bucket"), ("k", "aws_kms_key")],
        &[
            ("fn", "b", RelationType::Dependency),
            ("b", "k", RelationType::Identity),
        ],
    );
    let report = BlastRadiusAnalyzer::default().calculate(&g, "b", 5).unwrap();
    assert!(report.contains("fn"));
    assert!(!report.contains("k"));
    assert!(!report.contains("b"));
}

#[test]
fn cycle_terminates_and_excludes_root() {
    let g = sealed(
        &[("a", "aws_security_group"), ("b", "aws_security_group"), ("c", "aws_instance")],
        &[
            ("a", "b", RelationType::Network),
            ("b", "a", RelationType::Network),
            ("c", "a", RelationType::Network),
        ],
    );
    let report = BlastRadiusAnalyzer::default().calculate(&g, "a", 50).unwrap();
    assert_eq!(report.affected_count(), 2);
    assert!(!report.contains("a"));
}

#[test]
fn each_node_reported_once_at_shortest_depth() {
    // d depends on both b and c; both depend on root.
    let g = sealed(
        &[
            ("root", "aws_s3_bucket"),
            ("b", "aws_instance"),
            ("c", "aws_instance"),
            ("d", "aws_instance"),
        ],
        &[
            ("b", "root", RelationType::Dependency),
            ("c", "root", RelationType::Dependency),
            ("d", "b", RelationType::Dependency),
            ("d", "c", RelationType::Dependency),
            ("d", "root", RelationType::Dependency),
        ],
    );
    let report = BlastRadiusAnalyzer::default().calculate(&g, "root", 5).unwrap();
    assert_eq!(report.affected_count(), 3);
    assert_eq!(report.get("d").unwrap().depth, 1);
}

#[test]
fn parallel_edges_report_by_precedence() {
    let g = sealed(
        &[("i", "aws_instance"), ("asg", "aws_autoscaling_group")],
        &[
            ("asg", "i", RelationType::Identity),
            ("asg", "i", RelationType::Consumer),
            ("asg", "i", RelationType::Manager),
        ],
    );
    let report = BlastRadiusAnalyzer::default().calculate(&g, "i", 2).unwrap();
    let asg = report.get("asg").unwrap();
    assert_eq!(asg.relation(), Some(RelationType::Manager));
    assert_eq!(asg.parent_id, "i");
    assert_eq!(asg.relation_path.as_slice(), &[RelationType::Manager]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Scoring and severity
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn depth_decay_makes_direct_dependents_dominate() {
    let g = chain(4);
    let report = BlastRadiusAnalyzer::default().calculate(&g, "n0", 3).unwrap();
    let scores: Vec<f64> = report.affected.iter().map(|a| a.criticality).collect();
    assert!(scores.windows(2).all(|w| w[0] > w[1]));
    assert_eq!(report.score, scores[0]);
}

#[test]
fn user_facing_dependent_forces_critical() {
    let g = sealed(
        &[("db", "aws_db_instance"), ("app", "aws_instance"), ("cdn", "aws_cloudfront_distribution")],
        &[
            ("app", "db", RelationType::Dependency),
            ("cdn", "app", RelationType::Consumer),
        ],
    );
    let analyzer = BlastRadiusAnalyzer::default();
    let shallow = analyzer.calculate(&g, "db", 1).unwrap();
    assert_ne!(shallow.severity, Severity::Critical);
    assert_eq!(shallow.user_facing().count(), 0);

    let deep = analyzer.calculate(&g, "db", 2).unwrap();
    assert_eq!(deep.severity, Severity::Critical);
    assert!(deep.get("cdn").unwrap().user_facing);
}

#[test]
fn low_criticality_dependents_stay_low() {
    let g = sealed(
        &[("vpc", "aws_vpc"), ("t", "aws_ec2_tag")],
        &[("t", "vpc", RelationType::Dependency)],
    );
    let report = BlastRadiusAnalyzer::default().calculate(&g, "vpc", 3).unwrap();
    assert_eq!(report.severity, Severity::Low);
    assert_eq!(report.by_type["aws_ec2_tag"], 1);
}

#[test]
fn custom_criticality_table_and_thresholds() {
    let g = sealed(
        &[("q", "aws_sqs_queue"), ("job", "aws_batch_job_definition")],
        &[("job", "q", RelationType::Dependency)],
    );
    let mut table = CriticalityTable::empty(0.1);
    table.set_weight("aws_batch_job_definition", 0.9);
    let config = ImpactConfig {
        critical_threshold: Some(0.95),
        high_threshold: Some(0.8),
        ..Default::default()
    };
    let analyzer = BlastRadiusAnalyzer::new(&config).with_criticality(table);
    let report = analyzer.calculate(&g, "q", 1).unwrap();
    assert_eq!(report.severity, Severity::High);
}

#[test]
fn repeated_calls_are_identical() {
    let g = chain(6);
    let analyzer = BlastRadiusAnalyzer::default();
    let first = analyzer.calculate(&g, "n0", 4).unwrap();
    let second = analyzer.calculate(&g, "n0", 4).unwrap();
    assert_eq!(first, second);
}

#[test]
fn many_roots_in_parallel_match_sequential() {
    let g = chain(8);
    let analyzer = BlastRadiusAnalyzer::default();
    let roots = ["n0", "n3", "missing", "n7"];
    let parallel = analyzer.calculate_many(&g, &roots, 3);
    assert_eq!(parallel.len(), 4);
    for (root, result) in roots.iter().zip(&parallel) {
        assert_eq!(result, &analyzer.calculate(&g, root, 3));
    }
    assert!(parallel[2].is_err());
}
