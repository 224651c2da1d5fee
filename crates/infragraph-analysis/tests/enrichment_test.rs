//! Live enrichment: discovered edges, timeouts, failures, cancellation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use infragraph_analysis::enrich::{Enrichment, ResourceEnricher, ResourceLookup, StaticLookup};
use infragraph_analysis::model::{ConfigMap, EdgeSource, RawResource, RelationType};
use infragraph_analysis::{BuildWarning, GraphBuilder, RelationClassifier};
use infragraph_core::config::EnrichmentConfig;
use infragraph_core::errors::EnrichmentError;
use infragraph_core::traits::Cancellable;
use serde_json::json;

fn raw(id: &str, ty: &str) -> RawResource {
    RawResource::new(id, ty, "us-east-1")
}

fn config(pairs: &[(&str, serde_json::Value)]) -> ConfigMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Sleeps before answering; counts calls.
struct SlowLookup {
    delay: Duration,
    calls: AtomicUsize,
}

impl ResourceLookup for SlowLookup {
    fn describe(&self, _resource_type: &str, _id: &str) -> Result<ConfigMap, EnrichmentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        Ok(ConfigMap::new())
    }
}

/// Sleeps before answering; records the most calls ever in flight at once.
struct GaugedLookup {
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl GaugedLookup {
    fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        })
    }
}

impl ResourceLookup for GaugedLookup {
    fn describe(&self, _resource_type: &str, _id: &str) -> Result<ConfigMap, EnrichmentError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(ConfigMap::new())
    }
}

struct PanickingLookup;

impl ResourceLookup for PanickingLookup {
    fn describe(&self, _resource_type: &str, id: &str) -> Result<ConfigMap, EnrichmentError> {
        panic!("client blew up on {id}");
    }
}

#[test]
fn discovered_config_adds_live_lookup_edges() {
    let lookup = StaticLookup::new().with_entry(
        "worker",
        config(&[
            ("event_source_arn", json!("arn:aws:sqs:us-east-1:123456789012:jobs")),
            ("arn", json!("arn:aws:lambda:us-east-1:123456789012:function:worker")),
        ]),
    );
    let enricher = ResourceEnricher::new(Arc::new(lookup));
    let resources = vec![
        raw("jobs", "aws_sqs_queue").with_arn("arn:aws:sqs:us-east-1:123456789012:jobs"),
        raw("worker", "aws_lambda_function"),
    ];

    let built = GraphBuilder::new(RelationClassifier::default())
        .with_enricher(enricher)
        .build(&resources, true)
        .unwrap();
    let g = &built.graph;

    let edges = g.edges_between("worker", "jobs");
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].source, EdgeSource::LiveLookup);
    assert_eq!(edges[0].relation, RelationType::Dependency);
    assert_eq!(
        g.node("worker").unwrap().arn.as_deref(),
        Some("arn:aws:lambda:us-east-1:123456789012:function:worker")
    );
    // The queue has no recorded entry.
    assert_eq!(built.enrichment_failures().count(), 1);
}

#[test]
fn static_edge_wins_over_identical_live_edge() {
    let lookup = StaticLookup::new().with_entry("fn", config(&[("bucket_id", json!("b1"))]));
    let built = GraphBuilder::new(RelationClassifier::default())
        .with_enricher(ResourceEnricher::new(Arc::new(lookup.supporting(["aws_lambda_function"]))))
        .build(
            &[
                raw("b1", "aws_s3_bucket"),
                raw("fn", "aws_lambda_function").with_config("bucket_id", "b1"),
            ],
            true,
        )
        .unwrap();
    let edges = built.graph.edges_between("fn", "b1");
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].source, EdgeSource::StaticConfig);
    assert!(built.warnings.is_empty());
}

#[test]
fn enrichment_is_skipped_when_not_requested() {
    let lookup = Arc::new(SlowLookup {
        delay: Duration::ZERO,
        calls: AtomicUsize::new(0),
    });
    let built = GraphBuilder::new(RelationClassifier::default())
        .with_enricher(ResourceEnricher::new(lookup.clone()))
        .build(&[raw("a", "aws_instance")], false)
        .unwrap();
    assert!(built.warnings.is_empty());
    assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn denied_and_failed_lookups_are_non_fatal() {
    let lookup = StaticLookup::new()
        .with_entry("ok", ConfigMap::new())
        .deny("secret");
    let built = GraphBuilder::new(RelationClassifier::default())
        .with_enricher(ResourceEnricher::new(Arc::new(lookup)))
        .build(
            &[
                raw("ok", "aws_instance"),
                raw("secret", "aws_secretsmanager_secret"),
                raw("gone", "aws_s3_bucket"),
            ],
            true,
        )
        .unwrap();

    assert_eq!(built.graph.node_count(), 3);
    let failures: Vec<&BuildWarning> = built.enrichment_failures().collect();
    assert_eq!(failures.len(), 2);
    assert!(matches!(
        failures[0],
        BuildWarning::Enrichment { error: EnrichmentError::AccessDenied { .. }, .. }
    ));
    assert!(matches!(
        failures[1],
        BuildWarning::Enrichment { error: EnrichmentError::LookupFailed { .. }, .. }
    ));
}

#[test]
fn slow_lookup_times_out() {
    let lookup = Arc::new(SlowLookup {
        delay: Duration::from_millis(500),
        calls: AtomicUsize::new(0),
    });
    let enricher = ResourceEnricher::new(lookup).with_timeout(Duration::from_millis(20));
    let results = enricher.enrich(&[raw("a", "aws_instance")]);
    assert_eq!(results.len(), 1);
    assert!(matches!(
        results[0].outcome,
        Err(EnrichmentError::Timeout { timeout_ms: 20, .. })
    ));
}

#[test]
fn timed_out_lookups_keep_their_slot() {
    let lookup = GaugedLookup::new(Duration::from_millis(500));
    let enricher = ResourceEnricher::new(lookup.clone())
        .with_workers(2)
        .with_timeout(Duration::from_millis(10));

    let resources: Vec<RawResource> = (0..40).map(|i| raw(&format!("r{i}"), "aws_instance")).collect();
    let results = enricher.enrich(&resources);

    assert_eq!(results.len(), 40);
    assert!(results
        .iter()
        .all(|r| matches!(r.outcome, Err(EnrichmentError::Timeout { timeout_ms: 10, .. }))));
    assert!(lookup.peak.load(Ordering::SeqCst) <= 2);
}

#[test]
fn in_flight_lookups_never_exceed_workers() {
    let lookup = GaugedLookup::new(Duration::from_millis(5));
    let enricher = ResourceEnricher::new(lookup.clone()).with_workers(3);

    let resources: Vec<RawResource> = (0..30).map(|i| raw(&format!("r{i}"), "aws_instance")).collect();
    let results = enricher.enrich(&resources);

    assert!(results.iter().all(Enrichment::is_ok));
    let peak = lookup.peak.load(Ordering::SeqCst);
    assert!((1..=3).contains(&peak), "peak {peak}");
}

#[test]
fn panicking_lookup_releases_its_slot() {
    let enricher = ResourceEnricher::new(Arc::new(PanickingLookup))
        .with_workers(1)
        .with_timeout(Duration::from_millis(500));
    let results = enricher.enrich(&[raw("a", "aws_instance"), raw("b", "aws_instance")]);
    assert!(results
        .iter()
        .all(|r| matches!(r.outcome, Err(EnrichmentError::WorkerPanicked { .. }))));
}

#[test]
fn panicking_lookup_is_reported() {
    let enricher = ResourceEnricher::new(Arc::new(PanickingLookup));
    let results = enricher.enrich(&[raw("a", "aws_instance")]);
    assert!(matches!(results[0].outcome, Err(EnrichmentError::WorkerPanicked { .. })));
}

#[test]
fn cancelled_enricher_issues_no_lookups() {
    let lookup = Arc::new(SlowLookup {
        delay: Duration::ZERO,
        calls: AtomicUsize::new(0),
    });
    let enricher = ResourceEnricher::new(lookup.clone());
    enricher.cancellation_token().cancel();

    let results = enricher.enrich(&[raw("a", "aws_instance"), raw("b", "aws_vpc")]);
    assert_eq!(results.len(), 2);
    assert!(results
        .iter()
        .all(|r| matches!(r.outcome, Err(EnrichmentError::Cancelled { .. }))));
    assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn results_keep_input_order_across_workers() {
    let lookup = Arc::new(SlowLookup {
        delay: Duration::from_millis(5),
        calls: AtomicUsize::new(0),
    });
    let enricher = ResourceEnricher::from_config(
        lookup.clone(),
        &EnrichmentConfig {
            workers: Some(4),
            ..Default::default()
        },
    );
    assert_eq!(enricher.workers(), 4);

    let resources: Vec<RawResource> = (0..32).map(|i| raw(&format!("r{i}"), "aws_instance")).collect();
    let results = enricher.enrich(&resources);
    let ids: Vec<&str> = results.iter().map(|r| r.resource_id.as_str()).collect();
    let expected: Vec<String> = (0..32).map(|i| format!("r{i}")).collect();
    assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());
    assert_eq!(lookup.calls.load(Ordering::SeqCst), 32);
}

#[test]
fn unsupported_types_are_skipped_silently() {
    let lookup = StaticLookup::new().supporting(["aws_lambda_function"]);
    let enricher = ResourceEnricher::new(Arc::new(lookup));
    let results = enricher.enrich(&[raw("a", "aws_instance"), raw("b", "aws_vpc")]);
    assert!(results.is_empty());
}
