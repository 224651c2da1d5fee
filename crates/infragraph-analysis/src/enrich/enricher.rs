//! Bounded-concurrency live enrichment.
//!
//! Lookups fan out over a dedicated rayon pool of `workers` threads. Each
//! `describe` call runs on its own thread holding one of `workers` permits,
//! and hands its result back through a `bounded(1)` channel. A caller gives
//! up after `timeout`, but the permit stays taken until the call returns, so
//! hung client calls never push the number in flight past `workers`.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use infragraph_core::config::EnrichmentConfig;
use infragraph_core::errors::EnrichmentError;
use infragraph_core::tracing::metrics;
use infragraph_core::traits::{Cancellable, CancellationToken};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::model::{ConfigMap, RawResource};

use super::lookup::ResourceLookup;

/// Counting gate over in-flight `describe` calls: a channel holding one
/// token per permit.
#[derive(Clone)]
struct Permits {
    give: Sender<()>,
    take: Receiver<()>,
}

impl Permits {
    fn new(count: usize) -> Self {
        let (give, take) = crossbeam_channel::bounded(count);
        for _ in 0..count {
            let _ = give.try_send(());
        }
        Self { give, take }
    }

    fn acquire_by(&self, deadline: Instant) -> Option<Permit> {
        self.take
            .recv_deadline(deadline)
            .ok()
            .map(|()| Permit(self.give.clone()))
    }
}

/// Returns its token on drop, including during unwinding.
struct Permit(Sender<()>);

impl Drop for Permit {
    fn drop(&mut self) {
        let _ = self.0.try_send(());
    }
}

/// Result of one live lookup.
#[derive(Debug, Clone)]
pub struct Enrichment {
    pub resource_id: String,
    pub resource_type: String,
    pub outcome: Result<ConfigMap, EnrichmentError>,
}

impl Enrichment {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Issues live lookups for scanned resources.
#[derive(Clone)]
pub struct ResourceEnricher {
    lookup: Arc<dyn ResourceLookup>,
    workers: usize,
    timeout: Duration,
    cancel: CancellationToken,
    permits: Permits,
}

impl std::fmt::Debug for ResourceEnricher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceEnricher")
            .field("workers", &self.workers)
            .field("timeout", &self.timeout)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl ResourceEnricher {
    /// Enricher with the default pool width (8) and timeout (5s).
    pub fn new(lookup: Arc<dyn ResourceLookup>) -> Self {
        Self::from_config(lookup, &EnrichmentConfig::default())
    }

    pub fn from_config(lookup: Arc<dyn ResourceLookup>, config: &EnrichmentConfig) -> Self {
        let workers = config.effective_workers().max(1);
        Self {
            lookup,
            workers,
            timeout: config.effective_timeout(),
            cancel: CancellationToken::new(),
            permits: Permits::new(workers),
        }
    }

    /// Pool width and the cap on `describe` calls in flight. Clones made
    /// before this call keep their own cap.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self.permits = Permits::new(self.workers);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Handle for cancelling lookups that have not started yet.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Look up every supported resource. Results come back in input order;
    /// resources of unsupported types are left out.
    pub fn enrich(&self, resources: &[RawResource]) -> Vec<Enrichment> {
        let start = Instant::now();
        let targets: Vec<&RawResource> = resources
            .iter()
            .filter(|r| self.lookup.supports(&r.resource_type))
            .collect();
        if targets.is_empty() {
            return Vec::new();
        }

        let run = || -> Vec<Enrichment> {
            targets
                .par_iter()
                .map(|r| Enrichment {
                    resource_id: r.id.clone(),
                    resource_type: r.resource_type.clone(),
                    outcome: self.lookup_one(&r.resource_type, &r.id),
                })
                .collect()
        };

        let results = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("infragraph-enrich-{i}"))
            .build()
        {
            Ok(pool) => pool.install(run),
            Err(e) => {
                warn!(error = %e, "enrichment pool unavailable, using global pool");
                run()
            }
        };

        let failures = results.iter().filter(|r| !r.is_ok()).count();
        info!(
            { metrics::ENRICHMENT_LOOKUPS } = results.len(),
            { metrics::ENRICHMENT_FAILURES } = failures,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "enrichment complete"
        );
        results
    }

    fn lookup_one(&self, resource_type: &str, id: &str) -> Result<ConfigMap, EnrichmentError> {
        if self.cancel.is_cancelled() {
            return Err(EnrichmentError::Cancelled { id: id.to_string() });
        }

        let deadline = Instant::now() + self.timeout;
        let Some(permit) = self.permits.acquire_by(deadline) else {
            debug!(id, "no lookup slot free before timeout");
            return Err(self.timed_out(id));
        };
        if self.cancel.is_cancelled() {
            return Err(EnrichmentError::Cancelled { id: id.to_string() });
        }

        let (tx, rx) = crossbeam_channel::bounded(1);
        let lookup = Arc::clone(&self.lookup);
        let (owned_type, owned_id) = (resource_type.to_string(), id.to_string());
        let spawned = thread::Builder::new()
            .name(format!("infragraph-lookup-{id}"))
            .spawn(move || {
                let _permit = permit;
                // Receiver may have given up already.
                let _ = tx.send(lookup.describe(&owned_type, &owned_id));
            });
        if let Err(e) = spawned {
            return Err(EnrichmentError::LookupFailed {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
                message: format!("could not start lookup: {e}"),
            });
        }

        match rx.recv_deadline(deadline) {
            Ok(outcome) => {
                if let Err(e) = &outcome {
                    debug!(id, error = %e, "lookup failed");
                }
                outcome
            }
            Err(RecvTimeoutError::Timeout) => Err(self.timed_out(id)),
            Err(RecvTimeoutError::Disconnected) => {
                Err(EnrichmentError::WorkerPanicked { id: id.to_string() })
            }
        }
    }

    fn timed_out(&self, id: &str) -> EnrichmentError {
        EnrichmentError::Timeout {
            id: id.to_string(),
            timeout_ms: self.timeout.as_millis() as u64,
        }
    }
}
