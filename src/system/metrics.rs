//! Metrics collection for the fleet store
//!
//! Counters live in a process-wide Prometheus registry, created lazily on
//! first use. Recording is a couple of atomic increments and becomes a no-op
//! when metrics are disabled in configuration.

use crate::types::{Error, ErrorKind, Result};
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};
use std::sync::atomic::{AtomicBool, Ordering};

/// Global metrics registry
static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

static ENABLED: AtomicBool = AtomicBool::new(true);

static METRICS: Lazy<Option<StoreMetrics>> = Lazy::new(|| match StoreMetrics::new(&REGISTRY) {
    Ok(metrics) => Some(metrics),
    Err(e) => {
        tracing::warn!(error = %e, "failed to register store metrics, recording disabled");
        None
    }
});

/// Store operation metrics
pub struct StoreMetrics {
    /// Operations by entity kind, operation and outcome
    pub operations: IntCounterVec,
    /// Current number of stored entities by kind
    pub entities: IntGaugeVec,
}

impl StoreMetrics {
    /// Create and register the store metrics
    fn new(registry: &Registry) -> std::result::Result<Self, prometheus::Error> {
        let operations = IntCounterVec::new(
            Opts::new("fleet_store_operations_total", "Total number of store operations"),
            &["entity", "op", "outcome"],
        )?;
        let entities = IntGaugeVec::new(
            Opts::new("fleet_store_entities", "Number of entities currently stored"),
            &["entity"],
        )?;
        registry.register(Box::new(operations.clone()))?;
        registry.register(Box::new(entities.clone()))?;
        Ok(Self { operations, entities })
    }

    /// Get the global metrics instance, if registration succeeded
    pub fn global() -> Option<&'static StoreMetrics> {
        METRICS.as_ref()
    }
}

/// Enable or disable recording
pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

/// Whether recording is enabled
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Count one store operation; `failure` is the error kind if it failed
pub fn record_operation(entity: &str, op: &str, failure: Option<ErrorKind>) {
    if !is_enabled() {
        return;
    }
    if let Some(metrics) = StoreMetrics::global() {
        let outcome = failure.map_or("ok", |kind| kind.as_str());
        metrics.operations.with_label_values(&[entity, op, outcome]).inc();
    }
}

/// Add `delta` to the stored-entity gauge for a kind
///
/// The gauge is process-wide, so it sums over every store of that kind.
pub fn adjust_entity_count(entity: &str, delta: i64) {
    if !is_enabled() {
        return;
    }
    if let Some(metrics) = StoreMetrics::global() {
        metrics.entities.with_label_values(&[entity]).add(delta);
    }
}

/// The registry holding the store metrics
pub fn registry() -> &'static Registry {
    &REGISTRY
}

/// Render all metrics in the Prometheus text exposition format
pub fn render() -> Result<String> {
    let mut buf = Vec::new();
    TextEncoder::new()
        .encode(&REGISTRY.gather(), &mut buf)
        .map_err(|e| Error::internal(format!("failed to encode metrics: {e}")))?;
    String::from_utf8(buf).map_err(|e| Error::internal(format!("metrics are not utf-8: {e}")))
}
