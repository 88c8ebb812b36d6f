//! Prometheus metrics for routing decisions
//!
//! The embedding service exposes `metrics().gather()` on whatever endpoint
//! it already serves.

use prometheus::{IntCounter, IntCounterVec, Opts, Registry};
use std::sync::OnceLock;
use tracing::warn;

/// Global metrics registry
static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Get the global metrics instance
pub fn metrics() -> &'static Metrics {
    METRICS.get_or_init(Metrics::new)
}

/// Router metrics collection
pub struct Metrics {
    /// Registry for all metrics
    pub registry: Registry,

    // Routing metrics
    /// Routing decisions by reason (write, slave_group, default_group, ...)
    pub routes_total: IntCounterVec,
    /// Reads that found no slave and fell back to master
    pub no_slave_fallback_total: IntCounter,

    // Scope metrics
    /// Accepted scope pushes by frame kind
    pub scope_pushes_total: IntCounterVec,
    /// Scope pushes rejected for an unknown target
    pub scope_rejections_total: IntCounter,
}

impl Metrics {
    /// Create a new metrics collection
    pub fn new() -> Self {
        let registry = Registry::new();

        let routes_total = IntCounterVec::new(
            Opts::new(
                "athena_router_routes_total",
                "Total number of routing decisions by reason",
            ),
            &["reason"],
        )
        .expect("valid routes_total metric");

        let no_slave_fallback_total = IntCounter::new(
            "athena_router_no_slave_fallback_total",
            "Total number of reads sent to master because no slave was available",
        )
        .expect("valid no_slave_fallback_total metric");

        let scope_pushes_total = IntCounterVec::new(
            Opts::new(
                "athena_router_scope_pushes_total",
                "Total number of scope frames pushed by kind",
            ),
            &["kind"], // master, connection, slave_group
        )
        .expect("valid scope_pushes_total metric");

        let scope_rejections_total = IntCounter::new(
            "athena_router_scope_rejections_total",
            "Total number of scope pushes rejected for an unknown target",
        )
        .expect("valid scope_rejections_total metric");

        let collectors: [Box<dyn prometheus::core::Collector>; 4] = [
            Box::new(routes_total.clone()),
            Box::new(no_slave_fallback_total.clone()),
            Box::new(scope_pushes_total.clone()),
            Box::new(scope_rejections_total.clone()),
        ];
        for collector in collectors {
            if let Err(e) = registry.register(collector) {
                warn!(error = %e, "Failed to register metric");
            }
        }

        Self {
            registry,
            routes_total,
            no_slave_fallback_total,
            scope_pushes_total,
            scope_rejections_total,
        }
    }

    /// Record route decision
    pub fn record_route(&self, reason: &str) {
        self.routes_total.with_label_values(&[reason]).inc();
    }

    /// Record a read that degraded to master
    pub fn record_no_slave_fallback(&self) {
        self.no_slave_fallback_total.inc();
    }

    /// Record an accepted scope push
    pub fn record_scope_push(&self, kind: &str) {
        self.scope_pushes_total.with_label_values(&[kind]).inc();
    }

    /// Record a rejected scope push
    pub fn record_scope_rejected(&self) {
        self.scope_rejections_total.inc();
    }

    /// Get metrics as Prometheus text format
    pub fn gather(&self) -> String {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            warn!(error = %e, "Failed to encode metrics");
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
