//! Prometheus metrics for the switchboard server.

use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;
use std::time::Duration;

/// Labels for probe result metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ProbeLabels {
    /// Result (live, dead)
    pub result: String,
}

/// Labels for cache read metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct CacheLabels {
    /// Read outcome (hit, miss)
    pub outcome: String,
}

/// Labels for failover metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct GroupLabels {
    /// Channel group name
    pub group: String,
}

/// Metrics registry with all switchboard server metrics
pub struct MetricsRegistry {
    /// Prometheus registry
    pub registry: Registry,

    /// Probe results by outcome
    probes_total: Family<ProbeLabels, Counter>,
    /// Completed full verification passes
    full_passes_total: Counter,
    /// Full pass duration
    pass_duration_seconds: Histogram,
    /// Selection cache reads by outcome
    cache_reads_total: Family<CacheLabels, Counter>,
    /// Failovers by group
    failovers_total: Family<GroupLabels, Counter>,
    /// Groups currently configured
    groups_configured: Gauge,
    /// Groups with a live selection after the last pass
    groups_live: Gauge,
}

impl MetricsRegistry {
    /// Create a new metrics registry
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let probes_total = Family::<ProbeLabels, Counter>::default();
        registry.register(
            "switchboard_probes_total",
            "Endpoint probes by result",
            probes_total.clone(),
        );

        let full_passes_total = Counter::default();
        registry.register(
            "switchboard_full_passes_total",
            "Completed full verification passes",
            full_passes_total.clone(),
        );

        // Exponential buckets from 10ms to ~80s: passes are bounded by
        // candidates / width * probe timeout
        let pass_duration_seconds = Histogram::new(exponential_buckets(0.01, 2.0, 14));
        registry.register(
            "switchboard_pass_duration_seconds",
            "Full verification pass duration in seconds",
            pass_duration_seconds.clone(),
        );

        let cache_reads_total = Family::<CacheLabels, Counter>::default();
        registry.register(
            "switchboard_cache_reads_total",
            "Selection cache reads by outcome",
            cache_reads_total.clone(),
        );

        let failovers_total = Family::<GroupLabels, Counter>::default();
        registry.register(
            "switchboard_failovers_total",
            "Current-index failovers by group",
            failovers_total.clone(),
        );

        let groups_configured = Gauge::default();
        registry.register(
            "switchboard_groups_configured",
            "Channel groups currently configured",
            groups_configured.clone(),
        );

        let groups_live = Gauge::default();
        registry.register(
            "switchboard_groups_live",
            "Groups with a live selection after the last pass",
            groups_live.clone(),
        );

        Self {
            registry,
            probes_total,
            full_passes_total,
            pass_duration_seconds,
            cache_reads_total,
            failovers_total,
            groups_configured,
            groups_live,
        }
    }

    /// Record one probe result
    pub fn record_probe(&self, live: bool) {
        let result = if live { "live" } else { "dead" };
        self.probes_total
            .get_or_create(&ProbeLabels {
                result: result.to_string(),
            })
            .inc();
    }

    /// Record a completed full pass
    pub fn record_pass(&self, duration: Duration, groups: usize, live: usize) {
        self.full_passes_total.inc();
        self.pass_duration_seconds.observe(duration.as_secs_f64());
        self.groups_configured.set(groups as i64);
        self.groups_live.set(live as i64);
    }

    /// Record a cache read outcome
    pub fn record_cache_read(&self, hit: bool) {
        let outcome = if hit { "hit" } else { "miss" };
        self.cache_reads_total
            .get_or_create(&CacheLabels {
                outcome: outcome.to_string(),
            })
            .inc();
    }

    /// Record a failover for a group
    pub fn record_failover(&self, group: &str) {
        self.failovers_total
            .get_or_create(&GroupLabels {
                group: group.to_string(),
            })
            .inc();
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}
