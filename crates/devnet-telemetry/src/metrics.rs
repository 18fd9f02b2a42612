//! Prometheus metrics for network orchestration.
//!
//! All metrics follow the naming convention: `cn_<area>_<metric>_<unit>`
//! and carry a `network` label.

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts,
    Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // CONTAINER METRICS
    // =========================================================================

    /// Node containers started
    pub static ref CONTAINERS_STARTED: CounterVec = CounterVec::new(
        Opts::new("cn_containers_started_total", "Node containers started"),
        &["network", "role"]
    ).expect("metric creation failed");

    /// Nodes currently believed to be running
    pub static ref NODES_RUNNING: GaugeVec = GaugeVec::new(
        Opts::new("cn_nodes_running", "Nodes in the running state"),
        &["network"]
    ).expect("metric creation failed");

    // =========================================================================
    // READINESS METRICS
    // =========================================================================

    /// Readiness probes by outcome
    pub static ref READINESS_PROBES: CounterVec = CounterVec::new(
        Opts::new("cn_readiness_probes_total", "Node readiness waits"),
        &["network", "outcome"]  // outcome: ready/timeout
    ).expect("metric creation failed");

    /// Time from container start to RPC readiness
    pub static ref NODE_STARTUP_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "cn_node_startup_duration_seconds",
            "Time until a node answers eth_blockNumber"
        ).buckets(exponential_buckets(0.25, 2.0, 10).expect("valid buckets")),
        &["network"]
    ).expect("metric creation failed");

    // =========================================================================
    // ADDRESSING METRICS
    // =========================================================================

    /// Static addresses handed out
    pub static ref IPS_ALLOCATED: CounterVec = CounterVec::new(
        Opts::new("cn_ips_allocated_total", "Static container addresses allocated"),
        &["network"]
    ).expect("metric creation failed");

    // =========================================================================
    // CONSENSUS METRICS
    // =========================================================================

    /// clique_propose calls by outcome
    pub static ref CLIQUE_PROPOSALS: CounterVec = CounterVec::new(
        Opts::new("cn_clique_proposals_total", "Clique validator proposals"),
        &["network", "outcome"]  // outcome: cast/failed
    ).expect("metric creation failed");

    /// Signer set changes by result
    pub static ref SIGNER_CHANGES: CounterVec = CounterVec::new(
        Opts::new("cn_signer_changes_total", "Signer admissions and removals"),
        &["network", "result"]  // result: admitted/removed/pending/not_required
    ).expect("metric creation failed");

    // =========================================================================
    // ERROR METRICS
    // =========================================================================

    /// Operation failures by type
    pub static ref ORCHESTRATOR_ERRORS: CounterVec = CounterVec::new(
        Opts::new("cn_orchestrator_errors_total", "Failed operations by error type"),
        &["network", "error_type"]
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(CONTAINERS_STARTED.clone()),
        Box::new(NODES_RUNNING.clone()),
        Box::new(READINESS_PROBES.clone()),
        Box::new(NODE_STARTUP_DURATION.clone()),
        Box::new(IPS_ALLOCATED.clone()),
        Box::new(CLIQUE_PROPOSALS.clone()),
        Box::new(SIGNER_CHANGES.clone()),
        Box::new(ORCHESTRATOR_ERRORS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: prometheus::Histogram,
    start: std::time::Instant,
    discarded: bool,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &prometheus::Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
            discarded: false,
        }
    }

    /// Stop without recording an observation.
    pub fn discard(mut self) {
        self.discarded = true;
    }

    /// Startup timer for one network.
    pub fn node_startup(network: &str) -> Self {
        Self::new(&NODE_STARTUP_DURATION.with_label_values(&[network]))
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        if self.discarded {
            return;
        }
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent() {
        register_metrics().unwrap();
        register_metrics().unwrap();
    }

    #[test]
    fn test_counter_increment_is_exported() {
        register_metrics().unwrap();
        CONTAINERS_STARTED.with_label_values(&["metrics-test", "signer"]).inc();
        let text = gather_metrics().unwrap();
        assert!(text.contains("cn_containers_started_total"));
        assert!(text.contains("metrics-test"));
    }

    #[test]
    fn test_histogram_timer_observes_on_drop() {
        {
            let _timer = HistogramTimer::node_startup("timer-test");
        }
        let count = NODE_STARTUP_DURATION
            .with_label_values(&["timer-test"])
            .get_sample_count();
        assert_eq!(count, 1);
    }
}
