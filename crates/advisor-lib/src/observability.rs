//! Observability infrastructure for the resize advisor
//!
//! Provides:
//! - Prometheus metrics (record throughput, cache behavior, per-record latency)
//! - Structured logging for batch run events

use prometheus::{register_histogram, register_int_gauge, Histogram, IntGauge};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for per-record processing latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<AdvisorMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct AdvisorMetricsInner {
    record_latency_seconds: Histogram,
    records_processed: IntGauge,
    records_failed: IntGauge,
    records_timed_out: IntGauge,
    region_fetches: IntGauge,
    catalog_lookups: IntGauge,
    pricing_fetches: IntGauge,
    pricing_lookups: IntGauge,
}

impl AdvisorMetricsInner {
    fn new() -> Self {
        Self {
            record_latency_seconds: register_histogram!(
                "resize_advisor_record_latency_seconds",
                "Wall-clock time spent processing one resize record",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register record_latency_seconds"),

            records_processed: register_int_gauge!(
                "resize_advisor_records_processed_total",
                "Total number of resize records processed"
            )
            .expect("Failed to register records_processed_total"),

            records_failed: register_int_gauge!(
                "resize_advisor_records_failed_total",
                "Total number of resize records that failed processing"
            )
            .expect("Failed to register records_failed_total"),

            records_timed_out: register_int_gauge!(
                "resize_advisor_records_timed_out_total",
                "Total number of resize records that exceeded the per-record budget"
            )
            .expect("Failed to register records_timed_out_total"),

            region_fetches: register_int_gauge!(
                "resize_advisor_region_fetches_total",
                "Total number of regional capability catalog fetches"
            )
            .expect("Failed to register region_fetches_total"),

            catalog_lookups: register_int_gauge!(
                "resize_advisor_catalog_lookups_total",
                "Total number of capability catalog lookups"
            )
            .expect("Failed to register catalog_lookups_total"),

            pricing_fetches: register_int_gauge!(
                "resize_advisor_pricing_fetches_total",
                "Total number of pricing backend queries"
            )
            .expect("Failed to register pricing_fetches_total"),

            pricing_lookups: register_int_gauge!(
                "resize_advisor_pricing_lookups_total",
                "Total number of pricing resolver lookups"
            )
            .expect("Failed to register pricing_lookups_total"),
        }
    }
}

/// Advisor metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct AdvisorMetrics {
    _private: (),
}

impl Default for AdvisorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl AdvisorMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(AdvisorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &AdvisorMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    /// Record a per-record processing latency observation
    pub fn observe_record_latency(&self, duration_secs: f64) {
        self.inner().record_latency_seconds.observe(duration_secs);
    }

    pub fn inc_records_processed(&self) {
        self.inner().records_processed.inc();
    }

    pub fn inc_records_failed(&self) {
        self.inner().records_failed.inc();
    }

    pub fn inc_records_timed_out(&self) {
        self.inner().records_timed_out.inc();
    }

    pub fn inc_region_fetches(&self) {
        self.inner().region_fetches.inc();
    }

    pub fn inc_catalog_lookups(&self) {
        self.inner().catalog_lookups.inc();
    }

    pub fn inc_pricing_fetches(&self) {
        self.inner().pricing_fetches.inc();
    }

    pub fn inc_pricing_lookups(&self) {
        self.inner().pricing_lookups.inc();
    }
}

/// Structured logger for batch run events
///
/// Provides consistent logging for run start, per-record outcomes,
/// and run completion.
#[derive(Clone)]
pub struct RunLogger {
    run_id: String,
}

impl RunLogger {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
        }
    }

    /// Log the start of a batch run
    pub fn log_run_started(&self, total_records: usize, mode: &str, concurrency: usize) {
        info!(
            event = "run_started",
            run_id = %self.run_id,
            total_records = total_records,
            mode = %mode,
            concurrency = concurrency,
            "Starting resize evaluation run"
        );
    }

    /// Log the outcome of one record
    pub fn log_record(&self, resource_id: &str, status: &str, fully_compatible: Option<bool>) {
        match status {
            "completed" => {
                info!(
                    event = "record_processed",
                    run_id = %self.run_id,
                    resource_id = %resource_id,
                    status = %status,
                    fully_compatible = ?fully_compatible,
                    "Record processed"
                );
            }
            _ => {
                warn!(
                    event = "record_processed",
                    run_id = %self.run_id,
                    resource_id = %resource_id,
                    status = %status,
                    "Record did not complete"
                );
            }
        }
    }

    /// Log the completion of a batch run
    pub fn log_run_finished(
        &self,
        completed: usize,
        failed: usize,
        timed_out: usize,
        elapsed_secs: f64,
    ) {
        info!(
            event = "run_finished",
            run_id = %self.run_id,
            completed = completed,
            failed = failed,
            timed_out = timed_out,
            elapsed_secs = elapsed_secs,
            "Resize evaluation run finished"
        );
    }
}
