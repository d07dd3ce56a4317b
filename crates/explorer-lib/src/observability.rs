//! Observability infrastructure for the cost explorer
//!
//! Provides:
//! - Prometheus metrics (report latency, host counts, telemetry and pricing failures)
//! - Structured JSON logging with tracing

use prometheus::{
    register_gauge, register_histogram, register_int_counter, register_int_gauge, Gauge,
    Histogram, IntCounter, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for report latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

static GLOBAL_METRICS: OnceLock<ExplorerMetricsInner> = OnceLock::new();

struct ExplorerMetricsInner {
    report_latency_seconds: Histogram,
    hosts_evaluated: IntGauge,
    hosts_excluded: IntGauge,
    fleet_hourly_cost: Gauge,
    reports_generated: IntCounter,
    telemetry_errors: IntCounter,
    pricing_updates: IntCounter,
    pricing_update_failures: IntCounter,
}

impl ExplorerMetricsInner {
    fn new() -> Self {
        Self {
            report_latency_seconds: register_histogram!(
                "cost_explorer_report_latency_seconds",
                "Time spent building a cost report",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register report_latency_seconds"),

            hosts_evaluated: register_int_gauge!(
                "cost_explorer_hosts_evaluated",
                "Hosts with an agent interface considered by the last report"
            )
            .expect("Failed to register hosts_evaluated"),

            hosts_excluded: register_int_gauge!(
                "cost_explorer_hosts_excluded",
                "Hosts left out of the last report for missing capacity data"
            )
            .expect("Failed to register hosts_excluded"),

            fleet_hourly_cost: register_gauge!(
                "cost_explorer_fleet_hourly_cost",
                "Total hourly cost of the hosts in the last report"
            )
            .expect("Failed to register fleet_hourly_cost"),

            reports_generated: register_int_counter!(
                "cost_explorer_reports_generated_total",
                "Total number of cost reports generated"
            )
            .expect("Failed to register reports_generated"),

            telemetry_errors: register_int_counter!(
                "cost_explorer_telemetry_errors_total",
                "Total number of failed telemetry API calls"
            )
            .expect("Failed to register telemetry_errors"),

            pricing_updates: register_int_counter!(
                "cost_explorer_pricing_updates_total",
                "Total number of accepted pricing updates"
            )
            .expect("Failed to register pricing_updates"),

            pricing_update_failures: register_int_counter!(
                "cost_explorer_pricing_update_failures_total",
                "Total number of rejected or failed pricing updates"
            )
            .expect("Failed to register pricing_update_failures"),
        }
    }
}

/// Handle to the process-wide Prometheus metrics
///
/// Clones share the same underlying metrics.
#[derive(Clone)]
pub struct ExplorerMetrics {
    _private: (),
}

impl Default for ExplorerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ExplorerMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ExplorerMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ExplorerMetricsInner {
        GLOBAL_METRICS.get_or_init(ExplorerMetricsInner::new)
    }

    /// Record one finished report
    pub fn observe_report(&self, duration_secs: f64, evaluated: usize, excluded: usize, hourly: f64) {
        let inner = self.inner();
        inner.report_latency_seconds.observe(duration_secs);
        inner.hosts_evaluated.set(evaluated as i64);
        inner.hosts_excluded.set(excluded as i64);
        inner.fleet_hourly_cost.set(hourly);
        inner.reports_generated.inc();
    }

    pub fn inc_telemetry_errors(&self) {
        self.inner().telemetry_errors.inc();
    }

    pub fn inc_pricing_updates(&self) {
        self.inner().pricing_updates.inc();
    }

    pub fn inc_pricing_update_failures(&self) {
        self.inner().pricing_update_failures.inc();
    }

    pub fn reports_generated(&self) -> u64 {
        self.inner().reports_generated.get()
    }
}

/// Structured logger for cost explorer events
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn log_startup(&self, version: &str, port: u16, telemetry_source: &str) {
        info!(
            event = "explorer_started",
            instance = %self.instance,
            version = %version,
            port = port,
            telemetry_source = %telemetry_source,
            "Cost explorer started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "explorer_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Cost explorer shutting down"
        );
    }

    /// A host left out of the report
    pub fn log_host_excluded(&self, host_id: &str, host_name: &str, reason: &str) {
        info!(
            event = "host_excluded",
            instance = %self.instance,
            host_id = %host_id,
            host_name = %host_name,
            reason = %reason,
            "Host excluded from cost report"
        );
    }

    pub fn log_report(
        &self,
        hosts_evaluated: usize,
        hosts_priced: usize,
        hosts_excluded: usize,
        total_hourly: f64,
        duration_ms: u128,
    ) {
        info!(
            event = "report_generated",
            instance = %self.instance,
            hosts_evaluated = hosts_evaluated,
            hosts_priced = hosts_priced,
            hosts_excluded = hosts_excluded,
            total_hourly = total_hourly,
            duration_ms = duration_ms as u64,
            "Cost report generated"
        );
    }

    pub fn log_telemetry_error(&self, operation: &str, detail: &str) {
        warn!(
            event = "telemetry_error",
            instance = %self.instance,
            operation = %operation,
            error = %detail,
            "Telemetry call failed"
        );
    }

    pub fn log_pricing_update(&self, per_cpu_core: f64, per_memory_gb: f64, updated_by: &str) {
        info!(
            event = "pricing_updated",
            instance = %self.instance,
            per_cpu_core = per_cpu_core,
            per_memory_gb = per_memory_gb,
            updated_by = %updated_by,
            "Pricing rate updated"
        );
    }

    pub fn log_pricing_rejected(&self, updated_by: &str, reason: &str) {
        warn!(
            event = "pricing_update_failed",
            instance = %self.instance,
            updated_by = %updated_by,
            reason = %reason,
            "Pricing update rejected, keeping previous rate"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_handles_share_registry() {
        let metrics = ExplorerMetrics::new();
        let other = metrics.clone();
        let before = metrics.reports_generated();

        other.observe_report(0.01, 3, 1, 1.25);
        metrics.inc_telemetry_errors();
        metrics.inc_pricing_updates();
        metrics.inc_pricing_update_failures();

        assert!(metrics.reports_generated() > before);
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("explorer-test");
        assert_eq!(logger.instance, "explorer-test");
    }
}
