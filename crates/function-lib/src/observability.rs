//! Observability for pipeline execution
//!
//! Provides:
//! - Prometheus metrics (stage latency, rows processed, alerts raised, errors)
//! - Structured JSON logging with tracing

use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge, HistogramVec,
    IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for stage latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<FunctionMetricsInner> = OnceLock::new();

struct FunctionMetricsInner {
    execution_latency_seconds: HistogramVec,
    rows_processed: IntCounterVec,
    alerts_raised: IntCounterVec,
    execution_errors: IntCounterVec,
    pipeline_stages: IntGauge,
}

impl FunctionMetricsInner {
    fn new() -> Self {
        Self {
            execution_latency_seconds: register_histogram_vec!(
                "iot_function_execution_latency_seconds",
                "Time spent executing one function over one batch",
                &["function"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register execution_latency_seconds"),

            rows_processed: register_int_counter_vec!(
                "iot_function_rows_processed_total",
                "Rows passed through each function",
                &["function"]
            )
            .expect("Failed to register rows_processed"),

            alerts_raised: register_int_counter_vec!(
                "iot_function_alerts_raised_total",
                "Rows flagged by alert columns",
                &["function", "alert"]
            )
            .expect("Failed to register alerts_raised"),

            execution_errors: register_int_counter_vec!(
                "iot_function_execution_errors_total",
                "Function executions that returned an error",
                &["function"]
            )
            .expect("Failed to register execution_errors"),

            pipeline_stages: register_int_gauge!(
                "iot_function_pipeline_stages",
                "Number of stages in the loaded pipeline"
            )
            .expect("Failed to register pipeline_stages"),
        }
    }
}

/// Handle to the global function metrics.
///
/// Clones share the same underlying metrics.
#[derive(Clone)]
pub struct FunctionMetrics {
    _private: (),
}

impl Default for FunctionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(FunctionMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &FunctionMetricsInner {
        GLOBAL_METRICS.get_or_init(FunctionMetricsInner::new)
    }

    pub fn observe_execution(&self, function: &str, duration_secs: f64, rows: usize) {
        let inner = self.inner();
        inner
            .execution_latency_seconds
            .with_label_values(&[function])
            .observe(duration_secs);
        inner
            .rows_processed
            .with_label_values(&[function])
            .inc_by(rows as u64);
    }

    pub fn inc_alerts_raised(&self, function: &str, alert: &str, count: usize) {
        self.inner()
            .alerts_raised
            .with_label_values(&[function, alert])
            .inc_by(count as u64);
    }

    pub fn inc_execution_errors(&self, function: &str) {
        self.inner()
            .execution_errors
            .with_label_values(&[function])
            .inc();
    }

    pub fn set_pipeline_stages(&self, count: usize) {
        self.inner().pipeline_stages.set(count as i64);
    }
}

/// Structured logger for pipeline events
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

    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Log one successful stage execution
    pub fn log_stage(&self, function: &str, rows: usize, elapsed_us: u128, produced: &[String]) {
        info!(
            event = "stage_executed",
            instance = %self.instance,
            function = %function,
            rows = rows,
            elapsed_us = elapsed_us as u64,
            produced = ?produced,
            "Function executed"
        );
    }

    pub fn log_stage_failure(&self, function: &str, error: &str) {
        warn!(
            event = "stage_failed",
            instance = %self.instance,
            function = %function,
            error = %error,
            "Function execution failed"
        );
    }

    pub fn log_alerts(&self, function: &str, alert: &str, raised: usize, rows: usize) {
        warn!(
            event = "alerts_raised",
            instance = %self.instance,
            function = %function,
            alert = %alert,
            raised = raised,
            rows = rows,
            "Alert raised"
        );
    }

    pub fn log_startup(&self, version: &str, stages: usize) {
        info!(
            event = "runner_started",
            instance = %self.instance,
            version = %version,
            stages = stages,
            "Function runner started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "runner_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Function runner shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_metrics_creation() {
        // Metrics live in the global Prometheus registry, so every handle
        // in this process shares them.
        let metrics = FunctionMetrics::new();
        metrics.observe_execution("MultiplyByFactor", 0.001, 10);
        metrics.inc_alerts_raised("SimpleAnomaly", "temp_alert", 2);
        metrics.inc_execution_errors("SimpleRegressor");
        metrics.set_pipeline_stages(3);

        let again = FunctionMetrics::new();
        again.observe_execution("MultiplyByFactor", 0.002, 5);
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("test-runner");
        assert_eq!(logger.instance(), "test-runner");
    }
}
