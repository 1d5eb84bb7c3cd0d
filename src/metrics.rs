//! Observability metrics for the geocoding engine
//!
//! Metrics go through the `metrics` facade and cost nothing when no recorder
//! is installed. [`init_metrics`] installs a Prometheus exporter with a
//! scrape endpoint.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::Lazy;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Geocoding requests by operation and outcome
pub const GEOCODE_REQUESTS_TOTAL: &str = "geocode_requests_total";
/// End-to-end request duration
pub const GEOCODE_REQUEST_DURATION_SECONDS: &str = "geocode_request_duration_seconds";
/// Scheduled retries
pub const GEOCODE_RETRIES_TOTAL: &str = "geocode_retries_total";
/// Backoff slept before retries
pub const RETRY_BACKOFF_DURATION_SECONDS: &str = "retry_backoff_duration_seconds";
/// Provider calls by provider and outcome
pub const PROVIDER_REQUESTS_TOTAL: &str = "provider_requests_total";
/// Fall-throughs from a provider to the next one
pub const PROVIDER_SWITCHES_TOTAL: &str = "provider_switches_total";

static METRICS_INITIALIZED: Lazy<Arc<RwLock<bool>>> = Lazy::new(|| Arc::new(RwLock::new(false)));

/// Install the Prometheus exporter on `addr`
///
/// Idempotent: later calls are no-ops.
pub async fn init_metrics(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    let mut initialized = METRICS_INITIALIZED.write().await;
    if *initialized {
        debug!("Metrics already initialized, skipping");
        return Ok(());
    }

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_metrics();

    *initialized = true;
    info!("Metrics system initialized on {}", addr);
    Ok(())
}

fn describe_metrics() {
    describe_counter!(
        GEOCODE_REQUESTS_TOTAL,
        Unit::Count,
        "Total number of geocoding requests by operation and outcome"
    );
    describe_histogram!(
        GEOCODE_REQUEST_DURATION_SECONDS,
        Unit::Seconds,
        "Geocoding request duration in seconds, including retries"
    );
    describe_counter!(
        GEOCODE_RETRIES_TOTAL,
        Unit::Count,
        "Total number of provider passes re-run after a retriable failure"
    );
    describe_histogram!(
        RETRY_BACKOFF_DURATION_SECONDS,
        Unit::Seconds,
        "Duration of retry backoff in seconds"
    );
    describe_counter!(
        PROVIDER_REQUESTS_TOTAL,
        Unit::Count,
        "Total number of provider calls by provider and outcome"
    );
    describe_counter!(
        PROVIDER_SWITCHES_TOTAL,
        Unit::Count,
        "Total number of times the switch policy moved past a provider"
    );
}

/// Whether [`init_metrics`] has run
pub async fn is_initialized() -> bool {
    *METRICS_INITIALIZED.read().await
}

/// Timing and outcome of one logical geocoding request
pub struct RequestMetrics {
    operation: &'static str,
    start_time: Instant,
}

impl RequestMetrics {
    /// Start timing a request
    pub fn start(operation: &'static str) -> Self {
        Self {
            operation,
            start_time: Instant::now(),
        }
    }

    /// Record the terminal outcome, `"success"` or an error class label
    pub fn record(&self, outcome: &'static str) {
        let duration = self.start_time.elapsed();

        counter!(
            GEOCODE_REQUESTS_TOTAL,
            "operation" => self.operation,
            "outcome" => outcome,
        )
        .increment(1);

        histogram!(
            GEOCODE_REQUEST_DURATION_SECONDS,
            "operation" => self.operation,
        )
        .record(duration.as_secs_f64());
    }
}

/// Record one provider call
pub fn record_provider_call(provider: &str, outcome: &'static str) {
    counter!(
        PROVIDER_REQUESTS_TOTAL,
        "provider" => provider.to_string(),
        "outcome" => outcome,
    )
    .increment(1);
}

/// Record a switch away from `provider`
pub fn record_provider_switch(provider: &str) {
    counter!(
        PROVIDER_SWITCHES_TOTAL,
        "provider" => provider.to_string(),
    )
    .increment(1);
}

/// Record a scheduled retry and its backoff
pub fn record_retry_backoff(duration: Duration, attempt: u32) {
    counter!(GEOCODE_RETRIES_TOTAL).increment(1);
    histogram!(RETRY_BACKOFF_DURATION_SECONDS).record(duration.as_secs_f64());

    debug!(
        attempt = attempt,
        backoff_ms = duration.as_millis() as u64,
        "Retry backoff recorded"
    );
}
