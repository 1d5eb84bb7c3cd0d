//! Per-request state machine
//!
//! ```text
//! Attempting --ok--------------------------> Succeeded
//! Attempting --retriable, budget left------> Backoff --delay--> Attempting
//! Attempting --fatal or budget exhausted---> Failed
//! Attempting | Backoff --cancel------------> Cancelled
//! ```

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::builder::GeocoderConfig;
use super::error::GeocoderError;
use super::retry::{RetryDecision, RetryNotice};
use crate::cancel::CancelToken;
use crate::metrics::{record_provider_call, record_provider_switch, record_retry_backoff, RequestMetrics};
use crate::provider::Lookup;
use crate::transport::Transport;
use crate::Address;

/// Request lifecycle states
#[derive(Debug)]
pub(crate) enum RequestState {
    /// Running a provider pass; `retries` passes already re-run
    Attempting { retries: u32 },
    /// Waiting before the next pass
    Backoff { retries: u32, delay: Duration },
    Succeeded(Vec<Address>),
    Failed(GeocoderError),
    Cancelled,
}

/// One logical geocoding request
pub(crate) struct GeocodeRequest {
    config: Arc<GeocoderConfig>,
    lookup: Lookup,
    cancel: CancelToken,
}

impl GeocodeRequest {
    pub(crate) fn new(config: Arc<GeocoderConfig>, lookup: Lookup, cancel: CancelToken) -> Self {
        Self {
            config,
            lookup,
            cancel,
        }
    }

    /// Drive the request to its terminal state
    pub(crate) async fn run(self) -> Result<Vec<Address>, GeocoderError> {
        let operation = self.lookup.operation();
        let metrics = RequestMetrics::start(operation);

        let outcome = self.drive().await;

        match &outcome {
            Ok(addresses) => {
                metrics.record("success");
                info!(operation, results = addresses.len(), "Geocoding request completed");
            }
            Err(GeocoderError::Cancelled) => {
                metrics.record("cancelled");
                warn!(operation, "Geocoding request cancelled");
            }
            Err(e) => {
                metrics.record(e.kind().as_str());
                info!(operation, error = %e, "Geocoding request failed");
            }
        }
        outcome
    }

    async fn drive(&self) -> Result<Vec<Address>, GeocoderError> {
        self.lookup
            .validate()
            .map_err(GeocoderError::InvalidArgument)?;

        let mut state = RequestState::Attempting { retries: 0 };
        loop {
            state = match state {
                RequestState::Attempting { retries } => self.attempt(retries).await,
                RequestState::Backoff { retries, delay } => self.backoff(retries, delay).await,
                RequestState::Succeeded(addresses) => return Ok(addresses),
                RequestState::Failed(e) => return Err(e),
                RequestState::Cancelled => return Err(GeocoderError::Cancelled),
            };
        }
    }

    async fn attempt(&self, retries: u32) -> RequestState {
        if self.cancel.is_cancelled() {
            return RequestState::Cancelled;
        }

        let transport = self.config.transport_factory.create();
        let pass = self.pass(transport.as_ref());

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                transport.abort();
                RequestState::Cancelled
            }
            result = pass => match result {
                Ok(addresses) => RequestState::Succeeded(addresses),
                Err(e) => self.on_failure(retries, e),
            },
        }
    }

    fn on_failure(&self, retries: u32, error: GeocoderError) -> RequestState {
        let policy = &self.config.retry_policy;
        match policy.decide(retries, &error) {
            RetryDecision::Retry { delay } => {
                let notice = RetryNotice::new(retries + 1, policy.max_retries, delay, &error);
                warn!(
                    operation = self.lookup.operation(),
                    attempt = notice.attempt,
                    delay_ms = delay.as_millis() as u64,
                    "{}",
                    notice.format_retry()
                );
                record_retry_backoff(delay, notice.attempt);
                RequestState::Backoff { retries, delay }
            }
            RetryDecision::Exhausted => RequestState::Failed(error.into_cause()),
            RetryDecision::Fail => RequestState::Failed(error),
        }
    }

    async fn backoff(&self, retries: u32, delay: Duration) -> RequestState {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => RequestState::Cancelled,
            _ = tokio::time::sleep(delay) => RequestState::Attempting { retries: retries + 1 },
        }
    }

    /// One provider-sequencing pass
    ///
    /// Providers run strictly in order. The first provider failure ends the
    /// pass; otherwise the pass ends on the first result the switch policy
    /// accepts, or after the last provider.
    async fn pass(&self, transport: &dyn Transport) -> Result<Vec<Address>, GeocoderError> {
        let mut result = Vec::new();

        for provider in self.config.providers.iter() {
            let name = provider.name();
            debug!(provider = name, operation = self.lookup.operation(), "Calling provider");

            result = match provider.lookup(transport, &self.lookup).await {
                Ok(addresses) => {
                    record_provider_call(name, "success");
                    addresses
                }
                Err(e) => {
                    record_provider_call(name, if e.is_retriable() { "retriable" } else { "error" });
                    debug!(provider = name, error = %e, "Provider failed");
                    return Err(GeocoderError::provider(name, e));
                }
            };

            if !self.config.switch_policy.should_switch(name, &result) {
                debug!(provider = name, results = result.len(), "Result accepted");
                return Ok(result);
            }
            record_provider_switch(name);
            debug!(provider = name, results = result.len(), "Switching to next provider");
        }

        Ok(result)
    }
}
