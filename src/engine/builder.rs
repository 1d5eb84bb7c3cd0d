//! Engine construction

use std::fmt;
use std::sync::Arc;

use super::error::GeocoderError;
use super::retry::RetryPolicy;
use super::switch::{SwitchPolicy, NEVER_SWITCH};
use super::Geocoder;
use crate::provider::Provider;
use crate::transport::TransportFactory;

/// Immutable engine configuration shared by every request
pub struct GeocoderConfig {
    pub(crate) providers: Arc<[Arc<dyn Provider>]>,
    pub(crate) transport_factory: Arc<dyn TransportFactory>,
    pub(crate) switch_policy: Arc<dyn SwitchPolicy>,
    pub(crate) retry_policy: RetryPolicy,
}

impl GeocoderConfig {
    /// Provider names in priority order
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Retry policy
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }
}

impl fmt::Debug for GeocoderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeocoderConfig")
            .field("providers", &self.provider_names())
            .field("retry_policy", &self.retry_policy)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Geocoder`]
///
/// Providers are appended in priority order; the first one added is the
/// primary. The switch policy defaults to never switching and the retry
/// policy to two retries with 2s linear backoff.
#[derive(Default)]
pub struct GeocoderBuilder {
    providers: Vec<Arc<dyn Provider>>,
    transport_factory: Option<Arc<dyn TransportFactory>>,
    switch_policy: Option<Arc<dyn SwitchPolicy>>,
    retry_policy: RetryPolicy,
}

impl GeocoderBuilder {
    /// Empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider
    pub fn add_provider(self, provider: impl Provider + 'static) -> Self {
        self.add_shared_provider(Arc::new(provider))
    }

    /// Append an already shared provider
    pub fn add_shared_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Set the factory producing one transport per attempt
    pub fn transport_factory(mut self, factory: impl TransportFactory + 'static) -> Self {
        self.transport_factory = Some(Arc::new(factory));
        self
    }

    /// Set the switch policy
    pub fn switch_policy(mut self, policy: impl SwitchPolicy + 'static) -> Self {
        self.switch_policy = Some(Arc::new(policy));
        self
    }

    /// Set the retry policy
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Freeze the configuration
    ///
    /// # Errors
    /// [`GeocoderError::Configuration`] when no provider or no transport
    /// factory was supplied
    pub fn build(self) -> Result<Geocoder, GeocoderError> {
        if self.providers.is_empty() {
            return Err(GeocoderError::Configuration(
                "at least one provider is required".to_string(),
            ));
        }
        let transport_factory = self.transport_factory.ok_or_else(|| {
            GeocoderError::Configuration("a transport factory is required".to_string())
        })?;

        let config = GeocoderConfig {
            providers: self.providers.into(),
            transport_factory,
            switch_policy: self
                .switch_policy
                .unwrap_or_else(|| Arc::new(NEVER_SWITCH)),
            retry_policy: self.retry_policy,
        };
        Ok(Geocoder::from_config(config))
    }
}
