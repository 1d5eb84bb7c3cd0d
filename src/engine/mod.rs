//! Geocoding engine
//!
//! [`Geocoder`] runs each lookup on a Tokio task. A lookup walks the
//! configured providers in order, asking the switch policy after each one
//! whether to keep going, and retries the whole walk on retriable provider
//! failures. Every call returns a [`GeocodeTask`] that resolves exactly once
//! and can be cancelled.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::task::JoinHandle;

use crate::cancel::CancelToken;
use crate::provider::Lookup;
use crate::{Address, BoundingBox};

pub mod builder;
pub mod error;
mod request;
pub mod retry;
pub mod switch;

pub use builder::{GeocoderBuilder, GeocoderConfig};
pub use error::{ErrorKind, GeocoderError};
pub use retry::{RetryDecision, RetryNotice, RetryPolicy, MAX_RETRIES, RETRY_DELAY_MS};
pub use switch::{NeverSwitch, SwitchOnEmpty, SwitchOnMissing, SwitchPolicy, NEVER_SWITCH};

use request::GeocodeRequest;

/// Multi-provider geocoder
///
/// Cheap to clone; clones share the same immutable configuration and may be
/// used from many tasks at once.
#[derive(Debug, Clone)]
pub struct Geocoder {
    config: Arc<GeocoderConfig>,
}

impl Geocoder {
    /// Start building a geocoder
    pub fn builder() -> GeocoderBuilder {
        GeocoderBuilder::new()
    }

    pub(crate) fn from_config(config: GeocoderConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Engine configuration
    pub fn config(&self) -> &GeocoderConfig {
        &self.config
    }

    /// Forward lookup by place name
    ///
    /// Resolves to [`GeocoderError::InvalidArgument`] for an empty name
    /// without contacting any provider.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn by_name(&self, location_name: impl Into<String>) -> GeocodeTask {
        self.lookup(Lookup::Name(location_name.into()))
    }

    /// Forward lookup restricted to `bounds`
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn by_name_in_bounds(
        &self,
        location_name: impl Into<String>,
        bounds: BoundingBox,
    ) -> GeocodeTask {
        self.lookup(Lookup::NameInBounds {
            name: location_name.into(),
            bounds,
        })
    }

    /// Reverse lookup
    ///
    /// Resolves to [`GeocoderError::InvalidArgument`] when either coordinate
    /// is out of range, without contacting any provider.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn by_coordinate(&self, latitude: f64, longitude: f64) -> GeocodeTask {
        self.lookup(Lookup::Coordinate {
            latitude,
            longitude,
        })
    }

    /// Run an arbitrary lookup
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn lookup(&self, lookup: Lookup) -> GeocodeTask {
        let cancel = CancelToken::new();
        let request = GeocodeRequest::new(Arc::clone(&self.config), lookup, cancel.clone());
        GeocodeTask {
            handle: tokio::spawn(request.run()),
            cancel,
        }
    }
}

/// Handle to an in-flight geocoding request
///
/// Await it for the result. Dropping the handle cancels the request.
#[derive(Debug)]
#[must_use = "a GeocodeTask is cancelled when dropped"]
pub struct GeocodeTask {
    handle: JoinHandle<Result<Vec<Address>, GeocoderError>>,
    cancel: CancelToken,
}

impl GeocodeTask {
    /// Cancel the request
    ///
    /// Aborts the in-flight fetch and any pending retry. Once cancelled the
    /// task resolves to [`GeocoderError::Cancelled`].
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether [`cancel`](GeocodeTask::cancel) has been called
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token that cancels this request, for use from another task
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }
}

impl Future for GeocodeTask {
    type Output = Result<Vec<Address>, GeocoderError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let joined = match Pin::new(&mut this.handle).poll(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(joined) => joined,
        };

        if this.cancel.is_cancelled() {
            return Poll::Ready(Err(GeocoderError::Cancelled));
        }
        Poll::Ready(match joined {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => Err(GeocoderError::Cancelled),
            Err(e) => Err(GeocoderError::Internal(format!("geocoding task failed: {e}"))),
        })
    }
}

impl Drop for GeocodeTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
