//! Transport abstraction
//!
//! A [`Transport`] performs one byte-fetch at a time and can be aborted from
//! another task. The engine obtains a fresh transport from a
//! [`TransportFactory`] for every attempt, so an aborted transport never leaks
//! into a later retry.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

pub mod http;

/// Transport errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Connection, DNS, TLS or timeout failure
    #[error("network error: {0}")]
    Network(String),

    /// Server answered with a non-success status
    #[error("HTTP status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// The transport was aborted before or during the fetch
    #[error("request aborted")]
    Aborted,

    /// The transport could not be constructed or the URL was unusable
    #[error("client error: {0}")]
    Client(String),
}

impl TransportError {
    /// HTTP status code, when the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Cancellable byte-fetch primitive
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the body at `url`.
    ///
    /// # Errors
    /// Returns [`TransportError::Aborted`] once [`abort`](Transport::abort)
    /// has been called, and other variants on network or HTTP failure.
    async fn fetch(&self, url: &str) -> TransportResult<Bytes>;

    /// Abort the in-flight fetch, if any. Subsequent fetches fail immediately.
    fn abort(&self);

    /// Whether [`abort`](Transport::abort) has been called
    fn is_aborted(&self) -> bool;
}

/// Constructs one transport per lookup attempt
pub trait TransportFactory: Send + Sync {
    /// Create a fresh, un-aborted transport
    fn create(&self) -> Arc<dyn Transport>;
}

impl<F> TransportFactory for F
where
    F: Fn() -> Arc<dyn Transport> + Send + Sync,
{
    fn create(&self) -> Arc<dyn Transport> {
        self()
    }
}
