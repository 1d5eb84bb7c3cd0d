//! HTTP transport backed by reqwest
//!
//! All transports share one pooled [`reqwest::Client`]; each transport owns
//! its own [`CancelToken`] so aborting one request never affects another.

use async_trait::async_trait;
use bytes::Bytes;
use once_cell::sync::Lazy;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::{Transport, TransportError, TransportFactory, TransportResult};
use crate::cancel::CancelToken;

/// HTTP connect timeout (seconds) - time to establish TCP connection
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
/// HTTP request timeout (seconds) - overall time for the entire request
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Default User-Agent. Nominatim rejects requests without one.
pub const DEFAULT_USER_AGENT: &str = concat!("geocoder/", env!("CARGO_PKG_VERSION"));

/// Longest error body kept in [`TransportError::Status`]
const MAX_ERROR_BODY_CHARS: usize = 512;

static SHARED_HTTP_CLIENT: Lazy<Result<Client, String>> = Lazy::new(|| {
    build_client(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS)).map_err(|e| e.to_string())
});

fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
        .timeout(timeout)
        .build()
}

/// Get the process-wide HTTP client
///
/// # Errors
/// Returns [`TransportError::Client`] if the TLS backend could not be initialised.
pub fn shared_http_client() -> TransportResult<Client> {
    match &*SHARED_HTTP_CLIENT {
        Ok(client) => Ok(client.clone()),
        Err(e) => Err(TransportError::Client(format!(
            "failed to build HTTP client: {e}"
        ))),
    }
}

/// Builds [`HttpTransport`]s that share one client and a set of headers
#[derive(Debug, Clone)]
pub struct HttpTransportFactory {
    client: Result<Client, String>,
    headers: HeaderMap,
}

impl HttpTransportFactory {
    /// Factory using the shared client and the default User-Agent
    pub fn new() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

        Self {
            client: shared_http_client().map_err(|e| e.to_string()),
            headers,
        }
    }

    /// Factory with a dedicated client using a custom request timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: build_client(timeout).map_err(|e| e.to_string()),
            ..Self::new()
        }
    }

    /// Add a header sent with every request. Invalid names or values are
    /// reported on the first fetch.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => {
                self.client = Err(format!("invalid header {name}: {value}"));
            }
        }
        self
    }

    /// Replace the User-Agent header
    pub fn user_agent(self, value: &str) -> Self {
        self.header(USER_AGENT.as_str(), value)
    }
}

impl Default for HttpTransportFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportFactory for HttpTransportFactory {
    fn create(&self) -> Arc<dyn Transport> {
        Arc::new(HttpTransport {
            client: self.client.clone(),
            headers: self.headers.clone(),
            abort: CancelToken::new(),
        })
    }
}

/// Single-use HTTP transport
#[derive(Debug)]
pub struct HttpTransport {
    client: Result<Client, String>,
    headers: HeaderMap,
    abort: CancelToken,
}

impl HttpTransport {
    async fn send(&self, client: &Client, url: &str) -> TransportResult<Bytes> {
        let response = client
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> TransportResult<Bytes> {
        if self.abort.is_cancelled() {
            return Err(TransportError::Aborted);
        }

        let client = self.client.as_ref().map_err(|e| TransportError::Client(e.clone()))?;
        debug!(url = %redact_key(url), "HTTP GET");

        tokio::select! {
            biased;
            _ = self.abort.cancelled() => Err(TransportError::Aborted),
            result = self.send(client, url) => result,
        }
    }

    fn abort(&self) {
        self.abort.cancel();
    }

    fn is_aborted(&self) -> bool {
        self.abort.is_cancelled()
    }
}

/// Hide API keys before a URL reaches the logs
fn redact_key(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(mut parsed) => {
            let pairs: Vec<(String, String)> = parsed
                .query_pairs()
                .map(|(k, v)| {
                    let v = if k == "key" || k == "api_key" {
                        "REDACTED".to_string()
                    } else {
                        v.into_owned()
                    };
                    (k.into_owned(), v)
                })
                .collect();
            if !pairs.is_empty() {
                parsed.query_pairs_mut().clear().extend_pairs(pairs);
            }
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}
