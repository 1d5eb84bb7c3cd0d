//! Engine error types

use crate::provider::ProviderError;

/// Terminal failure of a geocoding request
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeocoderError {
    /// Malformed input, rejected before any network call
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A provider failed during the pass
    #[error("{provider}: {source}")]
    Provider {
        /// Name of the failing provider
        provider: String,
        /// Provider failure
        #[source]
        source: ProviderError,
    },

    /// Engine could not be built
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request was cancelled before it completed
    #[error("request cancelled")]
    Cancelled,

    /// Background task failed unexpectedly
    #[error("internal error: {0}")]
    Internal(String),
}

/// Error classes exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input
    InvalidArgument,
    /// Transient provider condition, still marked retriable
    RetriableProvider,
    /// Any other provider failure
    FatalProvider,
    /// Network or I/O failure
    Transport,
    /// Cancelled by the caller
    Cancelled,
    /// Invalid engine configuration
    Configuration,
    /// Unexpected internal failure
    Internal,
}

impl ErrorKind {
    /// Short label for logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::RetriableProvider => "retriable_provider",
            ErrorKind::FatalProvider => "fatal_provider",
            ErrorKind::Transport => "transport",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Internal => "internal",
        }
    }

    /// Remediation hint shown with a failure summary
    pub fn suggestion(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => {
                "Check the query: names must be non-empty and coordinates within range"
            }
            ErrorKind::RetriableProvider => "Provider quota exceeded, wait before trying again",
            ErrorKind::FatalProvider => "Check the API key and request parameters for this provider",
            ErrorKind::Transport => "Check network connectivity and try again",
            ErrorKind::Cancelled => "Request was cancelled",
            ErrorKind::Configuration => "Configure at least one provider and a transport",
            ErrorKind::Internal => "Report this as a bug",
        }
    }
}

impl GeocoderError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            GeocoderError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            GeocoderError::Provider { source, .. } => source.kind(),
            GeocoderError::Configuration(_) => ErrorKind::Configuration,
            GeocoderError::Cancelled => ErrorKind::Cancelled,
            GeocoderError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the engine may retry after this failure
    pub fn is_retriable(&self) -> bool {
        matches!(self, GeocoderError::Provider { source, .. } if source.is_retriable())
    }

    /// Strip the retriable marker from a provider failure
    pub fn into_cause(self) -> GeocoderError {
        match self {
            GeocoderError::Provider { provider, source } => GeocoderError::Provider {
                provider,
                source: source.into_cause(),
            },
            other => other,
        }
    }

    /// Provider failure for `provider`
    pub fn provider(provider: impl Into<String>, source: ProviderError) -> Self {
        GeocoderError::Provider {
            provider: provider.into(),
            source,
        }
    }
}
