//! Provider adapters
//!
//! A provider adapter knows how to build a backend-specific request URL, run
//! it through a [`Transport`], parse the payload into backend-native records
//! and convert those into [`Address`]es. Adapters implement the typed
//! [`ProviderAdapter`] trait; the engine only ever sees the object-safe
//! [`Provider`] capability, which every adapter gets through a blanket impl.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::engine::ErrorKind;
use crate::transport::{Transport, TransportError};
use crate::{is_valid_latitude, is_valid_longitude, Address, BoundingBox};

pub mod google_maps;
pub mod openstreetmap;

/// Provider errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    /// Transient backend condition (e.g. quota exceeded); eligible for retry
    #[error("retriable: {0}")]
    Retriable(Box<ProviderError>),

    /// Backend rejected or failed the request
    #[error("{provider} returned {status}{}", message_suffix(.message))]
    Rejected {
        /// Provider name
        provider: String,
        /// Backend status code or label
        status: String,
        /// Backend error message, if any
        message: Option<String>,
    },

    /// Response payload could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// Transport failure
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

impl ProviderError {
    /// Mark `cause` as eligible for retry
    pub fn retriable(cause: ProviderError) -> Self {
        match cause {
            already @ ProviderError::Retriable(_) => already,
            other => ProviderError::Retriable(Box::new(other)),
        }
    }

    /// Whether the engine may retry after this failure
    pub fn is_retriable(&self) -> bool {
        matches!(self, ProviderError::Retriable(_))
    }

    /// Strip the retriable marker, returning the underlying failure
    pub fn into_cause(self) -> ProviderError {
        match self {
            ProviderError::Retriable(cause) => cause.into_cause(),
            other => other,
        }
    }

    /// Error class used for reporting and retry decisions
    pub fn kind(&self) -> ErrorKind {
        if self.is_retriable() {
            ErrorKind::RetriableProvider
        } else if self.is_transport() {
            ErrorKind::Transport
        } else {
            ErrorKind::FatalProvider
        }
    }

    /// Whether the failure originated in the transport layer
    pub fn is_transport(&self) -> bool {
        match self {
            ProviderError::Transport(_) => true,
            ProviderError::Retriable(cause) => cause.is_transport(),
            _ => false,
        }
    }
}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// One logical geocoding request
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Forward lookup by place name
    Name(String),
    /// Forward lookup restricted to a search area
    NameInBounds {
        /// Place name
        name: String,
        /// Search area
        bounds: BoundingBox,
    },
    /// Reverse lookup
    Coordinate {
        /// Latitude in degrees
        latitude: f64,
        /// Longitude in degrees
        longitude: f64,
    },
}

impl Lookup {
    /// Short label used in logs and metrics
    pub fn operation(&self) -> &'static str {
        match self {
            Lookup::Name(_) => "by_name",
            Lookup::NameInBounds { .. } => "by_name_in_bounds",
            Lookup::Coordinate { .. } => "by_coordinate",
        }
    }

    /// Check arguments before anything touches the network
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Lookup::Name(name) => validate_name(name),
            Lookup::NameInBounds { name, bounds } => {
                validate_name(name)?;
                bounds.validate()
            }
            Lookup::Coordinate {
                latitude,
                longitude,
            } => {
                if !is_valid_latitude(*latitude) {
                    return Err(format!("latitude == {latitude}"));
                }
                if !is_valid_longitude(*longitude) {
                    return Err(format!("longitude == {longitude}"));
                }
                Ok(())
            }
        }
    }
}

fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("locationName is empty".to_string());
    }
    Ok(())
}

/// Typed adapter contract implemented by each backend
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Backend-native result record
    type Record: Send;

    /// Stable provider name
    fn name(&self) -> &str;

    /// Forward lookup by place name
    async fn location_call(
        &self,
        transport: &dyn Transport,
        location_name: &str,
    ) -> ProviderResult<Vec<Self::Record>>;

    /// Forward lookup restricted to a search area
    async fn location_call_with_bounds(
        &self,
        transport: &dyn Transport,
        location_name: &str,
        bounds: &BoundingBox,
    ) -> ProviderResult<Vec<Self::Record>>;

    /// Reverse lookup
    async fn coordinate_call(
        &self,
        transport: &dyn Transport,
        latitude: f64,
        longitude: f64,
    ) -> ProviderResult<Vec<Self::Record>>;

    /// Convert backend-native records into addresses
    fn convert(&self, records: Vec<Self::Record>) -> ProviderResult<Vec<Address>>;
}

/// Object-safe provider capability consumed by the engine
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable provider name
    fn name(&self) -> &str;

    /// Run `lookup` through `transport` and convert the result
    async fn lookup(
        &self,
        transport: &dyn Transport,
        lookup: &Lookup,
    ) -> ProviderResult<Vec<Address>>;
}

#[async_trait]
impl<P> Provider for P
where
    P: ProviderAdapter,
{
    fn name(&self) -> &str {
        ProviderAdapter::name(self)
    }

    async fn lookup(
        &self,
        transport: &dyn Transport,
        lookup: &Lookup,
    ) -> ProviderResult<Vec<Address>> {
        let records = match lookup {
            Lookup::Name(name) => self.location_call(transport, name).await?,
            Lookup::NameInBounds { name, bounds } => {
                self.location_call_with_bounds(transport, name, bounds)
                    .await?
            }
            Lookup::Coordinate {
                latitude,
                longitude,
            } => self.coordinate_call(transport, *latitude, *longitude).await?,
        };
        self.convert(records)
    }
}

/// Bundled backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// Google Maps Geocoding API
    #[value(alias = "google")]
    GoogleMaps,
    /// OpenStreetMap Nominatim
    #[value(name = "openstreetmap", alias = "osm")]
    #[serde(rename = "openstreetmap")]
    OpenStreetMap,
}

impl ProviderKind {
    /// Every bundled backend, in default priority order
    pub const ALL: [ProviderKind; 2] = [ProviderKind::GoogleMaps, ProviderKind::OpenStreetMap];

    /// Display name of the backend
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::GoogleMaps => google_maps::API_NAME,
            ProviderKind::OpenStreetMap => openstreetmap::API_NAME,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProviderKind::GoogleMaps => "google-maps",
            ProviderKind::OpenStreetMap => "openstreetmap",
        };
        write!(f, "{s}")
    }
}

/// Settings shared by the bundled backends
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    /// Google Maps API key
    pub google_api_key: Option<String>,
    /// Cap on results per lookup
    pub max_results: Option<u32>,
}

/// Create a bundled provider
pub fn create_provider(kind: ProviderKind, settings: &ProviderSettings) -> Arc<dyn Provider> {
    match kind {
        ProviderKind::GoogleMaps => {
            let provider = match &settings.google_api_key {
                Some(key) => google_maps::GoogleMaps::with_api_key(key.clone()),
                None => google_maps::GoogleMaps::new(),
            };
            Arc::new(provider.max_results(settings.max_results))
        }
        ProviderKind::OpenStreetMap => {
            Arc::new(openstreetmap::OpenStreetMap::new().max_results(settings.max_results))
        }
    }
}
