//! # Geocoder Library
//!
//! Resolves place names to coordinates (forward geocoding) and coordinates to
//! place descriptions (reverse geocoding) by querying one or more third-party
//! geocoding services and normalizing their responses into one [`Address`]
//! model.
//!
//! ## Features
//!
//! - **Provider Fallback**: Providers are queried strictly in configured order;
//!   a [`SwitchPolicy`](engine::SwitchPolicy) decides whether to accept a
//!   result or fall through to the next provider
//! - **Retry With Backoff**: Provider-reported transient failures (quota
//!   exceeded) re-run the whole lookup after 2s, then 4s
//! - **Cancellation**: Every lookup runs as a spawned task that can be
//!   cancelled at any point; the in-flight HTTP request is aborted
//! - **Typed Addresses**: One flat, serializable record for every backend
//!
//! ## Quick Start
//!
//! ```no_run
//! use geocoder::engine::{GeocoderBuilder, SwitchOnEmpty};
//! use geocoder::provider::{google_maps::GoogleMaps, openstreetmap::OpenStreetMap};
//! use geocoder::transport::http::HttpTransportFactory;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let geocoder = GeocoderBuilder::new()
//!     .add_provider(GoogleMaps::with_api_key("my-key"))
//!     .add_provider(OpenStreetMap::new())
//!     .transport_factory(HttpTransportFactory::new())
//!     .switch_policy(SwitchOnEmpty)
//!     .build()?;
//!
//! let addresses = geocoder.by_name("1600 Amphitheatre Parkway, Mountain View").await?;
//! for address in addresses {
//!     println!("{:?}", address.formatted_address);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`engine`] - Provider sequencing, retry state machine, switch policies, builder
//! - [`provider`] - Provider adapter contract and the bundled backends
//! - [`transport`] - Cancellable byte-fetch abstraction and the HTTP implementation
//! - [`cancel`] - Cancellation token shared between a task and its transport
//! - [`metrics`] - Counters and histograms for lookups, retries and switches
//! - [`cli`] - Command line interface for the `geocoder` binary

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Cancellation token shared between a lookup task and its transport
pub mod cancel;

/// CLI command implementations
pub mod cli;

/// Geocoding engine
pub mod engine;

/// Observability metrics
pub mod metrics;

/// Provider adapters
pub mod provider;

/// Transport abstraction
pub mod transport;

// Re-export commonly used types
pub use engine::{GeocodeTask, Geocoder, GeocoderBuilder, GeocoderError};

/// Minimum valid latitude in degrees
pub const LATITUDE_MIN: f64 = -90.0;
/// Maximum valid latitude in degrees
pub const LATITUDE_MAX: f64 = 90.0;
/// Minimum valid longitude in degrees
pub const LONGITUDE_MIN: f64 = -180.0;
/// Maximum valid longitude in degrees
pub const LONGITUDE_MAX: f64 = 180.0;

/// Whether `latitude` lies in `[-90, 90]`. NaN is never valid.
pub fn is_valid_latitude(latitude: f64) -> bool {
    (LATITUDE_MIN..=LATITUDE_MAX).contains(&latitude)
}

/// Whether `longitude` lies in `[-180, 180]`. NaN is never valid.
pub fn is_valid_longitude(longitude: f64) -> bool {
    (LONGITUDE_MIN..=LONGITUDE_MAX).contains(&longitude)
}

/// A geographic point. Either coordinate may be absent when a backend omits it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Latitude in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Longitude in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Location {
    /// Create a location with both coordinates present
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }
}

/// Recommended viewport for displaying a result
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// North-east corner
    pub northeast: Location,
    /// South-west corner
    pub southwest: Location,
}

/// Bounding box that fully contains a result
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    /// South-west corner
    pub southwest: Location,
    /// North-east corner
    pub northeast: Location,
}

/// Search area for a bounded forward lookup.
///
/// Unlike [`Bounds`] every coordinate is required, since it is sent to the
/// backend as a query parameter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    /// Latitude of the south-west corner
    pub lower_left_latitude: f64,
    /// Longitude of the south-west corner
    pub lower_left_longitude: f64,
    /// Latitude of the north-east corner
    pub upper_right_latitude: f64,
    /// Longitude of the north-east corner
    pub upper_right_longitude: f64,
}

impl BoundingBox {
    /// Create a bounding box from its south-west and north-east corners
    pub fn new(
        lower_left_latitude: f64,
        lower_left_longitude: f64,
        upper_right_latitude: f64,
        upper_right_longitude: f64,
    ) -> Self {
        Self {
            lower_left_latitude,
            lower_left_longitude,
            upper_right_latitude,
            upper_right_longitude,
        }
    }

    /// Validate every corner coordinate
    pub fn validate(&self) -> Result<(), String> {
        for (label, value) in [
            ("lower-left latitude", self.lower_left_latitude),
            ("upper-right latitude", self.upper_right_latitude),
        ] {
            if !is_valid_latitude(value) {
                return Err(format!("{label} == {value}"));
            }
        }

        for (label, value) in [
            ("lower-left longitude", self.lower_left_longitude),
            ("upper-right longitude", self.upper_right_longitude),
        ] {
            if !is_valid_longitude(value) {
                return Err(format!("{label} == {value}"));
            }
        }

        Ok(())
    }
}

impl FromStr for BoundingBox {
    type Err = String;

    /// Parse `south,west,north,east`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("Invalid bounding box '{s}': {e}"))?;

        match parts.as_slice() {
            [south, west, north, east] => Ok(Self::new(*south, *west, *north, *east)),
            _ => Err(format!(
                "Invalid bounding box '{s}': expected south,west,north,east"
            )),
        }
    }
}

/// Normalized geocoding result.
///
/// Every field is optional; backends fill in what they know. Unset fields are
/// omitted from the serialized form rather than written as empty strings, so a
/// JSON round trip reproduces the record exactly.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    /// Human-readable full address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    /// Precise street address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    /// Named route, e.g. a road name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    /// Major intersection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intersection: Option<String>,
    /// Political entity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub political: Option<String>,
    /// Country
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// First-order civil entity below country (state, province)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub administrative_area_level1: Option<String>,
    /// Second-order civil entity (county, city)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub administrative_area_level2: Option<String>,
    /// Third-order civil entity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub administrative_area_level3: Option<String>,
    /// Fourth-order civil entity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub administrative_area_level4: Option<String>,
    /// Fifth-order civil entity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub administrative_area_level5: Option<String>,
    /// Commonly used alternative name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colloquial_area: Option<String>,
    /// Incorporated city or town
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    /// Ward
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ward: Option<String>,
    /// Civil entity below a locality
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_locality: Option<String>,
    /// Sub-locality level 1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_locality_level1: Option<String>,
    /// Sub-locality level 2
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_locality_level2: Option<String>,
    /// Sub-locality level 3
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_locality_level3: Option<String>,
    /// Sub-locality level 4
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_locality_level4: Option<String>,
    /// Sub-locality level 5
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_locality_level5: Option<String>,
    /// Named neighborhood
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    /// Named location, usually a building
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premise: Option<String>,
    /// Entity below a premise, e.g. an apartment block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_premise: Option<String>,
    /// Postal code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    /// Prominent natural feature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub natural_feature: Option<String>,
    /// Airport
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airport: Option<String>,
    /// Named park
    #[serde(skip_serializing_if = "Option::is_none")]
    pub park: Option<String>,
    /// Named point of interest
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_of_interest: Option<String>,
    /// Floor of a building
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
    /// Establishment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub establishment: Option<String>,
    /// Parking lot or structure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parking: Option<String>,
    /// Post box
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_box: Option<String>,
    /// Postal town
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_town: Option<String>,
    /// Room of a building
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    /// Street number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_number: Option<String>,
    /// Bus station
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bus_station: Option<String>,
    /// Train station
    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_station: Option<String>,
    /// Transit station
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transit_station: Option<String>,
    /// Geocoded point
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Precision of [`location`](Self::location) as reported by the backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_type: Option<String>,
    /// Recommended viewport
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
    /// Bounding box containing the result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
}

impl Address {
    /// Read a textual field by name
    pub fn field(&self, field: AddressField) -> Option<&str> {
        let value = match field {
            AddressField::FormattedAddress => &self.formatted_address,
            AddressField::StreetAddress => &self.street_address,
            AddressField::Route => &self.route,
            AddressField::Intersection => &self.intersection,
            AddressField::Political => &self.political,
            AddressField::Country => &self.country,
            AddressField::AdministrativeAreaLevel1 => &self.administrative_area_level1,
            AddressField::AdministrativeAreaLevel2 => &self.administrative_area_level2,
            AddressField::AdministrativeAreaLevel3 => &self.administrative_area_level3,
            AddressField::AdministrativeAreaLevel4 => &self.administrative_area_level4,
            AddressField::AdministrativeAreaLevel5 => &self.administrative_area_level5,
            AddressField::ColloquialArea => &self.colloquial_area,
            AddressField::Locality => &self.locality,
            AddressField::Ward => &self.ward,
            AddressField::SubLocality => &self.sub_locality,
            AddressField::SubLocalityLevel1 => &self.sub_locality_level1,
            AddressField::SubLocalityLevel2 => &self.sub_locality_level2,
            AddressField::SubLocalityLevel3 => &self.sub_locality_level3,
            AddressField::SubLocalityLevel4 => &self.sub_locality_level4,
            AddressField::SubLocalityLevel5 => &self.sub_locality_level5,
            AddressField::Neighborhood => &self.neighborhood,
            AddressField::Premise => &self.premise,
            AddressField::SubPremise => &self.sub_premise,
            AddressField::PostalCode => &self.postal_code,
            AddressField::NaturalFeature => &self.natural_feature,
            AddressField::Airport => &self.airport,
            AddressField::Park => &self.park,
            AddressField::PointOfInterest => &self.point_of_interest,
            AddressField::Floor => &self.floor,
            AddressField::Establishment => &self.establishment,
            AddressField::Parking => &self.parking,
            AddressField::PostBox => &self.post_box,
            AddressField::PostTown => &self.post_town,
            AddressField::Room => &self.room,
            AddressField::StreetNumber => &self.street_number,
            AddressField::BusStation => &self.bus_station,
            AddressField::TrainStation => &self.train_station,
            AddressField::TransitStation => &self.transit_station,
            AddressField::LocationType => &self.location_type,
        };
        value.as_deref()
    }

    /// Whether a textual field is present and non-empty
    pub fn has_field(&self, field: AddressField) -> bool {
        self.field(field).is_some_and(|v| !v.is_empty())
    }

    /// Best single-line description: the formatted address, or the most
    /// specific named component available
    pub fn display_line(&self) -> Option<&str> {
        [
            AddressField::FormattedAddress,
            AddressField::StreetAddress,
            AddressField::PointOfInterest,
            AddressField::Route,
            AddressField::Locality,
            AddressField::AdministrativeAreaLevel2,
            AddressField::AdministrativeAreaLevel1,
            AddressField::Country,
        ]
        .into_iter()
        .find_map(|field| self.field(field).filter(|v| !v.is_empty()))
    }
}

/// Names of the textual [`Address`] fields, used by switch policies and the
/// CLI to express "required" components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum AddressField {
    FormattedAddress,
    StreetAddress,
    Route,
    Intersection,
    Political,
    Country,
    #[serde(rename = "administrative_area_level_1")]
    #[value(name = "administrative_area_level_1")]
    AdministrativeAreaLevel1,
    #[serde(rename = "administrative_area_level_2")]
    #[value(name = "administrative_area_level_2")]
    AdministrativeAreaLevel2,
    #[serde(rename = "administrative_area_level_3")]
    #[value(name = "administrative_area_level_3")]
    AdministrativeAreaLevel3,
    #[serde(rename = "administrative_area_level_4")]
    #[value(name = "administrative_area_level_4")]
    AdministrativeAreaLevel4,
    #[serde(rename = "administrative_area_level_5")]
    #[value(name = "administrative_area_level_5")]
    AdministrativeAreaLevel5,
    ColloquialArea,
    Locality,
    Ward,
    SubLocality,
    #[serde(rename = "sub_locality_level_1")]
    #[value(name = "sub_locality_level_1")]
    SubLocalityLevel1,
    #[serde(rename = "sub_locality_level_2")]
    #[value(name = "sub_locality_level_2")]
    SubLocalityLevel2,
    #[serde(rename = "sub_locality_level_3")]
    #[value(name = "sub_locality_level_3")]
    SubLocalityLevel3,
    #[serde(rename = "sub_locality_level_4")]
    #[value(name = "sub_locality_level_4")]
    SubLocalityLevel4,
    #[serde(rename = "sub_locality_level_5")]
    #[value(name = "sub_locality_level_5")]
    SubLocalityLevel5,
    Neighborhood,
    Premise,
    SubPremise,
    PostalCode,
    NaturalFeature,
    Airport,
    Park,
    PointOfInterest,
    Floor,
    Establishment,
    Parking,
    PostBox,
    PostTown,
    Room,
    StreetNumber,
    BusStation,
    TrainStation,
    TransitStation,
    LocationType,
}
