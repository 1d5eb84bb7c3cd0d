//! Google Maps Geocoding API adapter
//!
//! Builds requests against the JSON geocoding endpoint and parses the
//! `status` / `results` envelope. `OVER_QUERY_LIMIT` is the only status the
//! engine may retry; every other non-OK status is a rejection.

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use std::str::FromStr;

use super::{ProviderAdapter, ProviderError, ProviderResult};
use crate::transport::Transport;
use crate::{Address, BoundingBox, Bounds, Location, Viewport};

/// Provider name reported to switch policies
pub const API_NAME: &str = "Google Maps Api";

/// Geocoding endpoint
pub const ENDPOINT_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Response status codes
///
/// <https://developers.google.com/maps/documentation/geocoding/requests-geocoding#StatusCodes>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// At least one result was returned
    Ok,
    /// The request succeeded but matched nothing
    ZeroResults,
    /// Quota exceeded
    OverQueryLimit,
    /// Request denied, usually a key problem
    RequestDenied,
    /// Query parameter missing or malformed
    InvalidRequest,
    /// Server error; anything unrecognised also maps here
    UnknownError,
}

impl Status {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::ZeroResults => "ZERO_RESULTS",
            Status::OverQueryLimit => "OVER_QUERY_LIMIT",
            Status::RequestDenied => "REQUEST_DENIED",
            Status::InvalidRequest => "INVALID_REQUEST",
            Status::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Parse a status string, mapping empty or unknown values to
    /// [`Status::UnknownError`]
    pub fn parse_lossy(s: &str) -> Self {
        Status::from_str(s).unwrap_or(Status::UnknownError)
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OK" => Ok(Status::Ok),
            "ZERO_RESULTS" => Ok(Status::ZeroResults),
            "OVER_QUERY_LIMIT" => Ok(Status::OverQueryLimit),
            "REQUEST_DENIED" => Ok(Status::RequestDenied),
            "INVALID_REQUEST" => Ok(Status::InvalidRequest),
            "UNKNOWN_ERROR" => Ok(Status::UnknownError),
            _ => Err(format!("Invalid status: {s}")),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by the Google payload itself
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GoogleMapsError {
    /// Non-OK status, with `error_message` when present
    #[error("{}", status_message(.status, .message))]
    Status {
        /// Response status
        status: Status,
        /// `error_message` field
        message: Option<String>,
    },

    /// Malformed JSON or missing `status`
    #[error("{0}")]
    Malformed(String),
}

fn status_message<'a>(status: &'a Status, message: &'a Option<String>) -> &'a str {
    message.as_deref().unwrap_or(status.as_str())
}

impl From<GoogleMapsError> for ProviderError {
    fn from(e: GoogleMapsError) -> Self {
        match e {
            GoogleMapsError::Status { status, message } => {
                let rejected = ProviderError::Rejected {
                    provider: API_NAME.to_string(),
                    status: status.to_string(),
                    message,
                };
                if status == Status::OverQueryLimit {
                    ProviderError::retriable(rejected)
                } else {
                    rejected
                }
            }
            GoogleMapsError::Malformed(msg) => ProviderError::Parse(msg),
        }
    }
}

/// Google Maps adapter
#[derive(Debug, Clone)]
pub struct GoogleMaps {
    api_key: Option<String>,
    endpoint: String,
    max_results: Option<u32>,
}

impl GoogleMaps {
    /// Adapter without an API key
    pub fn new() -> Self {
        Self {
            api_key: None,
            endpoint: ENDPOINT_URL.to_string(),
            max_results: None,
        }
    }

    /// Adapter sending `key=<api_key>` with every request. An empty key is
    /// treated as no key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        Self {
            api_key: (!api_key.is_empty()).then_some(api_key),
            ..Self::new()
        }
    }

    /// Override the endpoint URL
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Keep at most `max_results` results per lookup
    pub fn max_results(mut self, max_results: Option<u32>) -> Self {
        self.max_results = max_results;
        self
    }

    /// Build a request URL carrying `params` and the API key
    pub fn request_url(&self, params: &[(&str, String)]) -> ProviderResult<String> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| ProviderError::Parse(format!("invalid endpoint {}: {e}", self.endpoint)))?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(key) = &self.api_key {
                query.append_pair("key", key);
            }
            for (name, value) in params {
                query.append_pair(name, value);
            }
        }
        Ok(url.into())
    }

    async fn request(
        &self,
        transport: &dyn Transport,
        params: &[(&str, String)],
    ) -> ProviderResult<Vec<Address>> {
        let url = self.request_url(params)?;
        let data = transport.fetch(&url).await?;
        let limit = self.max_results.map(|n| n as usize);
        Ok(GoogleMapsParser::parse_json(&data, limit)?)
    }
}

impl Default for GoogleMaps {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderAdapter for GoogleMaps {
    type Record = Address;

    fn name(&self) -> &str {
        API_NAME
    }

    async fn location_call(
        &self,
        transport: &dyn Transport,
        location_name: &str,
    ) -> ProviderResult<Vec<Address>> {
        self.request(transport, &[("address", location_name.to_string())])
            .await
    }

    async fn location_call_with_bounds(
        &self,
        transport: &dyn Transport,
        location_name: &str,
        bounds: &BoundingBox,
    ) -> ProviderResult<Vec<Address>> {
        let bounds = format!(
            "{},{}|{},{}",
            bounds.lower_left_latitude,
            bounds.lower_left_longitude,
            bounds.upper_right_latitude,
            bounds.upper_right_longitude
        );
        self.request(
            transport,
            &[("address", location_name.to_string()), ("bounds", bounds)],
        )
        .await
    }

    async fn coordinate_call(
        &self,
        transport: &dyn Transport,
        latitude: f64,
        longitude: f64,
    ) -> ProviderResult<Vec<Address>> {
        self.request(transport, &[("latlng", format!("{latitude},{longitude}"))])
            .await
    }

    fn convert(&self, records: Vec<Address>) -> ProviderResult<Vec<Address>> {
        Ok(records)
    }
}

/// Stateless parser for Google geocoding responses
pub struct GoogleMapsParser;

impl GoogleMapsParser {
    /// Parse a raw response body
    ///
    /// # Returns
    /// Parsed addresses for `OK`, an empty list for `ZERO_RESULTS`
    ///
    /// # Errors
    /// [`GoogleMapsError::Status`] for any other status,
    /// [`GoogleMapsError::Malformed`] for invalid JSON or a missing `status`
    pub fn parse_json(data: &[u8], max_results: Option<usize>) -> Result<Vec<Address>, GoogleMapsError> {
        let json: Value = serde_json::from_slice(data)
            .map_err(|e| GoogleMapsError::Malformed(format!("invalid JSON: {e}")))?;

        let status = json
            .get("status")
            .and_then(Value::as_str)
            .ok_or_else(|| GoogleMapsError::Malformed("No \"status\" field".to_string()))?;

        match Status::parse_lossy(status) {
            Status::Ok => match json.get("results") {
                Some(results) => Self::parse_results(results, max_results),
                None => Ok(Vec::new()),
            },
            Status::ZeroResults => Ok(Vec::new()),
            status => Err(GoogleMapsError::Status {
                status,
                message: json
                    .get("error_message")
                    .and_then(Value::as_str)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string),
            }),
        }
    }

    /// Parse the `results` array
    pub fn parse_results(
        results: &Value,
        max_results: Option<usize>,
    ) -> Result<Vec<Address>, GoogleMapsError> {
        let results = results
            .as_array()
            .ok_or_else(|| GoogleMapsError::Malformed("\"results\" is not an array".to_string()))?;

        let count = max_results.map_or(results.len(), |max| max.min(results.len()));
        let mut addresses = Vec::with_capacity(count);

        for result in results.iter().take(count) {
            let mut address = Address {
                formatted_address: result
                    .get("formatted_address")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                ..Default::default()
            };
            Self::parse_geometry(result, &mut address);
            Self::parse_address_components(result, &mut address);
            addresses.push(address);
        }

        Ok(addresses)
    }

    fn parse_geometry(result: &Value, address: &mut Address) {
        let Some(geometry) = result.get("geometry") else {
            return;
        };

        address.location_type = geometry
            .get("location_type")
            .and_then(Value::as_str)
            .map(str::to_string);
        address.location = geometry.get("location").map(Self::parse_location);
        address.viewport = Self::parse_corners(geometry.get("viewport")).map(
            |(southwest, northeast)| Viewport {
                northeast,
                southwest,
            },
        );
        address.bounds = Self::parse_corners(geometry.get("bounds")).map(
            |(southwest, northeast)| Bounds {
                southwest,
                northeast,
            },
        );
    }

    fn parse_location(value: &Value) -> Location {
        Location {
            latitude: value.get("lat").and_then(Value::as_f64),
            longitude: value.get("lng").and_then(Value::as_f64),
        }
    }

    /// `(southwest, northeast)` when both corners are present
    fn parse_corners(value: Option<&Value>) -> Option<(Location, Location)> {
        let value = value?;
        let southwest = value.get("southwest")?;
        let northeast = value.get("northeast")?;
        Some((Self::parse_location(southwest), Self::parse_location(northeast)))
    }

    fn parse_address_components(result: &Value, address: &mut Address) {
        let Some(components) = result.get("address_components").and_then(Value::as_array) else {
            return;
        };

        for component in components {
            let Some(types) = component.get("types").and_then(Value::as_array) else {
                continue;
            };

            let value = Self::component_name(component, "long_name")
                .or_else(|| Self::component_name(component, "short_name"));
            let Some(value) = value else {
                continue;
            };

            for component_type in types.iter().filter_map(Value::as_str) {
                if let Some(slot) = Self::component_slot(address, component_type) {
                    *slot = Some(value.to_string());
                }
            }
        }
    }

    fn component_name<'a>(component: &'a Value, key: &str) -> Option<&'a str> {
        component.get(key).and_then(Value::as_str).filter(|v| !v.is_empty())
    }

    fn component_slot<'a>(address: &'a mut Address, component_type: &str) -> Option<&'a mut Option<String>> {
        let slot = match component_type {
            "street_address" => &mut address.street_address,
            "route" => &mut address.route,
            "intersection" => &mut address.intersection,
            "political" => &mut address.political,
            "country" => &mut address.country,
            "administrative_area_level_1" => &mut address.administrative_area_level1,
            "administrative_area_level_2" => &mut address.administrative_area_level2,
            "administrative_area_level_3" => &mut address.administrative_area_level3,
            "administrative_area_level_4" => &mut address.administrative_area_level4,
            "administrative_area_level_5" => &mut address.administrative_area_level5,
            "colloquial_area" => &mut address.colloquial_area,
            "locality" => &mut address.locality,
            "ward" => &mut address.ward,
            "sublocality" => &mut address.sub_locality,
            "sublocality_level_1" => &mut address.sub_locality_level1,
            "sublocality_level_2" => &mut address.sub_locality_level2,
            "sublocality_level_3" => &mut address.sub_locality_level3,
            "sublocality_level_4" => &mut address.sub_locality_level4,
            "sublocality_level_5" => &mut address.sub_locality_level5,
            "neighborhood" => &mut address.neighborhood,
            "premise" => &mut address.premise,
            "subpremise" => &mut address.sub_premise,
            "postal_code" => &mut address.postal_code,
            "natural_feature" => &mut address.natural_feature,
            "airport" => &mut address.airport,
            "park" => &mut address.park,
            "point_of_interest" => &mut address.point_of_interest,
            "floor" => &mut address.floor,
            "establishment" => &mut address.establishment,
            "parking" => &mut address.parking,
            "post_box" => &mut address.post_box,
            "postal_town" => &mut address.post_town,
            "room" => &mut address.room,
            "street_number" => &mut address.street_number,
            "bus_station" => &mut address.bus_station,
            "train_station" => &mut address.train_station,
            "transit_station" => &mut address.transit_station,
            _ => return None,
        };
        Some(slot)
    }
}
