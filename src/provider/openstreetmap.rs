//! OpenStreetMap Nominatim adapter

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::{ProviderAdapter, ProviderError, ProviderResult};
use crate::transport::{Transport, TransportError};
use crate::{Address, BoundingBox, Bounds, Location};

/// Provider name reported to switch policies
pub const API_NAME: &str = "Open Street Maps Api";

/// Forward search endpoint
pub const SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Reverse lookup endpoint
pub const REVERSE_URL: &str = "https://nominatim.openstreetmap.org/reverse";

/// One Nominatim place
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OsmPlace {
    /// Full display name
    pub display_name: Option<String>,
    /// Latitude as a decimal string
    pub lat: Option<String>,
    /// Longitude as a decimal string
    pub lon: Option<String>,
    /// `[south, north, west, east]` as decimal strings
    pub boundingbox: Option<Vec<String>>,
    /// OSM feature type
    #[serde(rename = "type")]
    pub place_type: Option<String>,
    /// Structured address, present with `addressdetails=1`
    pub address: Option<OsmAddressDetail>,
    /// Set by the reverse endpoint when nothing matched
    pub error: Option<String>,
}

/// Structured Nominatim address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OsmAddressDetail {
    /// Country name
    pub country: Option<String>,
    /// ISO 3166-1 alpha-2 code
    pub country_code: Option<String>,
    /// State or region
    pub state: Option<String>,
    /// County
    pub county: Option<String>,
    /// City
    pub city: Option<String>,
    /// Town, used when there is no city
    pub town: Option<String>,
    /// Village, used when there is no town
    pub village: Option<String>,
    /// Suburb
    pub suburb: Option<String>,
    /// Neighbourhood
    pub neighbourhood: Option<String>,
    /// Postal code
    pub postcode: Option<String>,
    /// Street name
    pub road: Option<String>,
    /// House number
    pub house_number: Option<String>,
}

impl OsmPlace {
    /// Map onto the common address model
    pub fn to_address(&self) -> Address {
        let detail = self.address.clone().unwrap_or_default();
        let location = match (parse_coord(&self.lat), parse_coord(&self.lon)) {
            (None, None) => None,
            (latitude, longitude) => Some(Location {
                latitude,
                longitude,
            }),
        };

        Address {
            formatted_address: self.display_name.clone(),
            country: detail.country,
            administrative_area_level1: detail.state,
            administrative_area_level2: detail.city.or(detail.town).or(detail.village),
            neighborhood: detail.neighbourhood,
            sub_locality: detail.suburb,
            postal_code: detail.postcode,
            route: detail.road,
            street_number: detail.house_number,
            location,
            bounds: self.bounds(),
            ..Default::default()
        }
    }

    fn bounds(&self) -> Option<Bounds> {
        let bbox = self.boundingbox.as_ref()?;
        let [south, north, west, east] = bbox.as_slice() else {
            return None;
        };
        let parse = |s: &String| s.parse::<f64>().ok();
        Some(Bounds {
            southwest: Location::new(parse(south)?, parse(west)?),
            northeast: Location::new(parse(north)?, parse(east)?),
        })
    }
}

fn parse_coord(value: &Option<String>) -> Option<f64> {
    value.as_deref().and_then(|s| s.trim().parse().ok())
}

/// OpenStreetMap adapter
#[derive(Debug, Clone)]
pub struct OpenStreetMap {
    search_url: String,
    reverse_url: String,
    max_results: Option<u32>,
}

impl OpenStreetMap {
    /// Adapter against the public Nominatim instance
    pub fn new() -> Self {
        Self {
            search_url: SEARCH_URL.to_string(),
            reverse_url: REVERSE_URL.to_string(),
            max_results: None,
        }
    }

    /// Point at a self-hosted Nominatim
    pub fn endpoints(mut self, search_url: impl Into<String>, reverse_url: impl Into<String>) -> Self {
        self.search_url = search_url.into();
        self.reverse_url = reverse_url.into();
        self
    }

    /// Keep at most `max_results` results per lookup
    pub fn max_results(mut self, max_results: Option<u32>) -> Self {
        self.max_results = max_results;
        self
    }

    /// Build a request URL with the common `format` and `addressdetails`
    /// parameters followed by `params`
    pub fn request_url(&self, base: &str, params: &[(&str, String)]) -> ProviderResult<String> {
        let mut url =
            Url::parse(base).map_err(|e| ProviderError::Parse(format!("invalid endpoint {base}: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("format", "json");
            query.append_pair("addressdetails", "1");
            for (name, value) in params {
                query.append_pair(name, value);
            }
            if let Some(limit) = self.max_results {
                query.append_pair("limit", &limit.to_string());
            }
        }
        Ok(url.into())
    }

    async fn search(
        &self,
        transport: &dyn Transport,
        params: &[(&str, String)],
    ) -> ProviderResult<Vec<OsmPlace>> {
        let url = self.request_url(&self.search_url, params)?;
        let data = transport.fetch(&url).await.map_err(classify)?;
        let mut places: Vec<OsmPlace> = serde_json::from_slice(&data)
            .map_err(|e| ProviderError::Parse(format!("invalid search response: {e}")))?;
        if let Some(max) = self.max_results {
            places.truncate(max as usize);
        }
        Ok(places)
    }
}

impl Default for OpenStreetMap {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP 429 from Nominatim is a usage-policy throttle and worth retrying
fn classify(e: TransportError) -> ProviderError {
    match e.status() {
        Some(429) => ProviderError::retriable(ProviderError::Transport(e)),
        _ => ProviderError::Transport(e),
    }
}

#[async_trait]
impl ProviderAdapter for OpenStreetMap {
    type Record = OsmPlace;

    fn name(&self) -> &str {
        API_NAME
    }

    async fn location_call(
        &self,
        transport: &dyn Transport,
        location_name: &str,
    ) -> ProviderResult<Vec<OsmPlace>> {
        self.search(transport, &[("q", location_name.to_string())])
            .await
    }

    async fn location_call_with_bounds(
        &self,
        transport: &dyn Transport,
        location_name: &str,
        bounds: &BoundingBox,
    ) -> ProviderResult<Vec<OsmPlace>> {
        let viewbox = format!(
            "{},{},{},{}",
            bounds.lower_left_longitude,
            bounds.lower_left_latitude,
            bounds.upper_right_longitude,
            bounds.upper_right_latitude
        );
        self.search(
            transport,
            &[
                ("q", location_name.to_string()),
                ("viewbox", viewbox),
                ("bounded", "1".to_string()),
            ],
        )
        .await
    }

    async fn coordinate_call(
        &self,
        transport: &dyn Transport,
        latitude: f64,
        longitude: f64,
    ) -> ProviderResult<Vec<OsmPlace>> {
        let url = self.request_url(
            &self.reverse_url,
            &[("lat", latitude.to_string()), ("lon", longitude.to_string())],
        )?;
        let data = transport.fetch(&url).await.map_err(classify)?;
        let place: OsmPlace = serde_json::from_slice(&data)
            .map_err(|e| ProviderError::Parse(format!("invalid reverse response: {e}")))?;

        if let Some(error) = &place.error {
            tracing::debug!(error = %error, "Reverse lookup matched nothing");
            return Ok(Vec::new());
        }
        Ok(vec![place])
    }

    fn convert(&self, records: Vec<OsmPlace>) -> ProviderResult<Vec<Address>> {
        Ok(records.iter().map(OsmPlace::to_address).collect())
    }
}
