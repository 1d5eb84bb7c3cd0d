//! Unit tests for the Google Maps parser and adapter

use geocoder::provider::google_maps::{GoogleMaps, GoogleMapsError, GoogleMapsParser, Status, API_NAME};
use geocoder::provider::{Lookup, Provider, ProviderError};
use geocoder::transport::TransportError;
use geocoder::{BoundingBox, Location};
use serde_json::json;

use crate::support::StaticTransport;

fn amphitheatre() -> serde_json::Value {
    json!({
        "results": [
            {
                "address_components": [
                    { "long_name": "1600", "short_name": "1600", "types": ["street_number"] },
                    { "long_name": "Amphitheatre Parkway", "short_name": "Amphitheatre Pkwy", "types": ["route"] },
                    { "long_name": "Mountain View", "short_name": "Mountain View", "types": ["locality", "political"] },
                    { "long_name": "Santa Clara County", "short_name": "Santa Clara County", "types": ["administrative_area_level_2", "political"] },
                    { "long_name": "California", "short_name": "CA", "types": ["administrative_area_level_1", "political"] },
                    { "long_name": "United States", "short_name": "US", "types": ["country", "political"] },
                    { "long_name": "94043", "short_name": "94043", "types": ["postal_code"] }
                ],
                "formatted_address": "1600 Amphitheatre Pkwy, Mountain View, CA 94043, USA",
                "geometry": {
                    "location": { "lat": 37.4224764, "lng": -122.0842499 },
                    "location_type": "ROOFTOP",
                    "viewport": {
                        "northeast": { "lat": 37.4238253802915, "lng": -122.0829009197085 },
                        "southwest": { "lat": 37.4211274197085, "lng": -122.0855988802915 }
                    }
                },
                "place_id": "ChIJ2eUgeAK6j4ARbn5u_wAGqWA",
                "types": ["street_address"]
            },
            {
                "address_components": [],
                "formatted_address": "Second result",
                "geometry": {
                    "location": { "lat": 1.0, "lng": 2.0 },
                    "bounds": {
                        "northeast": { "lat": 3.0, "lng": 4.0 },
                        "southwest": { "lat": 1.5, "lng": 2.5 }
                    }
                }
            }
        ],
        "status": "OK"
    })
}

fn body(value: serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(&value).unwrap()
}

#[test]
fn test_parse_ok_response() {
    let addresses = GoogleMapsParser::parse_json(&body(amphitheatre()), None).unwrap();
    assert_eq!(addresses.len(), 2);

    let first = &addresses[0];
    assert_eq!(
        first.formatted_address.as_deref(),
        Some("1600 Amphitheatre Pkwy, Mountain View, CA 94043, USA")
    );
    assert_eq!(first.street_number.as_deref(), Some("1600"));
    assert_eq!(first.route.as_deref(), Some("Amphitheatre Parkway"));
    assert_eq!(first.locality.as_deref(), Some("Mountain View"));
    assert_eq!(first.political.as_deref(), Some("United States"));
    assert_eq!(first.administrative_area_level1.as_deref(), Some("California"));
    assert_eq!(first.administrative_area_level2.as_deref(), Some("Santa Clara County"));
    assert_eq!(first.postal_code.as_deref(), Some("94043"));
    assert_eq!(first.location, Some(Location::new(37.4224764, -122.0842499)));
    assert_eq!(first.location_type.as_deref(), Some("ROOFTOP"));
    assert!(first.bounds.is_none());

    let viewport = first.viewport.unwrap();
    assert_eq!(viewport.northeast, Location::new(37.4238253802915, -122.0829009197085));
    assert_eq!(viewport.southwest, Location::new(37.4211274197085, -122.0855988802915));

    let bounds = addresses[1].bounds.unwrap();
    assert_eq!(bounds.southwest, Location::new(1.5, 2.5));
    assert_eq!(bounds.northeast, Location::new(3.0, 4.0));
}

#[test]
fn test_parse_truncates_to_max_results() {
    let addresses = GoogleMapsParser::parse_json(&body(amphitheatre()), Some(1)).unwrap();
    assert_eq!(addresses.len(), 1);
}

#[test]
fn test_short_name_used_when_long_name_missing() {
    let response = json!({
        "status": "OK",
        "results": [{
            "address_components": [
                { "short_name": "CA", "types": ["administrative_area_level_1"] },
                { "long_name": "", "short_name": "", "types": ["route"] }
            ]
        }]
    });
    let addresses = GoogleMapsParser::parse_json(&body(response), None).unwrap();
    assert_eq!(addresses[0].administrative_area_level1.as_deref(), Some("CA"));
    assert_eq!(addresses[0].route, None);
}

#[test]
fn test_short_name_used_when_long_name_empty() {
    let response = json!({
        "status": "OK",
        "results": [{
            "address_components": [
                { "long_name": "", "short_name": "94043", "types": ["postal_code"] }
            ]
        }]
    });
    let addresses = GoogleMapsParser::parse_json(&body(response), None).unwrap();
    assert_eq!(addresses[0].postal_code.as_deref(), Some("94043"));
}

#[test]
fn test_zero_results_is_empty() {
    let addresses =
        GoogleMapsParser::parse_json(&body(json!({ "results": [], "status": "ZERO_RESULTS" })), None)
            .unwrap();
    assert!(addresses.is_empty());
}

#[test]
fn test_error_statuses() {
    let err = GoogleMapsParser::parse_json(
        &body(json!({
            "error_message": "The provided API key is invalid.",
            "results": [],
            "status": "REQUEST_DENIED"
        })),
        None,
    )
    .unwrap_err();
    assert_eq!(
        err,
        GoogleMapsError::Status {
            status: Status::RequestDenied,
            message: Some("The provided API key is invalid.".to_string()),
        }
    );

    let err = GoogleMapsParser::parse_json(&body(json!({ "status": "SOMETHING_NEW" })), None)
        .unwrap_err();
    assert_eq!(
        err,
        GoogleMapsError::Status {
            status: Status::UnknownError,
            message: None,
        }
    );
}

#[test]
fn test_missing_status_is_malformed() {
    let err = GoogleMapsParser::parse_json(&body(json!({ "results": [] })), None).unwrap_err();
    assert!(matches!(err, GoogleMapsError::Malformed(_)));

    let err = GoogleMapsParser::parse_json(b"<html>", None).unwrap_err();
    assert!(matches!(err, GoogleMapsError::Malformed(_)));
}

#[tokio::test]
async fn test_adapter_name_lookup() {
    let transport = StaticTransport::ok(body(amphitheatre()));
    let maps = GoogleMaps::with_api_key("secret").max_results(Some(1));

    let addresses = Provider::lookup(&maps, &transport, &Lookup::Name("Googleplex".into()))
        .await
        .unwrap();

    assert_eq!(addresses.len(), 1);
    assert_eq!(
        transport.urls(),
        vec!["https://maps.googleapis.com/maps/api/geocode/json?key=secret&address=Googleplex".to_string()]
    );
}

#[tokio::test]
async fn test_adapter_bounds_and_coordinate_params() {
    let transport = StaticTransport::ok(body(json!({ "status": "ZERO_RESULTS" })));
    let maps = GoogleMaps::new();

    let bounded = Lookup::NameInBounds {
        name: "Cafe".into(),
        bounds: BoundingBox::new(34.0, -118.5, 34.2, -118.2),
    };
    Provider::lookup(&maps, &transport, &bounded).await.unwrap();

    let reverse = Lookup::Coordinate {
        latitude: 40.714224,
        longitude: -73.961452,
    };
    Provider::lookup(&maps, &transport, &reverse).await.unwrap();

    let urls = transport.urls();
    assert!(urls[0].ends_with("address=Cafe&bounds=34%2C-118.5%7C34.2%2C-118.2"));
    assert!(urls[1].ends_with("latlng=40.714224%2C-73.961452"));
}

#[tokio::test]
async fn test_adapter_over_query_limit_is_retriable() {
    let transport = StaticTransport::ok(body(json!({ "status": "OVER_QUERY_LIMIT" })));
    let err = Provider::lookup(&GoogleMaps::new(), &transport, &Lookup::Name("x".into()))
        .await
        .unwrap_err();

    assert!(err.is_retriable());
    assert_eq!(
        err.into_cause(),
        ProviderError::Rejected {
            provider: API_NAME.to_string(),
            status: "OVER_QUERY_LIMIT".to_string(),
            message: None,
        }
    );
}

#[tokio::test]
async fn test_adapter_transport_error_is_fatal() {
    let transport = StaticTransport::err(TransportError::Status {
        status: 503,
        body: "unavailable".into(),
    });
    let err = Provider::lookup(&GoogleMaps::new(), &transport, &Lookup::Name("x".into()))
        .await
        .unwrap_err();

    assert!(!err.is_retriable());
    assert!(err.is_transport());
}
