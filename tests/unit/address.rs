//! Unit tests for the address model and its JSON form

use geocoder::{Address, AddressField, BoundingBox, Bounds, Location, Viewport};
use serde_json::json;

fn populated() -> Address {
    Address {
        formatted_address: Some("1600 Amphitheatre Pkwy, Mountain View, CA 94043, USA".into()),
        street_number: Some("1600".into()),
        route: Some("Amphitheatre Parkway".into()),
        locality: Some("Mountain View".into()),
        administrative_area_level1: Some("California".into()),
        administrative_area_level2: Some("Santa Clara County".into()),
        country: Some("United States".into()),
        postal_code: Some("94043".into()),
        location: Some(Location::new(37.4224764, -122.0842499)),
        location_type: Some("ROOFTOP".into()),
        viewport: Some(Viewport {
            northeast: Location::new(37.4238253802915, -122.0829009197085),
            southwest: Location::new(37.4211274197085, -122.0855988802915),
        }),
        bounds: Some(Bounds {
            southwest: Location::new(37.42, -122.09),
            northeast: Location::new(37.43, -122.08),
        }),
        ..Default::default()
    }
}

#[test]
fn test_json_round_trip_preserves_populated_fields() {
    let address = populated();
    let text = serde_json::to_string(&address).unwrap();
    let back: Address = serde_json::from_str(&text).unwrap();
    assert_eq!(back, address);
}

#[test]
fn test_unset_fields_are_absent_not_empty() {
    let address = Address {
        formatted_address: Some("1 Main St".into()),
        ..Default::default()
    };
    let value = serde_json::to_value(&address).unwrap();
    assert_eq!(value, json!({ "formattedAddress": "1 Main St" }));

    let back: Address = serde_json::from_value(value).unwrap();
    assert_eq!(back.route, None);
    assert_eq!(back.location, None);
}

#[test]
fn test_json_field_names() {
    let value = serde_json::to_value(populated()).unwrap();
    assert_eq!(value["administrativeAreaLevel1"], "California");
    assert_eq!(value["postalCode"], "94043");
    assert_eq!(value["location"]["latitude"], 37.4224764);
    assert_eq!(value["viewport"]["southwest"]["longitude"], -122.0855988802915);
}

#[test]
fn test_partial_location_round_trips() {
    let address = Address {
        location: Some(Location {
            latitude: Some(1.0),
            longitude: None,
        }),
        ..Default::default()
    };
    let value = serde_json::to_value(&address).unwrap();
    let back: Address = serde_json::from_value(value).unwrap();
    assert_eq!(back, address);
}

#[test]
fn test_field_accessors() {
    let address = populated();
    assert_eq!(address.field(AddressField::PostalCode), Some("94043"));
    assert_eq!(address.field(AddressField::LocationType), Some("ROOFTOP"));
    assert!(address.has_field(AddressField::Route));
    assert!(!address.has_field(AddressField::Airport));
}

#[test]
fn test_empty_value_does_not_count_as_present() {
    let address = Address {
        postal_code: Some(String::new()),
        ..Default::default()
    };
    assert!(!address.has_field(AddressField::PostalCode));
    assert_eq!(address.display_line(), None);
}

#[test]
fn test_bounding_box_parse_and_validate() {
    let bbox: BoundingBox = "-33.9,151.1,-33.8,151.3".parse().unwrap();
    assert_eq!(bbox, BoundingBox::new(-33.9, 151.1, -33.8, 151.3));
    assert!(bbox.validate().is_ok());

    assert!("1,2,3".parse::<BoundingBox>().is_err());
    assert!("a,b,c,d".parse::<BoundingBox>().is_err());
    assert_eq!(
        BoundingBox::new(-91.0, 0.0, 0.0, 0.0).validate().unwrap_err(),
        "lower-left latitude == -91"
    );
}
