//! Unit tests for CLI argument parsing

use clap::Parser;
use geocoder::cli::{Cli, CliError, Commands, OutputFormat, SwitchMode};
use geocoder::provider::ProviderKind;
use geocoder::{AddressField, BoundingBox};
use std::time::Duration;

#[test]
fn test_defaults() {
    let cli = Cli::try_parse_from(["geocoder", "name", "Paris"]).unwrap();

    assert_eq!(cli.switch, SwitchMode::Never);
    assert_eq!(cli.format, OutputFormat::Human);
    assert_eq!(cli.max_retries, 2);
    assert_eq!(cli.retry_delay_ms, 2000);
    assert_eq!(cli.provider_kinds(), ProviderKind::ALL.to_vec());
    assert_eq!(cli.retry_policy().base_delay, Duration::from_secs(2));

    match cli.command {
        Commands::Name(args) => {
            assert_eq!(args.query, "Paris");
            assert!(args.bounds.is_none());
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_provider_order_and_aliases() {
    let cli = Cli::try_parse_from([
        "geocoder",
        "--provider",
        "osm",
        "--provider",
        "google",
        "--provider",
        "openstreetmap",
        "providers",
    ])
    .unwrap();

    assert_eq!(
        cli.provider_kinds(),
        vec![ProviderKind::OpenStreetMap, ProviderKind::GoogleMaps]
    );
}

#[test]
fn test_name_with_negative_bounds() {
    let cli = Cli::try_parse_from([
        "geocoder",
        "name",
        "Opera House",
        "--bounds",
        "-33.9,151.1,-33.8,151.3",
    ])
    .unwrap();

    match cli.command {
        Commands::Name(args) => {
            assert_eq!(args.bounds, Some(BoundingBox::new(-33.9, 151.1, -33.8, 151.3)));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_coord_accepts_negative_numbers() {
    let cli = Cli::try_parse_from(["geocoder", "coord", "-33.8568", "151.2153"]).unwrap();
    match cli.command {
        Commands::Coord(args) => {
            assert_eq!(args.latitude, -33.8568);
            assert_eq!(args.longitude, 151.2153);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_switch_and_required_fields() {
    let cli = Cli::try_parse_from([
        "geocoder",
        "--switch",
        "on-missing",
        "--require",
        "postal_code",
        "--require",
        "administrative_area_level_1",
        "name",
        "Main St",
    ])
    .unwrap();

    assert_eq!(cli.switch, SwitchMode::OnMissing);
    assert_eq!(
        cli.required_fields,
        vec![AddressField::PostalCode, AddressField::AdministrativeAreaLevel1]
    );
    assert!(cli.build_geocoder().is_ok());
}

#[test]
fn test_require_without_on_missing_is_rejected() {
    let cli =
        Cli::try_parse_from(["geocoder", "--require", "postal_code", "name", "Main St"]).unwrap();
    assert!(matches!(cli.build_geocoder(), Err(CliError::InvalidArgument(_))));
}

#[test]
fn test_invalid_values_are_rejected() {
    assert!(Cli::try_parse_from(["geocoder", "--max-retries", "11", "providers"]).is_err());
    assert!(Cli::try_parse_from(["geocoder", "--timeout-secs", "0", "providers"]).is_err());
    assert!(Cli::try_parse_from(["geocoder", "--switch", "sometimes", "providers"]).is_err());
    assert!(Cli::try_parse_from(["geocoder", "--provider", "bing", "providers"]).is_err());
    assert!(Cli::try_parse_from(["geocoder", "name", "x", "--bounds", "1,2,3"]).is_err());
    assert!(Cli::try_parse_from(["geocoder", "coord", "north", "0"]).is_err());
}

#[test]
fn test_build_geocoder_uses_selected_providers() {
    let cli = Cli::try_parse_from([
        "geocoder",
        "--provider",
        "openstreetmap",
        "--max-retries",
        "0",
        "name",
        "x",
    ])
    .unwrap();

    let geocoder = cli.build_geocoder().unwrap();
    assert_eq!(geocoder.config().provider_names(), vec!["Open Street Maps Api"]);
    assert_eq!(geocoder.config().retry_policy().max_retries, 0);
}
