//! Binary tests that need no network access

use assert_cmd::Command;

fn geocoder() -> Command {
    let mut cmd = Command::cargo_bin("geocoder").unwrap();
    cmd.env_remove("GOOGLE_MAPS_API_KEY").env("RUST_LOG", "off");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let output = geocoder().arg("--help").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["name", "coord", "providers"] {
        assert!(stdout.contains(command), "missing {command} in:\n{stdout}");
    }
}

#[test]
fn test_providers_json() {
    let output = geocoder()
        .args(["--format", "json", "--provider", "osm", "providers"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["priority"], serde_json::Value::Null);
    assert_eq!(value[1]["id"], "openstreetmap");
    assert_eq!(value[1]["priority"], 1);
}

#[test]
fn test_out_of_range_coordinate_fails_before_network() {
    let output = geocoder().args(["coord", "91", "0"]).output().unwrap();
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[FAILED]"), "{stderr}");
    assert!(stderr.contains("latitude == 91"), "{stderr}");
    assert!(stderr.contains("invalid_argument"), "{stderr}");
}

#[test]
fn test_empty_name_fails_before_network() {
    let output = geocoder().args(["name", ""]).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("locationName is empty"));
}

#[test]
fn test_unknown_provider_is_usage_error() {
    let output = geocoder()
        .args(["--provider", "bing", "providers"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}
