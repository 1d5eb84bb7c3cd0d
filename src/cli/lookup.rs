//! `name` and `coord` commands

use clap::Args;
use std::fmt::Write as _;

use super::{CliError, OutputFormat};
use crate::engine::{GeocodeTask, Geocoder};
use crate::{Address, BoundingBox};

/// Arguments of `geocoder name`
#[derive(Args, Debug)]
pub struct NameArgs {
    /// Place name or address
    pub query: String,

    /// Restrict the search to `south,west,north,east`
    #[arg(long, allow_hyphen_values = true)]
    pub bounds: Option<BoundingBox>,
}

impl NameArgs {
    /// Start the lookup
    pub fn start(&self, geocoder: &Geocoder) -> GeocodeTask {
        match self.bounds {
            Some(bounds) => geocoder.by_name_in_bounds(self.query.clone(), bounds),
            None => geocoder.by_name(self.query.clone()),
        }
    }
}

/// Arguments of `geocoder coord`
#[derive(Args, Debug)]
pub struct CoordArgs {
    /// Latitude in degrees, -90 to 90
    #[arg(allow_negative_numbers = true)]
    pub latitude: f64,

    /// Longitude in degrees, -180 to 180
    #[arg(allow_negative_numbers = true)]
    pub longitude: f64,
}

impl CoordArgs {
    /// Start the lookup
    pub fn start(&self, geocoder: &Geocoder) -> GeocodeTask {
        geocoder.by_coordinate(self.latitude, self.longitude)
    }
}

/// Render lookup results
pub fn render(addresses: &[Address], format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(addresses)?),
        OutputFormat::Human => Ok(render_human(addresses)),
    }
}

fn render_human(addresses: &[Address]) -> String {
    if addresses.is_empty() {
        return "No results found".to_string();
    }

    let mut out = format!("Found {} result(s):\n", addresses.len());
    for (i, address) in addresses.iter().enumerate() {
        let _ = write!(
            out,
            "\n  {}. {}",
            i + 1,
            address.display_line().unwrap_or("(unnamed)")
        );
        if let Some(location) = &address.location {
            if let (Some(lat), Some(lon)) = (location.latitude, location.longitude) {
                let _ = write!(out, "\n     location: {lat:.6}, {lon:.6}");
            }
        }
        if let Some(postal_code) = &address.postal_code {
            let _ = write!(out, "\n     postal code: {postal_code}");
        }
        if let Some(country) = &address.country {
            let _ = write!(out, "\n     country: {country}");
        }
    }
    out
}
