//! CLI error types and conversions

use crate::engine::GeocoderError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Geocoding request failed
    #[error("geocoding error: {0}")]
    Geocoder(#[from] GeocoderError),

    /// Results could not be rendered
    #[error("output error: {0}")]
    Output(#[from] serde_json::Error),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    /// Underlying geocoder error, if any
    pub fn geocoder_error(&self) -> Option<&GeocoderError> {
        match self {
            CliError::Geocoder(e) => Some(e),
            _ => None,
        }
    }
}
