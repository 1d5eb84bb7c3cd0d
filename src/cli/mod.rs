//! CLI command tree and geocoder wiring

use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::time::Duration;

use crate::engine::{
    Geocoder, GeocoderBuilder, RetryPolicy, SwitchOnEmpty, SwitchOnMissing, MAX_RETRIES,
    NEVER_SWITCH, RETRY_DELAY_MS,
};
use crate::provider::{create_provider, ProviderKind, ProviderSettings};
use crate::transport::http::{HttpTransportFactory, HTTP_REQUEST_TIMEOUT_SECS};
use crate::AddressField;

pub mod error;
pub mod lookup;
pub mod providers;

pub use error::CliError;
pub use lookup::{CoordArgs, NameArgs};

/// Geocoder CLI
#[derive(Parser, Debug)]
#[command(
    name = "geocoder",
    version,
    about = "Forward and reverse geocoding across multiple providers"
)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Provider to query; repeat to set the fallback order (default: all)
    #[arg(long = "provider", global = true, value_enum)]
    pub providers: Vec<ProviderKind>,

    /// Google Maps API key
    #[arg(long, global = true, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,

    /// When to fall through to the next provider
    #[arg(long, global = true, value_enum, default_value = "never")]
    pub switch: SwitchMode,

    /// Field a result must carry under `--switch on-missing`; repeatable
    #[arg(long = "require", global = true, value_enum)]
    pub required_fields: Vec<AddressField>,

    /// Maximum number of results per provider
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_results: Option<u32>,

    /// Maximum number of retries after a quota error (range: 0-10)
    #[arg(long, global = true, default_value_t = MAX_RETRIES, value_parser = clap::value_parser!(u32).range(0..=10))]
    pub max_retries: u32,

    /// Base retry delay in milliseconds; retry n waits n times this
    #[arg(long, global = true, default_value_t = RETRY_DELAY_MS)]
    pub retry_delay_ms: u64,

    /// HTTP request timeout in seconds
    #[arg(long, global = true, default_value_t = HTTP_REQUEST_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,

    /// User-Agent sent to providers
    #[arg(long, global = true)]
    pub user_agent: Option<String>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Serve Prometheus metrics on this address
    #[arg(long, global = true)]
    pub metrics_addr: Option<SocketAddr>,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Look up a place by name
    Name(NameArgs),

    /// Look up the place at a coordinate
    Coord(CoordArgs),

    /// List the available providers
    Providers,
}

/// Switch policy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SwitchMode {
    /// Always keep the first provider's answer
    Never,
    /// Fall through while the result list is empty
    OnEmpty,
    /// Fall through until a result carries every `--require` field
    OnMissing,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

impl Cli {
    /// Selected providers in priority order, duplicates removed
    pub fn provider_kinds(&self) -> Vec<ProviderKind> {
        if self.providers.is_empty() {
            return ProviderKind::ALL.to_vec();
        }

        let mut kinds = Vec::with_capacity(self.providers.len());
        for kind in &self.providers {
            if !kinds.contains(kind) {
                kinds.push(*kind);
            }
        }
        kinds
    }

    /// Retry policy from `--max-retries` and `--retry-delay-ms`
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    /// Provider settings from the global flags
    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            google_api_key: self.google_api_key.clone().filter(|key| !key.is_empty()),
            max_results: self.max_results,
        }
    }

    /// HTTP transport factory from `--timeout-secs` and `--user-agent`
    pub fn transport_factory(&self) -> HttpTransportFactory {
        let factory = HttpTransportFactory::with_timeout(Duration::from_secs(self.timeout_secs));
        match &self.user_agent {
            Some(user_agent) => factory.user_agent(user_agent),
            None => factory,
        }
    }

    /// Build the geocoder described by the flags
    pub fn build_geocoder(&self) -> Result<Geocoder, CliError> {
        if self.switch != SwitchMode::OnMissing && !self.required_fields.is_empty() {
            return Err(CliError::InvalidArgument(
                "--require only applies with --switch on-missing".to_string(),
            ));
        }

        let settings = self.provider_settings();
        let mut builder = GeocoderBuilder::new()
            .transport_factory(self.transport_factory())
            .retry_policy(self.retry_policy());

        for kind in self.provider_kinds() {
            builder = builder.add_shared_provider(create_provider(kind, &settings));
        }

        builder = match self.switch {
            SwitchMode::Never => builder.switch_policy(NEVER_SWITCH),
            SwitchMode::OnEmpty => builder.switch_policy(SwitchOnEmpty),
            SwitchMode::OnMissing => builder.switch_policy(SwitchOnMissing::new(
                self.required_fields.iter().copied(),
            )),
        };

        Ok(builder.build()?)
    }
}
