//! Main entry point for the geocoder CLI

use anyhow::Context;
use clap::Parser;
use geocoder::cli::{lookup, providers, Cli, CliError, Commands, OutputFormat};
use geocoder::engine::retry::format_failure;
use geocoder::engine::GeocodeTask;
use geocoder::metrics::init_metrics;
use geocoder::Address;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing() {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("geocoder=info"));

    // Logs go to stderr so stdout carries only results
    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Await `task`, cancelling it on Ctrl+C
async fn await_with_interrupt(task: GeocodeTask) -> Result<Vec<Address>, CliError> {
    let token = task.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl+C received - cancelling request...");
            token.cancel();
        }
    });

    Ok(task.await?)
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    let task = match &cli.command {
        Commands::Providers => {
            println!("{}", providers::render(&cli.provider_kinds(), cli.format)?);
            return Ok(());
        }
        Commands::Name(args) => args.start(&cli.build_geocoder()?),
        Commands::Coord(args) => args.start(&cli.build_geocoder()?),
    };

    let addresses = await_with_interrupt(task).await?;
    println!("{}", lookup::render(&addresses, cli.format)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    if let Some(addr) = cli.metrics_addr {
        init_metrics(addr)
            .await
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("failed to start metrics endpoint on {addr}"))?;
    }

    if let Err(e) = run(&cli).await {
        match (e.geocoder_error(), cli.format) {
            (Some(geocoder_error), OutputFormat::Human) => {
                eprintln!("{}", format_failure(geocoder_error, cli.max_retries));
            }
            _ => error!("Command failed: {}", e),
        }
        std::process::exit(1);
    }

    Ok(())
}
