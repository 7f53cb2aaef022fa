mod classify;
mod config;
mod http_server;
mod links;
mod logging;
mod platform;
mod ports;
mod regionalize;
mod services;
#[cfg(test)]
mod test_utils;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::{
    Result,
    eyre::{Context, eyre},
};

use crate::{
    classify::is_setlist_url,
    config::Config,
    http_server::app::HttpServerConfig,
    logging::{init_tracing, shutdown_tracing},
    services::{
        itunes::ItunesCatalog, odesli::OdesliClient, page_fetcher::HttpPageFetcher,
        relay::RelayService, setlistfm::SetlistFmClient,
    },
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "SONGLINK_RELAY_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Storefront country, overrides the config file (e.g. CL)
    #[arg(long, env = "ODESLI_COUNTRY", global = true)]
    country: Option<String>,

    /// Log filter directives (RUST_LOG takes precedence)
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: String,

    /// OTLP/gRPC endpoint to export spans to
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT", global = true)]
    otlp_endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve every music or setlist link in a piece of text
    Resolve {
        /// Free text containing one or more links
        text: String,
    },
    /// Resolve every song of a setlist.fm setlist
    Setlist {
        /// setlist.fm setlist URL
        url: String,
    },
    /// Serve the JSON relay over HTTP
    Serve {
        /// The port to run the server on
        #[arg(short, long, default_value = "3000", env = "SONGLINK_RELAY_HTTP_PORT")]
        port: u16,
    },
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
    .wrap_err("Failed to load songlink-relay config")?;

    if let Some(country) = &args.country {
        config.country = country.clone();
        config.validate()?;
    }
    Ok(config)
}

fn build_relay(config: &Config) -> Result<RelayService> {
    Ok(RelayService::new(
        config,
        Arc::new(OdesliClient::new(config)?),
        Arc::new(HttpPageFetcher::new(config)?),
        Arc::new(ItunesCatalog::new(config)?),
        Arc::new(SetlistFmClient::new(config)?),
    ))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value).wrap_err("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    match &args.command {
        Commands::Config(ConfigCommands::CreateDefault) => {
            let path = Config::create_default()?;
            tracing::info!(path = %path.display(), "Default config ready");
            return Ok(());
        }
        Commands::Config(ConfigCommands::Path) => {
            match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            }
            return Ok(());
        }
        _ => {}
    }

    let config = load_config(&args)?;
    tracing::debug!(country = %config.country_code(), "Configuration loaded");
    let relay = build_relay(&config)?;

    match args.command {
        Commands::Resolve { text } => {
            let replies = relay.handle_message(&text).await;
            if replies.is_empty() {
                tracing::warn!("No link in the text could be resolved");
            }
            print_json(&replies)?;
        }
        Commands::Setlist { url } => {
            if !is_setlist_url(&url) {
                return Err(eyre!("Not a setlist.fm setlist URL: {url}"));
            }
            let reply = relay
                .handle_message(&url)
                .await
                .into_iter()
                .next()
                .ok_or_else(|| eyre!("Failed to resolve setlist {url}"))?;
            print_json(&reply)?;
        }
        Commands::Serve { port } => {
            http_server::app::start(HttpServerConfig { port, relay }).await?;
        }
        Commands::Config(_) => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let tracer_provider = init_tracing(
        env!("CARGO_PKG_NAME"),
        args.otlp_endpoint.as_deref(),
        &args.log_level,
    )?;

    let result = run(args).await;
    shutdown_tracing(tracer_provider);
    result
}
