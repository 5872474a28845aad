use anyhow::Result;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mcp_weather::{
    cache::LocationCache,
    config::WeatherConfig,
    providers::create_provider,
    service::Weather,
    transport::{self, Transport},
};

#[derive(Debug, Parser)]
#[command(name = "mcp-weather", version, about = "MCP server for hourly weather forecasts")]
struct Cli {
    /// Transport to serve the MCP tools on
    #[arg(long, value_enum, env = "MCP_TRANSPORT", ignore_case = true, default_value_t = Transport::Stdio)]
    transport: Transport,

    /// Shorthand for `--transport http`
    #[arg(long)]
    http: bool,

    /// Address to bind when serving HTTP
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to bind when serving HTTP
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,
}

/// `RUST_LOG` wins; otherwise `LOG_LEVEL` applies to this crate
fn env_filter() -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase();
    EnvFilter::try_new(format!("mcp_weather={}", level))
        .unwrap_or_else(|_| EnvFilter::new("mcp_weather=info"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = dotenv {
        tracing::debug!("No .env file loaded: {}", e);
    }

    let cli = Cli::parse();

    tracing::info!("Starting MCP weather server");

    let config = WeatherConfig::from_env()?;
    let cache = LocationCache::new(config.cache_root()?);
    let provider = create_provider(&config, cache.clone())?;
    let weather = Weather::new(provider, cache);

    let selected = if cli.http { Transport::Http } else { cli.transport };
    match selected {
        Transport::Stdio => transport::serve_stdio(weather).await?,
        Transport::Http => {
            transport::serve_http(weather, SocketAddr::new(cli.host, cli.port)).await?
        }
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}
