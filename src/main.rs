//! PostgREST Stub Server
//!
//! Binary entry point for the filtering server.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pgrest_common::config::StubConfig;
use pgrest_stub::StubServer;

#[derive(Parser, Debug)]
#[command(name = "pgrest-stub")]
#[command(about = "PostgREST-style filtering server", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "pgrest-stub.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", env = "PGREST_LOG_LEVEL")]
    log_level: String,

    /// Override the configured port
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the configured database file
    #[arg(long)]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)))
        .init();

    info!("PostgREST stub v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config: StubConfig = if args.config.exists() {
        let content = std::fs::read_to_string(&args.config)?;
        toml::from_str(&content)?
    } else {
        info!("Using default configuration");
        StubConfig::default()
    };

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(database) = args.database {
        config.database.path = Some(database);
    }

    let server = StubServer::new(config)?;

    // Handle shutdown signals
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Received shutdown signal");
    };

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        () = shutdown => {
            server.shutdown().await?;
        }
    }

    Ok(())
}
