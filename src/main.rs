//! Forge Auth - Main Server
//!
//! GitHub login and session credentials for the API.

use anyhow::Result;
use clap::{Parser, Subcommand};
use forge_auth::Config;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "forge-auth")]
#[command(about = "GitHub login and session credential server")]
struct Cli {
    /// Path to the YAML config file (default: ./config.yaml)
    #[arg(short, long, global = true, env = "FORGE_AUTH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on (overrides config.yaml and SERVER_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Load and validate the configuration, then exit
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,forge_auth=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_yaml_and_env(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            forge_auth::start_server(config).await
        }
        Commands::CheckConfig => {
            config.validate()?;
            tracing::info!(
                port = config.server.port,
                client_id = %config.github.client_id,
                "Configuration is valid"
            );
            Ok(())
        }
    }
}
