//! CoHive Upload - standalone upload function
//!
//! Usage:
//!   cohive-upload                     - serve POST /upload_file on 0.0.0.0:3000
//!   cohive-upload --config cohive.toml

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cohive_files::config::GatewayConfig;
use cohive_files::error::Result;
use cohive_files::upload::UploadServer;

/// Forward base64 file uploads to DBFS
#[derive(Parser)]
#[command(name = "cohive-upload")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (environment variables are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Address to listen on (overrides config)
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| cli.log_level.as_str().into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = GatewayConfig::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.upload.bind_address = bind;
    }

    let server = match UploadServer::from_config(&config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to configure upload function: {}", e);
            tracing::error!("Set DATABRICKS_HOST or upload.endpoint");
            return Err(e);
        }
    };

    tokio::select! {
        result = server.start() => {
            if let Err(e) = result {
                tracing::error!("Upload server error: {}", e);
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal");
        }
    }

    Ok(())
}
