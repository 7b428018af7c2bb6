//! CoHive Files - Databricks File Gateway
//!
//! Serves the file list/read API and the frontend bundle.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cohive_files::api::HttpServer;
use cohive_files::config::GatewayConfig;
use cohive_files::databricks::{Credentials, DatabricksClient, WorkspaceApi};
use cohive_files::error::Result;
use cohive_files::namespace::Dispatcher;

/// CoHive Files - Databricks File Gateway
#[derive(Parser)]
#[command(name = "cohive-files")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (environment variables are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the file gateway (default)
    Serve,

    /// Initialize a new configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = "cohive.toml")]
        output: PathBuf,
    },

    /// Validate configuration and credentials
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_serve(cli.config, cli.log_level).await,
        Commands::Init { output } => run_init(output),
        Commands::Validate => run_validate(cli.config),
    }
}

/// Initialize logging
fn init_logging(level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Start the file gateway
async fn run_serve(config_path: Option<PathBuf>, log_level: Option<String>) -> Result<()> {
    let config = match GatewayConfig::load(config_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };
    init_logging(log_level.as_deref().unwrap_or(&config.logging.level));
    tracing::info!("Starting CoHive File API...");

    // One client for the whole process, handed to the handlers
    let client = match DatabricksClient::from_config(&config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to create Databricks client: {}", e);
            tracing::error!("Set DATABRICKS_HOST and DATABRICKS_TOKEN (or a [databricks] section)");
            return Err(e);
        }
    };
    let api: Arc<dyn WorkspaceApi> = Arc::new(client);
    let dispatcher = Arc::new(Dispatcher::new(api));

    let server = HttpServer::new(config.server.clone(), dispatcher);

    tokio::select! {
        result = server.start() => {
            if let Err(e) = result {
                tracing::error!("HTTP server error: {}", e);
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal");
        }
    }

    tracing::info!("CoHive File API shutdown complete");
    Ok(())
}

/// Initialize configuration file
fn run_init(output: PathBuf) -> Result<()> {
    let config_content = r#"# CoHive Files Configuration
# Generated configuration file

[server]
bind_address = "0.0.0.0:8000"
static_dir = "build"
cors_enabled = true

[databricks]
# Falls back to DATABRICKS_HOST / DATABRICKS_TOKEN /
# DATABRICKS_CLIENT_ID / DATABRICKS_CLIENT_SECRET when unset
# host = "dbc-xxxxxxxx-xxxx.cloud.databricks.com"
# token = "dapi..."

[upload]
bind_address = "0.0.0.0:3000"
upload_dir = "/FileStore/uploads"
token_env = "DATABRICKS_TOKEN"
# endpoint = "https://dbc-xxxxxxxx-xxxx.cloud.databricks.com/api/2.0/dbfs/put"

[logging]
level = "info"
"#;

    std::fs::write(&output, config_content)?;
    println!("Configuration file created: {}", output.display());
    println!("\nSet DATABRICKS_HOST and DATABRICKS_TOKEN, or edit the [databricks] section.");
    println!("Then start with: cohive-files --config {} serve", output.display());

    Ok(())
}

/// Validate configuration
fn run_validate(config_path: Option<PathBuf>) -> Result<()> {
    let config = match GatewayConfig::load(config_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✗ Configuration error: {}", e);
            return Err(e);
        }
    };

    let workspace = config.workspace_url();
    let credentials = Credentials::from_config(&config.databricks);

    println!("  Bind Address:   {}", config.server.bind_address);
    println!("  Static Dir:     {}", config.server.static_dir.display());
    println!("  CORS:           {}", config.server.cors_enabled);
    match &workspace {
        Ok(url) => println!("  Workspace:      {}", url),
        Err(e) => println!("  Workspace:      ✗ {}", e),
    }
    match &credentials {
        Ok(Credentials::Token(_)) => println!("  Credentials:    personal access token"),
        Ok(Credentials::OAuth { client_id, .. }) => {
            println!("  Credentials:    OAuth service principal {}", client_id)
        }
        Err(e) => println!("  Credentials:    ✗ {}", e),
    }
    match config.upload_endpoint() {
        Ok(endpoint) => println!("  Upload Target:  {} -> {}", endpoint, config.upload.upload_dir),
        Err(e) => println!("  Upload Target:  ✗ {}", e),
    }

    workspace?;
    credentials?;
    println!("✓ Configuration is valid");
    Ok(())
}
