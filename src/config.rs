//! CoHive Files Configuration
//!
//! This module provides configuration structures for the file gateway
//! and the upload function. Every section has defaults so the gateway
//! can run from the environment alone.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the workspace URL
pub const ENV_HOST: &str = "DATABRICKS_HOST";
/// Environment variable holding a personal access token
pub const ENV_TOKEN: &str = "DATABRICKS_TOKEN";
/// Environment variable holding an OAuth client ID
pub const ENV_CLIENT_ID: &str = "DATABRICKS_CLIENT_ID";
/// Environment variable holding an OAuth client secret
pub const ENV_CLIENT_SECRET: &str = "DATABRICKS_CLIENT_SECRET";

/// Main CoHive Files configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// File gateway HTTP server
    #[serde(default)]
    pub server: ServerConfig,

    /// Databricks workspace connection
    #[serde(default)]
    pub databricks: DatabricksConfig,

    /// Upload function
    #[serde(default)]
    pub upload: UploadConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// File gateway HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP bind address
    #[serde(default = "default_server_address")]
    pub bind_address: String,

    /// Directory holding the pre-built frontend bundle
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
}

impl ServerConfig {
    /// Document served for paths that match no static file
    pub fn index_file(&self) -> PathBuf {
        self.static_dir.join("index.html")
    }
}

/// Databricks workspace connection
///
/// Unset fields are filled from the standard `DATABRICKS_*` environment
/// variables by [`GatewayConfig::apply_env`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabricksConfig {
    /// Workspace URL (scheme optional)
    #[serde(default)]
    pub host: Option<String>,

    /// Personal access token
    #[serde(default)]
    pub token: Option<String>,

    /// OAuth service principal client ID
    #[serde(default)]
    pub client_id: Option<String>,

    /// OAuth service principal client secret
    #[serde(default)]
    pub client_secret: Option<String>,
}

/// Upload function configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// HTTP bind address for the standalone upload server
    #[serde(default = "default_upload_address")]
    pub bind_address: String,

    /// Full URL of the DBFS put endpoint (derived from the host if unset)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// DBFS directory uploads land in
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    /// Environment variable the bearer token is read from on each request
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_server_address() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("build")
}

fn default_upload_address() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_upload_dir() -> String {
    "/FileStore/uploads".to_string()
}

fn default_token_env() -> String {
    ENV_TOKEN.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_server_address(),
            static_dir: default_static_dir(),
            cors_enabled: true,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            bind_address: default_upload_address(),
            endpoint: None,
            upload_dir: default_upload_dir(),
            token_env: default_token_env(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> crate::Result<Self> {
        let config: GatewayConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an optional file, then fill gaps from the process environment
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Fill unset Databricks settings from an environment lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let db = &mut self.databricks;
        if db.host.is_none() {
            db.host = non_empty(ENV_HOST);
        }
        if db.token.is_none() {
            db.token = non_empty(ENV_TOKEN);
        }
        if db.client_id.is_none() {
            db.client_id = non_empty(ENV_CLIENT_ID);
        }
        if db.client_secret.is_none() {
            db.client_secret = non_empty(ENV_CLIENT_SECRET);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.server.bind_address.is_empty() {
            return Err(crate::Error::Config("server.bind_address cannot be empty".into()));
        }

        if self.upload.bind_address.is_empty() {
            return Err(crate::Error::Config("upload.bind_address cannot be empty".into()));
        }

        if self.upload.token_env.is_empty() {
            return Err(crate::Error::Config("upload.token_env cannot be empty".into()));
        }

        if self.databricks.client_id.is_some() != self.databricks.client_secret.is_some() {
            return Err(crate::Error::Config(
                "databricks.client_id and databricks.client_secret must be set together".into(),
            ));
        }

        Ok(())
    }

    /// Workspace base URL with scheme and without trailing slash
    pub fn workspace_url(&self) -> crate::Result<String> {
        let host = self
            .databricks
            .host
            .as_deref()
            .ok_or_else(|| crate::Error::Config(format!("{} is not set", ENV_HOST)))?;
        Ok(normalize_host(host))
    }

    /// URL of the DBFS put endpoint used by the upload function
    pub fn upload_endpoint(&self) -> crate::Result<String> {
        match &self.upload.endpoint {
            Some(endpoint) => Ok(endpoint.clone()),
            None => Ok(format!("{}/api/2.0/dbfs/put", self.workspace_url()?)),
        }
    }
}

/// Prefix `https://` when no scheme is given and drop trailing slashes
pub fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
[server]
bind_address = "127.0.0.1:9000"
static_dir = "/srv/cohive/build"
cors_enabled = false

[databricks]
host = "dbc-1234.cloud.databricks.com"

[upload]
upload_dir = "/FileStore/incoming"

[logging]
level = "debug"
"#;

        let config = GatewayConfig::from_str(toml).unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:9000");
        assert!(!config.server.cors_enabled);
        assert_eq!(config.workspace_url().unwrap(), "https://dbc-1234.cloud.databricks.com");
        assert_eq!(
            config.upload_endpoint().unwrap(),
            "https://dbc-1234.cloud.databricks.com/api/2.0/dbfs/put"
        );
        assert_eq!(config.upload.upload_dir, "/FileStore/incoming");
        assert_eq!(config.upload.token_env, "DATABRICKS_TOKEN");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.server.index_file(), PathBuf::from("/srv/cohive/build/index.html"));
    }

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::from_str("").unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:8000");
        assert_eq!(config.server.static_dir, PathBuf::from("build"));
        assert!(config.server.cors_enabled);
        assert_eq!(config.upload.bind_address, "0.0.0.0:3000");
        assert_eq!(config.upload.upload_dir, "/FileStore/uploads");
        assert!(config.workspace_url().is_err());
    }

    #[test]
    fn test_env_fills_gaps_only() {
        let mut config = GatewayConfig::from_str(
            r#"
[databricks]
host = "https://configured.example.com/"
"#,
        )
        .unwrap();

        config.apply_env(|key| match key {
            ENV_HOST => Some("env.example.com".to_string()),
            ENV_TOKEN => Some("dapi-token".to_string()),
            ENV_CLIENT_ID => Some(String::new()),
            _ => None,
        });

        assert_eq!(config.workspace_url().unwrap(), "https://configured.example.com");
        assert_eq!(config.databricks.token.as_deref(), Some("dapi-token"));
        assert!(config.databricks.client_id.is_none());
    }

    #[test]
    fn test_oauth_pair_must_be_complete() {
        let result = GatewayConfig::from_str(
            r#"
[databricks]
client_id = "sp-id"
"#,
        );
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("example.com"), "https://example.com");
        assert_eq!(normalize_host("http://localhost:8080/"), "http://localhost:8080");
    }
}
