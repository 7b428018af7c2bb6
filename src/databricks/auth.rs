//! Workspace authentication
//!
//! Personal access tokens are used as-is. OAuth service principals go
//! through the client-credentials grant and the access token is reused
//! until shortly before it expires.

use std::fmt;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::RwLock;

use crate::config::DatabricksConfig;
use crate::error::{Error, Result};

/// Refresh this long before the reported expiry
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Credentials resolved at startup
#[derive(Clone)]
pub enum Credentials {
    /// Personal access token
    Token(String),
    /// OAuth machine-to-machine service principal
    OAuth {
        client_id: String,
        client_secret: String,
    },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Credentials::Token(***)"),
            Credentials::OAuth { client_id, .. } => f
                .debug_struct("Credentials::OAuth")
                .field("client_id", client_id)
                .finish_non_exhaustive(),
        }
    }
}

impl Credentials {
    /// Pick credentials from config; a token wins over an OAuth pair
    pub fn from_config(config: &DatabricksConfig) -> Result<Self> {
        if let Some(token) = &config.token {
            return Ok(Credentials::Token(token.clone()));
        }

        match (&config.client_id, &config.client_secret) {
            (Some(client_id), Some(client_secret)) => Ok(Credentials::OAuth {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
            }),
            _ => Err(Error::Config(
                "no Databricks credentials: set DATABRICKS_TOKEN or DATABRICKS_CLIENT_ID/DATABRICKS_CLIENT_SECRET".into(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Hands out bearer tokens for workspace requests
pub struct Authenticator {
    credentials: Credentials,
    cached: RwLock<Option<CachedToken>>,
}

impl Authenticator {
    /// Create a new authenticator
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            cached: RwLock::new(None),
        }
    }

    /// Bearer token for the next request
    pub async fn bearer_token(&self, http: &reqwest::Client, base_url: &str) -> Result<String> {
        let (client_id, client_secret) = match &self.credentials {
            Credentials::Token(token) => return Ok(token.clone()),
            Credentials::OAuth { client_id, client_secret } => (client_id, client_secret),
        };

        if let Some(cached) = self.cached.read().await.as_ref() {
            if Instant::now() < cached.expires_at {
                return Ok(cached.access_token.clone());
            }
        }

        let mut cached = self.cached.write().await;
        // Another request may have refreshed while we waited for the lock
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.access_token.clone());
            }
        }

        let token = fetch_token(http, base_url, client_id, client_secret).await?;
        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(3600));
        tracing::debug!("Obtained OAuth token valid for {}s", lifetime.as_secs());

        let access_token = token.access_token.clone();
        *cached = Some(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + lifetime.saturating_sub(REFRESH_MARGIN),
        });
        Ok(access_token)
    }
}

async fn fetch_token(
    http: &reqwest::Client,
    base_url: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<TokenResponse> {
    let url = format!("{}/oidc/v1/token", base_url);
    let response = http
        .post(&url)
        .basic_auth(client_id, Some(client_secret))
        .form(&[("grant_type", "client_credentials"), ("scope", "all-apis")])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Auth(format!("token endpoint returned {}: {}", status, body)));
    }

    Ok(response.json().await?)
}
