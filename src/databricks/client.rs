//! Databricks REST Client
//!
//! Implements [`WorkspaceApi`] over the workspace REST API 2.0.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use serde::Deserialize;

use super::{
    Authenticator, ByteStream, Credentials, DbfsReadResponse, DirectoryEntry, FileInfo,
    ObjectInfo, WorkspaceApi,
};
use crate::config::GatewayConfig;
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct ListWorkspaceResponse {
    #[serde(default)]
    objects: Vec<ObjectInfo>,
}

#[derive(Debug, Deserialize)]
struct ListDirectoryResponse {
    #[serde(default)]
    contents: Vec<DirectoryEntry>,
}

#[derive(Debug, Deserialize)]
struct DbfsListResponse {
    #[serde(default)]
    files: Vec<FileInfo>,
}

/// Error body returned by the REST API
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// REST client for a single workspace
pub struct DatabricksClient {
    http: reqwest::Client,
    base_url: String,
    auth: Authenticator,
}

impl DatabricksClient {
    /// Create a new client for a workspace base URL
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            auth: Authenticator::new(credentials),
        }
    }

    /// Create a client from resolved configuration
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let base_url = config.workspace_url()?;
        let credentials = Credentials::from_config(&config.databricks)?;
        tracing::info!("Databricks workspace: {} ({:?})", base_url, credentials);
        Ok(Self::new(base_url, credentials))
    }

    /// Workspace base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Authenticated GET, failing on non-success status
    async fn get(&self, url: reqwest::Url) -> Result<reqwest::Response> {
        let token = self.auth.bearer_token(&self.http, &self.base_url).await?;
        tracing::debug!("GET {}", url.path());
        let response = self.http.get(url).bearer_auth(token).send().await?;
        check_status(response).await
    }

    /// URL for a fixed API endpoint with query parameters
    fn api_url(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<reqwest::Url> {
        let url = format!("{}{}", self.base_url, endpoint);
        reqwest::Url::parse_with_params(&url, query)
            .map_err(|e| Error::Config(format!("invalid workspace URL {}: {}", url, e)))
    }

    /// URL for the files API, with the storage path as percent-encoded segments
    fn files_url(&self, resource: &str, path: &str) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("invalid workspace URL {}: {}", self.base_url, e)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| Error::Config(format!("workspace URL {} cannot be a base", self.base_url)))?;
            segments
                .pop_if_empty()
                .extend(["api", "2.0", "fs", resource])
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        Ok(url)
    }
}

/// Strip the `dbfs:` scheme; the DBFS API takes absolute paths
fn dbfs_api_path(path: &str) -> &str {
    match path.strip_prefix("dbfs:") {
        Some("") => "/",
        Some(rest) => rest,
        None => path,
    }
}

/// Turn a non-success response into [`Error::Api`]
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(ApiErrorBody { message: Some(message), .. }) => message,
        Ok(ApiErrorBody { error_code: Some(code), .. }) => code,
        _ if !body.trim().is_empty() => body,
        _ => status.canonical_reason().unwrap_or("request failed").to_string(),
    };

    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl WorkspaceApi for DatabricksClient {
    async fn list_workspace(&self, path: &str) -> Result<Vec<ObjectInfo>> {
        let url = self.api_url("/api/2.0/workspace/list", &[("path", path)])?;
        let body: ListWorkspaceResponse = self.get(url).await?.json().await?;
        Ok(body.objects)
    }

    async fn export_workspace(&self, path: &str) -> Result<Bytes> {
        let url = self.api_url(
            "/api/2.0/workspace/export",
            &[("path", path), ("format", "AUTO"), ("direct_download", "true")],
        )?;
        Ok(self.get(url).await?.bytes().await?)
    }

    async fn list_directory_contents(&self, path: &str) -> Result<Vec<DirectoryEntry>> {
        let url = self.files_url("directories", path)?;
        let body: ListDirectoryResponse = self.get(url).await?.json().await?;
        Ok(body.contents)
    }

    async fn download(&self, path: &str) -> Result<ByteStream> {
        let url = self.files_url("files", path)?;
        let response = self.get(url).await?;
        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(Error::from))
            .boxed())
    }

    async fn dbfs_list(&self, path: &str) -> Result<Vec<FileInfo>> {
        let url = self.api_url("/api/2.0/dbfs/list", &[("path", dbfs_api_path(path))])?;
        let body: DbfsListResponse = self.get(url).await?.json().await?;
        Ok(body.files)
    }

    async fn dbfs_read(&self, path: &str) -> Result<DbfsReadResponse> {
        let url = self.api_url("/api/2.0/dbfs/read", &[("path", dbfs_api_path(path))])?;
        Ok(self.get(url).await?.json().await?)
    }
}
