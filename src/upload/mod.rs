//! Upload Function
//!
//! Stateless handler that stores a base64 file under the DBFS upload
//! directory via `dbfs/put`. The bearer token is read from the environment
//! on every request, so a rotated token is picked up without a restart.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::api::ErrorResponse;
use crate::config::GatewayConfig;
use crate::error::{Error, Result};

/// Largest request body accepted
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Upload request body
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    #[serde(rename = "fileName", default)]
    pub file_name: Option<String>,
    #[serde(rename = "fileContentBase64", default)]
    pub file_content_base64: Option<String>,
}

/// Body sent to `dbfs/put`
#[derive(Debug, Serialize)]
struct PutRequest<'a> {
    path: String,
    contents: &'a str,
    overwrite: bool,
}

/// Upload response
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub databricks_response: serde_json::Value,
}

/// Shared upload state
pub struct UploadState {
    http: reqwest::Client,
    endpoint: String,
    upload_dir: String,
    token_env: String,
}

impl UploadState {
    /// Create upload state for a `dbfs/put` endpoint
    pub fn new(endpoint: String, upload_dir: String, token_env: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            upload_dir: upload_dir.trim_end_matches('/').to_string(),
            token_env,
        }
    }

    /// DBFS path a file name is stored under
    pub fn target_path(&self, file_name: &str) -> String {
        format!("{}/{}", self.upload_dir, file_name)
    }

    /// Parse the request body and forward it to DBFS
    ///
    /// Whatever JSON the remote answers with is wrapped as-is, including
    /// error bodies; only a non-JSON answer fails the upload.
    pub async fn upload(&self, body: &[u8]) -> Result<UploadResponse> {
        let req: UploadRequest =
            serde_json::from_slice(body).map_err(|e| Error::InvalidBody(e.to_string()))?;
        let file_name = req
            .file_name
            .filter(|n| !n.is_empty())
            .ok_or(Error::MissingField("fileName"))?;
        let contents = req
            .file_content_base64
            .ok_or(Error::MissingField("fileContentBase64"))?;

        let token = std::env::var(&self.token_env)
            .map_err(|_| Error::Config(format!("{} is not set", self.token_env)))?;

        let payload = PutRequest {
            path: self.target_path(&file_name),
            contents: &contents,
            overwrite: true,
        };
        tracing::info!("Uploading {} ({} base64 bytes)", payload.path, contents.len());

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await?;
        if !response.status().is_success() {
            tracing::warn!("dbfs/put answered {} for {}", response.status(), payload.path);
        }

        Ok(UploadResponse {
            success: true,
            databricks_response: response.json().await?,
        })
    }
}

/// Standalone server for the upload function
pub struct UploadServer {
    bind_address: String,
    state: Arc<UploadState>,
}

impl UploadServer {
    /// Create a new upload server
    pub fn new(bind_address: String, state: UploadState) -> Self {
        Self {
            bind_address,
            state: Arc::new(state),
        }
    }

    /// Create an upload server from configuration
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let state = UploadState::new(
            config.upload_endpoint()?,
            config.upload.upload_dir.clone(),
            config.upload.token_env.clone(),
        );
        Ok(Self::new(config.upload.bind_address.clone(), state))
    }

    /// Create the router
    pub fn router(&self) -> Router {
        Router::new()
            .route("/upload_file", any(handle_upload))
            .with_state(Arc::clone(&self.state))
            .layer(TraceLayer::new_for_http())
    }

    /// Start the upload server
    pub async fn start(&self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.bind_address).await?;
        tracing::info!(
            "Upload function listening on {} (forwarding to {})",
            self.bind_address,
            self.state.endpoint
        );

        axum::serve(listener, self.router())
            .await
            .map_err(|e| Error::Internal(format!("HTTP server error: {}", e)))?;

        Ok(())
    }
}

async fn handle_upload(State(state): State<Arc<UploadState>>, request: Request) -> Response {
    // Reject before touching the body
    if request.method() != Method::POST {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            Json(ErrorResponse::new("Method not allowed")),
        )
            .into_response();
    }

    let body = match axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(e) => return Error::InvalidBody(e.to_string()).into_response(),
    };

    match state.upload(&body).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}
