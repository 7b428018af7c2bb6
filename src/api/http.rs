//! HTTP API Server
//!
//! REST API for listing and reading workspace files, plus the static
//! frontend bundle on every other path.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::namespace::{Dispatcher, Encoding, FileEntry, FileTypeFilter, ReadResult, DEFAULT_LIST_PATH};

/// Service name reported by the health check
pub const HEALTH_SERVICE: &str = "CoHive File API";

/// Shared application state
pub struct AppState {
    /// Namespace dispatcher over the workspace client
    pub dispatcher: Arc<Dispatcher>,
    /// Directory of the pre-built frontend
    pub static_dir: PathBuf,
    /// Fallback document for client-side routes
    pub index_file: PathBuf,
}

/// HTTP API server
pub struct HttpServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(config: ServerConfig, dispatcher: Arc<Dispatcher>) -> Self {
        let state = Arc::new(AppState {
            dispatcher,
            static_dir: config.static_dir.clone(),
            index_file: config.index_file(),
        });

        Self { config, state }
    }

    /// Create the router
    pub fn router(&self) -> Router {
        let router = Self::create_router(Arc::clone(&self.state)).layer(TraceLayer::new_for_http());

        if self.config.cors_enabled {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    fn create_router(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/api/health", get(handle_health))
            .route("/api/files/list", get(handle_list))
            .route("/api/files/read", post(handle_read))
            // Everything else is the single-page app
            .fallback(handle_static)
            .with_state(state)
    }

    /// Start the HTTP server
    pub async fn start(&self) -> Result<()> {
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(&self.config.bind_address).await?;
        tracing::info!("CoHive File API listening on {}", self.config.bind_address);
        if !self.state.static_dir.is_dir() {
            tracing::warn!(
                "Static directory {} not found; frontend requests will 404",
                self.state.static_dir.display()
            );
        }

        axum::serve(listener, app)
            .await
            .map_err(|e| Error::Internal(format!("HTTP server error: {}", e)))?;

        Ok(())
    }
}

// ============ Request/Response Types ============

/// List query parameters
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub path: Option<String>,
    pub file_types: Option<String>,
}

/// List response
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub path: String,
    pub files: Vec<FileEntry>,
    pub count: usize,
}

/// Read request body
///
/// `encoding` is `"text"` (the default when absent) or `"base64"`. Any
/// other value is rejected with 400 rather than read as text.
#[derive(Debug, Deserialize)]
pub struct ReadRequest {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!("Request failed: {}", self);
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// ============ Handlers ============

async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        service: HEALTH_SERVICE,
    })
}

async fn handle_list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>> {
    let path = query.path.unwrap_or_else(|| DEFAULT_LIST_PATH.to_string());
    let filter = FileTypeFilter::parse(query.file_types.as_deref());

    let files = state.dispatcher.list(&path, &filter).await?;

    Ok(Json(ListResponse {
        path,
        count: files.len(),
        files,
    }))
}

async fn handle_read(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ReadResult>> {
    let req: ReadRequest =
        serde_json::from_slice(&body).map_err(|e| Error::InvalidBody(e.to_string()))?;

    let path = req
        .path
        .filter(|p| !p.is_empty())
        .ok_or(Error::MissingField("Path"))?;
    let encoding = match req.encoding.as_deref() {
        Some(raw) => raw.parse::<Encoding>()?,
        None => Encoding::default(),
    };

    let result = state.dispatcher.read(&path, encoding).await?;
    Ok(Json(result))
}

/// Serve the frontend, falling back to `index.html` for client-side routes
async fn handle_static(State(state): State<Arc<AppState>>, request: Request) -> Response {
    if request.uri().path().starts_with("/api/") {
        return (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not found"))).into_response();
    }

    let service =
        ServeDir::new(&state.static_dir).fallback(ServeFile::new(&state.index_file));

    match service.oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}
