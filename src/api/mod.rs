//! HTTP API Module
//!
//! Provides the file gateway's REST API and static frontend serving.

mod http;

pub use http::{AppState, HttpServer, ErrorResponse, HEALTH_SERVICE};
