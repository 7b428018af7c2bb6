//! CoHive Files - Databricks File Gateway
//!
//! A small HTTP service that lists and reads files stored in a Databricks
//! workspace, plus a standalone upload function that writes files to DBFS.
//!
//! # Architecture
//!
//! Requests name a storage path. The path prefix selects one of three
//! namespaces (workspace tree, Unity Catalog volume, DBFS) and the
//! matching handler calls the workspace REST API and reshapes the result
//! into a uniform JSON form.
//!
//! # Features
//!
//! - Namespace dispatch by path prefix (`/Workspace`, `/Volumes`, `dbfs:`)
//! - Extension filtering of listings
//! - Text or base64 file content
//! - Personal access token or OAuth service principal credentials
//! - Static single-page-app serving with client-side routing fallback
//! - Upload function forwarding base64 files to `dbfs/put`

pub mod config;
pub mod error;
pub mod databricks;
pub mod namespace;
pub mod api;
pub mod upload;

pub use config::GatewayConfig;
pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::GatewayConfig;
    pub use crate::error::{Error, Result};
    pub use crate::databricks::{DatabricksClient, WorkspaceApi};
    pub use crate::namespace::{Dispatcher, Encoding, FileEntry, FileTypeFilter, Namespace, ReadResult};
    pub use crate::api::HttpServer;
    pub use crate::upload::UploadServer;
}
