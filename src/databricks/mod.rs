//! Databricks Backend Module
//!
//! Raw access to the three storage namespaces of a Databricks workspace.
//! [`WorkspaceApi`] is the seam the namespace handlers depend on;
//! [`DatabricksClient`] implements it over the REST API.

mod auth;
mod client;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{Authenticator, Credentials};
pub use client::DatabricksClient;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Byte stream returned by a volume download
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Workspace object kind as reported by `workspace/list`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectType {
    Notebook,
    Directory,
    Library,
    File,
    Repo,
    Dashboard,
    #[serde(other)]
    Unknown,
}

/// Entry of a workspace listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub path: String,
    #[serde(default)]
    pub object_type: Option<ObjectType>,
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub modified_at: Option<i64>,
}

/// Entry of a Unity Catalog volume directory listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub is_directory: bool,
    #[serde(default)]
    pub file_size: Option<i64>,
    #[serde(default)]
    pub last_modified: Option<i64>,
}

/// Entry of a DBFS listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    pub path: String,
    #[serde(default)]
    pub is_dir: bool,
    #[serde(default)]
    pub file_size: Option<i64>,
    #[serde(default)]
    pub modification_time: Option<i64>,
}

/// Response of `dbfs/read`; `data` is base64-encoded
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DbfsReadResponse {
    #[serde(default)]
    pub bytes_read: i64,
    #[serde(default)]
    pub data: String,
}

/// Storage calls the file gateway needs from a workspace
#[async_trait]
pub trait WorkspaceApi: Send + Sync {
    /// List objects directly under a workspace directory
    async fn list_workspace(&self, path: &str) -> Result<Vec<ObjectInfo>>;

    /// Export a workspace file as raw bytes
    async fn export_workspace(&self, path: &str) -> Result<Bytes>;

    /// List the contents of a volume directory
    async fn list_directory_contents(&self, path: &str) -> Result<Vec<DirectoryEntry>>;

    /// Download a volume file
    async fn download(&self, path: &str) -> Result<ByteStream>;

    /// List a DBFS directory
    async fn dbfs_list(&self, path: &str) -> Result<Vec<FileInfo>>;

    /// Read a DBFS file
    async fn dbfs_read(&self, path: &str) -> Result<DbfsReadResponse>;
}
