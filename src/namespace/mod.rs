//! Storage Namespaces
//!
//! A path is routed to one of three namespaces by its prefix:
//!
//! - `/Workspace...` → workspace tree (files and notebooks)
//! - `/Volumes...`   → Unity Catalog volumes
//! - `dbfs:...`      → DBFS object store
//!
//! Each namespace has a [`NamespaceHandler`] and the [`Dispatcher`] picks one
//! per request.

mod dispatcher;
mod object_store;
mod volume;
mod workspace;

pub use dispatcher::Dispatcher;
pub use object_store::ObjectStoreHandler;
pub use volume::VolumeHandler;
pub use workspace::WorkspaceHandler;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Workspace tree prefix
pub const WORKSPACE_PREFIX: &str = "/Workspace";
/// Unity Catalog volume prefix
pub const VOLUME_PREFIX: &str = "/Volumes";
/// DBFS scheme prefix
pub const OBJECT_STORE_PREFIX: &str = "dbfs:";
/// Path listed when the caller gives none
pub const DEFAULT_LIST_PATH: &str = "/Workspace/Shared";

/// Storage namespace a path belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Namespace {
    #[serde(rename = "workspace")]
    Workspace,
    #[serde(rename = "volume")]
    Volume,
    #[serde(rename = "dbfs")]
    ObjectStore,
}

impl Namespace {
    /// Classify a path by its prefix
    pub fn classify(path: &str) -> Result<Self> {
        if path.starts_with(WORKSPACE_PREFIX) {
            Ok(Namespace::Workspace)
        } else if path.starts_with(VOLUME_PREFIX) {
            Ok(Namespace::Volume)
        } else if path.starts_with(OBJECT_STORE_PREFIX) {
            Ok(Namespace::ObjectStore)
        } else {
            Err(Error::InvalidPath(path.to_string()))
        }
    }

    /// Human-readable name used in log and error messages
    pub fn label(&self) -> &'static str {
        match self {
            Namespace::Workspace => "workspace",
            Namespace::Volume => "volume",
            Namespace::ObjectStore => "DBFS",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How file content is returned to the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Text,
    Base64,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Text => "text",
            Encoding::Base64 => "base64",
        }
    }

    /// Encode raw file bytes: UTF-8 text or standard base64
    pub fn encode(&self, bytes: &[u8]) -> Result<String> {
        match self {
            Encoding::Text => Ok(String::from_utf8(bytes.to_vec())?),
            Encoding::Base64 => Ok(BASE64.encode(bytes)),
        }
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(Encoding::Text),
            "base64" => Ok(Encoding::Base64),
            other => Err(Error::InvalidEncoding(other.to_string())),
        }
    }
}

/// A file found by a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub namespace: Namespace,
    pub size: Option<i64>,
    pub modified_at: Option<i64>,
}

/// Content returned by a read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadResult {
    pub path: String,
    pub name: String,
    pub content: String,
    pub encoding: Encoding,
}

/// Extension filter from a comma-separated `file_types` parameter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTypeFilter {
    extensions: Vec<String>,
}

impl FileTypeFilter {
    /// Parse `"pdf,docx,txt"`; empty segments are ignored
    pub fn parse(raw: Option<&str>) -> Self {
        let extensions = raw
            .unwrap_or_default()
            .split(',')
            .filter(|ext| !ext.is_empty())
            .map(str::to_string)
            .collect();
        Self { extensions }
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// True if no filter was given or `name` ends with `.{ext}` for some ext
    pub fn matches(&self, name: &str) -> bool {
        self.is_empty()
            || self.extensions.iter().any(|ext| {
                name.strip_suffix(ext.as_str())
                    .map_or(false, |stem| stem.ends_with('.'))
            })
    }
}

/// Final `/`-separated segment of a path
pub fn file_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// List and read operations of a single namespace
#[async_trait]
pub trait NamespaceHandler: Send + Sync {
    /// Namespace served by this handler
    fn namespace(&self) -> Namespace;

    /// Non-directory entries under `path` that pass `filter`
    async fn list(&self, path: &str, filter: &FileTypeFilter) -> Result<Vec<FileEntry>>;

    /// File content in the requested encoding
    async fn read(&self, path: &str, encoding: Encoding) -> Result<String>;
}
