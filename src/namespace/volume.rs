//! Unity Catalog volume handler

use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;

use super::{Encoding, FileEntry, FileTypeFilter, Namespace, NamespaceHandler};
use crate::databricks::WorkspaceApi;
use crate::error::Result;

/// Files under `/Volumes`
pub struct VolumeHandler {
    api: Arc<dyn WorkspaceApi>,
}

impl VolumeHandler {
    pub fn new(api: Arc<dyn WorkspaceApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl NamespaceHandler for VolumeHandler {
    fn namespace(&self) -> Namespace {
        Namespace::Volume
    }

    async fn list(&self, path: &str, filter: &FileTypeFilter) -> Result<Vec<FileEntry>> {
        let entries = self.api.list_directory_contents(path).await?;

        Ok(entries
            .into_iter()
            .filter(|item| !item.is_directory && filter.matches(&item.name))
            .map(|item| FileEntry {
                name: item.name,
                path: item.path,
                namespace: Namespace::Volume,
                size: item.file_size,
                modified_at: item.last_modified,
            })
            .collect())
    }

    async fn read(&self, path: &str, encoding: Encoding) -> Result<String> {
        let mut stream = self.api.download(path).await?;

        // Drain the whole download before encoding
        let mut content = Vec::new();
        while let Some(chunk) = stream.try_next().await? {
            content.extend_from_slice(&chunk);
        }

        encoding.encode(&content)
    }
}
