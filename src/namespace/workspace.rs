//! Workspace tree handler

use std::sync::Arc;

use async_trait::async_trait;

use super::{file_name, Encoding, FileEntry, FileTypeFilter, Namespace, NamespaceHandler};
use crate::databricks::{ObjectType, WorkspaceApi};
use crate::error::Result;

/// Files under `/Workspace`
pub struct WorkspaceHandler {
    api: Arc<dyn WorkspaceApi>,
}

impl WorkspaceHandler {
    pub fn new(api: Arc<dyn WorkspaceApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl NamespaceHandler for WorkspaceHandler {
    fn namespace(&self) -> Namespace {
        Namespace::Workspace
    }

    async fn list(&self, path: &str, filter: &FileTypeFilter) -> Result<Vec<FileEntry>> {
        let objects = self.api.list_workspace(path).await?;

        // Notebooks, folders and repos are not files
        Ok(objects
            .into_iter()
            .filter(|item| item.object_type == Some(ObjectType::File))
            .filter_map(|item| {
                let name = file_name(&item.path).to_string();
                filter.matches(&name).then(|| FileEntry {
                    name,
                    path: item.path,
                    namespace: Namespace::Workspace,
                    size: item.size,
                    modified_at: item.modified_at,
                })
            })
            .collect())
    }

    async fn read(&self, path: &str, encoding: Encoding) -> Result<String> {
        let content = self.api.export_workspace(path).await?;
        encoding.encode(&content)
    }
}
