//! DBFS object store handler
//!
//! DBFS hands file data back already base64-encoded, so the encoding rules
//! run the other way round from the workspace and volume handlers: `base64`
//! passes the payload through and `text` has to decode it first.

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use super::{file_name, Encoding, FileEntry, FileTypeFilter, Namespace, NamespaceHandler};
use crate::databricks::WorkspaceApi;
use crate::error::Result;

/// Files under `dbfs:`
pub struct ObjectStoreHandler {
    api: Arc<dyn WorkspaceApi>,
}

impl ObjectStoreHandler {
    pub fn new(api: Arc<dyn WorkspaceApi>) -> Self {
        Self { api }
    }
}

/// Turn a DBFS base64 payload into the requested encoding
pub(crate) fn decode_payload(data: String, encoding: Encoding) -> Result<String> {
    match encoding {
        Encoding::Base64 => Ok(data),
        Encoding::Text => Ok(String::from_utf8(BASE64.decode(data.as_bytes())?)?),
    }
}

#[async_trait]
impl NamespaceHandler for ObjectStoreHandler {
    fn namespace(&self) -> Namespace {
        Namespace::ObjectStore
    }

    async fn list(&self, path: &str, filter: &FileTypeFilter) -> Result<Vec<FileEntry>> {
        let items = self.api.dbfs_list(path).await?;

        Ok(items
            .into_iter()
            .filter(|item| !item.is_dir)
            .filter_map(|item| {
                let name = file_name(&item.path).to_string();
                filter.matches(&name).then(|| FileEntry {
                    name,
                    path: item.path,
                    namespace: Namespace::ObjectStore,
                    size: item.file_size,
                    // DBFS listings are not reported with a timestamp
                    modified_at: None,
                })
            })
            .collect())
    }

    async fn read(&self, path: &str, encoding: Encoding) -> Result<String> {
        let response = self.api.dbfs_read(path).await?;
        decode_payload(response.data, encoding)
    }
}
