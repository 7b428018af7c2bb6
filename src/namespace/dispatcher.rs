//! Namespace Dispatcher
//!
//! Routes list and read requests to the handler for the path's namespace.
//!
//! Listing is fail-open: a backend failure is logged and reported as an
//! empty listing. Reading is fail-loud: backend failures are wrapped with
//! the namespace and returned to the caller.

use std::sync::Arc;

use super::{
    file_name, Encoding, FileEntry, FileTypeFilter, Namespace, NamespaceHandler,
    ObjectStoreHandler, ReadResult, VolumeHandler, WorkspaceHandler,
};
use crate::databricks::WorkspaceApi;
use crate::error::{Error, Result};

/// Picks a namespace handler per path
pub struct Dispatcher {
    workspace: Box<dyn NamespaceHandler>,
    volume: Box<dyn NamespaceHandler>,
    object_store: Box<dyn NamespaceHandler>,
}

impl Dispatcher {
    /// Build handlers for all namespaces on top of one workspace client
    pub fn new(api: Arc<dyn WorkspaceApi>) -> Self {
        Self {
            workspace: Box::new(WorkspaceHandler::new(Arc::clone(&api))),
            volume: Box::new(VolumeHandler::new(Arc::clone(&api))),
            object_store: Box::new(ObjectStoreHandler::new(api)),
        }
    }

    /// Handler serving a namespace
    pub fn handler(&self, namespace: Namespace) -> &dyn NamespaceHandler {
        match namespace {
            Namespace::Workspace => self.workspace.as_ref(),
            Namespace::Volume => self.volume.as_ref(),
            Namespace::ObjectStore => self.object_store.as_ref(),
        }
    }

    /// List files under `path`
    ///
    /// Only an invalid path is an error.
    pub async fn list(&self, path: &str, filter: &FileTypeFilter) -> Result<Vec<FileEntry>> {
        let namespace = Namespace::classify(path)?;

        match self.handler(namespace).list(path, filter).await {
            Ok(files) => {
                tracing::debug!("Listed {} {} files under {}", files.len(), namespace, path);
                Ok(files)
            }
            Err(e) => {
                tracing::error!("Error listing {} files: {}", namespace, e);
                Ok(Vec::new())
            }
        }
    }

    /// Read the file at `path`
    pub async fn read(&self, path: &str, encoding: Encoding) -> Result<ReadResult> {
        if path.is_empty() {
            return Err(Error::MissingField("Path"));
        }
        let namespace = Namespace::classify(path)?;

        let content = self
            .handler(namespace)
            .read(path, encoding)
            .await
            .map_err(|e| {
                tracing::warn!("Read of {} failed: {}", path, e);
                Error::read_failure(namespace.label(), e)
            })?;

        Ok(ReadResult {
            path: path.to_string(),
            name: file_name(path).to_string(),
            content,
            encoding,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::databricks::testing::MockWorkspace;

    fn dispatcher(mock: MockWorkspace) -> (Dispatcher, Arc<MockWorkspace>) {
        let mock = Arc::new(mock);
        (Dispatcher::new(Arc::clone(&mock) as Arc<dyn WorkspaceApi>), mock)
    }

    #[test]
    fn test_handler_selection() {
        let (dispatcher, _) = dispatcher(MockWorkspace::default());
        for namespace in [Namespace::Workspace, Namespace::Volume, Namespace::ObjectStore] {
            assert_eq!(dispatcher.handler(namespace).namespace(), namespace);
        }
    }

    #[tokio::test]
    async fn test_list_routes_by_prefix() {
        let (dispatcher, _) = dispatcher(MockWorkspace::populated());
        let filter = FileTypeFilter::default();

        let workspace = dispatcher.list("/Workspace/Shared", &filter).await.unwrap();
        assert!(workspace.iter().all(|f| f.namespace == Namespace::Workspace));
        assert_eq!(workspace.len(), 2);

        let volume = dispatcher.list("/Volumes/main/cohive/raw", &filter).await.unwrap();
        assert_eq!(volume[0].namespace, Namespace::Volume);

        let dbfs = dispatcher.list("dbfs:/FileStore/uploads", &filter).await.unwrap();
        assert_eq!(dbfs[0].namespace, Namespace::ObjectStore);
    }

    #[tokio::test]
    async fn test_list_invalid_path_is_not_sent_to_backend() {
        let (dispatcher, mock) = dispatcher(MockWorkspace::populated());
        let result = dispatcher.list("/tmp", &FileTypeFilter::default()).await;
        assert!(matches!(result, Err(Error::InvalidPath(_))));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_list_fails_open() {
        let (dispatcher, mock) = dispatcher(MockWorkspace::failing());
        let filter = FileTypeFilter::default();
        for path in ["/Workspace/Shared", "/Volumes/main", "dbfs:/"] {
            assert!(dispatcher.list(path, &filter).await.unwrap().is_empty());
        }
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_read_result() {
        let (dispatcher, _) = dispatcher(MockWorkspace::populated());
        let result = dispatcher
            .read("/Workspace/Shared/notes.txt", Encoding::Text)
            .await
            .unwrap();
        assert_eq!(
            result,
            ReadResult {
                path: "/Workspace/Shared/notes.txt".into(),
                name: "notes.txt".into(),
                content: "hello world".into(),
                encoding: Encoding::Text,
            }
        );
    }

    #[tokio::test]
    async fn test_read_fails_loud() {
        let (dispatcher, _) = dispatcher(MockWorkspace::failing());

        let err = dispatcher
            .read("/Volumes/main/cohive/raw/survey.csv", Encoding::Text)
            .await
            .unwrap_err();
        assert!(!err.is_client_error());
        assert_eq!(
            err.to_string(),
            "Error reading volume file: Databricks API error (503): TEMPORARILY_UNAVAILABLE"
        );

        let err = dispatcher
            .read("dbfs:/FileStore/uploads/persona.txt", Encoding::Base64)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Error reading DBFS file:"));
    }

    #[tokio::test]
    async fn test_read_input_errors() {
        let (dispatcher, _) = dispatcher(MockWorkspace::populated());
        assert!(matches!(
            dispatcher.read("", Encoding::Text).await,
            Err(Error::MissingField("Path"))
        ));
        assert!(matches!(
            dispatcher.read("C:/notes.txt", Encoding::Text).await,
            Err(Error::InvalidPath(_))
        ));
    }
}
