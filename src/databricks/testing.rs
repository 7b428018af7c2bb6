//! In-memory workspace used by handler and API tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;

use super::{
    ByteStream, DbfsReadResponse, DirectoryEntry, FileInfo, ObjectInfo, ObjectType, WorkspaceApi,
};
use crate::error::{Error, Result};

/// Mock workspace backed by maps; `failing` makes every call error out
#[derive(Default)]
pub struct MockWorkspace {
    pub workspace_objects: Vec<ObjectInfo>,
    pub workspace_files: HashMap<String, Vec<u8>>,
    pub volume_entries: Vec<DirectoryEntry>,
    /// Volume file contents, delivered chunk by chunk
    pub volume_files: HashMap<String, Vec<Vec<u8>>>,
    /// Volume path whose download breaks off after its first chunk
    pub broken_download: Option<String>,
    pub dbfs_entries: Vec<FileInfo>,
    /// DBFS contents as the API returns them (base64)
    pub dbfs_files: HashMap<String, String>,
    pub failing: bool,
    pub calls: AtomicUsize,
}

impl MockWorkspace {
    /// A backend where every call fails
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    /// Workspace tree with two files, a notebook and a folder
    pub fn populated() -> Self {
        let mut mock = Self::default();

        mock.workspace_objects = vec![
            object("/Workspace/Shared/brief.pdf", ObjectType::File, Some(2048)),
            object("/Workspace/Shared/notes.txt", ObjectType::File, Some(11)),
            object("/Workspace/Shared/Analysis", ObjectType::Notebook, None),
            object("/Workspace/Shared/archive", ObjectType::Directory, None),
        ];
        mock.workspace_files
            .insert("/Workspace/Shared/notes.txt".into(), b"hello world".to_vec());
        mock.workspace_files
            .insert("/Workspace/Shared/brief.pdf".into(), vec![0x25, 0x50, 0x44, 0x46, 0xff, 0x00]);

        mock.volume_entries = vec![
            DirectoryEntry {
                name: "survey.csv".into(),
                path: "/Volumes/main/cohive/raw/survey.csv".into(),
                is_directory: false,
                file_size: Some(18),
                last_modified: Some(1_700_000_000_000),
            },
            DirectoryEntry {
                name: "2024".into(),
                path: "/Volumes/main/cohive/raw/2024".into(),
                is_directory: true,
                file_size: None,
                last_modified: None,
            },
        ];
        mock.volume_files.insert(
            "/Volumes/main/cohive/raw/survey.csv".into(),
            vec![b"id,score\n".to_vec(), b"1,9\n2,7\n".to_vec()],
        );

        mock.dbfs_entries = vec![
            FileInfo {
                path: "/FileStore/uploads/persona.txt".into(),
                is_dir: false,
                file_size: Some(7),
                modification_time: Some(1_700_000_000_000),
            },
            FileInfo {
                path: "/FileStore/uploads/old".into(),
                is_dir: true,
                file_size: Some(0),
                modification_time: None,
            },
        ];
        // "persona" in base64
        mock.dbfs_files
            .insert("dbfs:/FileStore/uploads/persona.txt".into(), "cGVyc29uYQ==".into());

        mock
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(Error::Api {
                status: 503,
                message: "TEMPORARILY_UNAVAILABLE".into(),
            });
        }
        Ok(())
    }
}

fn object(path: &str, object_type: ObjectType, size: Option<i64>) -> ObjectInfo {
    ObjectInfo {
        path: path.to_string(),
        object_type: Some(object_type),
        size,
        modified_at: Some(1_700_000_000_000),
    }
}

fn not_found(path: &str) -> Error {
    Error::Api {
        status: 404,
        message: format!("{} does not exist", path),
    }
}

#[async_trait]
impl WorkspaceApi for MockWorkspace {
    async fn list_workspace(&self, _path: &str) -> Result<Vec<ObjectInfo>> {
        self.check()?;
        Ok(self.workspace_objects.clone())
    }

    async fn export_workspace(&self, path: &str) -> Result<Bytes> {
        self.check()?;
        self.workspace_files
            .get(path)
            .map(|b| Bytes::from(b.clone()))
            .ok_or_else(|| not_found(path))
    }

    async fn list_directory_contents(&self, _path: &str) -> Result<Vec<DirectoryEntry>> {
        self.check()?;
        Ok(self.volume_entries.clone())
    }

    async fn download(&self, path: &str) -> Result<ByteStream> {
        self.check()?;
        let chunks = self.volume_files.get(path).cloned().ok_or_else(|| not_found(path))?;
        let mut items: Vec<Result<Bytes>> = chunks.into_iter().map(|c| Ok(Bytes::from(c))).collect();
        if self.broken_download.as_deref() == Some(path) {
            items.truncate(1);
            items.push(Err(Error::Internal("connection reset mid-download".into())));
        }
        Ok(futures::stream::iter(items).boxed())
    }

    async fn dbfs_list(&self, _path: &str) -> Result<Vec<FileInfo>> {
        self.check()?;
        Ok(self.dbfs_entries.clone())
    }

    async fn dbfs_read(&self, path: &str) -> Result<DbfsReadResponse> {
        self.check()?;
        let data = self.dbfs_files.get(path).cloned().ok_or_else(|| not_found(path))?;
        Ok(DbfsReadResponse {
            bytes_read: data.len() as i64,
            data,
        })
    }
}
