use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use procura_core::domain::request::RequestId;
use procura_core::files::{location_for, sha256_hex, FileKind, FileRef, FileStore, FileStoreError};

/// File store rooted at the configured media directory. Layout is
/// `{media_root}/{kind prefix}/{request_id}/{filename}`, mirroring the
/// locations recorded on `FileRef`s.
pub struct LocalFileStore {
    media_root: PathBuf,
}

impl LocalFileStore {
    pub fn new(media_root: impl Into<PathBuf>) -> Self {
        Self { media_root: media_root.into() }
    }

    fn path_for(&self, location: &str) -> PathBuf {
        self.media_root.join(location)
    }
}

fn io_error(location: &str, error: std::io::Error) -> FileStoreError {
    FileStoreError::Io { location: location.to_string(), message: error.to_string() }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn put(
        &self,
        kind: FileKind,
        request_id: &RequestId,
        filename: &str,
        bytes: &[u8],
    ) -> Result<FileRef, FileStoreError> {
        if bytes.is_empty() {
            return Err(FileStoreError::EmptyFile { filename: filename.to_string() });
        }

        let location = location_for(kind, request_id, filename);
        let path = self.path_for(&location);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|error| io_error(&location, error))?;
        }
        tokio::fs::write(&path, bytes).await.map_err(|error| io_error(&location, error))?;

        debug!(location = %location, size = bytes.len(), "file stored");

        Ok(FileRef {
            kind,
            filename: filename.to_string(),
            location,
            sha256: sha256_hex(bytes),
            stored_at: Utc::now(),
        })
    }

    async fn exists(&self, file: &FileRef) -> bool {
        tokio::fs::try_exists(self.path_for(&file.location)).await.unwrap_or(false)
    }

    async fn get(&self, file: &FileRef) -> Result<Vec<u8>, FileStoreError> {
        tokio::fs::read(self.path_for(&file.location))
            .await
            .map_err(|error| io_error(&file.location, error))
    }
}

#[cfg(test)]
mod tests {
    use procura_core::domain::request::RequestId;
    use procura_core::files::{sha256_hex, FileKind, FileStore};

    use super::LocalFileStore;

    #[tokio::test]
    async fn put_writes_under_kind_and_request_directories() {
        let media_root = tempfile::tempdir().expect("tempdir");
        let store = LocalFileStore::new(media_root.path());
        let request_id = RequestId("req-1".to_string());

        let file = store
            .put(FileKind::Proforma, &request_id, "invoice.pdf", b"proforma bytes")
            .await
            .expect("put");

        assert_eq!(file.location, "proformas/req-1/invoice.pdf");
        assert_eq!(file.sha256, sha256_hex(b"proforma bytes"));
        assert!(media_root.path().join("proformas/req-1/invoice.pdf").is_file());
        assert!(store.exists(&file).await);
        assert_eq!(store.get(&file).await.expect("get"), b"proforma bytes");
    }

    #[tokio::test]
    async fn empty_uploads_are_rejected() {
        let media_root = tempfile::tempdir().expect("tempdir");
        let store = LocalFileStore::new(media_root.path());
        let request_id = RequestId("req-1".to_string());

        let error = store
            .put(FileKind::Receipt, &request_id, "empty.pdf", b"")
            .await
            .expect_err("empty upload");
        assert!(error.to_string().contains("empty.pdf"));
        assert!(!media_root.path().join("receipts/req-1/empty.pdf").exists());
    }

    #[tokio::test]
    async fn get_missing_file_is_an_io_error() {
        let media_root = tempfile::tempdir().expect("tempdir");
        let store = LocalFileStore::new(media_root.path());
        let request_id = RequestId("req-1".to_string());

        let file = store
            .put(FileKind::Receipt, &request_id, "receipt.pdf", b"bytes")
            .await
            .expect("put");
        tokio::fs::remove_file(media_root.path().join(&file.location))
            .await
            .expect("remove");

        assert!(!store.exists(&file).await);
        assert!(store.get(&file).await.is_err());
    }
}
