use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::domain::request::RequestId;

/// Which upload slot a stored file belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Proforma,
    PurchaseOrder,
    Receipt,
}

impl FileKind {
    /// Directory prefix used in stored locations: `{prefix}/{request_id}/{filename}`.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Proforma => "proformas",
            Self::PurchaseOrder => "purchase_orders",
            Self::Receipt => "receipts",
        }
    }
}

/// Stable reference returned by the file-store collaborator. The core never
/// inspects storage mechanics; it only passes references around.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub kind: FileKind,
    pub filename: String,
    pub location: String,
    pub sha256: String,
    pub stored_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("refusing to store empty file `{filename}`")]
    EmptyFile { filename: String },
    #[error("file store i/o failure at `{location}`: {message}")]
    Io { location: String, message: String },
}

#[async_trait]
pub trait FileStore: Send + Sync {
    async fn put(
        &self,
        kind: FileKind,
        request_id: &RequestId,
        filename: &str,
        bytes: &[u8],
    ) -> Result<FileRef, FileStoreError>;

    async fn exists(&self, file: &FileRef) -> bool;

    async fn get(&self, file: &FileRef) -> Result<Vec<u8>, FileStoreError>;
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

pub fn location_for(kind: FileKind, request_id: &RequestId, filename: &str) -> String {
    format!("{}/{}/{}", kind.prefix(), request_id.0, filename)
}

/// Keeps file bytes in process memory, keyed by location. Used by tests and
/// the demo command; production deployments use the local store in the
/// extract crate.
#[derive(Default)]
pub struct InMemoryFileStore {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl FileStore for InMemoryFileStore {
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
        let mut files = self.files.write().await;
        files.insert(location.clone(), bytes.to_vec());

        Ok(FileRef {
            kind,
            filename: filename.to_string(),
            location,
            sha256: sha256_hex(bytes),
            stored_at: Utc::now(),
        })
    }

    async fn exists(&self, file: &FileRef) -> bool {
        let files = self.files.read().await;
        files.contains_key(&file.location)
    }

    async fn get(&self, file: &FileRef) -> Result<Vec<u8>, FileStoreError> {
        let files = self.files.read().await;
        files.get(&file.location).cloned().ok_or_else(|| FileStoreError::Io {
            location: file.location.clone(),
            message: "not found".to_string(),
        })
    }
}
