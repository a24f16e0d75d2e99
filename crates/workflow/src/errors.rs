use thiserror::Error;

use procura_core::domain::document::ExtractError;
use procura_core::errors::{PermissionError, StateError, ValidationError};
use procura_core::files::FileStoreError;
use procura_db::StoreError;

/// Error surface of the workflow service. The first three variants map to
/// caller mistakes; the rest are infrastructure failures worth retrying.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Permission(#[from] PermissionError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
    #[error("file store failure: {0}")]
    File(#[from] FileStoreError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}
