use async_trait::async_trait;
use thiserror::Error;

use procura_core::domain::approval::{Approval, ApprovalLevel};
use procura_core::domain::purchase_order::PurchaseOrder;
use procura_core::domain::receipt::ReceiptValidation;
use procura_core::domain::request::{PurchaseRequest, RequestId, RequestStatus};
use procura_core::files::{FileKind, FileRef};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Persistence contract for the workflow core. Implementations must provide
/// the two atomic primitives (`transition_status`, `insert_po_if_absent`)
/// with compare-and-set semantics: they are what makes the
/// PENDING -> APPROVED transition and PO creation happen at most once
/// under concurrent approver sessions.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    async fn find_request(&self, id: &RequestId) -> Result<Option<PurchaseRequest>, StoreError>;

    /// Inserts or replaces the request row and its item set. Callers only
    /// invoke this for creation and owner edits; status changes go through
    /// `transition_status` and file slots through `set_file`.
    async fn save_request(&self, request: &PurchaseRequest) -> Result<(), StoreError>;

    /// Removes the request and, by cascade, its items, approvals, PO and
    /// validation records.
    async fn delete_request(&self, id: &RequestId) -> Result<(), StoreError>;

    /// Updates a single file slot without touching any workflow field.
    async fn set_file(
        &self,
        id: &RequestId,
        kind: FileKind,
        file: &FileRef,
    ) -> Result<(), StoreError>;

    /// Atomically moves the request from `from` to `to`. Returns true iff
    /// this caller performed the transition; false means another caller won
    /// or the request was not in `from`.
    async fn transition_status(
        &self,
        id: &RequestId,
        from: RequestStatus,
        to: RequestStatus,
    ) -> Result<bool, StoreError>;

    async fn find_approval(
        &self,
        id: &RequestId,
        level: ApprovalLevel,
    ) -> Result<Option<Approval>, StoreError>;

    /// Single-statement upsert keyed on (request_id, level); concurrent
    /// upserts for different levels must not lose each other's writes.
    async fn upsert_approval(&self, approval: &Approval) -> Result<(), StoreError>;

    /// Approvals for the request, ordered by level.
    async fn list_approvals(&self, id: &RequestId) -> Result<Vec<Approval>, StoreError>;

    /// Inserts the PO unless one already exists for the request. Returns
    /// true iff this call created it.
    async fn insert_po_if_absent(&self, po: &PurchaseOrder) -> Result<bool, StoreError>;

    async fn find_po(&self, id: &RequestId) -> Result<Option<PurchaseOrder>, StoreError>;

    /// Replaces the 1:1 validation record for the request; the most recent
    /// attempt wins.
    async fn upsert_validation(&self, validation: &ReceiptValidation) -> Result<(), StoreError>;

    async fn find_validation(
        &self,
        id: &RequestId,
    ) -> Result<Option<ReceiptValidation>, StoreError>;
}
