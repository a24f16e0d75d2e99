pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod files;
pub mod po;
pub mod reconcile;

pub use audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink, InMemoryAuditSink};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat, ReconcileConfig};
pub use domain::{
    derive_status, derive_status_for_levels, Actor, ActorId, Approval, ApprovalDecision,
    ApprovalLevel, ApprovalStatus, Confidence, Discrepancy, DiscrepancyKind, DocumentExtractor,
    ExtractError, ExtractedDocument, ExtractedItem, PurchaseOrder, PurchaseRequest,
    ReceiptValidation, RequestId, RequestItem, RequestStatus, Role,
};
pub use errors::{FieldViolation, PermissionError, StateError, ValidationError};
pub use files::{FileKind, FileRef, FileStore, FileStoreError, InMemoryFileStore};
pub use po::{build_purchase_order, render_po_json};
pub use reconcile::{reconcile, ReconcileOutcome};
