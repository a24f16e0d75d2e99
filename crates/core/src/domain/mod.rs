pub mod actor;
pub mod approval;
pub mod document;
pub mod purchase_order;
pub mod receipt;
pub mod request;

pub use actor::{Actor, ActorId, Role};
pub use approval::{
    derive_status, derive_status_for_levels, Approval, ApprovalDecision, ApprovalId,
    ApprovalLevel, ApprovalStatus,
};
pub use document::{
    Confidence, DocumentExtractor, ExtractError, ExtractedDocument, ExtractedItem, StaticExtractor,
};
pub use purchase_order::{PoApprovalRecord, PoId, PoLine, PurchaseOrder};
pub use receipt::{Discrepancy, DiscrepancyKind, ReceiptValidation};
pub use request::{PurchaseRequest, ReceiptStage, RequestId, RequestItem, RequestStatus};
