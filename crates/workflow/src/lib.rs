pub mod audit;
pub mod errors;
pub mod ledger;
pub mod service;

pub use audit::TracingAuditSink;
pub use errors::WorkflowError;
pub use ledger::{ApprovalLedger, LedgerUpdate};
pub use service::{ActionOutcome, RequestDetail, RequestDraft, WorkflowService};
