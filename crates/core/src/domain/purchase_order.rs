use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::actor::ActorId;
use crate::domain::approval::ApprovalLevel;
use crate::domain::request::RequestId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoId(pub String);

/// A line frozen at generation time. Subsequent request edits must never
/// alter an issued purchase order, so lines are copies, not references.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoLine {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Who signed off at each level, captured on the artifact itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoApprovalRecord {
    pub level: ApprovalLevel,
    pub approver: Option<ActorId>,
    pub decided_at: DateTime<Utc>,
}

/// Immutable artifact generated exactly once, when both levels approve.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: PoId,
    pub po_number: String,
    pub request_id: RequestId,
    pub title: String,
    pub lines: Vec<PoLine>,
    pub total: Decimal,
    pub approvals: Vec<PoApprovalRecord>,
    pub issued_at: DateTime<Utc>,
}
