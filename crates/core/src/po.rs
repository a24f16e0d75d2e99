use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::approval::{Approval, ApprovalStatus};
use crate::domain::purchase_order::{PoApprovalRecord, PoId, PoLine, PurchaseOrder};
use crate::domain::request::{PurchaseRequest, RequestStatus};
use crate::errors::StateError;

/// Builds the immutable purchase-order snapshot for an approved request.
/// Lines are copied, never referenced, so later edits to the request can
/// never alter an issued PO. The caller owns the exactly-once discipline
/// (store-level conditional insert); this function only refuses requests
/// that are not approved.
pub fn build_purchase_order(
    request: &PurchaseRequest,
    approvals: &[Approval],
    issued_at: DateTime<Utc>,
) -> Result<PurchaseOrder, StateError> {
    if request.status != RequestStatus::Approved {
        return Err(StateError::NotApproved { id: request.id.clone(), status: request.status });
    }

    let lines: Vec<PoLine> = request
        .items
        .iter()
        .map(|item| PoLine {
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.total(),
        })
        .collect();

    let total = lines.iter().map(|line| line.line_total).sum();

    let mut approval_records: Vec<PoApprovalRecord> = approvals
        .iter()
        .filter(|approval| approval.status == ApprovalStatus::Approved)
        .map(|approval| PoApprovalRecord {
            level: approval.level,
            approver: approval.approver.clone(),
            decided_at: approval.updated_at,
        })
        .collect();
    approval_records.sort_by_key(|record| record.level);

    Ok(PurchaseOrder {
        id: PoId(uuid::Uuid::new_v4().to_string()),
        po_number: po_number(request, issued_at),
        request_id: request.id.clone(),
        title: request.title.clone(),
        lines,
        total,
        approvals: approval_records,
        issued_at,
    })
}

/// Human-readable PO number: `PO_{request_id}_{YYYYMMDD}`.
pub fn po_number(request: &PurchaseRequest, issued_at: DateTime<Utc>) -> String {
    format!("PO_{}_{}", request.id.0, issued_at.format("%Y%m%d"))
}

/// Renders the PO artifact payload stored alongside the request files.
pub fn render_po_json(po: &PurchaseOrder) -> Vec<u8> {
    let payload = json!({
        "po_number": po.po_number,
        "date": po.issued_at.to_rfc3339(),
        "request_id": po.request_id.0,
        "title": po.title,
        "total": po.total.to_string(),
        "items": po.lines.iter().map(|line| json!({
            "item_name": line.name,
            "quantity": line.quantity,
            "price": line.unit_price.to_string(),
            "total": line.line_total.to_string(),
        })).collect::<Vec<_>>(),
        "approvals": po.approvals.iter().map(|record| json!({
            "level": record.level.as_i64(),
            "approver": record.approver.as_ref().map(|id| id.0.clone()),
            "approved_at": record.decided_at.to_rfc3339(),
        })).collect::<Vec<_>>(),
    });

    serde_json::to_vec_pretty(&payload).unwrap_or_default()
}
