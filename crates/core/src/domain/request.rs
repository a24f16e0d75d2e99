use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::actor::ActorId;
use crate::errors::StateError;
use crate::files::FileRef;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Where an approved request stands in the receipt sub-flow. Derived from
/// attached files and the validation record, not a top-level status change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStage {
    AwaitingReceipt,
    ReceiptSubmitted,
    Validated,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestItem {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl RequestItem {
    /// Always quantity x unit price; never stored as authoritative input.
    pub fn total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub id: RequestId,
    pub title: String,
    pub description: String,
    pub amount: Decimal,
    pub status: RequestStatus,
    pub created_by: ActorId,
    pub items: Vec<RequestItem>,
    pub proforma_file: Option<FileRef>,
    pub purchase_order_file: Option<FileRef>,
    pub receipt_file: Option<FileRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PurchaseRequest {
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(
            (&self.status, next),
            (RequestStatus::Pending, RequestStatus::Approved)
                | (RequestStatus::Pending, RequestStatus::Rejected)
        )
    }

    pub fn transition_to(&mut self, next: RequestStatus) -> Result<(), StateError> {
        if self.can_transition_to(next) {
            self.status = next;
            return Ok(());
        }

        Err(StateError::InvalidTransition { from: self.status, to: next })
    }

    /// Owner edits are only legal before any level has finalized the request.
    pub fn can_be_edited(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    pub fn can_be_approved(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    pub fn is_owned_by(&self, actor: &ActorId) -> bool {
        &self.created_by == actor
    }

    pub fn total_amount(&self) -> Decimal {
        self.items.iter().map(RequestItem::total).sum()
    }

    /// Recompute the cached amount from the item totals.
    pub fn refresh_amount(&mut self) {
        self.amount = self.total_amount();
    }

    /// Receipt sub-flow position for APPROVED requests; None otherwise.
    pub fn receipt_stage(&self, has_validation: bool) -> Option<ReceiptStage> {
        if self.status != RequestStatus::Approved {
            return None;
        }

        Some(if has_validation {
            ReceiptStage::Validated
        } else if self.receipt_file.is_some() {
            ReceiptStage::ReceiptSubmitted
        } else {
            ReceiptStage::AwaitingReceipt
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::{PurchaseRequest, ReceiptStage, RequestId, RequestItem, RequestStatus};
    use crate::domain::actor::ActorId;

    fn request(status: RequestStatus) -> PurchaseRequest {
        let now = Utc::now();
        let items = vec![RequestItem {
            name: "Paper".to_string(),
            quantity: 10,
            unit_price: Decimal::new(2500, 2),
        }];
        let mut request = PurchaseRequest {
            id: RequestId("req-1".to_string()),
            title: "Office supplies".to_string(),
            description: String::new(),
            amount: Decimal::ZERO,
            status,
            created_by: ActorId("u-staff".to_string()),
            items,
            proforma_file: None,
            purchase_order_file: None,
            receipt_file: None,
            created_at: now,
            updated_at: now,
        };
        request.refresh_amount();
        request
    }

    #[test]
    fn item_total_is_quantity_times_unit_price() {
        let item = RequestItem {
            name: "Paper".to_string(),
            quantity: 10,
            unit_price: Decimal::new(2500, 2),
        };
        assert_eq!(item.total(), Decimal::new(25000, 2));
    }

    #[test]
    fn amount_is_sum_of_item_totals() {
        let mut request = request(RequestStatus::Pending);
        request.items.push(RequestItem {
            name: "Toner".to_string(),
            quantity: 2,
            unit_price: Decimal::new(4999, 2),
        });
        request.refresh_amount();
        assert_eq!(request.amount, Decimal::new(25000 + 9998, 2));
    }

    #[test]
    fn pending_transitions_to_either_terminal_state() {
        let mut approved = request(RequestStatus::Pending);
        approved.transition_to(RequestStatus::Approved).expect("pending -> approved");
        assert_eq!(approved.status, RequestStatus::Approved);

        let mut rejected = request(RequestStatus::Pending);
        rejected.transition_to(RequestStatus::Rejected).expect("pending -> rejected");
        assert_eq!(rejected.status, RequestStatus::Rejected);
    }

    #[test]
    fn terminal_states_reject_further_transitions() {
        let mut request = request(RequestStatus::Rejected);
        let error = request
            .transition_to(RequestStatus::Approved)
            .expect_err("rejected requests are not reopenable");
        assert!(matches!(error, crate::errors::StateError::InvalidTransition { .. }));
    }

    #[test]
    fn edits_are_blocked_once_finalized() {
        assert!(request(RequestStatus::Pending).can_be_edited());
        assert!(!request(RequestStatus::Approved).can_be_edited());
        assert!(!request(RequestStatus::Rejected).can_be_approved());
    }

    #[test]
    fn receipt_stage_tracks_the_sub_flow() {
        let pending = request(RequestStatus::Pending);
        assert_eq!(pending.receipt_stage(false), None);

        let mut approved = request(RequestStatus::Approved);
        assert_eq!(approved.receipt_stage(false), Some(ReceiptStage::AwaitingReceipt));

        approved.receipt_file = Some(crate::files::FileRef {
            kind: crate::files::FileKind::Receipt,
            filename: "receipt.pdf".to_string(),
            location: "receipts/req-1/receipt.pdf".to_string(),
            sha256: "0".repeat(64),
            stored_at: Utc::now(),
        });
        assert_eq!(approved.receipt_stage(false), Some(ReceiptStage::ReceiptSubmitted));
        assert_eq!(approved.receipt_stage(true), Some(ReceiptStage::Validated));
    }
}
