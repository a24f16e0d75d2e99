use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::actor::ActorId;
use crate::domain::request::RequestId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyKind {
    AmountMismatch,
    MissingItem,
    ExtraItem,
    TotalMismatch,
    ExtractionFailed,
}

/// One structured mismatch between the extracted receipt and the PO.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Discrepancy {
    pub kind: DiscrepancyKind,
    pub item: Option<String>,
    pub expected: Option<Decimal>,
    pub actual: Option<Decimal>,
    pub delta: Decimal,
    pub note: String,
}

impl Discrepancy {
    pub fn extraction_failed(note: impl Into<String>) -> Self {
        Self {
            kind: DiscrepancyKind::ExtractionFailed,
            item: None,
            expected: None,
            actual: None,
            delta: Decimal::ZERO,
            note: note.into(),
        }
    }
}

/// Outcome of the most recent validation attempt for a request (1:1; a
/// re-run replaces the previous record).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReceiptValidation {
    pub request_id: RequestId,
    pub is_valid: bool,
    pub discrepancy_amount: Decimal,
    pub details: Vec<Discrepancy>,
    pub validated_by: ActorId,
    pub validated_at: DateTime<Utc>,
}
