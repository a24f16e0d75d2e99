use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ReconcileConfig;
use crate::domain::document::{Confidence, ExtractedDocument};
use crate::domain::purchase_order::PurchaseOrder;
use crate::domain::receipt::{Discrepancy, DiscrepancyKind};

/// Result of comparing an extracted receipt against a PO. Persisted as the
/// request's ReceiptValidation by the workflow layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    pub is_valid: bool,
    pub discrepancy_amount: Decimal,
    pub details: Vec<Discrepancy>,
}

/// Compares an extracted receipt document against the PO snapshot.
///
/// Items are matched by case-insensitive exact name. Matched pairs
/// contribute |receipt line total - po line total|; missing PO items and
/// extra receipt items contribute their full value. The grand totals are
/// compared only when extraction recovered one, and item lines only when
/// extraction recovered any, so a totals-only receipt is judged on its
/// total alone.
pub fn reconcile(
    document: &ExtractedDocument,
    po: &PurchaseOrder,
    config: &ReconcileConfig,
) -> ReconcileOutcome {
    let mut details = Vec::new();
    let mut amount = Decimal::ZERO;

    if let Some(reason) = &document.failure {
        details.push(Discrepancy::extraction_failed(format!("extraction failed: {reason}")));
        return ReconcileOutcome { is_valid: false, discrepancy_amount: amount, details };
    }

    if !document.items.is_empty() {
        for line in &po.lines {
            let key = line.name.trim().to_lowercase();
            match document
                .items
                .iter()
                .find(|item| item.name.trim().to_lowercase() == key)
            {
                Some(matched) => {
                    let delta = (matched.line_total - line.line_total).abs();
                    if delta > Decimal::ZERO {
                        amount += delta;
                        details.push(Discrepancy {
                            kind: DiscrepancyKind::AmountMismatch,
                            item: Some(line.name.clone()),
                            expected: Some(line.line_total),
                            actual: Some(matched.line_total),
                            delta,
                            note: format!("receipt line total differs for `{}`", line.name),
                        });
                    }
                }
                None => {
                    amount += line.line_total;
                    details.push(Discrepancy {
                        kind: DiscrepancyKind::MissingItem,
                        item: Some(line.name.clone()),
                        expected: Some(line.line_total),
                        actual: None,
                        delta: line.line_total,
                        note: format!("`{}` is on the purchase order but not the receipt", line.name),
                    });
                }
            }
        }

        for item in &document.items {
            let key = item.name.trim().to_lowercase();
            let on_po = po.lines.iter().any(|line| line.name.trim().to_lowercase() == key);
            if !on_po {
                amount += item.line_total;
                details.push(Discrepancy {
                    kind: DiscrepancyKind::ExtraItem,
                    item: Some(item.name.clone()),
                    expected: None,
                    actual: Some(item.line_total),
                    delta: item.line_total,
                    note: format!("`{}` is on the receipt but not the purchase order", item.name),
                });
            }
        }
    }

    if let Some(receipt_total) = document.total {
        let delta = (receipt_total - po.total).abs();
        if delta > Decimal::ZERO {
            amount += delta;
            details.push(Discrepancy {
                kind: DiscrepancyKind::TotalMismatch,
                item: None,
                expected: Some(po.total),
                actual: Some(receipt_total),
                delta,
                note: "receipt grand total differs from purchase order total".to_string(),
            });
        }
    }

    let tolerance = effective_tolerance(po.total, document.confidence, config);
    ReconcileOutcome { is_valid: amount <= tolerance, discrepancy_amount: amount, details }
}

fn effective_tolerance(
    po_total: Decimal,
    confidence: Confidence,
    config: &ReconcileConfig,
) -> Decimal {
    let percent_based = po_total.abs() * config.percent_tolerance / Decimal::new(100, 0);
    let base = config.absolute_tolerance.max(percent_based);

    match confidence {
        Confidence::High => base,
        Confidence::Low => base * config.low_confidence_multiplier,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::{reconcile, ReconcileConfig};
    use crate::domain::document::{Confidence, ExtractedDocument, ExtractedItem};
    use crate::domain::purchase_order::{PoId, PoLine, PurchaseOrder};
    use crate::domain::receipt::DiscrepancyKind;
    use crate::domain::request::RequestId;

    fn po(lines: &[(&str, u32, i64)]) -> PurchaseOrder {
        let lines: Vec<PoLine> = lines
            .iter()
            .map(|(name, quantity, unit_cents)| PoLine {
                name: name.to_string(),
                quantity: *quantity,
                unit_price: Decimal::new(*unit_cents, 2),
                line_total: Decimal::from(*quantity) * Decimal::new(*unit_cents, 2),
            })
            .collect();
        let total = lines.iter().map(|line| line.line_total).sum();

        PurchaseOrder {
            id: PoId("po-1".to_string()),
            po_number: "PO_req-1_20260314".to_string(),
            request_id: RequestId("req-1".to_string()),
            title: "Office supplies".to_string(),
            lines,
            total,
            approvals: Vec::new(),
            issued_at: Utc::now(),
        }
    }

    fn document(items: &[(&str, u32, i64)], total_cents: Option<i64>) -> ExtractedDocument {
        ExtractedDocument {
            vendor: Some("Acme Supplies".to_string()),
            items: items
                .iter()
                .map(|(name, quantity, unit_cents)| ExtractedItem {
                    name: name.to_string(),
                    quantity: *quantity,
                    unit_price: Decimal::new(*unit_cents, 2),
                    line_total: Decimal::from(*quantity) * Decimal::new(*unit_cents, 2),
                })
                .collect(),
            total: total_cents.map(|cents| Decimal::new(cents, 2)),
            confidence: Confidence::High,
            failure: None,
        }
    }

    fn zero_tolerance() -> ReconcileConfig {
        ReconcileConfig {
            absolute_tolerance: Decimal::ZERO,
            percent_tolerance: Decimal::ZERO,
            low_confidence_multiplier: Decimal::new(20, 1),
        }
    }

    #[test]
    fn identical_receipt_and_po_reconcile_cleanly() {
        let po = po(&[("Paper", 10, 2500)]);
        let document = document(&[("paper", 10, 2500)], Some(25000));

        let outcome = reconcile(&document, &po, &zero_tolerance());

        assert!(outcome.is_valid);
        assert_eq!(outcome.discrepancy_amount, Decimal::ZERO);
        assert!(outcome.details.is_empty());
    }

    #[test]
    fn missing_po_item_contributes_its_full_value() {
        let po = po(&[("Paper", 10, 2500), ("Toner", 2, 4999)]);
        let document = document(&[("Paper", 10, 2500)], None);

        let outcome = reconcile(&document, &po, &zero_tolerance());

        assert!(!outcome.is_valid);
        assert_eq!(outcome.discrepancy_amount, Decimal::new(9998, 2));
        assert_eq!(outcome.details.len(), 1);
        assert_eq!(outcome.details[0].kind, DiscrepancyKind::MissingItem);
    }

    #[test]
    fn extra_receipt_item_is_reported_with_its_value() {
        let po = po(&[("Paper", 10, 2500)]);
        let document = document(&[("Paper", 10, 2500), ("Stapler", 1, 1500)], None);

        let outcome = reconcile(&document, &po, &zero_tolerance());

        assert!(!outcome.is_valid);
        assert_eq!(outcome.discrepancy_amount, Decimal::new(1500, 2));
        assert_eq!(outcome.details[0].kind, DiscrepancyKind::ExtraItem);
    }

    #[test]
    fn totals_only_receipt_is_judged_on_its_total() {
        // Partial delivery: the receipt parser only recovered a grand total.
        let po = po(&[("Paper", 10, 2500)]);
        let document = document(&[], Some(23000));

        let outcome = reconcile(&document, &po, &zero_tolerance());

        assert!(!outcome.is_valid);
        assert_eq!(outcome.discrepancy_amount, Decimal::new(2000, 2));
        assert_eq!(outcome.details.len(), 1);
        assert_eq!(outcome.details[0].kind, DiscrepancyKind::TotalMismatch);
    }

    #[test]
    fn matched_line_delta_and_total_delta_both_count() {
        let po = po(&[("Paper", 10, 2500)]);
        let document = document(&[("Paper", 9, 2500)], Some(22500));

        let outcome = reconcile(&document, &po, &zero_tolerance());

        // 25.00 line delta plus 25.00 grand-total delta.
        assert_eq!(outcome.discrepancy_amount, Decimal::new(5000, 2));
        assert_eq!(outcome.details.len(), 2);
    }

    #[test]
    fn tolerance_absorbs_small_differences() {
        let po = po(&[("Paper", 10, 2500)]);
        let document = document(&[("Paper", 10, 2500)], Some(25001));

        let mut config = zero_tolerance();
        config.absolute_tolerance = Decimal::new(1, 2);

        let outcome = reconcile(&document, &po, &config);
        assert!(outcome.is_valid);
        assert_eq!(outcome.discrepancy_amount, Decimal::new(1, 2));
    }

    #[test]
    fn percent_tolerance_scales_with_po_total() {
        let po = po(&[("Paper", 10, 2500)]);
        let document = document(&[], Some(25200));

        let mut config = zero_tolerance();
        config.percent_tolerance = Decimal::ONE;

        // 1% of 250.00 = 2.50 tolerance against a 2.00 delta.
        let outcome = reconcile(&document, &po, &config);
        assert!(outcome.is_valid);
    }

    #[test]
    fn low_confidence_widens_the_tolerance() {
        let po = po(&[("Paper", 10, 2500)]);
        let mut document = document(&[], Some(25150));
        let mut config = zero_tolerance();
        config.absolute_tolerance = Decimal::ONE;

        let strict = reconcile(&document, &po, &config);
        assert!(!strict.is_valid, "1.50 delta exceeds the 1.00 tolerance at high confidence");

        document.confidence = Confidence::Low;
        let widened = reconcile(&document, &po, &config);
        assert!(widened.is_valid, "2x multiplier should absorb OCR noise");
    }

    #[test]
    fn extraction_failure_is_never_valid() {
        let po = po(&[("Paper", 10, 2500)]);
        let document = ExtractedDocument::failed("no text layer");

        let mut config = zero_tolerance();
        config.absolute_tolerance = Decimal::new(1_000_000, 0);

        let outcome = reconcile(&document, &po, &config);
        assert!(!outcome.is_valid);
        assert_eq!(outcome.details.len(), 1);
        assert_eq!(outcome.details[0].kind, DiscrepancyKind::ExtractionFailed);
    }
}
