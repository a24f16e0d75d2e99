use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use procura_core::domain::actor::ActorId;
use procura_core::domain::approval::{Approval, ApprovalId, ApprovalLevel, ApprovalStatus};
use procura_core::domain::purchase_order::{PoId, PurchaseOrder};
use procura_core::domain::receipt::ReceiptValidation;
use procura_core::domain::request::{PurchaseRequest, RequestId, RequestItem, RequestStatus};
use procura_core::files::{FileKind, FileRef};

use crate::connection::DbPool;
use crate::store::{StoreError, WorkflowStore};

/// SQLite-backed store. Decimals and timestamps are stored as TEXT
/// (arbitrary precision and rfc3339 respectively); nested documents
/// (file refs, PO lines, validation details) are stored as JSON TEXT.
#[derive(Clone)]
pub struct SqliteWorkflowStore {
    pool: DbPool,
}

impl SqliteWorkflowStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn decode_decimal(raw: &str, column: &str) -> Result<Decimal, StoreError> {
    raw.parse()
        .map_err(|_| StoreError::Decode(format!("invalid decimal in {column}: {raw}")))
}

fn decode_timestamp(raw: &str, column: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|error| StoreError::Decode(format!("invalid timestamp in {column}: {error}")))
}

fn decode_json<T: DeserializeOwned>(raw: &str, column: &str) -> Result<T, StoreError> {
    serde_json::from_str(raw)
        .map_err(|error| StoreError::Decode(format!("invalid json in {column}: {error}")))
}

fn decode_optional_file(raw: Option<String>, column: &str) -> Result<Option<FileRef>, StoreError> {
    raw.map(|raw| decode_json(&raw, column)).transpose()
}

fn request_status_str(status: RequestStatus) -> &'static str {
    status.as_str()
}

fn decode_request_status(raw: &str) -> Result<RequestStatus, StoreError> {
    match raw {
        "pending" => Ok(RequestStatus::Pending),
        "approved" => Ok(RequestStatus::Approved),
        "rejected" => Ok(RequestStatus::Rejected),
        other => Err(StoreError::Decode(format!("unknown request status: {other}"))),
    }
}

fn approval_status_str(status: ApprovalStatus) -> &'static str {
    match status {
        ApprovalStatus::Pending => "pending",
        ApprovalStatus::Approved => "approved",
        ApprovalStatus::Rejected => "rejected",
    }
}

fn decode_approval_status(raw: &str) -> Result<ApprovalStatus, StoreError> {
    match raw {
        "pending" => Ok(ApprovalStatus::Pending),
        "approved" => Ok(ApprovalStatus::Approved),
        "rejected" => Ok(ApprovalStatus::Rejected),
        other => Err(StoreError::Decode(format!("unknown approval status: {other}"))),
    }
}

fn file_column(kind: FileKind) -> &'static str {
    match kind {
        FileKind::Proforma => "proforma_file",
        FileKind::PurchaseOrder => "purchase_order_file",
        FileKind::Receipt => "receipt_file",
    }
}

fn row_to_request(row: &SqliteRow, items: Vec<RequestItem>) -> Result<PurchaseRequest, StoreError> {
    Ok(PurchaseRequest {
        id: RequestId(row.try_get("id")?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        amount: decode_decimal(&row.try_get::<String, _>("amount")?, "amount")?,
        status: decode_request_status(&row.try_get::<String, _>("status")?)?,
        created_by: ActorId(row.try_get("created_by")?),
        items,
        proforma_file: decode_optional_file(row.try_get("proforma_file")?, "proforma_file")?,
        purchase_order_file: decode_optional_file(
            row.try_get("purchase_order_file")?,
            "purchase_order_file",
        )?,
        receipt_file: decode_optional_file(row.try_get("receipt_file")?, "receipt_file")?,
        created_at: decode_timestamp(&row.try_get::<String, _>("created_at")?, "created_at")?,
        updated_at: decode_timestamp(&row.try_get::<String, _>("updated_at")?, "updated_at")?,
    })
}

fn row_to_item(row: &SqliteRow) -> Result<RequestItem, StoreError> {
    let quantity: i64 = row.try_get("quantity")?;
    Ok(RequestItem {
        name: row.try_get("item_name")?,
        quantity: u32::try_from(quantity)
            .map_err(|_| StoreError::Decode(format!("invalid quantity: {quantity}")))?,
        unit_price: decode_decimal(&row.try_get::<String, _>("unit_price")?, "unit_price")?,
    })
}

fn row_to_approval(row: &SqliteRow) -> Result<Approval, StoreError> {
    let level: i64 = row.try_get("level")?;
    Ok(Approval {
        id: ApprovalId(row.try_get("id")?),
        request_id: RequestId(row.try_get("request_id")?),
        level: ApprovalLevel::from_i64(level)
            .ok_or_else(|| StoreError::Decode(format!("unknown approval level: {level}")))?,
        approver: row.try_get::<Option<String>, _>("approver")?.map(ActorId),
        status: decode_approval_status(&row.try_get::<String, _>("status")?)?,
        comment: row.try_get("comment")?,
        created_at: decode_timestamp(&row.try_get::<String, _>("created_at")?, "created_at")?,
        updated_at: decode_timestamp(&row.try_get::<String, _>("updated_at")?, "updated_at")?,
    })
}

fn row_to_po(row: &SqliteRow) -> Result<PurchaseOrder, StoreError> {
    Ok(PurchaseOrder {
        id: PoId(row.try_get("id")?),
        po_number: row.try_get("po_number")?,
        request_id: RequestId(row.try_get("request_id")?),
        title: row.try_get("title")?,
        lines: decode_json(&row.try_get::<String, _>("lines")?, "lines")?,
        total: decode_decimal(&row.try_get::<String, _>("total")?, "total")?,
        approvals: decode_json(&row.try_get::<String, _>("approvals")?, "approvals")?,
        issued_at: decode_timestamp(&row.try_get::<String, _>("issued_at")?, "issued_at")?,
    })
}

fn row_to_validation(row: &SqliteRow) -> Result<ReceiptValidation, StoreError> {
    Ok(ReceiptValidation {
        request_id: RequestId(row.try_get("request_id")?),
        is_valid: row.try_get::<i64, _>("is_valid")? != 0,
        discrepancy_amount: decode_decimal(
            &row.try_get::<String, _>("discrepancy_amount")?,
            "discrepancy_amount",
        )?,
        details: decode_json(&row.try_get::<String, _>("details")?, "details")?,
        validated_by: ActorId(row.try_get("validated_by")?),
        validated_at: decode_timestamp(&row.try_get::<String, _>("validated_at")?, "validated_at")?,
    })
}

fn encode_json<T: serde::Serialize>(value: &T, column: &str) -> Result<String, StoreError> {
    serde_json::to_string(value)
        .map_err(|error| StoreError::Decode(format!("cannot encode {column}: {error}")))
}

#[async_trait]
impl WorkflowStore for SqliteWorkflowStore {
    async fn find_request(&self, id: &RequestId) -> Result<Option<PurchaseRequest>, StoreError> {
        let row = sqlx::query("SELECT * FROM purchase_requests WHERE id = ?")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = sqlx::query(
            "SELECT item_name, quantity, unit_price
             FROM request_items WHERE request_id = ? ORDER BY position",
        )
        .bind(&id.0)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(row_to_item)
        .collect::<Result<Vec<_>, _>>()?;

        row_to_request(&row, items).map(Some)
    }

    async fn save_request(&self, request: &PurchaseRequest) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        // On conflict only the owner-editable fields are rewritten; status
        // and file slots have their own atomic update paths.
        sqlx::query(
            "INSERT INTO purchase_requests
                 (id, title, description, amount, status, created_by,
                  proforma_file, purchase_order_file, receipt_file,
                  created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 title = excluded.title,
                 description = excluded.description,
                 amount = excluded.amount,
                 updated_at = excluded.updated_at",
        )
        .bind(&request.id.0)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.amount.to_string())
        .bind(request_status_str(request.status))
        .bind(&request.created_by.0)
        .bind(request.proforma_file.as_ref().map(|f| encode_json(f, "proforma_file")).transpose()?)
        .bind(
            request
                .purchase_order_file
                .as_ref()
                .map(|f| encode_json(f, "purchase_order_file"))
                .transpose()?,
        )
        .bind(request.receipt_file.as_ref().map(|f| encode_json(f, "receipt_file")).transpose()?)
        .bind(request.created_at.to_rfc3339())
        .bind(request.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM request_items WHERE request_id = ?")
            .bind(&request.id.0)
            .execute(&mut *tx)
            .await?;

        for (position, item) in request.items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO request_items (request_id, position, item_name, quantity, unit_price)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&request.id.0)
            .bind(position as i64)
            .bind(&item.name)
            .bind(i64::from(item.quantity))
            .bind(item.unit_price.to_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_request(&self, id: &RequestId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM purchase_requests WHERE id = ?")
            .bind(&id.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_file(
        &self,
        id: &RequestId,
        kind: FileKind,
        file: &FileRef,
    ) -> Result<(), StoreError> {
        let column = file_column(kind);
        let sql =
            format!("UPDATE purchase_requests SET {column} = ?, updated_at = ? WHERE id = ?");
        sqlx::query(&sql)
            .bind(encode_json(file, column)?)
            .bind(file.stored_at.to_rfc3339())
            .bind(&id.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn transition_status(
        &self,
        id: &RequestId,
        from: RequestStatus,
        to: RequestStatus,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE purchase_requests SET status = ?, updated_at = ?
             WHERE id = ? AND status = ?",
        )
        .bind(request_status_str(to))
        .bind(Utc::now().to_rfc3339())
        .bind(&id.0)
        .bind(request_status_str(from))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_approval(
        &self,
        id: &RequestId,
        level: ApprovalLevel,
    ) -> Result<Option<Approval>, StoreError> {
        let row = sqlx::query("SELECT * FROM approvals WHERE request_id = ? AND level = ?")
            .bind(&id.0)
            .bind(level.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_approval).transpose()
    }

    async fn upsert_approval(&self, approval: &Approval) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO approvals
                 (id, request_id, level, approver, status, comment, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(request_id, level) DO UPDATE SET
                 approver = excluded.approver,
                 status = excluded.status,
                 comment = excluded.comment,
                 updated_at = excluded.updated_at",
        )
        .bind(&approval.id.0)
        .bind(&approval.request_id.0)
        .bind(approval.level.as_i64())
        .bind(approval.approver.as_ref().map(|actor| actor.0.clone()))
        .bind(approval_status_str(approval.status))
        .bind(&approval.comment)
        .bind(approval.created_at.to_rfc3339())
        .bind(approval.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_approvals(&self, id: &RequestId) -> Result<Vec<Approval>, StoreError> {
        sqlx::query("SELECT * FROM approvals WHERE request_id = ? ORDER BY level")
            .bind(&id.0)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(row_to_approval)
            .collect()
    }

    async fn insert_po_if_absent(&self, po: &PurchaseOrder) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT INTO purchase_orders
                 (id, request_id, po_number, title, lines, total, approvals, issued_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(request_id) DO NOTHING",
        )
        .bind(&po.id.0)
        .bind(&po.request_id.0)
        .bind(&po.po_number)
        .bind(&po.title)
        .bind(encode_json(&po.lines, "lines")?)
        .bind(po.total.to_string())
        .bind(encode_json(&po.approvals, "approvals")?)
        .bind(po.issued_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_po(&self, id: &RequestId) -> Result<Option<PurchaseOrder>, StoreError> {
        let row = sqlx::query("SELECT * FROM purchase_orders WHERE request_id = ?")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_po).transpose()
    }

    async fn upsert_validation(&self, validation: &ReceiptValidation) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO receipt_validations
                 (request_id, is_valid, discrepancy_amount, details, validated_by, validated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(request_id) DO UPDATE SET
                 is_valid = excluded.is_valid,
                 discrepancy_amount = excluded.discrepancy_amount,
                 details = excluded.details,
                 validated_by = excluded.validated_by,
                 validated_at = excluded.validated_at",
        )
        .bind(&validation.request_id.0)
        .bind(i64::from(validation.is_valid))
        .bind(validation.discrepancy_amount.to_string())
        .bind(encode_json(&validation.details, "details")?)
        .bind(&validation.validated_by.0)
        .bind(validation.validated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_validation(
        &self,
        id: &RequestId,
    ) -> Result<Option<ReceiptValidation>, StoreError> {
        let row = sqlx::query("SELECT * FROM receipt_validations WHERE request_id = ?")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_validation).transpose()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use procura_core::domain::actor::ActorId;
    use procura_core::domain::approval::{Approval, ApprovalLevel, ApprovalStatus};
    use procura_core::domain::purchase_order::{PoApprovalRecord, PoId, PoLine, PurchaseOrder};
    use procura_core::domain::receipt::{Discrepancy, ReceiptValidation};
    use procura_core::domain::request::{PurchaseRequest, RequestId, RequestItem, RequestStatus};
    use procura_core::files::{FileKind, FileRef};

    use super::SqliteWorkflowStore;
    use crate::connection::connect_with_settings;
    use crate::migrations::run_pending;
    use crate::store::WorkflowStore;

    async fn store() -> SqliteWorkflowStore {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");
        SqliteWorkflowStore::new(pool)
    }

    fn sample_request(id: &str) -> PurchaseRequest {
        let now = Utc::now();
        let mut request = PurchaseRequest {
            id: RequestId(id.to_string()),
            title: "Office supplies".to_string(),
            description: "Paper restock".to_string(),
            amount: Decimal::ZERO,
            status: RequestStatus::Pending,
            created_by: ActorId("u-staff".to_string()),
            items: vec![RequestItem {
                name: "Paper".to_string(),
                quantity: 10,
                unit_price: Decimal::new(2500, 2),
            }],
            proforma_file: None,
            purchase_order_file: None,
            receipt_file: None,
            created_at: now,
            updated_at: now,
        };
        request.refresh_amount();
        request
    }

    fn sample_po(request_id: &str) -> PurchaseOrder {
        PurchaseOrder {
            id: PoId(format!("po-{request_id}")),
            po_number: format!("PO_{request_id}_20260827"),
            request_id: RequestId(request_id.to_string()),
            title: "Office supplies".to_string(),
            lines: vec![PoLine {
                name: "Paper".to_string(),
                quantity: 10,
                unit_price: Decimal::new(2500, 2),
                line_total: Decimal::new(25000, 2),
            }],
            total: Decimal::new(25000, 2),
            approvals: vec![PoApprovalRecord {
                level: ApprovalLevel::First,
                approver: Some(ActorId("u-approver-1".to_string())),
                decided_at: Utc::now(),
            }],
            issued_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn request_round_trips_with_items_in_order() {
        let store = store().await;
        let mut request = sample_request("req-1");
        request.items.push(RequestItem {
            name: "Toner".to_string(),
            quantity: 2,
            unit_price: Decimal::new(4999, 2),
        });
        request.refresh_amount();

        store.save_request(&request).await.expect("save");
        let loaded = store
            .find_request(&request.id)
            .await
            .expect("find")
            .expect("request should exist");

        assert_eq!(loaded.amount, request.amount);
        assert_eq!(loaded.items.len(), 2);
        assert_eq!(loaded.items[0].name, "Paper");
        assert_eq!(loaded.items[1].name, "Toner");
        assert_eq!(loaded.created_at.timestamp(), request.created_at.timestamp());
    }

    #[tokio::test]
    async fn find_missing_request_returns_none() {
        let store = store().await;
        let found =
            store.find_request(&RequestId("req-missing".to_string())).await.expect("find");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn resave_replaces_item_set_without_touching_status() {
        let store = store().await;
        let mut request = sample_request("req-1");
        store.save_request(&request).await.expect("save");

        assert!(store
            .transition_status(&request.id, RequestStatus::Pending, RequestStatus::Approved)
            .await
            .expect("transition"));

        request.items = vec![RequestItem {
            name: "Stapler".to_string(),
            quantity: 1,
            unit_price: Decimal::new(1200, 2),
        }];
        request.refresh_amount();
        store.save_request(&request).await.expect("resave");

        let loaded = store.find_request(&request.id).await.expect("find").expect("exists");
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].name, "Stapler");
        assert_eq!(loaded.status, RequestStatus::Approved);
    }

    #[tokio::test]
    async fn status_transition_is_compare_and_set() {
        let store = store().await;
        let request = sample_request("req-1");
        store.save_request(&request).await.expect("save");

        let first = store
            .transition_status(&request.id, RequestStatus::Pending, RequestStatus::Approved)
            .await
            .expect("first transition");
        let second = store
            .transition_status(&request.id, RequestStatus::Pending, RequestStatus::Rejected)
            .await
            .expect("second transition");

        assert!(first);
        assert!(!second, "the request already left PENDING");

        let loaded = store.find_request(&request.id).await.expect("find").expect("exists");
        assert_eq!(loaded.status, RequestStatus::Approved);
    }

    #[tokio::test]
    async fn approvals_upsert_on_request_and_level() {
        let store = store().await;
        let request = sample_request("req-1");
        store.save_request(&request).await.expect("save");

        let mut approval =
            Approval::pending(request.id.clone(), ApprovalLevel::First, Utc::now());
        store.upsert_approval(&approval).await.expect("insert");

        approval.status = ApprovalStatus::Approved;
        approval.approver = Some(ActorId("u-approver-1".to_string()));
        approval.comment = "looks fine".to_string();
        store.upsert_approval(&approval).await.expect("update");

        let listed = store.list_approvals(&request.id).await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, ApprovalStatus::Approved);
        assert_eq!(listed[0].comment, "looks fine");
        assert_eq!(listed[0].approver, Some(ActorId("u-approver-1".to_string())));
    }

    #[tokio::test]
    async fn list_approvals_orders_by_level() {
        let store = store().await;
        let request = sample_request("req-1");
        store.save_request(&request).await.expect("save");

        store
            .upsert_approval(&Approval::pending(
                request.id.clone(),
                ApprovalLevel::Second,
                Utc::now(),
            ))
            .await
            .expect("insert second");
        store
            .upsert_approval(&Approval::pending(
                request.id.clone(),
                ApprovalLevel::First,
                Utc::now(),
            ))
            .await
            .expect("insert first");

        let listed = store.list_approvals(&request.id).await.expect("list");
        assert_eq!(listed[0].level, ApprovalLevel::First);
        assert_eq!(listed[1].level, ApprovalLevel::Second);
    }

    #[tokio::test]
    async fn po_insert_is_first_writer_wins() {
        let store = store().await;
        let request = sample_request("req-1");
        store.save_request(&request).await.expect("save");

        let first = sample_po("req-1");
        let mut second = sample_po("req-1");
        second.id = PoId("po-other".to_string());

        assert!(store.insert_po_if_absent(&first).await.expect("first insert"));
        assert!(!store.insert_po_if_absent(&second).await.expect("second insert"));

        let loaded = store.find_po(&request.id).await.expect("find").expect("exists");
        assert_eq!(loaded.id, first.id);
        assert_eq!(loaded.total, Decimal::new(25000, 2));
        assert_eq!(loaded.lines.len(), 1);
    }

    #[tokio::test]
    async fn set_file_fills_one_slot() {
        let store = store().await;
        let request = sample_request("req-1");
        store.save_request(&request).await.expect("save");

        let file = FileRef {
            kind: FileKind::Receipt,
            filename: "receipt.pdf".to_string(),
            location: "receipts/req-1/receipt.pdf".to_string(),
            sha256: "0".repeat(64),
            stored_at: Utc::now(),
        };
        store.set_file(&request.id, FileKind::Receipt, &file).await.expect("set file");

        let loaded = store.find_request(&request.id).await.expect("find").expect("exists");
        assert!(loaded.proforma_file.is_none());
        assert_eq!(loaded.receipt_file.expect("receipt slot").filename, "receipt.pdf");
    }

    #[tokio::test]
    async fn validation_record_is_replaced_on_rerun() {
        let store = store().await;
        let request = sample_request("req-1");
        store.save_request(&request).await.expect("save");

        let mut validation = ReceiptValidation {
            request_id: request.id.clone(),
            is_valid: false,
            discrepancy_amount: Decimal::new(2000, 2),
            details: vec![Discrepancy::extraction_failed("unreadable scan")],
            validated_by: ActorId("u-finance".to_string()),
            validated_at: Utc::now(),
        };
        store.upsert_validation(&validation).await.expect("first validation");

        validation.is_valid = true;
        validation.discrepancy_amount = Decimal::ZERO;
        validation.details.clear();
        store.upsert_validation(&validation).await.expect("second validation");

        let loaded =
            store.find_validation(&request.id).await.expect("find").expect("exists");
        assert!(loaded.is_valid);
        assert_eq!(loaded.discrepancy_amount, Decimal::ZERO);
        assert!(loaded.details.is_empty());
    }

    #[tokio::test]
    async fn delete_request_cascades_to_children() {
        let store = store().await;
        let request = sample_request("req-1");
        store.save_request(&request).await.expect("save");
        store
            .upsert_approval(&Approval::pending(
                request.id.clone(),
                ApprovalLevel::First,
                Utc::now(),
            ))
            .await
            .expect("insert approval");
        store.insert_po_if_absent(&sample_po("req-1")).await.expect("insert po");

        store.delete_request(&request.id).await.expect("delete");

        assert!(store.find_request(&request.id).await.expect("find request").is_none());
        assert!(store.list_approvals(&request.id).await.expect("list").is_empty());
        assert!(store.find_po(&request.id).await.expect("find po").is_none());
    }
}
