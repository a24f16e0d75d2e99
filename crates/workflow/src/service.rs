use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use procura_core::audit::{AuditCategory, AuditEvent, AuditOutcome, AuditSink};
use procura_core::config::ReconcileConfig;
use procura_core::domain::actor::Actor;
use procura_core::domain::approval::{derive_status, Approval, ApprovalDecision, ApprovalStatus};
use procura_core::domain::document::DocumentExtractor;
use procura_core::domain::purchase_order::PurchaseOrder;
use procura_core::domain::receipt::ReceiptValidation;
use procura_core::domain::request::{
    PurchaseRequest, ReceiptStage, RequestId, RequestItem, RequestStatus,
};
use procura_core::errors::{PermissionError, StateError, ValidationError};
use procura_core::files::{FileKind, FileRef, FileStore};
use procura_core::po::{build_purchase_order, render_po_json};
use procura_core::reconcile::reconcile;
use procura_db::WorkflowStore;

use crate::errors::WorkflowError;
use crate::ledger::ApprovalLedger;

/// Caller-supplied fields for creating or editing a request.
#[derive(Clone, Debug)]
pub struct RequestDraft {
    pub title: String,
    pub description: String,
    pub items: Vec<RequestItem>,
}

/// Full read model for one request.
#[derive(Clone, Debug)]
pub struct RequestDetail {
    pub request: PurchaseRequest,
    pub approvals: Vec<Approval>,
    pub purchase_order: Option<PurchaseOrder>,
    pub validation: Option<ReceiptValidation>,
    pub receipt_stage: Option<ReceiptStage>,
}

/// What an approver sees after recording a decision. `changed` is false
/// when the decision was already on record, making repeats safe.
#[derive(Clone, Debug)]
pub struct ActionOutcome {
    pub request: PurchaseRequest,
    pub approvals: Vec<Approval>,
    pub purchase_order: Option<PurchaseOrder>,
    pub changed: bool,
}

/// The workflow core. Owns no policy about identity or transport; callers
/// hand in a resolved `Actor` per call and the service enforces role,
/// ownership and state rules from there.
///
/// Status is always the fold of the approval ledger. The service never sets
/// a status directly; it derives the target and lets the store's
/// compare-and-set decide which concurrent caller performs the transition.
pub struct WorkflowService<S, X, F, A> {
    store: S,
    extractor: X,
    files: F,
    audit: A,
    reconcile_config: ReconcileConfig,
}

impl<S, X, F, A> WorkflowService<S, X, F, A>
where
    S: WorkflowStore,
    X: DocumentExtractor,
    F: FileStore,
    A: AuditSink,
{
    pub fn new(
        store: S,
        extractor: X,
        files: F,
        audit: A,
        reconcile_config: ReconcileConfig,
    ) -> Self {
        Self { store, extractor, files, audit, reconcile_config }
    }

    pub async fn create_request(
        &self,
        actor: &Actor,
        draft: RequestDraft,
    ) -> Result<PurchaseRequest, WorkflowError> {
        if !actor.role.can_create_requests() {
            return Err(PermissionError::role("create purchase requests", actor.role).into());
        }
        validate_draft(&draft)?;

        let now = Utc::now();
        let mut request = PurchaseRequest {
            id: RequestId::generate(),
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            amount: Decimal::ZERO,
            status: RequestStatus::Pending,
            created_by: actor.id.clone(),
            items: draft.items,
            proforma_file: None,
            purchase_order_file: None,
            receipt_file: None,
            created_at: now,
            updated_at: now,
        };
        request.refresh_amount();

        self.store.save_request(&request).await?;
        ApprovalLedger::new(&self.store).seed(&request.id, now).await?;

        self.audit.emit(
            AuditEvent::new(
                Some(request.id.clone()),
                Uuid::new_v4().to_string(),
                "workflow.request_created",
                AuditCategory::Workflow,
                actor.id.0.clone(),
                AuditOutcome::Success,
            )
            .with_metadata("amount", request.amount.to_string()),
        );

        Ok(request)
    }

    pub async fn update_request(
        &self,
        actor: &Actor,
        id: &RequestId,
        draft: RequestDraft,
    ) -> Result<PurchaseRequest, WorkflowError> {
        let mut request = self.load_request(id).await?;
        if !request.is_owned_by(&actor.id) {
            return Err(PermissionError::not_owner("edit this request").into());
        }
        if !request.can_be_edited() {
            return Err(StateError::NotPending { id: id.clone(), status: request.status }.into());
        }
        validate_draft(&draft)?;

        request.title = draft.title.trim().to_string();
        request.description = draft.description.trim().to_string();
        request.items = draft.items;
        request.refresh_amount();
        request.updated_at = Utc::now();
        self.store.save_request(&request).await?;

        self.audit.emit(
            AuditEvent::new(
                Some(id.clone()),
                Uuid::new_v4().to_string(),
                "workflow.request_updated",
                AuditCategory::Workflow,
                actor.id.0.clone(),
                AuditOutcome::Success,
            )
            .with_metadata("amount", request.amount.to_string()),
        );

        Ok(request)
    }

    pub async fn delete_request(
        &self,
        actor: &Actor,
        id: &RequestId,
    ) -> Result<(), WorkflowError> {
        let request = self.load_request(id).await?;
        if !request.is_owned_by(&actor.id) {
            return Err(PermissionError::not_owner("delete this request").into());
        }
        if !request.can_be_edited() {
            return Err(StateError::NotPending { id: id.clone(), status: request.status }.into());
        }

        self.store.delete_request(id).await?;

        self.audit.emit(AuditEvent::new(
            Some(id.clone()),
            Uuid::new_v4().to_string(),
            "workflow.request_deleted",
            AuditCategory::Workflow,
            actor.id.0.clone(),
            AuditOutcome::Success,
        ));

        Ok(())
    }

    pub async fn attach_proforma(
        &self,
        actor: &Actor,
        id: &RequestId,
        filename: &str,
        bytes: &[u8],
    ) -> Result<FileRef, WorkflowError> {
        let request = self.load_request(id).await?;
        if !request.is_owned_by(&actor.id) {
            return Err(PermissionError::not_owner("attach a proforma").into());
        }
        if !request.can_be_edited() {
            return Err(StateError::NotPending { id: id.clone(), status: request.status }.into());
        }

        let file = self.files.put(FileKind::Proforma, id, filename, bytes).await?;
        self.store.set_file(id, FileKind::Proforma, &file).await?;

        self.audit.emit(
            AuditEvent::new(
                Some(id.clone()),
                Uuid::new_v4().to_string(),
                "workflow.proforma_attached",
                AuditCategory::Documents,
                actor.id.0.clone(),
                AuditOutcome::Success,
            )
            .with_metadata("filename", filename),
        );

        Ok(file)
    }

    /// Records an approve or reject decision at the actor's level, folds the
    /// ledger, and performs the status transition when the fold settles.
    /// Repeats of a decision already on record amend the stored comment and
    /// timestamp while the request is still pending, return `changed: false`,
    /// and never re-trigger the fold, the transition, or PO issuance.
    pub async fn record_action(
        &self,
        actor: &Actor,
        id: &RequestId,
        decision: ApprovalDecision,
        comment: &str,
    ) -> Result<ActionOutcome, WorkflowError> {
        let level = actor
            .role
            .approval_level()
            .ok_or_else(|| PermissionError::role("record approval decisions", actor.role))?;
        if decision == ApprovalDecision::Reject && comment.trim().is_empty() {
            return Err(
                ValidationError::single("comment", "a comment is required when rejecting").into()
            );
        }

        let request = self.load_request(id).await?;
        if request.status != RequestStatus::Pending {
            let existing = self.store.find_approval(id, level).await?;
            let same_decision = existing
                .map(|approval| approval.status == ApprovalStatus::from_decision(decision))
                .unwrap_or(false);
            if same_decision {
                return self.action_view(id, false).await;
            }
            return Err(StateError::NotPending { id: id.clone(), status: request.status }.into());
        }

        let now = Utc::now();
        let ledger = ApprovalLedger::new(&self.store);
        let update = ledger.record(id, level, &actor.id, decision, comment.trim(), now).await?;
        if !update.changed {
            return self.action_view(id, false).await;
        }

        self.audit.emit(
            AuditEvent::new(
                Some(id.clone()),
                Uuid::new_v4().to_string(),
                "workflow.action_recorded",
                AuditCategory::Ledger,
                actor.id.0.clone(),
                AuditOutcome::Success,
            )
            .with_metadata("level", level.to_string())
            .with_metadata("decision", format!("{decision:?}").to_lowercase()),
        );

        let approvals = ledger.list_for(id).await?;
        let folded = derive_status(&approvals);
        if folded == RequestStatus::Pending {
            return self.action_view(id, true).await;
        }

        // Exactly one concurrent caller wins this; losers fall through and
        // read the winner's outcome.
        let won = self.store.transition_status(id, RequestStatus::Pending, folded).await?;
        if won {
            match folded {
                RequestStatus::Approved => self.issue_po(actor, id, &approvals).await?,
                RequestStatus::Rejected => {
                    self.audit.emit(
                        AuditEvent::new(
                            Some(id.clone()),
                            Uuid::new_v4().to_string(),
                            "workflow.request_rejected",
                            AuditCategory::Workflow,
                            actor.id.0.clone(),
                            AuditOutcome::Rejected,
                        )
                        .with_metadata("comment", comment.trim()),
                    );
                }
                RequestStatus::Pending => {}
            }
        }

        self.action_view(id, true).await
    }

    pub async fn submit_receipt(
        &self,
        actor: &Actor,
        id: &RequestId,
        filename: &str,
        bytes: &[u8],
    ) -> Result<FileRef, WorkflowError> {
        let request = self.load_request(id).await?;
        if !request.is_owned_by(&actor.id) {
            return Err(PermissionError::not_owner("submit a receipt").into());
        }
        if request.status != RequestStatus::Approved {
            return Err(StateError::NotApproved { id: id.clone(), status: request.status }.into());
        }

        let file = self.files.put(FileKind::Receipt, id, filename, bytes).await?;
        self.store.set_file(id, FileKind::Receipt, &file).await?;

        self.audit.emit(
            AuditEvent::new(
                Some(id.clone()),
                Uuid::new_v4().to_string(),
                "workflow.receipt_submitted",
                AuditCategory::Documents,
                actor.id.0.clone(),
                AuditOutcome::Success,
            )
            .with_metadata("filename", filename),
        );

        Ok(file)
    }

    /// Extracts the submitted receipt, reconciles it against the PO, and
    /// replaces the validation record. Re-runs are allowed; the most recent
    /// attempt wins.
    pub async fn validate_receipt(
        &self,
        actor: &Actor,
        id: &RequestId,
    ) -> Result<ReceiptValidation, WorkflowError> {
        if !actor.role.can_validate_receipts() {
            return Err(PermissionError::role("validate receipts", actor.role).into());
        }

        let request = self.load_request(id).await?;
        if request.status != RequestStatus::Approved {
            return Err(StateError::NotApproved { id: id.clone(), status: request.status }.into());
        }
        let receipt = request
            .receipt_file
            .as_ref()
            .ok_or_else(|| StateError::ReceiptMissing { id: id.clone() })?;
        let po = self
            .store
            .find_po(id)
            .await?
            .ok_or_else(|| StateError::PoMissing { id: id.clone() })?;

        let document = self.extractor.extract(receipt).await?;
        let outcome = reconcile(&document, &po, &self.reconcile_config);

        let validation = ReceiptValidation {
            request_id: id.clone(),
            is_valid: outcome.is_valid,
            discrepancy_amount: outcome.discrepancy_amount,
            details: outcome.details,
            validated_by: actor.id.clone(),
            validated_at: Utc::now(),
        };
        self.store.upsert_validation(&validation).await?;

        self.audit.emit(
            AuditEvent::new(
                Some(id.clone()),
                Uuid::new_v4().to_string(),
                "workflow.receipt_validated",
                AuditCategory::Documents,
                actor.id.0.clone(),
                if validation.is_valid { AuditOutcome::Success } else { AuditOutcome::Rejected },
            )
            .with_metadata("discrepancy_amount", validation.discrepancy_amount.to_string()),
        );

        Ok(validation)
    }

    pub async fn get_request(
        &self,
        actor: &Actor,
        id: &RequestId,
    ) -> Result<RequestDetail, WorkflowError> {
        let request = self.load_request(id).await?;
        let may_read = request.is_owned_by(&actor.id)
            || actor.role.can_approve()
            || actor.role.can_validate_receipts();
        if !may_read {
            return Err(PermissionError::not_owner("view this request").into());
        }

        let approvals = self.store.list_approvals(id).await?;
        let purchase_order = self.store.find_po(id).await?;
        let validation = self.store.find_validation(id).await?;
        let receipt_stage = request.receipt_stage(validation.is_some());

        Ok(RequestDetail { request, approvals, purchase_order, validation, receipt_stage })
    }

    async fn load_request(&self, id: &RequestId) -> Result<PurchaseRequest, WorkflowError> {
        self.store
            .find_request(id)
            .await?
            .ok_or_else(|| StateError::RequestMissing { id: id.clone() }.into())
    }

    async fn action_view(
        &self,
        id: &RequestId,
        changed: bool,
    ) -> Result<ActionOutcome, WorkflowError> {
        let request = self.load_request(id).await?;
        let approvals = self.store.list_approvals(id).await?;
        let purchase_order = self.store.find_po(id).await?;
        Ok(ActionOutcome { request, approvals, purchase_order, changed })
    }

    async fn issue_po(
        &self,
        actor: &Actor,
        id: &RequestId,
        approvals: &[Approval],
    ) -> Result<(), WorkflowError> {
        let request = self.load_request(id).await?;
        let po = build_purchase_order(&request, approvals, Utc::now())?;

        if self.store.insert_po_if_absent(&po).await? {
            let artifact = render_po_json(&po);
            let filename = format!("{}.json", po.po_number);
            let file = self.files.put(FileKind::PurchaseOrder, id, &filename, &artifact).await?;
            self.store.set_file(id, FileKind::PurchaseOrder, &file).await?;

            self.audit.emit(
                AuditEvent::new(
                    Some(id.clone()),
                    Uuid::new_v4().to_string(),
                    "workflow.po_issued",
                    AuditCategory::Workflow,
                    actor.id.0.clone(),
                    AuditOutcome::Success,
                )
                .with_metadata("po_number", po.po_number.clone())
                .with_metadata("total", po.total.to_string()),
            );
        }

        Ok(())
    }
}

fn validate_draft(draft: &RequestDraft) -> Result<(), ValidationError> {
    let mut error = ValidationError::new();
    if draft.title.trim().is_empty() {
        error.push("title", "must not be empty");
    }
    if draft.items.is_empty() {
        error.push("items", "at least one item is required");
    }
    for (index, item) in draft.items.iter().enumerate() {
        if item.name.trim().is_empty() {
            error.push(format!("items[{index}].name"), "must not be empty");
        }
        if item.quantity == 0 {
            error.push(format!("items[{index}].quantity"), "must be at least 1");
        }
        if item.unit_price < Decimal::ZERO {
            error.push(format!("items[{index}].unit_price"), "must not be negative");
        }
    }
    error.into_result()
}
