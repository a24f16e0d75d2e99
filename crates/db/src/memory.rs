use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use procura_core::domain::approval::{Approval, ApprovalLevel};
use procura_core::domain::purchase_order::PurchaseOrder;
use procura_core::domain::receipt::ReceiptValidation;
use procura_core::domain::request::{PurchaseRequest, RequestId, RequestStatus};
use procura_core::files::{FileKind, FileRef};

use crate::store::{StoreError, WorkflowStore};

#[derive(Default)]
struct State {
    requests: HashMap<RequestId, PurchaseRequest>,
    approvals: HashMap<(RequestId, i64), Approval>,
    pos: HashMap<RequestId, PurchaseOrder>,
    validations: HashMap<RequestId, ReceiptValidation>,
}

/// Store used by tests and demos. Every mutation takes the single write
/// lock, so the compare-and-set primitives are trivially linearizable.
#[derive(Clone, Default)]
pub struct InMemoryWorkflowStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowStore for InMemoryWorkflowStore {
    async fn find_request(&self, id: &RequestId) -> Result<Option<PurchaseRequest>, StoreError> {
        Ok(self.state.read().await.requests.get(id).cloned())
    }

    async fn save_request(&self, request: &PurchaseRequest) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        match state.requests.get_mut(&request.id) {
            Some(existing) => {
                // Owner edits only; status and file slots keep their own paths.
                existing.title = request.title.clone();
                existing.description = request.description.clone();
                existing.amount = request.amount;
                existing.items = request.items.clone();
                existing.updated_at = request.updated_at;
            }
            None => {
                state.requests.insert(request.id.clone(), request.clone());
            }
        }
        Ok(())
    }

    async fn delete_request(&self, id: &RequestId) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.requests.remove(id);
        state.approvals.retain(|(request_id, _), _| request_id != id);
        state.pos.remove(id);
        state.validations.remove(id);
        Ok(())
    }

    async fn set_file(
        &self,
        id: &RequestId,
        kind: FileKind,
        file: &FileRef,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if let Some(request) = state.requests.get_mut(id) {
            let slot = match kind {
                FileKind::Proforma => &mut request.proforma_file,
                FileKind::PurchaseOrder => &mut request.purchase_order_file,
                FileKind::Receipt => &mut request.receipt_file,
            };
            *slot = Some(file.clone());
            request.updated_at = file.stored_at;
        }
        Ok(())
    }

    async fn transition_status(
        &self,
        id: &RequestId,
        from: RequestStatus,
        to: RequestStatus,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        match state.requests.get_mut(id) {
            Some(request) if request.status == from => {
                request.status = to;
                request.updated_at = chrono::Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_approval(
        &self,
        id: &RequestId,
        level: ApprovalLevel,
    ) -> Result<Option<Approval>, StoreError> {
        Ok(self.state.read().await.approvals.get(&(id.clone(), level.as_i64())).cloned())
    }

    async fn upsert_approval(&self, approval: &Approval) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state
            .approvals
            .insert((approval.request_id.clone(), approval.level.as_i64()), approval.clone());
        Ok(())
    }

    async fn list_approvals(&self, id: &RequestId) -> Result<Vec<Approval>, StoreError> {
        let state = self.state.read().await;
        let mut approvals: Vec<Approval> = state
            .approvals
            .iter()
            .filter(|((request_id, _), _)| request_id == id)
            .map(|(_, approval)| approval.clone())
            .collect();
        approvals.sort_by_key(|approval| approval.level);
        Ok(approvals)
    }

    async fn insert_po_if_absent(&self, po: &PurchaseOrder) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if state.pos.contains_key(&po.request_id) {
            return Ok(false);
        }
        state.pos.insert(po.request_id.clone(), po.clone());
        Ok(true)
    }

    async fn find_po(&self, id: &RequestId) -> Result<Option<PurchaseOrder>, StoreError> {
        Ok(self.state.read().await.pos.get(id).cloned())
    }

    async fn upsert_validation(&self, validation: &ReceiptValidation) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.validations.insert(validation.request_id.clone(), validation.clone());
        Ok(())
    }

    async fn find_validation(
        &self,
        id: &RequestId,
    ) -> Result<Option<ReceiptValidation>, StoreError> {
        Ok(self.state.read().await.validations.get(id).cloned())
    }
}
