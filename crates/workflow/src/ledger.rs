use chrono::{DateTime, Utc};

use procura_core::domain::actor::ActorId;
use procura_core::domain::approval::{
    Approval, ApprovalDecision, ApprovalLevel, ApprovalStatus,
};
use procura_core::domain::request::RequestId;
use procura_db::{StoreError, WorkflowStore};

/// Result of recording a decision. `changed` is false when the record
/// already held the same decision; the comment and timestamp are still
/// amended, but the caller skips every downstream side effect.
#[derive(Clone, Debug)]
pub struct LedgerUpdate {
    pub approval: Approval,
    pub previous_status: ApprovalStatus,
    pub changed: bool,
}

/// The append-or-amend view over the per-level approval records. Knows
/// nothing about the two-level policy or the request status; that fold
/// lives with the caller.
pub struct ApprovalLedger<'a> {
    store: &'a dyn WorkflowStore,
}

impl<'a> ApprovalLedger<'a> {
    pub fn new(store: &'a dyn WorkflowStore) -> Self {
        Self { store }
    }

    /// Creates the pending record for every level. Called once at request
    /// creation, so every later decision is an amendment, never an insert.
    pub async fn seed(
        &self,
        request_id: &RequestId,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        for level in ApprovalLevel::ALL {
            self.store.upsert_approval(&Approval::pending(request_id.clone(), level, at)).await?;
        }
        Ok(())
    }

    pub async fn record(
        &self,
        request_id: &RequestId,
        level: ApprovalLevel,
        approver: &ActorId,
        decision: ApprovalDecision,
        comment: &str,
        at: DateTime<Utc>,
    ) -> Result<LedgerUpdate, StoreError> {
        let mut approval = match self.store.find_approval(request_id, level).await? {
            Some(approval) => approval,
            // Requests created before the ledger was seeded eagerly.
            None => Approval::pending(request_id.clone(), level, at),
        };

        let previous_status = approval.status;
        let next_status = ApprovalStatus::from_decision(decision);
        let changed = previous_status != next_status;

        // A repeat of the decision already on record still amends the
        // comment and timestamp; `changed: false` tells the caller to skip
        // the fold and its side effects.
        approval.approver = Some(approver.clone());
        approval.status = next_status;
        approval.comment = comment.to_string();
        approval.updated_at = at;
        self.store.upsert_approval(&approval).await?;

        Ok(LedgerUpdate { approval, previous_status, changed })
    }

    pub async fn list_for(&self, request_id: &RequestId) -> Result<Vec<Approval>, StoreError> {
        self.store.list_approvals(request_id).await
    }
}
