use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::actor::ActorId;
use crate::domain::request::{RequestId, RequestStatus};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApprovalId(pub String);

/// The two sequential review levels a request must clear.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ApprovalLevel {
    First,
    Second,
}

impl ApprovalLevel {
    pub const ALL: [ApprovalLevel; 2] = [ApprovalLevel::First, ApprovalLevel::Second];

    pub fn as_i64(&self) -> i64 {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::First),
            2 => Some(Self::Second),
            _ => None,
        }
    }
}

impl std::fmt::Display for ApprovalLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    Approve,
    Reject,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn from_decision(decision: ApprovalDecision) -> Self {
        match decision {
            ApprovalDecision::Approve => Self::Approved,
            ApprovalDecision::Reject => Self::Rejected,
        }
    }
}

/// One per (request, level). Created PENDING with no approver at request
/// creation; the approver reference is set on first action at that level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub id: ApprovalId,
    pub request_id: RequestId,
    pub level: ApprovalLevel,
    pub approver: Option<ActorId>,
    pub status: ApprovalStatus,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Approval {
    pub fn pending(request_id: RequestId, level: ApprovalLevel, at: DateTime<Utc>) -> Self {
        Self {
            id: ApprovalId(uuid::Uuid::new_v4().to_string()),
            request_id,
            level,
            approver: None,
            status: ApprovalStatus::Pending,
            comment: String::new(),
            created_at: at,
            updated_at: at,
        }
    }

    pub fn has_acted(&self) -> bool {
        self.status != ApprovalStatus::Pending
    }
}

/// Folds the approval records into the request status. The request status
/// is a pure function of this fold: any rejection is terminal, approval
/// requires every required level to have approved.
pub fn derive_status(approvals: &[Approval]) -> RequestStatus {
    derive_status_for_levels(approvals, &ApprovalLevel::ALL)
}

/// Level-agnostic fold. The ledger itself has no knowledge of the two-level
/// policy; callers state which levels must approve.
pub fn derive_status_for_levels(
    approvals: &[Approval],
    required_levels: &[ApprovalLevel],
) -> RequestStatus {
    if approvals.iter().any(|approval| approval.status == ApprovalStatus::Rejected) {
        return RequestStatus::Rejected;
    }

    let all_approved = required_levels.iter().all(|level| {
        approvals
            .iter()
            .any(|approval| approval.level == *level && approval.status == ApprovalStatus::Approved)
    });

    if all_approved {
        RequestStatus::Approved
    } else {
        RequestStatus::Pending
    }
}
