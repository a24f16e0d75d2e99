use serde::{Deserialize, Serialize};

use crate::domain::approval::ApprovalLevel;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub String);

/// Roles resolved by the identity collaborator. The core trusts the
/// resolved role; it never re-validates credentials.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Staff,
    ApproverLevel1,
    ApproverLevel2,
    Finance,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Staff => "staff",
            Self::ApproverLevel1 => "approver_level_1",
            Self::ApproverLevel2 => "approver_level_2",
            Self::Finance => "finance",
        }
    }

    pub fn can_approve(&self) -> bool {
        self.approval_level().is_some()
    }

    /// The single approval level a role is authorized for, if any.
    pub fn approval_level(&self) -> Option<ApprovalLevel> {
        match self {
            Self::ApproverLevel1 => Some(ApprovalLevel::First),
            Self::ApproverLevel2 => Some(ApprovalLevel::Second),
            Self::Staff | Self::Finance => None,
        }
    }

    pub fn can_create_requests(&self) -> bool {
        matches!(self, Self::Staff)
    }

    pub fn can_validate_receipts(&self) -> bool {
        matches!(self, Self::Finance)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "staff" => Ok(Self::Staff),
            "approver_level_1" => Ok(Self::ApproverLevel1),
            "approver_level_2" => Ok(Self::ApproverLevel2),
            "finance" => Ok(Self::Finance),
            other => Err(format!(
                "unknown role `{other}` (expected staff|approver_level_1|approver_level_2|finance)"
            )),
        }
    }
}

/// A caller identity resolved by the identity collaborator, passed per call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self { id: ActorId(id.into()), role }
    }
}
