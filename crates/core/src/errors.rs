use thiserror::Error;

use crate::domain::actor::Role;
use crate::domain::request::{RequestId, RequestStatus};

/// Malformed input, reported with field-level detail. Never retried.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("validation failed: {}", self.describe())]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new() -> Self {
        Self { violations: Vec::new() }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut error = Self::new();
        error.push(field, message);
        error
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(FieldViolation { field: field.into(), message: message.into() });
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Ok(()) when no violations were collected, otherwise self as Err.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    fn describe(&self) -> String {
        self.violations
            .iter()
            .map(|violation| format!("{}: {}", violation.field, violation.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl Default for ValidationError {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrong role, level, or ownership for the attempted action. Never retried.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PermissionError {
    #[error("role `{role}` is not permitted to {action}")]
    RoleNotPermitted { action: String, role: Role },
    #[error("only the request owner may {action}")]
    NotOwner { action: String },
}

impl PermissionError {
    pub fn role(action: impl Into<String>, role: Role) -> Self {
        Self::RoleNotPermitted { action: action.into(), role }
    }

    pub fn not_owner(action: impl Into<String>) -> Self {
        Self::NotOwner { action: action.into() }
    }
}

/// Illegal transition or precondition: surfaced as a conflict. Callers may
/// re-fetch and retry with updated state; the core never retries internally.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("invalid status transition from {from:?} to {to:?}")]
    InvalidTransition { from: RequestStatus, to: RequestStatus },
    #[error("request {id:?} is {status:?}; only pending requests accept this action")]
    NotPending { id: RequestId, status: RequestStatus },
    #[error("request {id:?} is {status:?}; this action requires an approved request")]
    NotApproved { id: RequestId, status: RequestStatus },
    #[error("request {id:?} has no submitted receipt to validate")]
    ReceiptMissing { id: RequestId },
    #[error("no purchase order exists for request {id:?}")]
    PoMissing { id: RequestId },
    #[error("request {id:?} does not exist")]
    RequestMissing { id: RequestId },
}
