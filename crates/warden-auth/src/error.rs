//! Access-control error type.
//!
//! [`AccessControlError`] unifies every way a subject can be refused:
//!
//! ```text
//! Effective Permission = Role(WHO) ∩ Delegate(WHAT on WHICH resource)
//!                          │                 │
//!                   RoleRejected     ConstraintDenied
//!                          │
//!          Unauthenticated / PermissionDenied (typed verdicts)
//! ```
//!
//! Each variant carries a [`DenyCode`]; a 401 is recoverable by
//! authenticating, a 403 is not.

use crate::DenyCode;
use thiserror::Error;
use warden_types::{ConstraintId, ErrorCode, ResourceId, SubjectId};

/// Unified error for access denied across the access-control model.
///
/// # Example
///
/// ```
/// use warden_auth::{AccessControlError, DenyCode};
/// use warden_types::{ErrorCode, SubjectId};
///
/// let err = AccessControlError::unauthenticated(SubjectId::random(), "open /accounts");
/// assert_eq!(err.deny_code(), DenyCode::Unauthenticated);
/// assert_eq!(err.code(), "ACCESS_UNAUTHENTICATED");
/// assert!(err.is_recoverable());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessControlError {
    /// The subject must authenticate before the action is allowed.
    #[error("unauthenticated: {subject} must authenticate to {action}")]
    Unauthenticated {
        /// Who was refused.
        subject: SubjectId,
        /// What was attempted.
        action: String,
    },

    /// The subject is authenticated but not permitted.
    #[error("permission denied: {subject} may not {action}")]
    PermissionDenied {
        /// Who was refused.
        subject: SubjectId,
        /// What was attempted.
        action: String,
    },

    /// A role refused to be assigned to an agent.
    #[error("role '{role}' cannot be assigned to {agent}")]
    RoleRejected {
        /// Name of the role.
        role: String,
        /// The agent it was offered to.
        agent: SubjectId,
    },

    /// A delegated constraint does not list the subject.
    #[error("constraint {constraint} on {resource} denies {subject}")]
    ConstraintDenied {
        /// Who was refused.
        subject: SubjectId,
        /// The constraint category.
        constraint: ConstraintId,
        /// The guarded resource.
        resource: ResourceId,
        /// 401 or 403.
        code: DenyCode,
    },
}

impl AccessControlError {
    /// Creates an [`AccessControlError::Unauthenticated`].
    #[must_use]
    pub fn unauthenticated(subject: SubjectId, action: impl Into<String>) -> Self {
        Self::Unauthenticated {
            subject,
            action: action.into(),
        }
    }

    /// Creates an [`AccessControlError::PermissionDenied`].
    #[must_use]
    pub fn permission_denied(subject: SubjectId, action: impl Into<String>) -> Self {
        Self::PermissionDenied {
            subject,
            action: action.into(),
        }
    }

    /// Returns the deny code carried by this error.
    #[must_use]
    pub fn deny_code(&self) -> DenyCode {
        match self {
            Self::Unauthenticated { .. } => DenyCode::Unauthenticated,
            Self::PermissionDenied { .. } | Self::RoleRejected { .. } => DenyCode::Forbidden,
            Self::ConstraintDenied { code, .. } => *code,
        }
    }

    /// Returns the subject that was refused.
    #[must_use]
    pub fn subject(&self) -> &SubjectId {
        match self {
            Self::Unauthenticated { subject, .. }
            | Self::PermissionDenied { subject, .. }
            | Self::ConstraintDenied { subject, .. } => subject,
            Self::RoleRejected { agent, .. } => agent,
        }
    }
}

impl ErrorCode for AccessControlError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated { .. } => "ACCESS_UNAUTHENTICATED",
            Self::PermissionDenied { .. } => "ACCESS_PERMISSION_DENIED",
            Self::RoleRejected { .. } => "ACCESS_ROLE_REJECTED",
            Self::ConstraintDenied { .. } => "ACCESS_CONSTRAINT_DENIED",
        }
    }

    fn is_recoverable(&self) -> bool {
        self.deny_code() == DenyCode::Unauthenticated
    }
}
