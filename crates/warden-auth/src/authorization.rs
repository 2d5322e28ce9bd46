//! Typed authorization verdicts.
//!
//! Every access check in Warden produces an [`Authorization`] instead of a
//! bare `bool`, so callers can tell a subject who should authenticate
//! (401) from one who never will be allowed (403).

use crate::{AccessControlError, Agent};
use serde::{Deserialize, Serialize};
use warden_types::SubjectId;

/// Why access was denied.
///
/// | Code | Status | Meaning |
/// |------|--------|---------|
/// | `Unauthenticated` | 401 | Retry after authenticating |
/// | `Forbidden` | 403 | Not allowed for this subject |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyCode {
    /// The subject is not authenticated.
    Unauthenticated,
    /// The subject is authenticated but not permitted.
    Forbidden,
}

impl DenyCode {
    /// Returns the HTTP-style status code.
    #[must_use]
    pub fn status(self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::Forbidden => 403,
        }
    }

    /// Maps a status code back to a deny code.
    ///
    /// Returns `None` for anything other than 401 and 403.
    #[must_use]
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            401 => Some(Self::Unauthenticated),
            403 => Some(Self::Forbidden),
            _ => None,
        }
    }

    /// The deny code appropriate for `agent`: guests are asked to
    /// authenticate, everyone else is forbidden.
    #[must_use]
    pub fn for_agent(agent: &Agent) -> Self {
        if agent.is_authenticated() {
            Self::Forbidden
        } else {
            Self::Unauthenticated
        }
    }
}

impl std::fmt::Display for DenyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "401 unauthenticated"),
            Self::Forbidden => write!(f, "403 forbidden"),
        }
    }
}

/// Result of an access check.
///
/// # Example
///
/// ```
/// use warden_auth::{Authorization, DenyCode};
///
/// let ok = Authorization::Authorized;
/// assert!(ok.is_authorized());
///
/// let denied = Authorization::denied(DenyCode::Unauthenticated);
/// assert_eq!(denied.deny_code(), Some(DenyCode::Unauthenticated));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Authorization {
    /// Access is allowed.
    Authorized,
    /// Access is denied.
    Denied {
        /// Why.
        code: DenyCode,
    },
}

impl Authorization {
    /// Creates a denial.
    #[must_use]
    pub fn denied(code: DenyCode) -> Self {
        Self::Denied { code }
    }

    /// Authorized when `allowed`, otherwise denied with the code
    /// appropriate for `agent`.
    #[must_use]
    pub fn for_agent(allowed: bool, agent: &Agent) -> Self {
        if allowed {
            Self::Authorized
        } else {
            Self::denied(DenyCode::for_agent(agent))
        }
    }

    /// Returns `true` if access is allowed.
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized)
    }

    /// Returns the deny code, if denied.
    #[must_use]
    pub fn deny_code(&self) -> Option<DenyCode> {
        match self {
            Self::Authorized => None,
            Self::Denied { code } => Some(*code),
        }
    }

    /// Converts the verdict into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessControlError::Unauthenticated`] or
    /// [`AccessControlError::PermissionDenied`] when denied.
    pub fn require(self, subject: &SubjectId, action: &str) -> Result<(), AccessControlError> {
        match self {
            Self::Authorized => Ok(()),
            Self::Denied {
                code: DenyCode::Unauthenticated,
            } => Err(AccessControlError::unauthenticated(subject.clone(), action)),
            Self::Denied {
                code: DenyCode::Forbidden,
            } => Err(AccessControlError::permission_denied(subject.clone(), action)),
        }
    }
}
