//! Registry error types.

use super::StoreError;
use thiserror::Error;
use warden_auth::AccessControlError;
use warden_types::ErrorCode;

/// Errors from loading, evicting or persisting registry classes.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No recipe is registered under this name.
    #[error("class not registered: {0}")]
    NotRegistered(String),

    /// The recipe names a factory method with no registered constructor.
    #[error("no factory '{method}' for class {class}")]
    UnknownFactory {
        /// Class being loaded.
        class: String,
        /// Factory method named by its recipe.
        method: String,
    },

    /// The class refused the subject.
    #[error(transparent)]
    AccessDenied(#[from] AccessControlError),

    /// `wakeup` failed for a reason other than access.
    #[error("failed to construct {class}: {message}")]
    Construction {
        /// Class being loaded.
        class: String,
        /// What went wrong.
        message: String,
    },

    /// A typed load found an instance of another type.
    #[error("class {class} is not a {expected}")]
    TypeMismatch {
        /// Class being loaded.
        class: String,
        /// Rust type requested.
        expected: &'static str,
    },

    /// Persisting or reloading the recipes failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RegistryError {
    /// Creates a NotRegistered error.
    pub fn not_registered(name: impl Into<String>) -> Self {
        Self::NotRegistered(name.into())
    }

    /// Returns the access-control denial, if that is what this is.
    #[must_use]
    pub fn access_denied(&self) -> Option<&AccessControlError> {
        match self {
            Self::AccessDenied(err) => Some(err),
            _ => None,
        }
    }
}

impl ErrorCode for RegistryError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotRegistered(_) => "REGISTRY_NOT_REGISTERED",
            Self::UnknownFactory { .. } => "REGISTRY_UNKNOWN_FACTORY",
            Self::AccessDenied(_) => "REGISTRY_ACCESS_DENIED",
            Self::Construction { .. } => "REGISTRY_CONSTRUCTION",
            Self::TypeMismatch { .. } => "REGISTRY_TYPE_MISMATCH",
            Self::Store(err) => err.code(),
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::AccessDenied(err) => err.is_recoverable(),
            _ => false,
        }
    }
}
