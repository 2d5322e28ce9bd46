//! Transaction error types.

use super::TransactionState;
use crate::registry::RegistryError;
use thiserror::Error;
use warden_types::{ErrorCode, TransactionId};

/// Errors that end a transaction.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// Loading a class failed for a reason other than access.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A second child was enlisted.
    #[error("transaction {id} already has an enlisted child")]
    AlreadyEnlisted {
        /// The parent transaction.
        id: TransactionId,
    },

    /// No transaction class is registered under this name.
    #[error("unknown transaction class: {0}")]
    UnknownClass(String),

    /// `run` was called outside the `Created` state.
    #[error("transaction {id} cannot run from state {state}")]
    InvalidState {
        /// The transaction.
        id: TransactionId,
        /// Its state at the time.
        state: TransactionState,
    },

    /// The resource class produced something that is not a resource.
    #[error("class {class} is not a resource")]
    NotAResource {
        /// The class that was loaded.
        class: String,
    },
}

impl ErrorCode for TransactionError {
    fn code(&self) -> &'static str {
        match self {
            Self::Registry(_) => "TRANSACTION_REGISTRY",
            Self::AlreadyEnlisted { .. } => "TRANSACTION_ALREADY_ENLISTED",
            Self::UnknownClass(_) => "TRANSACTION_UNKNOWN_CLASS",
            Self::InvalidState { .. } => "TRANSACTION_INVALID_STATE",
            Self::NotAResource { .. } => "TRANSACTION_NOT_A_RESOURCE",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Registry(err) => err.is_recoverable(),
            _ => false,
        }
    }
}
