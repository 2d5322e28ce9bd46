//! Outcome of dispatching a command.

use crate::CommandError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a target returned for a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandResult {
    /// The command succeeded with a value.
    Success(Value),
    /// The command failed or was not handled.
    Failure {
        /// Human-readable reason.
        message: String,
    },
}

impl CommandResult {
    /// Creates a success.
    #[must_use]
    pub fn success(value: impl Into<Value>) -> Self {
        Self::Success(value.into())
    }

    /// Creates a failure.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    /// Returns `true` on success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the success value.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure { .. } => None,
        }
    }

    /// Converts into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Failed`] for a failure.
    pub fn into_result(self) -> Result<Value, CommandError> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure { message } => Err(CommandError::Failed { message }),
        }
    }
}
