//! Transaction lifecycle state.
//!
//! # State Machine
//!
//! ```text
//!              start()             complete()
//!   Created ───────────▶ Running ─────────────▶ Completed
//!      │                    │
//!      │ abort(reason)      │ abort(reason)
//!      ▼                    ▼
//!   Aborted ◀───────────────┘
//! ```
//!
//! `Completed` and `Aborted` are terminal; every transition out of them is
//! refused.

use super::{Transaction, TransactionError, TransactionSeed};
use crate::resource::{Request, ResourceRegistration};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warden_auth::Agent;
use warden_types::{Identity, TransactionId};

/// Where a transaction is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TransactionState {
    /// Built, not yet run.
    Created,
    /// Resolving.
    Running,
    /// Produced a resource.
    Completed,
    /// Rolled back.
    Aborted {
        /// Why.
        reason: String,
    },
}

impl TransactionState {
    /// Returns `true` for `Completed` and `Aborted`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Aborted { .. })
    }
}

impl std::fmt::Display for TransactionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::Running => f.write_str("running"),
            Self::Completed => f.write_str("completed"),
            Self::Aborted { reason } => write!(f, "aborted ({reason})"),
        }
    }
}

/// State shared by every transaction type.
pub struct TransactionCore {
    identity: Identity<TransactionId>,
    agent: Arc<Agent>,
    request: Request,
    registration: ResourceRegistration,
    state: TransactionState,
    child: Option<Box<dyn Transaction>>,
}

impl TransactionCore {
    /// Creates a core in the `Created` state.
    pub fn new(class: &str, seed: TransactionSeed) -> Self {
        let name = format!("{class} {}", seed.request.path());
        Self {
            identity: Identity::dynamic(name),
            agent: seed.agent,
            request: seed.request,
            registration: seed.registration,
            state: TransactionState::Created,
            child: None,
        }
    }

    /// Returns the transaction id.
    #[must_use]
    pub fn id(&self) -> &TransactionId {
        self.identity.id()
    }

    /// Returns the transaction name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.identity.name()
    }

    /// Returns the invoking agent.
    #[must_use]
    pub fn agent(&self) -> &Arc<Agent> {
        &self.agent
    }

    /// Returns the originating request.
    #[must_use]
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Returns the registration being resolved.
    #[must_use]
    pub fn registration(&self) -> &ResourceRegistration {
        &self.registration
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> &TransactionState {
        &self.state
    }

    /// Returns `true` in a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Returns the enlisted child.
    #[must_use]
    pub fn child(&self) -> Option<&dyn Transaction> {
        self.child.as_deref()
    }

    /// `Created` → `Running`.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::InvalidState`] from any other state.
    pub fn start(&mut self) -> Result<(), TransactionError> {
        if self.state != TransactionState::Created {
            return Err(TransactionError::InvalidState {
                id: self.id().clone(),
                state: self.state.clone(),
            });
        }
        self.state = TransactionState::Running;
        Ok(())
    }

    /// `Running` → `Completed`. Returns `false` from any other state.
    pub fn complete(&mut self) -> bool {
        if self.state == TransactionState::Running {
            self.state = TransactionState::Completed;
            true
        } else {
            false
        }
    }

    /// Any non-terminal state → `Aborted`. Returns `false` if terminal.
    pub fn abort(&mut self, reason: impl Into<String>) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.state = TransactionState::Aborted {
            reason: reason.into(),
        };
        true
    }

    /// Enlists `child`, returning it for running.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::AlreadyEnlisted`] if a child is already
    /// enlisted.
    pub fn enlist(
        &mut self,
        child: Box<dyn Transaction>,
    ) -> Result<&mut Box<dyn Transaction>, TransactionError> {
        if self.child.is_some() {
            return Err(TransactionError::AlreadyEnlisted {
                id: self.id().clone(),
            });
        }
        tracing::debug!(parent = %self.id(), child = %child.id(), "child transaction enlisted");
        Ok(self.child.insert(child))
    }
}

impl std::fmt::Debug for TransactionCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionCore")
            .field("id", self.id())
            .field("name", &self.name())
            .field("state", &self.state)
            .field("child", &self.child.as_ref().map(|c| c.id().clone()))
            .finish_non_exhaustive()
    }
}
