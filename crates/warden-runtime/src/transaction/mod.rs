//! Transactions: resolving a request into a resource.
//!
//! # Flow
//!
//! ```text
//! App::create_transaction(request, agent)
//!     │  registration.transaction_class → TransactionCatalog
//!     ▼
//! Transaction::run(app)
//!     ├── resource_class set ──▶ ClassRegistry::load_class(class, agent)
//!     │        ├── Ok ─────────────────────────────────▶ resource      (Completed)
//!     │        ├── AccessDenied, 401 + authority_class ─▶ child.run()  (Completed)
//!     │        ├── AccessDenied otherwise ─────────────▶ 403           (Completed)
//!     │        └── other error ────────────────────────▶ Err           (Aborted)
//!     └── no resource_class ──▶ built-in fallback (200 / 404)          (Completed)
//! ```
//!
//! A child transaction is built without an authority class, so enlistment
//! is at most one level deep.

mod authentication;
mod catalog;
mod error;
mod resource;
mod state;

pub use authentication::AuthenticationTransaction;
pub use catalog::{TransactionCatalog, TransactionFactory};
pub use error::TransactionError;
pub use resource::ResourceTransaction;
pub use state::{TransactionCore, TransactionState};

use crate::resource::{Request, Resource, ResourceRegistration};
use crate::App;
use std::sync::Arc;
use warden_auth::Agent;
use warden_types::TransactionId;

/// Everything a transaction is built from.
#[derive(Debug, Clone)]
pub struct TransactionSeed {
    /// The invoking agent.
    pub agent: Arc<Agent>,
    /// The originating request.
    pub request: Request,
    /// The registration to resolve.
    pub registration: ResourceRegistration,
}

/// A unit of request resolution.
pub trait Transaction: Send {
    /// Shared lifecycle state.
    fn core(&self) -> &TransactionCore;

    /// Shared lifecycle state, mutably.
    fn core_mut(&mut self) -> &mut TransactionCore;

    /// Resolves the request. Runs once, from `Created`.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError`] for anything other than an access
    /// denial; the transaction is then `Aborted`.
    fn run(&mut self, app: &App) -> Result<Arc<dyn Resource>, TransactionError>;

    /// Aborts the transaction. Returns `false` if it already finished.
    fn rollback(&mut self, reason: &str) -> bool {
        let id = self.id().clone();
        let aborted = self.core_mut().abort(reason);
        if aborted {
            tracing::warn!(transaction = %id, reason, "transaction rolled back");
        }
        aborted
    }

    /// Returns the transaction id.
    fn id(&self) -> &TransactionId {
        self.core().id()
    }

    /// Returns the transaction name.
    fn name(&self) -> &str {
        self.core().name()
    }

    /// Returns the current state.
    fn state(&self) -> &TransactionState {
        self.core().state()
    }

    /// Returns the invoking agent.
    fn agent(&self) -> &Arc<Agent> {
        self.core().agent()
    }

    /// Returns the enlisted child.
    fn child(&self) -> Option<&dyn Transaction> {
        self.core().child()
    }
}

/// Marks `transaction` completed after a successful resolution, or rolls it
/// back with the error.
pub(crate) fn finish(
    transaction: &mut dyn Transaction,
    outcome: Result<Arc<dyn Resource>, TransactionError>,
) -> Result<Arc<dyn Resource>, TransactionError> {
    match outcome {
        Ok(resource) => {
            transaction.core_mut().complete();
            tracing::info!(
                transaction = %transaction.id(),
                name = transaction.name(),
                status = resource.status(),
                "transaction completed"
            );
            Ok(resource)
        }
        Err(err) => {
            transaction.rollback(&err.to_string());
            Err(err)
        }
    }
}
