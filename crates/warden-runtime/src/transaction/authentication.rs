//! The authentication transaction: challenge the agent to sign in.

use super::{finish, Transaction, TransactionCore, TransactionError, TransactionSeed};
use crate::resource::{LoginChallenge, Resource};
use crate::App;
use std::sync::Arc;

/// Resolves to the login challenge (401).
#[derive(Debug)]
pub struct AuthenticationTransaction {
    core: TransactionCore,
}

impl AuthenticationTransaction {
    /// Catalog name.
    pub const CLASS: &'static str = "authentication";

    /// Creates the transaction.
    #[must_use]
    pub fn new(seed: TransactionSeed) -> Self {
        Self {
            core: TransactionCore::new(Self::CLASS, seed),
        }
    }
}

impl Transaction for AuthenticationTransaction {
    fn core(&self) -> &TransactionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TransactionCore {
        &mut self.core
    }

    fn run(&mut self, app: &App) -> Result<Arc<dyn Resource>, TransactionError> {
        self.core.start()?;
        let outcome = app
            .load::<LoginChallenge>(self.core.agent())
            .map(|challenge| challenge as Arc<dyn Resource>)
            .map_err(TransactionError::from);
        finish(self, outcome)
    }
}
