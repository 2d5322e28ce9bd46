//! Transaction classes by name.

use super::{
    AuthenticationTransaction, ResourceTransaction, Transaction, TransactionError,
    TransactionSeed,
};
use std::collections::HashMap;

/// Builds a transaction from its seed.
pub type TransactionFactory = fn(TransactionSeed) -> Box<dyn Transaction>;

fn resource(seed: TransactionSeed) -> Box<dyn Transaction> {
    Box::new(ResourceTransaction::new(seed))
}

fn authentication(seed: TransactionSeed) -> Box<dyn Transaction> {
    Box::new(AuthenticationTransaction::new(seed))
}

/// Maps transaction class names to constructors.
///
/// Starts with the built-in `resource` and `authentication` classes.
#[derive(Clone)]
pub struct TransactionCatalog {
    factories: HashMap<String, TransactionFactory>,
}

impl TransactionCatalog {
    /// Creates a catalog with the built-in classes.
    #[must_use]
    pub fn new() -> Self {
        let mut catalog = Self {
            factories: HashMap::new(),
        };
        catalog.register(ResourceTransaction::CLASS, resource);
        catalog.register(AuthenticationTransaction::CLASS, authentication);
        catalog
    }

    /// Adds or replaces a class.
    pub fn register(&mut self, name: impl Into<String>, factory: TransactionFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered class names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Builds a transaction of class `name`.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::UnknownClass`] if `name` is not
    /// registered.
    pub fn create(
        &self,
        name: &str,
        seed: TransactionSeed,
    ) -> Result<Box<dyn Transaction>, TransactionError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| TransactionError::UnknownClass(name.to_string()))?;
        Ok(factory(seed))
    }
}

impl Default for TransactionCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TransactionCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
