//! The default transaction: resolve a registered resource class.

use super::{finish, Transaction, TransactionCore, TransactionError, TransactionSeed};
use crate::registry::RegistryError;
use crate::resource::{Acknowledgement, ErrorResource, Install, Resource, ResourceRegistration};
use crate::App;
use std::sync::Arc;
use warden_auth::DenyCode;

/// Resolves a registration's resource class, falling back to built-ins.
#[derive(Debug)]
pub struct ResourceTransaction {
    core: TransactionCore,
}

impl ResourceTransaction {
    /// Catalog name.
    pub const CLASS: &'static str = "resource";

    /// Creates the transaction.
    #[must_use]
    pub fn new(seed: TransactionSeed) -> Self {
        Self {
            core: TransactionCore::new(Self::CLASS, seed),
        }
    }

    fn resolve(&mut self, app: &App) -> Result<Arc<dyn Resource>, TransactionError> {
        let registration = self.core.registration().clone();
        match &registration.resource_class {
            Some(class) => self.resolve_class(app, class, &registration),
            None => self.fallback(app),
        }
    }

    fn resolve_class(
        &mut self,
        app: &App,
        class: &str,
        registration: &ResourceRegistration,
    ) -> Result<Arc<dyn Resource>, TransactionError> {
        match app.load_class(class, self.core.agent()) {
            Ok(instance) => instance
                .as_resource()
                .ok_or_else(|| TransactionError::NotAResource {
                    class: class.to_string(),
                }),
            Err(RegistryError::AccessDenied(denied)) => {
                let code = registration.effective_deny_code(denied.deny_code());
                tracing::debug!(
                    transaction = %self.core.id(),
                    class,
                    code = %code,
                    "resource denied"
                );
                self.on_denied(app, code, registration)
            }
            Err(other) => Err(other.into()),
        }
    }

    fn on_denied(
        &mut self,
        app: &App,
        code: DenyCode,
        registration: &ResourceRegistration,
    ) -> Result<Arc<dyn Resource>, TransactionError> {
        if code == DenyCode::Unauthenticated {
            if let Some(authority) = &registration.authority_class {
                let seed = TransactionSeed {
                    agent: Arc::clone(self.core.agent()),
                    request: self.core.request().clone(),
                    registration: registration.without_authority(),
                };
                match app.catalog().create(authority, seed) {
                    Ok(child) => {
                        let child = self.core.enlist(child)?;
                        match child.run(app) {
                            Ok(resource) => return Ok(resource),
                            Err(err) => tracing::warn!(
                                authority = %authority,
                                error = %err,
                                "authority transaction failed"
                            ),
                        }
                    }
                    Err(err) => tracing::warn!(
                        authority = %authority,
                        error = %err,
                        "authority transaction unavailable"
                    ),
                }
            }
        }
        Ok(Arc::new(ErrorResource::access_denied(
            DenyCode::Forbidden,
            self.core.request().resource_name(),
        )))
    }

    fn fallback(&self, app: &App) -> Result<Arc<dyn Resource>, TransactionError> {
        let agent = self.core.agent();
        let name = self.core.request().resource_name();
        let resource: Arc<dyn Resource> = match name {
            "" | "home" | "index" => app.load::<Acknowledgement>(agent)?,
            "install" => app.load::<Install>(agent)?,
            _ => {
                tracing::debug!(resource = name, "no registration, not found");
                Arc::new(ErrorResource::not_found(name))
            }
        };
        Ok(resource)
    }
}

impl Transaction for ResourceTransaction {
    fn core(&self) -> &TransactionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TransactionCore {
        &mut self.core
    }

    fn run(&mut self, app: &App) -> Result<Arc<dyn Resource>, TransactionError> {
        self.core.start()?;
        let outcome = self.resolve(app);
        finish(self, outcome)
    }
}
