//! Built-in resources.
//!
//! | Resource | Status | Cached | Access |
//! |----------|--------|--------|--------|
//! | [`Acknowledgement`] | 200 | yes | anyone |
//! | [`Install`] | 200 | yes | anyone |
//! | [`LoginChallenge`] | 401 | yes | anyone |
//! | [`MembersOnly`] | 200 | yes | authenticated agents |
//! | [`Document`] | 200 | per document | delegated `open` permission |
//! | [`ErrorResource`] | 401/403/404/500 | no | anyone |

use super::Resource;
use crate::auth::SystemAgent;
use crate::registry::{CacheClass, CacheObject, RegistryError, WakeupContext, WakeupError};
use crate::App;
use serde_json::{json, Value};
use std::sync::Arc;
use warden_auth::{AccessControlError, Agent, Constraint, Delegation, DenyCode};
use warden_command::{Log, Version};
use warden_types::{Identity, IdentityStyle, ResourceId, SubjectId};

macro_rules! impl_resource_object {
    ($ty:ty) => {
        impl CacheObject for $ty {
            fn as_resource(self: Arc<Self>) -> Option<Arc<dyn Resource>> {
                Some(self)
            }
        }
    };
}

/// Terminal resource describing a failure.
#[derive(Debug, Clone)]
pub struct ErrorResource {
    identity: Identity<ResourceId>,
    status: u16,
    resource: String,
}

impl ErrorResource {
    /// Creates an error resource.
    pub fn new(status: u16, message: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            identity: Identity::dynamic(message),
            status,
            resource: resource.into(),
        }
    }

    /// "Resource not found", 404.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(404, "Resource not found", resource)
    }

    /// "Access Denied" with the status of `code`.
    pub fn access_denied(code: DenyCode, resource: impl Into<String>) -> Self {
        Self::new(code.status(), "Access Denied", resource)
    }

    /// An internal failure, 500.
    pub fn internal(resource: impl Into<String>) -> Self {
        Self::new(500, "Internal Error", resource)
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.identity.name()
    }
}

impl Resource for ErrorResource {
    fn identity(&self) -> &Identity<ResourceId> {
        &self.identity
    }

    fn status(&self) -> u16 {
        self.status
    }

    fn body(&self) -> Value {
        json!({ "error": self.message(), "resource": self.resource })
    }
}

/// Landing resource; reports the middleware version.
#[derive(Debug)]
pub struct Acknowledgement {
    identity: Identity<ResourceId>,
    version: String,
}

impl Acknowledgement {
    /// The version reported by the command chain at wakeup.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl_resource_object!(Acknowledgement);

impl CacheClass for Acknowledgement {
    const CLASS: &'static str = "Acknowledgement";

    fn wakeup(ctx: &WakeupContext<'_>) -> Result<Self, WakeupError> {
        let version = ctx
            .app()
            .invoke::<Version>(ctx.subject(), vec![])
            .map_err(|e| ctx.failed(e.to_string()))?;
        let version = match version {
            Value::String(s) => s,
            other => other.to_string(),
        };
        Ok(Self {
            identity: Identity::fixed(Self::CLASS),
            version,
        })
    }
}

impl Resource for Acknowledgement {
    fn identity(&self) -> &Identity<ResourceId> {
        &self.identity
    }

    fn status(&self) -> u16 {
        200
    }

    fn body(&self) -> Value {
        json!({ "message": "Warden is running", "version": self.version })
    }
}

/// Installation entry point.
#[derive(Debug)]
pub struct Install {
    identity: Identity<ResourceId>,
    mode: &'static str,
}

impl_resource_object!(Install);

impl CacheClass for Install {
    const CLASS: &'static str = "Install";

    fn wakeup(ctx: &WakeupContext<'_>) -> Result<Self, WakeupError> {
        let message = format!("installation requested by {}", ctx.subject().name());
        let notice = vec!["STATUS".into(), message.into()];
        if let Err(err) = ctx.app().invoke::<Log>(ctx.subject(), notice) {
            tracing::warn!(error = %err, "install notice not logged");
        }
        Ok(Self {
            identity: Identity::fixed(Self::CLASS),
            mode: ctx.app().config().mode.as_str(),
        })
    }
}

impl Resource for Install {
    fn identity(&self) -> &Identity<ResourceId> {
        &self.identity
    }

    fn status(&self) -> u16 {
        200
    }

    fn body(&self) -> Value {
        json!({ "message": "Install", "mode": self.mode })
    }
}

/// Asks the agent to authenticate.
#[derive(Debug)]
pub struct LoginChallenge {
    identity: Identity<ResourceId>,
}

impl_resource_object!(LoginChallenge);

impl CacheClass for LoginChallenge {
    const CLASS: &'static str = "LoginChallenge";

    fn wakeup(_ctx: &WakeupContext<'_>) -> Result<Self, WakeupError> {
        Ok(Self {
            identity: Identity::fixed(Self::CLASS),
        })
    }
}

impl Resource for LoginChallenge {
    fn identity(&self) -> &Identity<ResourceId> {
        &self.identity
    }

    fn status(&self) -> u16 {
        401
    }

    fn body(&self) -> Value {
        json!({
            "message": "Authentication required",
            "schemes": ["credentials", "bearer"],
        })
    }
}

/// Area open to any authenticated agent.
#[derive(Debug)]
pub struct MembersOnly {
    identity: Identity<ResourceId>,
}

impl CacheObject for MembersOnly {
    fn check_access(&self, _app: &App, subject: &Arc<Agent>) -> Result<(), RegistryError> {
        if subject.is_authenticated() {
            Ok(())
        } else {
            Err(AccessControlError::unauthenticated(
                subject.id().clone(),
                "open the members area",
            )
            .into())
        }
    }

    fn as_resource(self: Arc<Self>) -> Option<Arc<dyn Resource>> {
        Some(self)
    }
}

impl CacheClass for MembersOnly {
    const CLASS: &'static str = "MembersOnly";

    fn wakeup(ctx: &WakeupContext<'_>) -> Result<Self, WakeupError> {
        let members = Self {
            identity: Identity::fixed(Self::CLASS),
        };
        members.check_access(ctx.app(), ctx.subject())?;
        Ok(members)
    }
}

impl Resource for MembersOnly {
    fn identity(&self) -> &Identity<ResourceId> {
        &self.identity
    }

    fn status(&self) -> u16 {
        200
    }

    fn body(&self) -> Value {
        json!({ "message": "Welcome, member" })
    }
}

/// A document guarded by the delegate's `open` constraint.
///
/// Each document is its own class, `"Document:{name}"`, whose locator is
/// the document name. Every access check asks the delegate currently in
/// the registry.
#[derive(Debug)]
pub struct Document {
    identity: Identity<ResourceId>,
    authority: SubjectId,
}

impl Document {
    /// Class name under which the document `name` is registered.
    #[must_use]
    pub fn class_for(name: &str) -> String {
        format!("{}:{name}", Self::CLASS)
    }
}

impl CacheObject for Document {
    fn check_access(&self, app: &App, subject: &Arc<Agent>) -> Result<(), RegistryError> {
        app.delegate(subject)?.require(
            &self.authority,
            subject,
            Constraint::open().id(),
            self.identity.id(),
        )?;
        Ok(())
    }

    fn as_resource(self: Arc<Self>) -> Option<Arc<dyn Resource>> {
        Some(self)
    }
}

impl CacheClass for Document {
    const CLASS: &'static str = "Document";

    fn wakeup(ctx: &WakeupContext<'_>) -> Result<Self, WakeupError> {
        if ctx.locator().is_empty() {
            return Err(ctx.failed("document name missing"));
        }
        let document = Self {
            identity: Identity::from_parts(
                ResourceId::from(ctx.locator()),
                ctx.locator(),
                IdentityStyle::Static,
            ),
            authority: SystemAgent::subject_id(),
        };
        document.check_access(ctx.app(), ctx.subject())?;
        Ok(document)
    }
}

impl Resource for Document {
    fn identity(&self) -> &Identity<ResourceId> {
        &self.identity
    }

    fn status(&self) -> u16 {
        200
    }

    fn body(&self) -> Value {
        json!({ "document": self.name() })
    }
}
