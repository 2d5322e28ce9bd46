//! Requests, resource registrations, and the resources they resolve to.
//!
//! ```text
//! Request ──resource_name()──▶ ResourceRegistration ──resource_class──▶ ClassRegistry
//!                                                                         │
//!                                                     Arc<dyn Resource> ◀─┘
//! ```

mod builtin;
mod registration;
mod request;

pub use builtin::{Acknowledgement, Document, ErrorResource, Install, LoginChallenge, MembersOnly};
pub use registration::{ResourceRegistration, DEFAULT_TRANSACTION_CLASS};
pub use request::{Method, Request};

use serde_json::{json, Value};
use warden_types::{Identity, ResourceId};

/// A resolved resource: what a transaction hands back.
pub trait Resource: Send + Sync {
    /// Identity of the resource.
    fn identity(&self) -> &Identity<ResourceId>;

    /// HTTP-style status code.
    fn status(&self) -> u16;

    /// Response body.
    fn body(&self) -> Value {
        Value::Null
    }

    /// Shorthand for `identity().id()`.
    fn id(&self) -> &ResourceId {
        self.identity().id()
    }

    /// Shorthand for `identity().name()`.
    fn name(&self) -> &str {
        self.identity().name()
    }

    /// Renders the resource for output.
    fn to_json(&self) -> Value {
        json!({
            "id": self.id().article().to_string(),
            "name": self.name(),
            "status": self.status(),
            "body": self.body(),
        })
    }
}

impl std::fmt::Debug for dyn Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("name", &self.name())
            .field("status", &self.status())
            .finish()
    }
}
