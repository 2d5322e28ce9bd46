//! Resource registrations: how a resource name is resolved.
//!
//! Registrations come from `[[resources]]` tables in the configuration:
//!
//! ```toml
//! [[resources]]
//! resource = "members"
//! resource_class = "MembersOnly"
//! authority_class = "authentication"
//! ```

use serde::{Deserialize, Serialize};
use warden_auth::DenyCode;
use warden_types::ResourceId;

/// Transaction class used when a registration names none.
pub const DEFAULT_TRANSACTION_CLASS: &str = "resource";

fn default_transaction_class() -> String {
    DEFAULT_TRANSACTION_CLASS.to_string()
}

/// How one resource name is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRegistration {
    /// Resource name as it appears in request paths.
    pub resource: String,

    /// Registry class that produces the resource. Without one the name is
    /// resolved against the built-in fallbacks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_class: Option<String>,

    /// Transaction class that runs the resolution.
    #[serde(default = "default_transaction_class")]
    pub transaction_class: String,

    /// Transaction class enlisted when an unauthenticated agent is refused.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority_class: Option<String>,

    /// Status to report on denial, overriding the one from the refusal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deny_code: Option<u16>,
}

impl ResourceRegistration {
    /// A registration for `resource` with no class.
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            resource_class: None,
            transaction_class: default_transaction_class(),
            authority_class: None,
            deny_code: None,
        }
    }

    /// Sets the resource class.
    #[must_use]
    pub fn with_resource_class(mut self, class: impl Into<String>) -> Self {
        self.resource_class = Some(class.into());
        self
    }

    /// Sets the transaction class.
    #[must_use]
    pub fn with_transaction_class(mut self, class: impl Into<String>) -> Self {
        self.transaction_class = class.into();
        self
    }

    /// Sets the authority class.
    #[must_use]
    pub fn with_authority_class(mut self, class: impl Into<String>) -> Self {
        self.authority_class = Some(class.into());
        self
    }

    /// Sets the deny code.
    #[must_use]
    pub fn with_deny_code(mut self, status: u16) -> Self {
        self.deny_code = Some(status);
        self
    }

    /// Identifier of the registered resource.
    #[must_use]
    pub fn resource_id(&self) -> ResourceId {
        ResourceId::from(self.resource.trim_matches('/'))
    }

    /// The deny code to act on: the configured one if it is a known
    /// status, else `refused`.
    #[must_use]
    pub fn effective_deny_code(&self, refused: DenyCode) -> DenyCode {
        self.deny_code
            .and_then(DenyCode::from_status)
            .unwrap_or(refused)
    }

    /// A copy that can never enlist a child.
    #[must_use]
    pub fn without_authority(&self) -> Self {
        Self {
            authority_class: None,
            ..self.clone()
        }
    }
}
