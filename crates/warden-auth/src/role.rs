//! Roles: capability bundles assignable to agents.
//!
//! A [`Role`] decides by allow-list which agents it may be assigned to.
//! Anything not listed is rejected.
//!
//! | Role | Allowed kinds | Carries |
//! |------|---------------|---------|
//! | [`DatabaseClientRole`] | `User`, `OAuthUser` | connection locator + token |
//! | [`AdministratorRole`] | `System` | nothing |
//! | [`ApplicationRole`] | `Application` | optional token |

use crate::{Agent, AgentKind, Authorization, Token};
use warden_types::{Identity, SubjectId};

/// A capability bundle.
///
/// Implementors only decide `is_authorized`; the typed verdict is derived.
pub trait Role: Send + Sync + std::fmt::Debug {
    /// Returns the role identity.
    fn identity(&self) -> &Identity<SubjectId>;

    /// Returns `true` if `agent` may hold this role.
    fn is_authorized(&self, agent: &Agent) -> bool;

    /// Typed verdict for `agent`.
    fn authorize(&self, agent: &Agent) -> Authorization {
        Authorization::for_agent(self.is_authorized(agent), agent)
    }

    /// Credential bound to the role, if any.
    fn token(&self) -> Option<&Token> {
        None
    }

    /// Locator of the resource the role grants access to, if any.
    fn locator(&self) -> Option<&str> {
        None
    }
}

/// Access to the application database.
#[derive(Debug, Clone)]
pub struct DatabaseClientRole {
    identity: Identity<SubjectId>,
    locator: String,
    token: Option<Token>,
}

impl DatabaseClientRole {
    const NAME: &'static str = "warden.role.database-client";

    /// Static role identifier.
    #[must_use]
    pub fn role_id() -> SubjectId {
        SubjectId::derived(Self::NAME)
    }

    /// Creates the role for the database at `locator`.
    #[must_use]
    pub fn new(locator: impl Into<String>, token: Option<Token>) -> Self {
        Self {
            identity: Identity::fixed(Self::NAME),
            locator: locator.into(),
            token,
        }
    }
}

impl Role for DatabaseClientRole {
    fn identity(&self) -> &Identity<SubjectId> {
        &self.identity
    }

    fn is_authorized(&self, agent: &Agent) -> bool {
        matches!(agent.kind(), AgentKind::User | AgentKind::OAuthUser { .. })
    }

    fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    fn locator(&self) -> Option<&str> {
        Some(&self.locator)
    }
}

/// Full administrative rights. System agent only.
#[derive(Debug, Clone)]
pub struct AdministratorRole {
    identity: Identity<SubjectId>,
}

impl AdministratorRole {
    const NAME: &'static str = "warden.role.administrator";

    /// Static role identifier.
    #[must_use]
    pub fn role_id() -> SubjectId {
        SubjectId::derived(Self::NAME)
    }

    /// Creates the role.
    #[must_use]
    pub fn new() -> Self {
        Self {
            identity: Identity::fixed(Self::NAME),
        }
    }
}

impl Default for AdministratorRole {
    fn default() -> Self {
        Self::new()
    }
}

impl Role for AdministratorRole {
    fn identity(&self) -> &Identity<SubjectId> {
        &self.identity
    }

    fn is_authorized(&self, agent: &Agent) -> bool {
        *agent.kind() == AgentKind::System
    }
}

/// Rights of a registered third-party application.
#[derive(Debug, Clone)]
pub struct ApplicationRole {
    identity: Identity<SubjectId>,
    token: Option<Token>,
}

impl ApplicationRole {
    const NAME: &'static str = "warden.role.application";

    /// Static role identifier.
    #[must_use]
    pub fn role_id() -> SubjectId {
        SubjectId::derived(Self::NAME)
    }

    /// Creates the role without a credential.
    #[must_use]
    pub fn new() -> Self {
        Self {
            identity: Identity::fixed(Self::NAME),
            token: None,
        }
    }

    /// Attaches a credential.
    #[must_use]
    pub fn with_token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }
}

impl Default for ApplicationRole {
    fn default() -> Self {
        Self::new()
    }
}

impl Role for ApplicationRole {
    fn identity(&self) -> &Identity<SubjectId> {
        &self.identity
    }

    fn is_authorized(&self, agent: &Agent) -> bool {
        *agent.kind() == AgentKind::Application
    }

    fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }
}
