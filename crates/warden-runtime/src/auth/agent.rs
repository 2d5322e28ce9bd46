//! Process-wide agents, cached in the registry.
//!
//! | Class | Who may wake it | Roles |
//! |-------|-----------------|-------|
//! | [`SystemAgent`] | the system agent only | `AdministratorRole` |
//! | [`GuestAgent`] | anyone | none |

use crate::registry::{CacheClass, CacheObject, RegistryError, WakeupContext, WakeupError};
use crate::App;
use std::sync::Arc;
use warden_auth::{AccessControlError, AdministratorRole, Agent, AgentKind};
use warden_types::SubjectId;

/// The system agent, holding the administrator role.
#[derive(Debug)]
pub struct SystemAgent {
    agent: Arc<Agent>,
}

impl SystemAgent {
    /// Identifier of the system agent.
    #[must_use]
    pub fn subject_id() -> SubjectId {
        SubjectId::from("system")
    }

    /// The agent itself.
    #[must_use]
    pub fn agent(&self) -> &Arc<Agent> {
        &self.agent
    }
}

impl CacheObject for SystemAgent {
    fn check_access(&self, _app: &App, subject: &Arc<Agent>) -> Result<(), RegistryError> {
        if *subject.kind() == AgentKind::System {
            Ok(())
        } else {
            Err(AccessControlError::permission_denied(
                subject.id().clone(),
                "act as the system agent",
            )
            .into())
        }
    }
}

impl CacheClass for SystemAgent {
    const CLASS: &'static str = "SystemAgent";

    fn wakeup(ctx: &WakeupContext<'_>) -> Result<Self, WakeupError> {
        let agent = Arc::new(Agent::system());
        let system = Self { agent };
        system.check_access(ctx.app(), ctx.subject())?;
        system
            .agent
            .assign_role(Arc::new(AdministratorRole::new()))?;
        Ok(system)
    }
}

/// The shared guest agent.
#[derive(Debug)]
pub struct GuestAgent {
    agent: Arc<Agent>,
}

impl GuestAgent {
    /// The agent itself.
    #[must_use]
    pub fn agent(&self) -> &Arc<Agent> {
        &self.agent
    }
}

impl CacheObject for GuestAgent {}

impl CacheClass for GuestAgent {
    const CLASS: &'static str = "GuestAgent";

    fn wakeup(_ctx: &WakeupContext<'_>) -> Result<Self, WakeupError> {
        Ok(Self {
            agent: Arc::new(Agent::guest()),
        })
    }
}
