//! Built-in command targets.
//!
//! ```text
//! SystemTarget (head)  ── DatabaseTarget ── ...extra targets
//!   Version, Log          Query
//! ```
//!
//! `Version` travels in reverse, so a later target can shadow the head's
//! answer; `Log` and `Query` travel forward.

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use warden_auth::{DatabaseClientRole, Role, Token};
use warden_command::{
    Command, CommandResult, CommandSpec, CommandTarget, Log, LogLevel, Query, Version,
};
use warden_types::{CommandId, TargetId};

/// Head of every chain: answers `Version` and writes `Log` to tracing.
#[derive(Debug)]
pub struct SystemTarget {
    id: TargetId,
    version: String,
}

impl SystemTarget {
    /// Target id of the system target.
    #[must_use]
    pub fn target_id() -> TargetId {
        TargetId::from("system")
    }

    /// Creates the target reporting `version`.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            id: Self::target_id(),
            version: version.into(),
        }
    }

    fn log(command: &Command) -> CommandResult {
        let (level, message) = match Log::parts(command) {
            Ok(parts) => parts,
            Err(err) => return CommandResult::failure(err.to_string()),
        };
        let invoker = command.invoker().name();
        match level {
            LogLevel::Status => tracing::info!(invoker, "{message}"),
            LogLevel::Warning => tracing::warn!(invoker, "{message}"),
            LogLevel::Error => tracing::error!(invoker, "{message}"),
            LogLevel::Debug => tracing::debug!(invoker, "{message}"),
        }
        CommandResult::success(Value::Null)
    }
}

impl CommandTarget for SystemTarget {
    fn id(&self) -> &TargetId {
        &self.id
    }

    fn handles(&self, command: &CommandId) -> bool {
        *command == Version::id() || *command == Log::id()
    }

    fn handle(&self, command: &Command) -> CommandResult {
        if *command.id() == Version::id() {
            CommandResult::success(self.version.as_str())
        } else if *command.id() == Log::id() {
            Self::log(command)
        } else {
            CommandResult::failure(format!("system target cannot handle {}", command.name()))
        }
    }
}

/// Why a query could not be executed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("query failed: {message}")]
pub struct QueryError {
    /// What went wrong.
    pub message: String,
}

impl QueryError {
    /// Creates a query error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Runs SQL on behalf of the database target.
pub trait QueryExecutor: Send + Sync {
    /// Executes `sql` with positional `params` against `locator`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] if the query fails.
    fn execute(
        &self,
        locator: &str,
        token: Option<&Token>,
        sql: &str,
        params: &[Value],
    ) -> Result<Value, QueryError>;
}

/// Answers `Query` for invokers holding the database client role.
pub struct DatabaseTarget {
    id: TargetId,
    executor: Arc<dyn QueryExecutor>,
}

impl DatabaseTarget {
    /// Target id of the database target.
    #[must_use]
    pub fn target_id() -> TargetId {
        TargetId::from("database")
    }

    /// Creates the target.
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self {
            id: Self::target_id(),
            executor,
        }
    }

    fn client_role(command: &Command) -> Option<Arc<dyn Role>> {
        command
            .invoker()
            .as_agent()
            .and_then(|agent| agent.role(&DatabaseClientRole::role_id()))
    }
}

impl CommandTarget for DatabaseTarget {
    fn id(&self) -> &TargetId {
        &self.id
    }

    fn handles(&self, command: &CommandId) -> bool {
        *command == Query::id()
    }

    fn handle(&self, command: &Command) -> CommandResult {
        let Some(role) = Self::client_role(command) else {
            tracing::warn!(
                invoker = %command.invoker().id(),
                "query refused, no database client role"
            );
            return CommandResult::failure(format!(
                "{} does not hold the database client role",
                command.invoker().name()
            ));
        };
        let (sql, params) = match Query::parts(command) {
            Ok(parts) => parts,
            Err(err) => return CommandResult::failure(err.to_string()),
        };
        let locator = role.locator().unwrap_or_default();
        match self.executor.execute(locator, role.token(), sql, params) {
            Ok(rows) => CommandResult::success(rows),
            Err(err) => CommandResult::failure(err.to_string()),
        }
    }
}

impl std::fmt::Debug for DatabaseTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseTarget")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
