//! Built-in command kinds.
//!
//! | Command | Arguments | Direction | Handled by |
//! |---------|-----------|-----------|------------|
//! | [`Version`] | none | reverse | system target |
//! | [`Log`] | level, message | forward | system target |
//! | [`Query`] | sql, params | forward | database target |

use crate::{Arg, ArgKind, Command, CommandError, CommandSpec, Direction};
use serde_json::Value;
use std::str::FromStr;

/// Asks for the middleware version string.
pub struct Version;

impl CommandSpec for Version {
    const NAME: &'static str = "warden.command.version";
    const DIRECTION: Direction = Direction::Reverse;
    const SIGNATURE: &'static [ArgKind] = &[];
}

/// Severity accepted by [`Log`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    /// Normal operation.
    Status,
    /// Something unexpected but handled.
    Warning,
    /// A failure.
    Error,
    /// Diagnostic detail.
    Debug,
}

impl LogLevel {
    /// Returns the wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Status => "STATUS",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Debug => "DEBUG",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STATUS" => Ok(Self::Status),
            "WARNING" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "DEBUG" => Ok(Self::Debug),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writes a message to the log.
pub struct Log;

impl Log {
    /// Extracts the level and message of a built `Log` command.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidArgument`] if `command` is not a
    /// well-formed `Log` command.
    pub fn parts(command: &Command) -> Result<(LogLevel, &str), CommandError> {
        let level = command
            .arg(0)
            .and_then(Arg::as_str)
            .ok_or_else(|| invalid(Self::NAME, 0, "missing level"))?;
        let level = level
            .parse::<LogLevel>()
            .map_err(|reason| invalid(Self::NAME, 0, &reason))?;
        let message = command
            .arg(1)
            .and_then(Arg::as_str)
            .ok_or_else(|| invalid(Self::NAME, 1, "missing message"))?;
        Ok((level, message))
    }
}

impl CommandSpec for Log {
    const NAME: &'static str = "warden.command.log";
    const DIRECTION: Direction = Direction::Forward;
    const SIGNATURE: &'static [ArgKind] = &[ArgKind::String, ArgKind::String];

    fn validate(args: &[Arg]) -> Result<(), CommandError> {
        if let Some(level) = args.first().and_then(Arg::as_str) {
            level
                .parse::<LogLevel>()
                .map_err(|reason| invalid(Self::NAME, 0, &reason))?;
        }
        Ok(())
    }
}

/// Runs a parameterized query against the application database.
pub struct Query;

impl Query {
    /// Extracts the SQL text and parameters of a built `Query` command.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidArgument`] if `command` is not a
    /// well-formed `Query` command.
    pub fn parts(command: &Command) -> Result<(&str, &[Value]), CommandError> {
        let sql = command
            .arg(0)
            .and_then(Arg::as_str)
            .ok_or_else(|| invalid(Self::NAME, 0, "missing sql"))?;
        let params = command
            .arg(1)
            .and_then(Arg::as_value)
            .and_then(Value::as_array)
            .ok_or_else(|| invalid(Self::NAME, 1, "missing params"))?;
        Ok((sql, params.as_slice()))
    }
}

impl CommandSpec for Query {
    const NAME: &'static str = "warden.command.query";
    const DIRECTION: Direction = Direction::Forward;
    const SIGNATURE: &'static [ArgKind] = &[ArgKind::String, ArgKind::Array];

    fn validate(args: &[Arg]) -> Result<(), CommandError> {
        match args.first().and_then(Arg::as_str) {
            Some(sql) if sql.trim().is_empty() => Err(invalid(Self::NAME, 0, "empty sql")),
            _ => Ok(()),
        }
    }
}

fn invalid(command: &str, position: usize, reason: &str) -> CommandError {
    CommandError::InvalidArgument {
        command: command.to_string(),
        position,
        reason: reason.to_string(),
    }
}
