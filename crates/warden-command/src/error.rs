//! Error types for commands and chains.

use crate::ArgKind;
use thiserror::Error;
use warden_types::{ErrorCode, TargetId};

/// Errors raised while linking a chain or building and running a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// A target was linked to itself.
    #[error("target {target} cannot be linked to itself")]
    SelfLink {
        /// The offending target.
        target: TargetId,
    },

    /// The chain head was offered as a subordinate.
    #[error("chain head {target} cannot become a subordinate")]
    HeadAsSubordinate {
        /// The head.
        target: TargetId,
    },

    /// The target is already part of the chain.
    #[error("target {target} is already linked")]
    AlreadyLinked {
        /// The offending target.
        target: TargetId,
    },

    /// The superior named in a link is not in the chain.
    #[error("target {target} is not in the chain")]
    NotInChain {
        /// The missing target.
        target: TargetId,
    },

    /// The superior already has a subordinate.
    #[error("target {target} already has subordinate {existing}")]
    SubordinateTaken {
        /// The superior.
        target: TargetId,
        /// Its current subordinate.
        existing: TargetId,
    },

    /// A positional argument has the wrong kind.
    #[error("{command}: argument {position} expects {expected}, found {found}")]
    ArgumentType {
        /// Command name.
        command: String,
        /// Zero-based position.
        position: usize,
        /// Declared kind.
        expected: ArgKind,
        /// What was supplied.
        found: String,
    },

    /// Wrong number of arguments.
    #[error("{command}: expects {expected} arguments, found {found}")]
    Arity {
        /// Command name.
        command: String,
        /// Declared count.
        expected: usize,
        /// Supplied count.
        found: usize,
    },

    /// A positional argument has the right kind but an invalid value.
    #[error("{command}: argument {position} is invalid: {reason}")]
    InvalidArgument {
        /// Command name.
        command: String,
        /// Zero-based position.
        position: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// A command was handled but failed.
    #[error("command failed: {message}")]
    Failed {
        /// Failure message from the handling target.
        message: String,
    },
}

impl ErrorCode for CommandError {
    fn code(&self) -> &'static str {
        match self {
            Self::SelfLink { .. } => "COMMAND_SELF_LINK",
            Self::HeadAsSubordinate { .. } => "COMMAND_HEAD_AS_SUBORDINATE",
            Self::AlreadyLinked { .. } => "COMMAND_ALREADY_LINKED",
            Self::NotInChain { .. } => "COMMAND_NOT_IN_CHAIN",
            Self::SubordinateTaken { .. } => "COMMAND_SUBORDINATE_TAKEN",
            Self::ArgumentType { .. } => "COMMAND_ARGUMENT_TYPE",
            Self::Arity { .. } => "COMMAND_ARITY",
            Self::InvalidArgument { .. } => "COMMAND_INVALID_ARGUMENT",
            Self::Failed { .. } => "COMMAND_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
