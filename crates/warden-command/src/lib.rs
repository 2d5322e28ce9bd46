//! Typed commands and chain-of-responsibility dispatch for Warden.
//!
//! A [`Command`] is built and validated by its [`CommandSpec`] and then
//! handed to a [`CommandChain`], which routes it to the first
//! [`CommandTarget`] that handles it.
//!
//! # Architecture
//!
//! ```text
//! CommandSpec::invoke(chain, invoker, args)
//!     │  validate args against SIGNATURE
//!     ▼
//! Command { id, args, invoker, direction }
//!     │
//!     ▼
//! CommandChain::dispatch()
//!     │  Forward: head → tail     Reverse: tail → head
//!     ▼
//! first CommandTarget where handles(id) ──▶ CommandResult
//! ```
//!
//! # Crate Architecture
//!
//! ```text
//! warden-types   (CommandId, TargetId)
//! warden-auth    (Subject: the invoker)
//!       ↑
//! warden-command ◄── THIS CRATE
//!       ↑
//! warden-runtime (SystemTarget, DatabaseTarget)
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use warden_auth::{Agent, Subject};
//! use warden_command::{
//!     Command, CommandChain, CommandResult, CommandSpec, CommandTarget, Version,
//! };
//! use warden_types::{CommandId, TargetId};
//!
//! struct VersionTarget(TargetId);
//!
//! impl CommandTarget for VersionTarget {
//!     fn id(&self) -> &TargetId {
//!         &self.0
//!     }
//!     fn handles(&self, command: &CommandId) -> bool {
//!         *command == Version::id()
//!     }
//!     fn handle(&self, _command: &Command) -> CommandResult {
//!         CommandResult::success("1.2.3")
//!     }
//! }
//!
//! let chain = CommandChain::new(Arc::new(VersionTarget(TargetId::from("system"))));
//! let invoker = Subject::from(Arc::new(Agent::system()));
//! let result = Version::invoke(&chain, invoker, vec![]).expect("no arguments");
//! assert_eq!(result, CommandResult::success("1.2.3"));
//! ```

pub mod arg;
pub mod builtin;
pub mod chain;
pub mod command;
pub mod error;
pub mod result;
pub mod target;

pub use arg::{Arg, ArgKind};
pub use builtin::{Log, LogLevel, Query, Version};
pub use chain::CommandChain;
pub use command::{Command, CommandSpec, Direction};
pub use error::CommandError;
pub use result::CommandResult;
pub use target::CommandTarget;

#[cfg(any(test, feature = "test-utils"))]
pub use target::testing;
