//! Access-control model for Warden.
//!
//! This crate defines who may act ([`Agent`], [`Role`], [`Subject`]) and
//! on what terms ([`Constraint`], [`Delegation`]), and the typed verdicts
//! those checks produce ([`Authorization`], [`AccessControlError`]).
//!
//! # Two-Layer Model
//!
//! ```text
//! Effective Permission = Role(WHO may hold a capability)
//!                      ∩ Delegation(WHO may act on WHICH resource)
//! ```
//!
//! | Layer | Type | Controls |
//! |-------|------|----------|
//! | Role | [`Role`] trait | Which agent kinds may hold a capability bundle |
//! | Delegation | [`Delegation`] trait | Which subjects may open/read/write/execute a resource |
//!
//! # Crate Architecture
//!
//! ```text
//! warden-types  (ids, Identity, ErrorCode)
//!       ↑
//! warden-auth  ◄── THIS CRATE
//! (Agent, Role, Constraint, Token, Delegation trait)
//!       ↑
//! warden-command (Command invoker is a Subject)
//!       ↑
//! warden-runtime (Delegate impl, registry-cached agents)
//! ```
//!
//! # Design Principles
//!
//! - **Trait definitions here, implementations in the runtime**: the
//!   concrete `Delegate` lives in `warden-runtime` next to the class
//!   registry that caches it.
//! - **Default reject for roles**: a role must list the agent kinds it
//!   accepts.
//! - **Default open for delegation**: a resource is only guarded once a
//!   constraint has been set on it.

pub mod agent;
pub mod authorization;
pub mod constraint;
pub mod delegation;
pub mod error;
pub mod role;
pub mod subject;
pub mod token;

pub use agent::{Agent, AgentKind};
pub use authorization::{Authorization, DenyCode};
pub use constraint::{Constraint, ConstraintKind, ConstraintScope};
pub use delegation::Delegation;
pub use error::AccessControlError;
pub use role::{AdministratorRole, ApplicationRole, DatabaseClientRole, Role};
pub use subject::Subject;
pub use token::{Token, TokenError};
