//! Warden Runtime - the authorization-gated request core.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  warden-types   : ids, Identity, ErrorCode                  │
//! │  warden-auth    : Agent, Role, Constraint, Delegation       │
//! │  warden-command : CommandSpec, CommandChain                 │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Runtime Layer (THIS CRATE)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  registry/    : ClassRegistry, CacheObject lifecycle        │
//! │  auth/        : Delegate, SystemAgent, GuestAgent           │
//! │  resource/    : Request, ResourceRegistration, Resource     │
//! │  transaction/ : Transaction state machine, catalog          │
//! │  target       : SystemTarget, DatabaseTarget                │
//! │  config/      : WardenConfig, ConfigLoader                  │
//! │  app          : App context                                 │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │  warden-cli : resolves one request from the command line    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! ## [`registry`] - Class Registry
//!
//! Every shared instance is obtained through
//! [`ClassRegistry`](registry::ClassRegistry): recipes name a class, a
//! locator and a factory method; the first load wakes the instance up and
//! later loads return the same `Arc` until it is put to sleep.
//!
//! ## [`auth`] - Delegation
//!
//! [`Delegate`](auth::Delegate) stores which subjects may act on which
//! resource under which constraint. A pair without an entry is open to
//! everyone; an entry starts closed until permissions are granted.
//!
//! ## [`transaction`] - Request Resolution
//!
//! A [`Transaction`](transaction::Transaction) runs once and ends
//! `Completed` or `Aborted`. Denials of unauthenticated agents may enlist
//! one authority transaction (the login challenge).
//!
//! # Example
//!
//! ```
//! use warden_runtime::resource::{Request, ResourceRegistration};
//! use warden_runtime::App;
//!
//! let app = App::builder()
//!     .with_registration(
//!         ResourceRegistration::new("members")
//!             .with_resource_class("MembersOnly")
//!             .with_authority_class("authentication"),
//!     )
//!     .build()?;
//!
//! let guest = app.guest_agent()?;
//! assert_eq!(app.handle(&Request::get("/"), &guest).status(), 200);
//! assert_eq!(app.handle(&Request::get("/members"), &guest).status(), 401);
//! assert_eq!(app.handle(&Request::get("/ghost"), &guest).status(), 404);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod app;
pub mod auth;
pub mod config;
pub mod registry;
pub mod resource;
pub mod target;
pub mod transaction;

pub use app::{App, AppBuilder, AppError};
