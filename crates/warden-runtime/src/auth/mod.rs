//! Runtime side of the access-control model.
//!
//! The traits live in `warden-auth`; this module holds the concrete
//! [`Delegate`] and the singleton agents, all cached in the class registry.

mod agent;
mod delegate;

pub use agent::{GuestAgent, SystemAgent};
pub use delegate::{Delegate, DelegateEntry, DelegateRecord, DelegateSnapshot, GrantRecord};
