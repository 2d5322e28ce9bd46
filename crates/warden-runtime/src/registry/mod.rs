//! Class registry and the sleep/wakeup object lifecycle.
//!
//! # Overview
//!
//! ```text
//! App
//!  └── ClassRegistry
//!        ├── factories   "Delegate::wakeup" → Delegate::wakeup
//!        ├── recipes     "Delegate" → { path, method }
//!        └── instances   "Delegate" → Arc<Delegate>
//!                               ▲
//!        RegistryStore ─────────┘ recipes only (snapshot / restore)
//! ```
//!
//! Singleton-per-class state (the delegate, the system agent, cached
//! resources) lives here instead of in global statics.

mod class_registry;
mod error;
mod object;
mod store;

pub use class_registry::ClassRegistry;
pub use error::RegistryError;
pub use object::{CacheClass, CacheObject, Instance, SleepError, WakeupContext, WakeupError};
pub use store::{
    default_registry_path, ClassRecipe, LocalFileStore, MemoryStore, RegistrySnapshot,
    RegistryStore, StoreError,
};

pub(crate) use store::{ensure_parent_dir, expand_tilde, write_atomic};
