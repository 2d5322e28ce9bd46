//! Final configuration resolution.
//!
//! ```text
//! ConfigLoader.load()  →  WardenConfig (files + env)
//!                              │
//!                              ▼
//!               frontend overrides (CLI flags)
//!                              │
//!                              ▼
//!                     WardenConfig (final)
//! ```

use super::{ConfigError, ConfigLoader, WardenConfig};

/// Produces the configuration an application is built from.
///
/// Frontends implement this to layer their own overrides on top of
/// [`ConfigLoader`].
pub trait ConfigResolver {
    /// Loads and returns the final configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if loading fails.
    fn resolve(&self) -> Result<WardenConfig, ConfigError>;
}

impl ConfigResolver for ConfigLoader {
    fn resolve(&self) -> Result<WardenConfig, ConfigError> {
        self.load()
    }
}
