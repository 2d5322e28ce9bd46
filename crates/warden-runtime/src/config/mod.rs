//! Configuration with hierarchical layering.
//!
//! ```text
//! Priority (highest to lowest):
//!
//! ┌───────────────────────────────────────────┐
//! │  1. Environment Variables (WARDEN_*)      │
//! ├───────────────────────────────────────────┤
//! │  2. Project Config (.warden/config.toml)  │
//! ├───────────────────────────────────────────┤
//! │  3. Global Config (~/.warden/config.toml) │
//! ├───────────────────────────────────────────┤
//! │  4. Default Values                        │
//! └───────────────────────────────────────────┘
//! ```
//!
//! A key present in a file overrides the layers below it, even when it
//! restates the default (`mode = "normal"` cancels a global `install`).
//!
//! # Environment Variables
//!
//! | Variable | Config Field | Type |
//! |----------|--------------|------|
//! | `WARDEN_DEBUG` | `debug` | bool |
//! | `WARDEN_MODE` | `mode` | `normal` \| `install` \| `update` |
//! | `WARDEN_REGISTRY_PATH` | `paths.registry_file` | PathBuf |
//!
//! # Example Configuration
//!
//! ```toml
//! debug = false
//! mode = "normal"
//!
//! [paths]
//! registry_file = "~/.warden/registry.json"
//!
//! [[resources]]
//! resource = "members"
//! resource_class = "MembersOnly"
//! authority_class = "authentication"
//!
//! [database]
//! locator = "postgres://localhost/app"
//! username = "app"
//! password = "secret"
//! ```

mod error;
mod loader;
mod resolver;
mod types;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use resolver::ConfigResolver;
pub use types::{BootMode, ConfigLayer, DatabaseConfig, PathsConfig, WardenConfig};

/// Default global config directory.
pub fn default_config_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".warden")
}

/// Default global config file path.
pub fn default_config_path() -> std::path::PathBuf {
    default_config_dir().join("config.toml")
}

/// Project config directory name.
pub const PROJECT_CONFIG_DIR: &str = ".warden";

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "config.toml";
