//! Errors raised while loading configuration.

use std::path::PathBuf;
use thiserror::Error;

/// A configuration layer could not be loaded.
///
/// Missing files are not errors; only files that exist but cannot be read
/// or parsed, and malformed `WARDEN_*` variables, are reported.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file exists but could not be read.
    #[error("cannot read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config file is not valid TOML for [`ConfigLayer`](super::ConfigLayer).
    #[error("invalid config in {}: {source}", path.display())]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A `WARDEN_*` variable holds a value its field cannot take.
    #[error("{name}: {message}")]
    InvalidEnvVar { name: String, message: String },
}

impl ConfigError {
    pub(super) fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    pub(super) fn parse_toml(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::ParseToml {
            path: path.into(),
            source,
        }
    }

    pub(super) fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }

    /// The file the error is about, if any.
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::ReadFile { path, .. } | Self::ParseToml { path, .. } => Some(path),
            Self::InvalidEnvVar { .. } => None,
        }
    }
}
