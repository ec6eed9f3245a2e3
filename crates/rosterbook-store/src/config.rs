// ABOUTME: Environment-driven configuration for the rosterbook data directory.
// ABOUTME: Reads ROSTERBOOK_HOME with a home-directory default, validating emptiness.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ROSTERBOOK_HOME is set but empty")]
    EmptyHome,
}

/// Store configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub home: PathBuf,
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// - ROSTERBOOK_HOME: data directory (default: ~/.rosterbook, falling
    ///   back to /tmp/.rosterbook when HOME is unset)
    pub fn from_env() -> Result<Self, ConfigError> {
        let home = match std::env::var("ROSTERBOOK_HOME") {
            Ok(value) if value.trim().is_empty() => return Err(ConfigError::EmptyHome),
            Ok(value) => PathBuf::from(value),
            Err(_) => std::env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/tmp"))
                .join(".rosterbook"),
        };

        Ok(Self { home })
    }
}
