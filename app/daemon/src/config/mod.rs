//! Configuration module for Wallrus.
//!
//! This module provides configuration types, loading, validation, and the
//! template written on first run.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

pub mod template;
pub mod types;

use std::path::{Path, PathBuf};

pub use types::{
    ConfigError, ListerConfig, ListerMode, SetterConfig, WallrusConfig, WorkspaceConfig,
    config_paths, default_lock_path, load_config, load_config_from_path,
};

/// A validated configuration together with the directory relative paths resolve against.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The parsed configuration.
    pub config: WallrusConfig,
    /// The file it was read from.
    pub path: PathBuf,
}

impl LoadedConfig {
    /// Directory containing the configuration file.
    #[must_use]
    pub fn base_dir(&self) -> &Path { self.path.parent().unwrap_or_else(|| Path::new(".")) }
}

/// Loads and validates the configuration for starting the daemon.
///
/// If no configuration file exists, a template is written to the preferred
/// location and `ConfigError::TemplateCreated` is returned so the caller can
/// point the user at it.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated,
/// or if none existed.
pub fn load_for_start() -> Result<LoadedConfig, ConfigError> {
    match load_config() {
        Ok((config, path)) => {
            config.validate()?;
            tracing::debug!(path = %path.display(), "loaded configuration");
            Ok(LoadedConfig { config, path })
        }
        Err(ConfigError::NotFound) => Err(create_default_config_file()),
        Err(err) => Err(err),
    }
}

/// Loads the configuration for contacting a running daemon.
///
/// Only the lock record location matters here, so a missing file falls back
/// to the defaults and no validation is performed.
///
/// # Errors
///
/// Returns a `ConfigError` if a configuration file exists but cannot be read or parsed.
pub fn load_for_control() -> Result<LoadedConfig, ConfigError> {
    match load_config() {
        Ok((config, path)) => Ok(LoadedConfig { config, path }),
        Err(ConfigError::NotFound) => Ok(LoadedConfig {
            config: WallrusConfig::default(),
            path: std::env::current_dir().unwrap_or_default().join("config.jsonc"),
        }),
        Err(err) => Err(err),
    }
}

/// Writes a template configuration file at the preferred location.
///
/// Returns the error describing the outcome for the caller to report.
fn create_default_config_file() -> ConfigError {
    let Some(config_path) = config_paths().into_iter().next() else {
        return ConfigError::NotFound;
    };

    match template::create_config_file(&config_path) {
        Ok(()) => {
            tracing::info!(path = %config_path.display(), "created default configuration file");
            ConfigError::TemplateCreated(config_path)
        }
        Err(err) => {
            tracing::debug!(
                error = %err,
                path = %config_path.display(),
                "failed to create default configuration file"
            );
            ConfigError::NotFound
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = ConfigError::NotFound;
        let msg = err.to_string();
        assert!(msg.contains("No configuration file found"));
    }

    #[test]
    fn test_loaded_config_base_dir() {
        let loaded = LoadedConfig {
            config: WallrusConfig::default(),
            path: PathBuf::from("/home/u/.config/wallrus/config.jsonc"),
        };
        assert_eq!(loaded.base_dir(), Path::new("/home/u/.config/wallrus"));
    }

    #[test]
    fn test_shared_types_are_available() {
        let lister = ListerConfig::default();
        assert_eq!(lister.mode, ListerMode::Directory);

        let setter = SetterConfig::default();
        assert_eq!(setter.program, "bgswitch");
    }
}
