//! Configuration types for Wallrus.
//!
//! This module provides the configuration types and loading functionality.
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants::{
    APP_NAME, CONFIG_PATH_ENV, DEFAULT_INTERVAL_SECS, DEFAULT_SETTER_PROGRAM, MAX_INTERVAL_SECS,
};
use crate::platform::path::expand_and_resolve;
use crate::rotation::WorkspaceId;

/// A workspace and the directories its backgrounds come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConfig {
    /// Workspace number, passed to the setter as `{workspace}`.
    pub id: WorkspaceId,

    /// Directories holding the backgrounds for this workspace.
    /// Supports `~` expansion; relative paths resolve against the config file.
    pub paths: Vec<String>,
}

/// How candidate backgrounds are discovered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ListerMode {
    /// Read each directory directly (non-recursive).
    #[default]
    Directory,
    /// Run an external query command per directory.
    Query,
}

/// Candidate discovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ListerConfig {
    /// Discovery strategy: `directory` or `query`.
    pub mode: ListerMode,

    /// In `directory` mode, skip files without a known image extension.
    pub images_only: bool,

    /// Program run in `query` mode.
    pub command: String,

    /// Arguments for the query program. `{dir}` is replaced with each directory.
    pub args: Vec<String>,
}

impl Default for ListerConfig {
    fn default() -> Self {
        Self {
            mode: ListerMode::Directory,
            images_only: true,
            command: "query".to_string(),
            args: vec![
                "-f".to_string(),
                "-v".to_string(),
                "{dir}".to_string(),
                "BEOS:TYPE==image/*".to_string(),
            ],
        }
    }
}

/// External program used to apply a background.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct SetterConfig {
    /// Program name or path. Names are looked up in `PATH` and common install locations.
    pub program: String,

    /// Argument template. `{workspace}` and `{image}` are substituted per call.
    pub args: Vec<String>,
}

impl Default for SetterConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_SETTER_PROGRAM.to_string(),
            args: vec![
                "-w".to_string(),
                "{workspace}".to_string(),
                "set".to_string(),
                "{image}".to_string(),
            ],
        }
    }
}

/// Root configuration structure for Wallrus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct WallrusConfig {
    /// JSON Schema reference for editor support.
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Workspaces to rotate, in the order they are visited each pass.
    pub workspaces: Vec<WorkspaceConfig>,

    /// Seconds between rotation passes. Must be greater than zero.
    pub interval: u64,

    /// Candidate discovery settings.
    pub lister: ListerConfig,

    /// Background setter settings.
    pub setter: SetterConfig,

    /// Lock record path. Empty uses `wallrus.pid` in the system temp directory.
    pub lock_file: String,

    /// Log file path. Empty logs to stdout only.
    pub log_file: String,
}

impl Default for WallrusConfig {
    fn default() -> Self {
        Self {
            schema: None,
            workspaces: Vec::new(),
            interval: DEFAULT_INTERVAL_SECS,
            lister: ListerConfig::default(),
            setter: SetterConfig::default(),
            lock_file: String::new(),
            log_file: String::new(),
        }
    }
}

impl WallrusConfig {
    /// Checks the constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workspaces.is_empty() {
            return Err(ConfigError::Invalid("at least one workspace is required".to_string()));
        }

        let mut seen = HashSet::new();
        for workspace in &self.workspaces {
            if !seen.insert(workspace.id) {
                return Err(ConfigError::Invalid(format!(
                    "workspace {} is configured more than once",
                    workspace.id
                )));
            }
            if workspace.paths.iter().all(|path| path.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "workspace {} has no image paths",
                    workspace.id
                )));
            }
        }

        if self.interval == 0 {
            return Err(ConfigError::Invalid("interval must be greater than zero".to_string()));
        }
        if self.interval > MAX_INTERVAL_SECS {
            return Err(ConfigError::Invalid(format!(
                "interval must be at most {MAX_INTERVAL_SECS} seconds"
            )));
        }

        if self.setter.program.trim().is_empty() {
            return Err(ConfigError::Invalid("setter program cannot be empty".to_string()));
        }

        if self.lister.mode == ListerMode::Query && self.lister.command.trim().is_empty() {
            return Err(ConfigError::Invalid("query mode requires a lister command".to_string()));
        }

        Ok(())
    }

    /// Time between rotation passes.
    #[must_use]
    pub const fn interval(&self) -> Duration { Duration::from_secs(self.interval) }

    /// Resolved image sources per workspace, in configuration order.
    #[must_use]
    pub fn workspace_sources(&self, base_dir: &Path) -> Vec<(WorkspaceId, Vec<PathBuf>)> {
        self.workspaces
            .iter()
            .map(|workspace| {
                let sources = workspace
                    .paths
                    .iter()
                    .filter(|path| !path.trim().is_empty())
                    .map(|path| expand_and_resolve(path, base_dir))
                    .collect();
                (workspace.id, sources)
            })
            .collect()
    }

    /// Resolved lock record path.
    #[must_use]
    pub fn lock_path(&self, base_dir: &Path) -> PathBuf {
        if self.lock_file.trim().is_empty() {
            return default_lock_path();
        }
        expand_and_resolve(&self.lock_file, base_dir)
    }

    /// Resolved log file path, if file logging is enabled.
    #[must_use]
    pub fn log_path(&self, base_dir: &Path) -> Option<PathBuf> {
        if self.log_file.trim().is_empty() {
            return None;
        }
        Some(expand_and_resolve(&self.log_file, base_dir))
    }
}

/// Lock record location used when none is configured.
#[must_use]
pub fn default_lock_path() -> PathBuf { std::env::temp_dir().join(format!("{APP_NAME}.pid")) }

/// Errors that can occur when loading the configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    NotFound,
    /// The configuration file exists but could not be read.
    IoError(std::io::Error),
    /// The configuration file contains invalid JSON.
    ParseError(serde_json::Error),
    /// The configuration file parsed but its values are unusable.
    Invalid(String),
    /// No configuration existed, so a template was written at this path.
    TemplateCreated(PathBuf),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(
                f,
                "No configuration file found. Expected at ~/.config/wallrus/config.jsonc \
                or ~/.wallrus.jsonc"
            ),
            Self::IoError(err) => write!(f, "Failed to read configuration file: {err}"),
            Self::ParseError(err) => write!(f, "Failed to parse configuration file: {err}"),
            Self::Invalid(reason) => write!(f, "Invalid configuration: {reason}"),
            Self::TemplateCreated(path) => write!(
                f,
                "No configuration file found. A template was created at {}; \
                add your workspaces and start again",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoError(err) => Some(err),
            Self::ParseError(err) => Some(err),
            Self::NotFound | Self::Invalid(_) | Self::TemplateCreated(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err) }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self { Self::ParseError(err) }
}

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Configuration file names in the home directory.
const HOME_CONFIG_FILE_NAMES: &[&str] = &[".wallrus.jsonc", ".wallrus.json"];

/// Returns the possible configuration file paths in priority order.
///
/// The function checks the following locations:
/// 1. `$WALLRUS_CONFIG`, if set
/// 2. `$XDG_CONFIG_HOME/wallrus/config.jsonc` or `config.json`
/// 3. `~/.config/wallrus/config.jsonc` or `config.json`
/// 4. The platform config directory (`dirs::config_dir()`) under `wallrus/`
/// 5. `~/.wallrus.jsonc` or `~/.wallrus.json`
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(custom) = std::env::var(CONFIG_PATH_ENV)
        && !custom.trim().is_empty()
    {
        paths.push(crate::platform::path::expand(&custom));
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        push_dir(PathBuf::from(xdg_config).join(APP_NAME), &mut paths);
    }

    if let Some(home) = dirs::home_dir() {
        push_dir(home.join(".config").join(APP_NAME), &mut paths);
    }

    if let Some(config_dir) = dirs::config_dir() {
        push_dir(config_dir.join(APP_NAME), &mut paths);
    }

    if let Some(home) = dirs::home_dir() {
        for filename in HOME_CONFIG_FILE_NAMES {
            paths.push(home.join(filename));
        }
    }

    paths
}

fn push_dir(dir: PathBuf, paths: &mut Vec<PathBuf>) {
    for filename in CONFIG_FILE_NAMES {
        let path = dir.join(filename);
        // XDG_CONFIG_HOME is often ~/.config itself
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
}

/// Loads the configuration from the first available config file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists in any of the expected locations.
/// Returns `ConfigError::IoError` if a configuration file exists but could not be read.
/// Returns `ConfigError::ParseError` if the configuration file contains invalid JSON.
pub fn load_config() -> Result<(WallrusConfig, PathBuf), ConfigError> {
    for path in config_paths() {
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    Err(ConfigError::NotFound)
}

/// Loads the configuration from a specific file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist, `ConfigError::IoError`
/// if it cannot be read, and `ConfigError::ParseError` if it is not valid JSONC.
pub fn load_config_from_path(path: &Path) -> Result<(WallrusConfig, PathBuf), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }

    let file = fs::File::open(path)?;
    // Strip comments from JSONC before parsing
    let reader = json_comments::StripComments::new(file);
    let config: WallrusConfig = serde_json::from_reader(reader)?;
    Ok((config, path.to_path_buf()))
}
