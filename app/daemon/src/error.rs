//! Error types for Wallrus.
//!
//! This module provides the unified error type used by the CLI, the
//! single-instance guard, and the rotation core. Daemon-loop errors are
//! logged and recovered locally; only the CLI maps errors to exit codes.

use std::path::PathBuf;

use thiserror::Error;

use crate::rotation::WorkspaceId;

/// Errors that can occur during application execution.
#[derive(Debug, Error)]
pub enum WallrusError {
    /// A lock record already exists, so another daemon is assumed to be running.
    #[error("{} exists. Delete the file if wallrus is not running", .path.display())]
    AlreadyRunning { path: PathBuf },

    /// No lock record exists, so no daemon is assumed to be running.
    #[error("wallrus doesn't appear to be running. {} not found", .path.display())]
    NotRunning { path: PathBuf },

    /// The lock record exists but does not contain a usable process id.
    #[error("Invalid lock record at {}: {reason}", .path.display())]
    InvalidLockRecord { path: PathBuf, reason: String },

    /// The lock record names a process that no longer exists.
    #[error(
        "Stale lock record at {}: process {pid} is not running. Delete the file and try again",
        .path.display()
    )]
    StaleLockRecord { path: PathBuf, pid: i32 },

    /// A workspace produced no candidates after a refill.
    #[error("No backgrounds for workspace {0}")]
    EmptyWorkspace(WorkspaceId),

    /// The lister or the wallpaper setter failed.
    #[error("External call failed: {0}")]
    ExternalCall(String),

    /// Invalid command-line invocation.
    #[error("{0}")]
    InvalidArguments(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Signal delivery or registration failed.
    #[error("Signal error: {0}")]
    SignalError(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(String),
}

impl WallrusError {
    /// Process exit code used when this error ends a CLI invocation.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::AlreadyRunning { .. } => 2,
            _ => 1,
        }
    }
}

impl From<std::io::Error> for WallrusError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err.to_string()) }
}

impl From<serde_json::Error> for WallrusError {
    fn from(err: serde_json::Error) -> Self { Self::ConfigError(err.to_string()) }
}

impl From<crate::config::ConfigError> for WallrusError {
    fn from(err: crate::config::ConfigError) -> Self { Self::ConfigError(err.to_string()) }
}
