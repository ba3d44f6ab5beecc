//! Application-wide constants.

/// Name used for the binary, config directory, and lock file.
pub const APP_NAME: &str = "wallrus";

/// Application version from Cargo.toml.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable that overrides the configuration file location.
pub const CONFIG_PATH_ENV: &str = "WALLRUS_CONFIG";

/// Environment variable holding the `tracing` filter directive.
pub const LOG_FILTER_ENV: &str = "WALLRUS_LOG";

/// Default time between rotation passes.
pub const DEFAULT_INTERVAL_SECS: u64 = 3600;

/// Longest accepted time between rotation passes (one year).
pub const MAX_INTERVAL_SECS: u64 = 365 * 24 * 60 * 60;

/// Default program used to apply a background to a workspace.
pub const DEFAULT_SETTER_PROGRAM: &str = "bgswitch";
