//! JSON Schema for the configuration file.

use crate::config::WallrusConfig;

/// Generates a JSON Schema for the Wallrus configuration.
#[must_use]
pub fn generate_schema() -> schemars::Schema { schemars::schema_for!(WallrusConfig) }

/// Generates a pretty-printed JSON Schema string for the Wallrus configuration.
///
/// # Errors
///
/// Returns an error if the schema cannot be serialized.
pub fn generate_schema_json() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&generate_schema())
}
