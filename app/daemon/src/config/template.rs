//! Configuration template generation.
//!
//! Generates a commented configuration template with all available options.

use std::fs;
use std::path::Path;

/// Generates a configuration template.
///
/// The template defines one example workspace and documents every other
/// option, commented out at its default value.
#[must_use]
pub fn generate_config_template() -> String {
    r#"// Wallrus Configuration File
// ===========================
// This file uses JSONC format (JSON with comments).
// Options that are commented out show their default values.

{
  // ============================================================================
  // Workspaces
  // ============================================================================
  // Each workspace gets its own background, picked at random from its
  // directories without repeats until every image has been shown once.
  // Paths support "~" and resolve relative to this file.
  "workspaces": [
    { "id": 1, "paths": ["~/Pictures/Wallpapers"] }
    // { "id": 2, "paths": ["~/Pictures/astronomy", "~/Pictures/landscapes"] }
  ],

  // Seconds between rotations
  // "interval": 3600,

  // ============================================================================
  // Finding backgrounds
  // ============================================================================
  // "lister": {
  //   // "directory" reads each directory; "query" runs the command below
  //   "mode": "directory",
  //
  //   // In directory mode, only consider files with an image extension
  //   "imagesOnly": true,
  //
  //   // Query mode: program and arguments. {dir} is replaced with each directory
  //   "command": "query",
  //   "args": ["-f", "-v", "{dir}", "BEOS:TYPE==image/*"]
  // },

  // ============================================================================
  // Applying backgrounds
  // ============================================================================
  // "setter": {
  //   "program": "bgswitch",
  //   // {workspace} and {image} are replaced on every call
  //   "args": ["-w", "{workspace}", "set", "{image}"]
  // },

  // ============================================================================
  // Files
  // ============================================================================
  // PID file used to detect a running daemon. Empty uses the temp directory.
  // "lockFile": "",

  // Also write logs to this file. Empty logs to stdout only.
  // "logFile": ""
}
"#
    .to_string()
}

/// Writes the template to `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if the directory or the file cannot be written.
pub fn create_config_file(path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, generate_config_template())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{WallrusConfig, load_config_from_path};

    #[test]
    fn test_generate_config_template_is_valid_jsonc() {
        let template = generate_config_template();
        let reader = json_comments::StripComments::new(template.as_bytes());
        let config: WallrusConfig = serde_json::from_reader(reader).unwrap();
        assert_eq!(config.workspaces.len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generate_config_template_documents_all_sections() {
        let template = generate_config_template();
        assert!(template.contains("\"interval\""));
        assert!(template.contains("\"lister\""));
        assert!(template.contains("\"setter\""));
        assert!(template.contains("\"lockFile\""));
        assert!(template.contains("\"logFile\""));
    }

    #[test]
    fn test_create_config_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("wallrus").join("config.jsonc");

        create_config_file(&path).unwrap();

        let (config, _) = load_config_from_path(&path).unwrap();
        assert_eq!(config.interval, 3600);
    }
}
