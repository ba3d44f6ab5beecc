//! Applying a background to a workspace through an external program.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::WorkspaceId;
use crate::error::WallrusError;

/// Placeholder replaced with the workspace number.
const WORKSPACE_PLACEHOLDER: &str = "{workspace}";

/// Placeholder replaced with the image path.
const IMAGE_PLACEHOLDER: &str = "{image}";

/// Applies a background image to a workspace.
pub trait WallpaperSetter {
    /// Sets `image` as the background of `workspace`.
    ///
    /// # Errors
    ///
    /// Returns [`WallrusError::ExternalCall`] if the background could not be applied.
    fn set(&self, workspace: WorkspaceId, image: &Path) -> Result<(), WallrusError>;
}

/// Runs a program such as `bgswitch -w <workspace> set <image>`.
///
/// Arguments are passed directly to the program without a shell, so image
/// paths never need quoting.
#[derive(Debug, Clone)]
pub struct CommandSetter {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandSetter {
    /// Creates a setter from a program and an argument template.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Expands the argument template for one invocation.
    fn render_args(&self, workspace: WorkspaceId, image: &Path) -> Vec<String> {
        let workspace = workspace.to_string();
        let image = image.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace(WORKSPACE_PLACEHOLDER, &workspace).replace(IMAGE_PLACEHOLDER, &image))
            .collect()
    }
}

impl WallpaperSetter for CommandSetter {
    fn set(&self, workspace: WorkspaceId, image: &Path) -> Result<(), WallrusError> {
        let output = Command::new(&self.program)
            .args(self.render_args(workspace, image))
            .output()
            .map_err(|err| {
                WallrusError::ExternalCall(format!(
                    "failed to run {}: {err}",
                    self.program.display()
                ))
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        Err(WallrusError::ExternalCall(if stderr.is_empty() {
            format!("{} exited with {}", self.program.display(), output.status)
        } else {
            format!("{} exited with {}: {stderr}", self.program.display(), output.status)
        }))
    }
}
