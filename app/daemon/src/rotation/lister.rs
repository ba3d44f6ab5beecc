//! Candidate discovery for workspace pools.
//!
//! A [`Lister`] turns the image sources configured for a workspace into an
//! ordered list of backgrounds. Two strategies exist: a plain directory scan
//! and an external query command.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use natord::compare;

use crate::error::WallrusError;

/// Supported image file extensions.
const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff"];

/// Placeholder replaced with the directory being queried.
const DIR_PLACEHOLDER: &str = "{dir}";

/// Produces the candidates for one workspace.
pub trait Lister {
    /// Lists candidate backgrounds found in `sources`, in a stable order.
    ///
    /// An empty result is not an error; it means the sources hold nothing usable.
    ///
    /// # Errors
    ///
    /// Returns [`WallrusError::ExternalCall`] if the sources could not be read.
    fn list(&self, sources: &[PathBuf]) -> Result<Vec<PathBuf>, WallrusError>;
}

/// Checks if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Scans each source directory (non-recursively) for regular files.
#[derive(Debug, Clone, Copy)]
pub struct DirectoryLister {
    images_only: bool,
}

impl DirectoryLister {
    /// Creates a directory lister.
    ///
    /// When `images_only` is set, files without a known image extension are skipped.
    #[must_use]
    pub const fn new(images_only: bool) -> Self { Self { images_only } }

    fn list_directory(&self, dir: &Path) -> Result<Vec<PathBuf>, WallrusError> {
        if !dir.is_dir() {
            tracing::warn!(dir = %dir.display(), "image source is not a directory, skipping");
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(dir).map_err(|err| {
            WallrusError::ExternalCall(format!("failed to read {}: {err}", dir.display()))
        })?;

        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| !self.images_only || is_supported_image(path))
            .collect();

        // Natural ordering keeps "img2" ahead of "img10"
        files.sort_by(|a, b| compare(a.to_string_lossy().as_ref(), b.to_string_lossy().as_ref()));
        Ok(files)
    }
}

impl Default for DirectoryLister {
    fn default() -> Self { Self::new(true) }
}

impl Lister for DirectoryLister {
    fn list(&self, sources: &[PathBuf]) -> Result<Vec<PathBuf>, WallrusError> {
        let mut candidates = Vec::new();
        for dir in sources {
            candidates.extend(self.list_directory(dir)?);
        }
        Ok(candidates)
    }
}

/// Runs an external query command per source directory.
///
/// Each output line is a candidate path; lines that do not live inside the
/// queried directory are dropped, since attribute queries search the whole
/// volume.
#[derive(Debug, Clone)]
pub struct QueryLister {
    program: PathBuf,
    args: Vec<String>,
}

impl QueryLister {
    /// Creates a query lister. `{dir}` in `args` is replaced with each source directory.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn query_directory(&self, dir: &Path) -> Result<Vec<PathBuf>, WallrusError> {
        let dir_str = dir.to_string_lossy();
        let args: Vec<String> =
            self.args.iter().map(|arg| arg.replace(DIR_PLACEHOLDER, &dir_str)).collect();

        let output = Command::new(&self.program).args(&args).output().map_err(|err| {
            WallrusError::ExternalCall(format!("failed to run {}: {err}", self.program.display()))
        })?;

        if !output.status.success() {
            // Queries without matches exit non-zero on some systems; use whatever was printed.
            tracing::debug!(
                dir = %dir.display(),
                status = %output.status,
                "query command exited unsuccessfully"
            );
        }

        let prefix = directory_prefix(&dir_str);
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with(&prefix))
            .map(PathBuf::from)
            .collect())
    }
}

impl Lister for QueryLister {
    fn list(&self, sources: &[PathBuf]) -> Result<Vec<PathBuf>, WallrusError> {
        let mut candidates = Vec::new();
        for dir in sources {
            candidates.extend(self.query_directory(dir)?);
        }
        Ok(candidates)
    }
}

/// Returns `dir` with exactly one trailing slash.
fn directory_prefix(dir: &str) -> String {
    if dir.ends_with('/') {
        dir.to_string()
    } else {
        format!("{dir}/")
    }
}
