//! Locating external programs such as the background setter.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::WallrusError;

/// Environment variable with extra colon-separated search directories.
const EXTRA_PATHS_ENV: &str = "WALLRUS_EXTRA_PATHS";

/// Resolves the absolute path to an executable.
///
/// Paths containing a separator are checked as given. Bare names are searched
/// for, in order, in:
/// 1. Directories listed in `WALLRUS_EXTRA_PATHS` (colon-separated).
/// 2. The current process `PATH`.
/// 3. Common install locations that a daemon started from a login item may
///    not have on its `PATH`.
///
/// # Errors
///
/// Returns `WallrusError::ConfigError` if the program cannot be found or is not executable.
pub fn resolve_binary(binary: &str) -> Result<PathBuf, WallrusError> {
    let binary = binary.trim();
    if binary.is_empty() {
        return Err(WallrusError::ConfigError("Program name cannot be empty".to_string()));
    }

    if binary.contains('/') {
        let candidate = crate::platform::path::expand(binary);
        return if is_executable(&candidate) {
            Ok(candidate)
        } else {
            Err(WallrusError::ConfigError(format!(
                "Program at {} is not executable",
                candidate.display()
            )))
        };
    }

    search_paths()
        .into_iter()
        .filter(|directory| !directory.as_os_str().is_empty())
        .map(|directory| directory.join(binary))
        .find(|candidate| is_executable(candidate))
        .ok_or_else(|| {
            WallrusError::ConfigError(format!(
                "Unable to locate executable '{binary}' in known search paths"
            ))
        })
}

fn search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(extra) = env::var(EXTRA_PATHS_ENV) {
        paths.extend(extra.split(':').map(PathBuf::from));
    }

    if let Some(path_var) = env::var_os("PATH") {
        paths.extend(env::split_paths(&path_var));
    }

    paths.extend([
        PathBuf::from("/usr/local/bin"),
        PathBuf::from("/opt/homebrew/bin"),
        PathBuf::from("/boot/home/config/non-packaged/bin"),
        PathBuf::from("/boot/system/bin"),
    ]);

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".cargo/bin"));
        paths.push(home.join(".local/bin"));
    }

    paths
}

fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };

    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_binary_rejects_empty_name() {
        assert!(matches!(resolve_binary("  "), Err(WallrusError::ConfigError(_))));
    }

    #[test]
    fn test_resolve_binary_finds_system_binary() {
        if cfg!(unix) {
            let path = resolve_binary("sh").unwrap();
            assert!(path.is_absolute());
            assert!(path.ends_with("sh"));
        }
    }

    #[test]
    fn test_resolve_binary_accepts_explicit_path() {
        if cfg!(unix) {
            assert_eq!(resolve_binary("/bin/sh").unwrap(), PathBuf::from("/bin/sh"));
        }
    }

    #[test]
    fn test_resolve_binary_rejects_non_executable_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = resolve_binary(&file.path().to_string_lossy());
        assert!(matches!(result, Err(WallrusError::ConfigError(_))));
    }

    #[test]
    fn test_resolve_binary_fails_for_nonexistent() {
        let result = resolve_binary("nonexistent_binary_12345");
        assert!(result.unwrap_err().to_string().contains("nonexistent_binary_12345"));
    }
}
