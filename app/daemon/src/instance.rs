//! Single-instance guard.
//!
//! A running daemon owns a lock record: a file holding its PID as plain text.
//! The record is created exclusively, so a second `--start` fails while it
//! exists, and `--next` reads it to find the process to signal.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;

use crate::error::WallrusError;

/// Exclusive ownership of the lock record. The file is removed on release or drop.
#[derive(Debug)]
pub struct LockRecord {
    path: PathBuf,
    pid: u32,
    released: bool,
}

impl LockRecord {
    /// Creates the lock record and writes the current PID into it.
    ///
    /// # Errors
    ///
    /// Returns `WallrusError::AlreadyRunning` if the record already exists, or
    /// `WallrusError::IoError` if it cannot be written.
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self, WallrusError> {
        let path = path.into();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                return Err(WallrusError::AlreadyRunning { path });
            }
            Err(err) => return Err(err.into()),
        };

        let pid = std::process::id();
        let record = Self {
            path,
            pid,
            released: false,
        };
        // Dropping `record` on a failed write removes the partial file
        writeln!(file, "{pid}")?;
        file.sync_all()?;

        tracing::debug!(path = %record.path.display(), pid, "acquired lock record");
        Ok(record)
    }

    /// Location of the record.
    #[must_use]
    pub fn path(&self) -> &Path { &self.path }

    /// PID written into the record.
    #[must_use]
    pub const fn pid(&self) -> u32 { self.pid }

    /// Removes the record. Succeeds if it is already gone.
    ///
    /// # Errors
    ///
    /// Returns `WallrusError::IoError` if the file exists but cannot be removed.
    pub fn release(mut self) -> Result<(), WallrusError> {
        self.released = true;
        remove_if_present(&self.path)?;
        tracing::debug!(path = %self.path.display(), "released lock record");
        Ok(())
    }
}

impl Drop for LockRecord {
    fn drop(&mut self) {
        if !self.released {
            let _ = remove_if_present(&self.path);
        }
    }
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

/// Removes the lock record from a panic hook.
///
/// Release builds may abort on panic without running destructors, so the
/// record is also cleaned up before the previous hook runs.
pub fn release_on_panic(path: &Path) {
    let path = path.to_path_buf();
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = remove_if_present(&path);
        previous(info);
    }));
}

/// Reads the PID stored in the lock record at `path`.
///
/// # Errors
///
/// Returns `WallrusError::NotRunning` if there is no record, and
/// `WallrusError::InvalidLockRecord` if its content is not a positive integer.
pub fn read_pid(path: &Path) -> Result<i32, WallrusError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(WallrusError::NotRunning {
                path: path.to_path_buf(),
            });
        }
        Err(err) => return Err(err.into()),
    };

    let invalid = |reason: String| WallrusError::InvalidLockRecord {
        path: path.to_path_buf(),
        reason,
    };

    let pid: i32 = content
        .trim()
        .parse()
        .map_err(|_| invalid(format!("'{}' is not a process id", content.trim())))?;

    if pid <= 0 {
        return Err(invalid(format!("{pid} is not a valid process id")));
    }

    Ok(pid)
}

/// Sends the advance signal (`SIGUSR1`) to `pid`.
///
/// # Errors
///
/// Returns `WallrusError::StaleLockRecord` if the process does not exist, or
/// `WallrusError::SignalError` if delivery fails for another reason.
pub fn signal_advance(path: &Path, pid: i32) -> Result<(), WallrusError> {
    match kill(Pid::from_raw(pid), Signal::SIGUSR1) {
        Ok(()) => Ok(()),
        Err(Errno::ESRCH) => Err(WallrusError::StaleLockRecord {
            path: path.to_path_buf(),
            pid,
        }),
        Err(errno) => Err(WallrusError::SignalError(format!(
            "failed to signal process {pid}: {errno}"
        ))),
    }
}

/// Asks the daemon owning the record at `path` to rotate now.
///
/// Returns once the signal is delivered, without waiting for the rotation.
///
/// # Errors
///
/// Propagates the errors of [`read_pid`] and [`signal_advance`].
pub fn request_advance(path: &Path) -> Result<i32, WallrusError> {
    let pid = read_pid(path)?;
    signal_advance(path, pid)?;
    Ok(pid)
}
