//! CLI module for Wallrus.
//!
//! One binary serves both roles: `wallrus -s` runs the daemon in the
//! foreground and `wallrus -n` signals it to switch backgrounds.

mod commands;

pub use commands::{Action, Cli, advance, control_lock_path, parse, validate_arg_shape};

use crate::error::WallrusError;

/// Runs the CLI with the process arguments.
///
/// # Errors
///
/// Returns an error if the arguments are malformed or the command fails;
/// use [`WallrusError::exit_code`] for the process status.
pub fn run() -> Result<(), WallrusError> { run_from(std::env::args_os()) }

/// Runs the CLI with explicit arguments, including the program name.
///
/// # Errors
///
/// See [`run`].
pub fn run_from<I, T>(args: I) -> Result<(), WallrusError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    match parse(args)? {
        Some(cli) => cli.execute(),
        None => Ok(()),
    }
}
