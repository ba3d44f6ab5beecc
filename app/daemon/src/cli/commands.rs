//! CLI definition and command execution.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::{ArgGroup, CommandFactory, Parser};
use colored::Colorize;

use crate::config::{ConfigError, LoadedConfig};
use crate::constants::{APP_NAME, APP_VERSION};
use crate::error::WallrusError;
use crate::{config, daemon, instance, logging, schema};

/// Wallrus - rotates desktop backgrounds across workspaces.
///
/// Start the daemon with `-s`; send `-n` from a hotkey or script to switch
/// every workspace to its next background right away.
#[derive(Parser, Debug)]
#[command(name = APP_NAME, version = APP_VERSION, about, long_about = None)]
#[command(override_usage = "wallrus [-n | -s]")]
#[command(group(ArgGroup::new("action").args(["next", "start", "schema"])))]
pub struct Cli {
    /// Switch the running daemon to the next backgrounds.
    #[arg(short = 'n', long)]
    next: bool,

    /// Start the rotation daemon.
    #[arg(short = 's', long)]
    start: bool,

    /// Print the configuration file JSON Schema.
    #[arg(long)]
    schema: bool,
}

/// What a parsed command line asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Run the daemon in the foreground.
    Start,
    /// Signal the running daemon to switch backgrounds.
    Next,
    /// Print the configuration JSON Schema.
    Schema,
    /// No flag given.
    Help,
}

impl Cli {
    /// The requested action.
    #[must_use]
    pub const fn action(&self) -> Action {
        if self.start {
            Action::Start
        } else if self.next {
            Action::Next
        } else if self.schema {
            Action::Schema
        } else {
            Action::Help
        }
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon cannot be started, or if the
    /// configuration cannot be read.
    pub fn execute(&self) -> Result<(), WallrusError> {
        match self.action() {
            Action::Start => {
                let loaded = config::load_for_start()?;
                logging::init(loaded.config.log_path(loaded.base_dir()).as_deref());
                daemon::start(&loaded)
            }

            Action::Next => {
                let mut stdout = io::stdout();
                let lock_path = control_lock_path(config::load_for_control(), &mut stdout)?;
                advance(&lock_path, &mut stdout)?;
                Ok(())
            }

            Action::Schema => {
                println!("{}", schema::generate_schema_json()?);
                Ok(())
            }

            Action::Help => print_help(),
        }
    }
}

/// Parses `args` (including the program name) into a [`Cli`].
///
/// Returns `Ok(None)` when clap already handled the request, as for
/// `--help` and `--version`.
///
/// # Errors
///
/// Returns `WallrusError::InvalidArguments` with the message and usage to
/// print when the arguments are malformed.
pub fn parse<I, T>(args: I) -> Result<Option<Cli>, WallrusError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    validate_arg_shape(args.get(1..).unwrap_or_default())?;

    match Cli::try_parse_from(&args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.print()?;
            Ok(None)
        }
        Err(err) => Err(WallrusError::InvalidArguments(err.render().to_string())),
    }
}

/// Rejects invocations with more than one argument, and single arguments
/// longer than a short flag that are not long flags, such as `-sn`.
///
/// # Errors
///
/// Returns `WallrusError::InvalidArguments` with the message and usage to print.
pub fn validate_arg_shape(args: &[OsString]) -> Result<(), WallrusError> {
    let malformed = match args {
        [] => false,
        [single] => {
            let arg = single.to_string_lossy();
            !arg.starts_with("--") && arg.chars().count() > 2
        }
        _ => true,
    };

    if malformed {
        return Err(usage_error("Too many arguments"));
    }
    Ok(())
}

fn usage_error(reason: &str) -> WallrusError {
    let usage = Cli::command().render_usage();
    WallrusError::InvalidArguments(format!("{} {reason}\n\n{usage}", "Error:".red().bold()))
}

fn print_help() -> Result<(), WallrusError> {
    Cli::command().print_help()?;
    Ok(())
}

/// Picks the lock record `--next` signals through.
///
/// A configuration that cannot be loaded is reported to `out` and the
/// default location is used instead.
///
/// # Errors
///
/// Returns an error only if writing to `out` fails.
pub fn control_lock_path(
    loaded: Result<LoadedConfig, ConfigError>,
    out: &mut impl Write,
) -> io::Result<PathBuf> {
    match loaded {
        Ok(loaded) => Ok(loaded.config.lock_path(loaded.base_dir())),
        Err(err) => {
            let fallback = config::default_lock_path();
            writeln!(
                out,
                "{} {err}. Using {}",
                "Warning:".yellow().bold(),
                fallback.display()
            )?;
            Ok(fallback)
        }
    }
}

/// Asks the daemon owning `lock_path` to advance, reporting progress to `out`.
///
/// Failures to reach the daemon are reported, not returned: `--next` is bound
/// to hotkeys and should never fail loudly.
///
/// # Errors
///
/// Returns an error only if writing to `out` fails.
pub fn advance(lock_path: &Path, out: &mut impl Write) -> io::Result<()> {
    let pid = match instance::read_pid(lock_path) {
        Ok(pid) => pid,
        Err(err) => return writeln!(out, "{}", err.to_string().red()),
    };

    write!(out, "Switching ....")?;
    out.flush()?;

    match instance::signal_advance(lock_path, pid) {
        Ok(()) => writeln!(out, " {}", "done".green()),
        Err(err) => {
            writeln!(out)?;
            writeln!(out, "{}", err.to_string().red())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn advance_output(lock_path: &Path) -> String {
        colored::control::set_override(false);
        let mut out = Vec::new();
        advance(lock_path, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    // ========================================================================
    // CLI parsing tests
    // ========================================================================

    #[test]
    fn test_cli_parses_start() {
        let cli = parse(["wallrus", "-s"]).unwrap().unwrap();
        assert_eq!(cli.action(), Action::Start);

        let cli = parse(["wallrus", "--start"]).unwrap().unwrap();
        assert_eq!(cli.action(), Action::Start);
    }

    #[test]
    fn test_cli_parses_next() {
        let cli = parse(["wallrus", "-n"]).unwrap().unwrap();
        assert_eq!(cli.action(), Action::Next);

        let cli = parse(["wallrus", "--next"]).unwrap().unwrap();
        assert_eq!(cli.action(), Action::Next);
    }

    #[test]
    fn test_cli_parses_schema() {
        let cli = parse(["wallrus", "--schema"]).unwrap().unwrap();
        assert_eq!(cli.action(), Action::Schema);
    }

    #[test]
    fn test_cli_without_arguments_shows_help() {
        let cli = parse(["wallrus"]).unwrap().unwrap();
        assert_eq!(cli.action(), Action::Help);
    }

    #[test]
    fn test_cli_rejects_two_arguments() {
        let err = parse(["wallrus", "-s", "-n"]).unwrap_err();
        assert!(matches!(err, WallrusError::InvalidArguments(_)));
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("Too many arguments"));
        assert!(err.to_string().contains("wallrus [-n | -s]"));
    }

    #[test]
    fn test_cli_rejects_combined_short_flags() {
        let err = parse(["wallrus", "-sn"]).unwrap_err();
        assert!(err.to_string().contains("Too many arguments"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_cli_rejects_unknown_flag() {
        let err = parse(["wallrus", "--bogus"]).unwrap_err();
        assert!(matches!(err, WallrusError::InvalidArguments(_)));
        assert!(err.to_string().contains("--bogus"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_cli_rejects_positional_argument() {
        let err = parse(["wallrus", "start"]).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_validate_arg_shape() {
        let args = |values: &[&str]| values.iter().map(OsString::from).collect::<Vec<_>>();

        assert!(validate_arg_shape(&args(&[])).is_ok());
        assert!(validate_arg_shape(&args(&["-s"])).is_ok());
        assert!(validate_arg_shape(&args(&["--start"])).is_ok());
        assert!(validate_arg_shape(&args(&["-sn"])).is_err());
        assert!(validate_arg_shape(&args(&["-s", "-n"])).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() { Cli::command().debug_assert(); }

    // ========================================================================
    // advance tests
    // ========================================================================

    #[test]
    fn test_advance_without_daemon_reports_not_running() {
        let dir = tempfile::tempdir().unwrap();
        let lock_path = dir.path().join("wallrus.pid");

        let text = advance_output(&lock_path);
        assert!(text.contains("doesn't appear to be running"));
        assert!(!text.contains("Switching"));
    }

    #[test]
    fn test_advance_with_stale_record_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let lock_path = dir.path().join("wallrus.pid");
        fs::write(&lock_path, i32::MAX.to_string()).unwrap();

        let text = advance_output(&lock_path);
        assert!(text.starts_with("Switching ...."));
        assert!(text.contains("is not running"));
        assert!(!text.contains("done"));
    }

    #[test]
    fn test_advance_with_invalid_record_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let lock_path = dir.path().join("wallrus.pid");
        fs::write(&lock_path, "garbage").unwrap();

        assert!(advance_output(&lock_path).contains("Invalid lock record"));
    }

    // ========================================================================
    // control_lock_path tests
    // ========================================================================

    #[test]
    fn test_control_lock_path_uses_configured_record() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = LoadedConfig {
            config: config::WallrusConfig {
                lock_file: "run/wallrus.pid".to_string(),
                ..Default::default()
            },
            path: dir.path().join("config.jsonc"),
        };

        let mut out = Vec::new();
        let path = control_lock_path(Ok(loaded), &mut out).unwrap();
        assert_eq!(path, dir.path().join("run/wallrus.pid"));
        assert!(out.is_empty());
    }

    #[test]
    fn test_control_lock_path_falls_back_on_broken_config() {
        colored::control::set_override(false);
        let broken = Err(ConfigError::Invalid("expected value at line 3".to_string()));

        let mut out = Vec::new();
        let path = control_lock_path(broken, &mut out).unwrap();

        assert_eq!(path, config::default_lock_path());
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Warning: Invalid configuration: expected value at line 3"));
    }

    #[test]
    fn test_next_with_broken_config_does_not_fail() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.jsonc");
        fs::write(&config_path, "{ not json").unwrap();

        let broken = config::load_config_from_path(&config_path)
            .map(|(config, path)| LoadedConfig { config, path });
        assert!(broken.is_err());

        let mut out = Vec::new();
        let lock_path = control_lock_path(broken, &mut out).unwrap();
        assert!(advance(&lock_path, &mut out).is_ok());
    }
}
