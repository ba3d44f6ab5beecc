//! Wallrus - rotates desktop backgrounds across workspaces.
//!
//! `wallrus -s` runs the rotation daemon; `wallrus -n` tells a running
//! daemon to switch to the next backgrounds immediately.

use wallrus_lib::error::WallrusError;

fn main() {
    if let Err(err) = wallrus_lib::cli::run() {
        match err {
            WallrusError::InvalidArguments(_) => eprintln!("{err}"),
            _ => eprintln!("wallrus: {err}"),
        }
        std::process::exit(err.exit_code());
    }
}
