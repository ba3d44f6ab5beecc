//! Wallrus - a daemon that rotates desktop backgrounds across workspaces.
//!
//! Each configured workspace draws backgrounds from its own directories,
//! shuffled without repeats until every image has been shown. A scheduler
//! rotates all workspaces on a fixed interval and can be told to advance
//! early with `SIGUSR1`, which `wallrus -n` sends to the daemon named in the
//! lock record.

pub mod cli;
pub mod config;
pub mod constants;
pub mod daemon;
pub mod error;
pub mod instance;
pub mod logging;
pub mod platform;
pub mod rotation;
pub mod scheduler;
pub mod schema;
pub mod signals;
