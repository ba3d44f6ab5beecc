//! Operating system helpers.
//!
//! - [`path`] - Shell-like path expansion
//! - [`command`] - Locating external programs

pub mod command;
pub mod path;

pub use command::resolve_binary;
pub use path::{expand, expand_and_resolve};
