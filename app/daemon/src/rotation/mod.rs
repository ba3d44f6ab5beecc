//! Background rotation core.
//!
//! This module holds everything a rotation pass needs, leaf first:
//!
//! - [`pool`] - per-workspace set of backgrounds not yet shown this cycle
//! - [`picker`] - uniform random selection out of a pool
//! - [`lister`] - strategies that discover candidate images for a workspace
//! - [`setter`] - the external program that applies a background
//! - [`state`] - the daemon state that runs one pass across all workspaces

pub mod lister;
pub mod picker;
pub mod pool;
pub mod setter;
pub mod state;

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use lister::{DirectoryLister, Lister, QueryLister};
pub use picker::Picker;
pub use pool::Pool;
pub use setter::{CommandSetter, WallpaperSetter};
pub use state::{DaemonState, PassReport, RotationOutcome, WorkspaceState};

/// Identifier of a desktop workspace, as understood by the wallpaper setter.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema
)]
#[serde(transparent)]
pub struct WorkspaceId(u32);

impl WorkspaceId {
    /// Creates a workspace identifier.
    #[must_use]
    pub const fn new(id: u32) -> Self { Self(id) }

    /// Returns the raw workspace number.
    #[must_use]
    pub const fn get(self) -> u32 { self.0 }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl From<u32> for WorkspaceId {
    fn from(id: u32) -> Self { Self(id) }
}
