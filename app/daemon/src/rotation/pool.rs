//! Per-workspace pool of backgrounds that have not been shown this cycle.

use std::path::{Path, PathBuf};

/// Backgrounds still waiting to be shown on one workspace.
///
/// A pool starts empty, is refilled from the lister when it runs dry, and
/// loses exactly one entry per rotation. Ordering inside the pool carries no
/// meaning; selection is done by [`super::Picker`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pool {
    candidates: Vec<PathBuf>,
}

impl Pool {
    /// Creates an empty pool.
    #[must_use]
    pub const fn new() -> Self { Self { candidates: Vec::new() } }

    /// Returns `true` when every candidate of the current cycle has been shown.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.candidates.is_empty() }

    /// Number of candidates left in the current cycle.
    #[must_use]
    pub fn len(&self) -> usize { self.candidates.len() }

    /// Starts a new cycle with the given candidates.
    ///
    /// Anything left over from the previous cycle is discarded.
    pub fn refill(&mut self, candidates: Vec<PathBuf>) { self.candidates = candidates; }

    /// Removes and returns the candidate at `index`.
    ///
    /// Returns `None` when the pool is empty or the index is out of range.
    pub fn take(&mut self, index: usize) -> Option<PathBuf> {
        if index >= self.candidates.len() {
            return None;
        }
        Some(self.candidates.swap_remove(index))
    }

    /// Returns `true` if the candidate is still waiting in this cycle.
    #[must_use]
    pub fn contains(&self, candidate: &Path) -> bool {
        self.candidates.iter().any(|path| path == candidate)
    }
}
