//! Daemon state: the active workspaces and their pools.

use std::path::PathBuf;

use super::{Lister, Picker, Pool, WallpaperSetter, WorkspaceId};
use crate::error::WallrusError;

/// One workspace taking part in rotation.
#[derive(Debug, Clone)]
pub struct WorkspaceState {
    id: WorkspaceId,
    sources: Vec<PathBuf>,
    pool: Pool,
}

impl WorkspaceState {
    /// Creates a workspace with an empty pool.
    #[must_use]
    pub const fn new(id: WorkspaceId, sources: Vec<PathBuf>) -> Self {
        Self {
            id,
            sources,
            pool: Pool::new(),
        }
    }

    /// The workspace identifier.
    #[must_use]
    pub const fn id(&self) -> WorkspaceId { self.id }

    /// The directories this workspace draws backgrounds from.
    #[must_use]
    pub fn sources(&self) -> &[PathBuf] { &self.sources }

    /// The backgrounds not yet shown this cycle.
    #[must_use]
    pub const fn pool(&self) -> &Pool { &self.pool }

    /// Rescans the sources and starts a new cycle. Returns the candidate count.
    fn refill(&mut self, lister: &dyn Lister) -> Result<usize, WallrusError> {
        let candidates = lister.list(&self.sources)?;
        let count = candidates.len();
        self.pool.refill(candidates);
        tracing::info!(workspace = %self.id, count, "{count} backgrounds found for workspace {}", self.id);
        Ok(count)
    }
}

/// What happened to one workspace during a pass.
#[derive(Debug)]
pub enum RotationOutcome {
    /// A new background was applied.
    Rotated {
        /// The background that was applied.
        image: PathBuf,
        /// Backgrounds left before the next refill.
        remaining: usize,
    },
    /// Listing or applying failed; the workspace stays active.
    Failed(WallrusError),
    /// The workspace had no backgrounds and was removed from rotation.
    Deactivated,
}

/// Outcomes of one rotation pass, in workspace order.
#[derive(Debug, Default)]
pub struct PassReport {
    outcomes: Vec<(WorkspaceId, RotationOutcome)>,
}

impl PassReport {
    /// All outcomes of the pass.
    #[must_use]
    pub fn outcomes(&self) -> &[(WorkspaceId, RotationOutcome)] { &self.outcomes }

    /// The background applied to `workspace` in this pass, if any.
    #[must_use]
    pub fn image_for(&self, workspace: WorkspaceId) -> Option<&PathBuf> {
        self.outcomes.iter().find_map(|(id, outcome)| match outcome {
            RotationOutcome::Rotated { image, .. } if *id == workspace => Some(image),
            _ => None,
        })
    }

    /// Workspaces that received a new background.
    pub fn rotated(&self) -> impl Iterator<Item = WorkspaceId> + '_ {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, RotationOutcome::Rotated { .. }))
            .map(|(id, _)| *id)
    }

    /// Workspaces whose rotation failed in this pass.
    pub fn failed(&self) -> impl Iterator<Item = WorkspaceId> + '_ {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, RotationOutcome::Failed(_)))
            .map(|(id, _)| *id)
    }

    /// Workspaces removed from rotation in this pass.
    pub fn deactivated(&self) -> impl Iterator<Item = WorkspaceId> + '_ {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, RotationOutcome::Deactivated))
            .map(|(id, _)| *id)
    }
}

/// All workspaces still taking part in rotation, in configuration order.
///
/// Owned by the scheduler; there is exactly one mutator, so no locking.
#[derive(Debug, Clone, Default)]
pub struct DaemonState {
    workspaces: Vec<WorkspaceState>,
}

impl DaemonState {
    /// Creates the state from `(workspace, sources)` pairs in configuration order.
    pub fn new<I>(workspaces: I) -> Self
    where I: IntoIterator<Item = (WorkspaceId, Vec<PathBuf>)> {
        Self {
            workspaces: workspaces
                .into_iter()
                .map(|(id, sources)| WorkspaceState::new(id, sources))
                .collect(),
        }
    }

    /// Returns `true` once every workspace has been deactivated.
    #[must_use]
    pub fn is_exhausted(&self) -> bool { self.workspaces.is_empty() }

    /// Identifiers of the active workspaces, in rotation order.
    #[must_use]
    pub fn active_workspaces(&self) -> Vec<WorkspaceId> {
        self.workspaces.iter().map(WorkspaceState::id).collect()
    }

    /// Looks up an active workspace.
    #[must_use]
    pub fn workspace(&self, id: WorkspaceId) -> Option<&WorkspaceState> {
        self.workspaces.iter().find(|ws| ws.id == id)
    }

    /// Runs one rotation pass over every active workspace.
    ///
    /// Failures are contained per workspace: a lister or setter error abandons
    /// that workspace for this pass only, and the remaining workspaces still
    /// rotate. A workspace whose refill succeeds but finds nothing is removed
    /// for good.
    pub fn rotate_all(
        &mut self,
        lister: &dyn Lister,
        setter: &dyn WallpaperSetter,
        picker: &mut Picker,
    ) -> PassReport {
        let mut report = PassReport::default();

        for workspace in &mut self.workspaces {
            let outcome = rotate_workspace(workspace, lister, setter, picker);
            report.outcomes.push((workspace.id, outcome));
        }

        let deactivated: Vec<WorkspaceId> = report.deactivated().collect();
        if !deactivated.is_empty() {
            self.workspaces.retain(|ws| !deactivated.contains(&ws.id));
        }

        report
    }
}

fn rotate_workspace(
    workspace: &mut WorkspaceState,
    lister: &dyn Lister,
    setter: &dyn WallpaperSetter,
    picker: &mut Picker,
) -> RotationOutcome {
    if workspace.pool.is_empty() {
        match workspace.refill(lister) {
            Ok(0) => {
                let err = WallrusError::EmptyWorkspace(workspace.id);
                tracing::info!(workspace = %workspace.id, "{err}. Removing from list.");
                return RotationOutcome::Deactivated;
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(workspace = %workspace.id, error = %err, "failed to gather backgrounds");
                return RotationOutcome::Failed(err);
            }
        }
    }

    let Some(image) = picker.pick(&mut workspace.pool) else {
        return RotationOutcome::Failed(WallrusError::EmptyWorkspace(workspace.id));
    };
    let remaining = workspace.pool.len();

    tracing::info!(
        workspace = %workspace.id,
        remaining,
        "Workspace {} [{remaining} left]: {}",
        workspace.id,
        image.display()
    );

    match setter.set(workspace.id, &image) {
        Ok(()) => RotationOutcome::Rotated { image, remaining },
        Err(err) => {
            tracing::warn!(workspace = %workspace.id, error = %err, "failed to set background");
            RotationOutcome::Failed(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};
    use std::path::Path;

    use super::*;

    /// Lister returning a fixed list per source directory.
    #[derive(Default)]
    struct MapLister {
        by_source: HashMap<PathBuf, Vec<PathBuf>>,
        failing: HashSet<PathBuf>,
        calls: RefCell<usize>,
    }

    impl MapLister {
        fn with(mut self, source: &str, images: &[&str]) -> Self {
            self.by_source
                .insert(PathBuf::from(source), images.iter().map(PathBuf::from).collect());
            self
        }

        fn failing(mut self, source: &str) -> Self {
            self.failing.insert(PathBuf::from(source));
            self
        }
    }

    impl Lister for MapLister {
        fn list(&self, sources: &[PathBuf]) -> Result<Vec<PathBuf>, WallrusError> {
            *self.calls.borrow_mut() += 1;
            let mut out = Vec::new();
            for source in sources {
                if self.failing.contains(source) {
                    return Err(WallrusError::ExternalCall("lister exploded".to_string()));
                }
                out.extend(self.by_source.get(source).cloned().unwrap_or_default());
            }
            Ok(out)
        }
    }

    /// Setter recording every call and failing for selected workspaces.
    #[derive(Default)]
    struct RecordingSetter {
        calls: RefCell<Vec<(WorkspaceId, PathBuf)>>,
        failing: HashSet<WorkspaceId>,
    }

    impl WallpaperSetter for RecordingSetter {
        fn set(&self, workspace: WorkspaceId, image: &Path) -> Result<(), WallrusError> {
            self.calls.borrow_mut().push((workspace, image.to_path_buf()));
            if self.failing.contains(&workspace) {
                return Err(WallrusError::ExternalCall("bgswitch failed".to_string()));
            }
            Ok(())
        }
    }

    fn ws(id: u32) -> WorkspaceId { WorkspaceId::new(id) }

    fn state(entries: &[(u32, &str)]) -> DaemonState {
        DaemonState::new(entries.iter().map(|(id, dir)| (ws(*id), vec![PathBuf::from(dir)])))
    }

    // ========================================================================
    // Rotation tests
    // ========================================================================

    #[test]
    fn test_first_pass_refills_and_rotates() {
        let lister = MapLister::default().with("/one", &["a", "b"]);
        let setter = RecordingSetter::default();
        let mut picker = Picker::seeded(1);
        let mut state = state(&[(1, "/one")]);

        let report = state.rotate_all(&lister, &setter, &mut picker);

        assert_eq!(report.rotated().collect::<Vec<_>>(), vec![ws(1)]);
        assert_eq!(state.workspace(ws(1)).unwrap().pool().len(), 1);
        assert_eq!(setter.calls.borrow().len(), 1);
    }

    #[test]
    fn test_no_repeat_until_exhausted() {
        let lister = MapLister::default().with("/one", &["a", "b", "c", "d"]);
        let setter = RecordingSetter::default();
        let mut picker = Picker::seeded(99);
        let mut state = state(&[(1, "/one")]);

        let mut seen = HashSet::new();
        for _ in 0..4 {
            let report = state.rotate_all(&lister, &setter, &mut picker);
            let image = report.image_for(ws(1)).unwrap().clone();
            assert!(seen.insert(image), "background repeated before exhaustion");
        }
        assert_eq!(*lister.calls.borrow(), 1);

        // Fifth pass starts a new cycle
        state.rotate_all(&lister, &setter, &mut picker);
        assert_eq!(*lister.calls.borrow(), 2);
    }

    #[test]
    fn test_empty_workspace_is_deactivated_once() {
        let lister = MapLister::default().with("/full", &["a"]).with("/empty", &[]);
        let setter = RecordingSetter::default();
        let mut picker = Picker::seeded(5);
        let mut state = state(&[(1, "/empty"), (2, "/full")]);

        let report = state.rotate_all(&lister, &setter, &mut picker);
        assert_eq!(report.deactivated().collect::<Vec<_>>(), vec![ws(1)]);
        assert_eq!(state.active_workspaces(), vec![ws(2)]);

        let second = state.rotate_all(&lister, &setter, &mut picker);
        assert!(second.outcomes().iter().all(|(id, _)| *id != ws(1)));
        assert!(setter.calls.borrow().iter().all(|(id, _)| *id != ws(1)));
    }

    #[test]
    fn test_all_workspaces_deactivated_exhausts_state() {
        let lister = MapLister::default();
        let setter = RecordingSetter::default();
        let mut picker = Picker::seeded(5);
        let mut state = state(&[(1, "/nothing")]);

        state.rotate_all(&lister, &setter, &mut picker);
        assert!(state.is_exhausted());
        assert!(state.rotate_all(&lister, &setter, &mut picker).outcomes().is_empty());
    }

    #[test]
    fn test_setter_failure_does_not_block_other_workspaces() {
        let lister = MapLister::default().with("/one", &["a"]).with("/two", &["b"]);
        let setter = RecordingSetter {
            failing: HashSet::from([ws(1)]),
            ..Default::default()
        };
        let mut picker = Picker::seeded(2);
        let mut state = state(&[(1, "/one"), (2, "/two")]);

        let report = state.rotate_all(&lister, &setter, &mut picker);

        assert_eq!(report.failed().collect::<Vec<_>>(), vec![ws(1)]);
        assert_eq!(report.rotated().collect::<Vec<_>>(), vec![ws(2)]);
        assert_eq!(state.active_workspaces(), vec![ws(1), ws(2)]);
    }

    #[test]
    fn test_lister_failure_keeps_workspace_active() {
        let lister = MapLister::default().failing("/broken").with("/ok", &["a"]);
        let setter = RecordingSetter::default();
        let mut picker = Picker::seeded(2);
        let mut state = state(&[(1, "/broken"), (2, "/ok")]);

        let report = state.rotate_all(&lister, &setter, &mut picker);

        assert_eq!(report.failed().collect::<Vec<_>>(), vec![ws(1)]);
        assert_eq!(report.deactivated().count(), 0);
        assert_eq!(state.active_workspaces(), vec![ws(1), ws(2)]);
    }

    #[test]
    fn test_workspaces_rotate_in_configuration_order() {
        let lister = MapLister::default().with("/a", &["1"]).with("/b", &["2"]).with("/c", &["3"]);
        let setter = RecordingSetter::default();
        let mut picker = Picker::seeded(4);
        let mut state = state(&[(3, "/c"), (1, "/a"), (2, "/b")]);

        state.rotate_all(&lister, &setter, &mut picker);

        let order: Vec<_> = setter.calls.borrow().iter().map(|(id, _)| *id).collect();
        assert_eq!(order, vec![ws(3), ws(1), ws(2)]);
    }

    #[test]
    fn test_rotated_outcome_reports_remaining() {
        let lister = MapLister::default().with("/one", &["a", "b", "c"]);
        let setter = RecordingSetter::default();
        let mut picker = Picker::seeded(8);
        let mut state = state(&[(1, "/one")]);

        let report = state.rotate_all(&lister, &setter, &mut picker);
        match &report.outcomes()[0].1 {
            RotationOutcome::Rotated { remaining, .. } => assert_eq!(*remaining, 2),
            other => panic!("Expected Rotated outcome, got {other:?}"),
        }
    }
}
