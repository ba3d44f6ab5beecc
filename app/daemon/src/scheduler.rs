//! Rotation scheduler.
//!
//! Runs a rotation pass over every active workspace, then sleeps for the
//! configured interval. The sleep ends early when an [`Interrupt`] arrives on
//! the scheduler's channel:
//!
//! ```text
//! Idle -> RotatingAll -> Sleeping -+-> RotatingAll   (interval elapsed or Advance)
//!                                  +-> ShuttingDown  (Shutdown)
//! ```
//!
//! Interrupts sent while a pass is running stay queued and are handled at the
//! next sleep boundary, so a pass is never cut short.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::rotation::{DaemonState, Lister, PassReport, Picker, WallpaperSetter};

/// Requests delivered to a running scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// Skip the rest of the current wait and rotate now.
    Advance,
    /// Stop after the current pass.
    Shutdown,
}

/// Why the scheduler stopped sleeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeReason {
    /// The full interval elapsed.
    Elapsed,
    /// An [`Interrupt::Advance`] cut the wait short.
    Advance,
    /// An [`Interrupt::Shutdown`] was received.
    Shutdown,
}

/// Lifecycle phase of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Constructed but not started.
    Idle,
    /// Rotating every active workspace.
    RotatingAll,
    /// Waiting for the interval or an interrupt.
    Sleeping,
    /// Shutdown was requested; no further passes will run.
    ShuttingDown,
}

/// Sending half of the interrupt channel.
pub type InterruptSender = mpsc::UnboundedSender<Interrupt>;

/// Receiving half of the interrupt channel, owned by the scheduler.
pub type InterruptReceiver = mpsc::UnboundedReceiver<Interrupt>;

/// Creates the channel used to interrupt a scheduler.
#[must_use]
pub fn interrupt_channel() -> (InterruptSender, InterruptReceiver) { mpsc::unbounded_channel() }

/// Drives rotation passes on a timer.
pub struct Scheduler {
    state: DaemonState,
    lister: Box<dyn Lister>,
    setter: Box<dyn WallpaperSetter>,
    picker: Picker,
    interval: Duration,
    interrupts: InterruptReceiver,
    phase: SchedulerState,
    passes: u64,
    exhausted_reported: bool,
}

impl Scheduler {
    /// Creates a scheduler in the [`SchedulerState::Idle`] phase.
    #[must_use]
    pub fn new(
        state: DaemonState,
        lister: Box<dyn Lister>,
        setter: Box<dyn WallpaperSetter>,
        interval: Duration,
        interrupts: InterruptReceiver,
    ) -> Self {
        Self {
            state,
            lister,
            setter,
            picker: Picker::new(),
            interval,
            interrupts,
            phase: SchedulerState::Idle,
            passes: 0,
            exhausted_reported: false,
        }
    }

    /// Replaces the random picker, e.g. with a seeded one.
    #[must_use]
    pub fn with_picker(mut self, picker: Picker) -> Self {
        self.picker = picker;
        self
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> SchedulerState { self.phase }

    /// The workspaces still in rotation.
    #[must_use]
    pub const fn state(&self) -> &DaemonState { &self.state }

    /// Number of passes run so far.
    #[must_use]
    pub const fn passes(&self) -> u64 { self.passes }

    /// Time between passes.
    #[must_use]
    pub const fn interval(&self) -> Duration { self.interval }

    /// Runs one rotation pass over every active workspace.
    pub fn run_pass(&mut self) -> PassReport {
        self.phase = SchedulerState::RotatingAll;
        self.passes += 1;

        let report = self.state.rotate_all(self.lister.as_ref(), self.setter.as_ref(), &mut self.picker);

        if self.state.is_exhausted() && !self.exhausted_reported {
            self.exhausted_reported = true;
            tracing::warn!("no workspaces left to rotate, waiting for shutdown");
        }

        tracing::debug!(
            pass = self.passes,
            rotated = report.rotated().count(),
            failed = report.failed().count(),
            deactivated = report.deactivated().count(),
            "rotation pass complete"
        );

        report
    }

    /// Waits for the interval to elapse or for an interrupt, whichever comes first.
    ///
    /// Interrupts queued during the preceding pass are consumed first: any
    /// queued shutdown wins, otherwise queued advances collapse into one
    /// immediate wake.
    pub async fn sleep(&mut self) -> WakeReason {
        self.phase = SchedulerState::Sleeping;

        if let Some(reason) = self.drain_pending() {
            return self.wake(reason);
        }

        // `sleep` saturates instead of overflowing the deadline
        let reason = tokio::select! {
            () = sleep(self.interval) => WakeReason::Elapsed,
            Some(interrupt) = self.interrupts.recv() => match interrupt {
                Interrupt::Advance => WakeReason::Advance,
                Interrupt::Shutdown => WakeReason::Shutdown,
            },
        };
        self.wake(reason)
    }

    /// Runs passes until a shutdown is requested. Returns the number of passes.
    pub async fn run(mut self) -> u64 {
        tracing::info!(
            workspaces = self.state.active_workspaces().len(),
            interval_secs = self.interval.as_secs(),
            "starting rotation"
        );

        loop {
            self.run_pass();

            match self.sleep().await {
                WakeReason::Elapsed => {}
                WakeReason::Advance => tracing::info!("advancing to the next background on demand"),
                WakeReason::Shutdown => break,
            }
        }

        tracing::info!(passes = self.passes, "Shutting down...");
        self.passes
    }

    /// Collapses interrupts that arrived while the scheduler was busy.
    fn drain_pending(&mut self) -> Option<WakeReason> {
        let mut pending = None;
        while let Ok(interrupt) = self.interrupts.try_recv() {
            match interrupt {
                Interrupt::Shutdown => return Some(WakeReason::Shutdown),
                Interrupt::Advance => pending = Some(WakeReason::Advance),
            }
        }
        pending
    }

    fn wake(&mut self, reason: WakeReason) -> WakeReason {
        if reason == WakeReason::Shutdown {
            self.phase = SchedulerState::ShuttingDown;
        }
        reason
    }
}
