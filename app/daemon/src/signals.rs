//! Translation of OS signals into scheduler interrupts.
//!
//! `SIGUSR1` advances the rotation; `SIGINT`, `SIGTERM` and `SIGHUP` shut the
//! daemon down.

use tokio::signal::unix::{Signal, SignalKind, signal};
use tokio::task::JoinHandle;

use crate::error::WallrusError;
use crate::scheduler::{Interrupt, InterruptSender};

fn listen(kind: SignalKind, name: &str) -> Result<Signal, WallrusError> {
    signal(kind).map_err(|err| {
        WallrusError::SignalError(format!("failed to install {name} handler: {err}"))
    })
}

/// Installs the signal handlers and spawns a task forwarding them to `sender`.
///
/// Handlers are installed before this returns, so signals sent afterwards
/// are never lost. The task ends once the scheduler drops its receiver.
/// Must be called from within a tokio runtime.
///
/// # Errors
///
/// Returns `WallrusError::SignalError` if a handler cannot be installed.
pub fn forward_signals(sender: InterruptSender) -> Result<JoinHandle<()>, WallrusError> {
    let mut advance = listen(SignalKind::user_defined1(), "SIGUSR1")?;
    let mut interrupt = listen(SignalKind::interrupt(), "SIGINT")?;
    let mut terminate = listen(SignalKind::terminate(), "SIGTERM")?;
    let mut hangup = listen(SignalKind::hangup(), "SIGHUP")?;

    Ok(tokio::spawn(async move {
        loop {
            let (interrupt_kind, name) = tokio::select! {
                _ = advance.recv() => (Interrupt::Advance, "SIGUSR1"),
                _ = interrupt.recv() => (Interrupt::Shutdown, "SIGINT"),
                _ = terminate.recv() => (Interrupt::Shutdown, "SIGTERM"),
                _ = hangup.recv() => (Interrupt::Shutdown, "SIGHUP"),
            };

            tracing::debug!(signal = name, ?interrupt_kind, "received signal");
            if sender.send(interrupt_kind).is_err() {
                break;
            }
        }
    }))
}
