//! Daemon lifecycle: wiring the configuration into a scheduler, owning the
//! lock record, and running the loop until shutdown.

use std::path::Path;

use tracing::Instrument;

use crate::config::{ListerMode, LoadedConfig, WallrusConfig};
use crate::error::WallrusError;
use crate::instance::{self, LockRecord};
use crate::platform::command::resolve_binary;
use crate::rotation::{CommandSetter, DaemonState, DirectoryLister, Lister, QueryLister};
use crate::scheduler::{InterruptReceiver, Scheduler, interrupt_channel};
use crate::signals;

/// Builds a scheduler for `config`.
///
/// The setter and query programs are resolved here so that a missing program
/// is reported at startup rather than on every rotation.
///
/// # Errors
///
/// Returns `WallrusError::ConfigError` if a configured program cannot be found.
pub fn build_scheduler(
    config: &WallrusConfig,
    base_dir: &Path,
    interrupts: InterruptReceiver,
) -> Result<Scheduler, WallrusError> {
    let lister: Box<dyn Lister> = match config.lister.mode {
        ListerMode::Directory => Box::new(DirectoryLister::new(config.lister.images_only)),
        ListerMode::Query => Box::new(QueryLister::new(
            resolve_binary(&config.lister.command)?,
            config.lister.args.clone(),
        )),
    };

    let setter = CommandSetter::new(
        resolve_binary(&config.setter.program)?,
        config.setter.args.clone(),
    );

    let state = DaemonState::new(config.workspace_sources(base_dir));

    Ok(Scheduler::new(state, lister, Box::new(setter), config.interval(), interrupts))
}

/// Runs `scheduler` until shutdown, then releases `lock`.
///
/// Returns the number of rotation passes performed.
///
/// # Errors
///
/// Returns `WallrusError::IoError` if the lock record cannot be removed.
pub async fn serve(scheduler: Scheduler, lock: LockRecord) -> Result<u64, WallrusError> {
    let span = tracing::info_span!("daemon", pid = lock.pid());
    let passes = scheduler.run().instrument(span).await;
    lock.release()?;
    Ok(passes)
}

/// Starts the daemon and blocks until it shuts down.
///
/// Signal handlers are installed before the lock record is created, so a
/// signal arriving right after startup always goes through the scheduler and
/// the record is released.
///
/// # Errors
///
/// Returns `WallrusError::AlreadyRunning` if another daemon holds the lock
/// record, `WallrusError::ConfigError` if a configured program is missing,
/// and I/O or signal errors raised while starting.
pub fn start(loaded: &LoadedConfig) -> Result<(), WallrusError> {
    let config = &loaded.config;
    let base_dir = loaded.base_dir();

    let (sender, receiver) = interrupt_channel();
    let scheduler = build_scheduler(config, base_dir, receiver)?;

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

    runtime.block_on(async move {
        let forwarder = signals::forward_signals(sender)?;

        let lock = match LockRecord::acquire(config.lock_path(base_dir)) {
            Ok(lock) => lock,
            Err(err) => {
                forwarder.abort();
                return Err(err);
            }
        };
        instance::release_on_panic(lock.path());

        tracing::info!(
            pid = lock.pid(),
            lock = %lock.path().display(),
            config = %loaded.path.display(),
            "Starting wallrus"
        );

        let result = serve(scheduler, lock).await;
        forwarder.abort();
        result.map(|_| ())
    })
}
