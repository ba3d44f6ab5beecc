//! Logging setup.
//!
//! Events go to stdout and, when a log file is configured, are appended to
//! that file without ANSI colors. The filter is read from `WALLRUS_LOG`
//! (e.g. `WALLRUS_LOG=debug`) and defaults to `info`.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing::Subscriber;
use tracing_subscriber::filter::{Builder, LevelFilter};
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::constants::LOG_FILTER_ENV;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Installs the global subscriber.
///
/// A log file that cannot be opened is reported as a warning and file
/// logging is skipped. Calling this more than once keeps the first subscriber.
pub fn init(log_file: Option<&Path>) {
    let filter = filter_builder().with_env_var(LOG_FILTER_ENV).from_env_lossy();

    let mut layers: Vec<BoxedLayer> =
        vec![tracing_subscriber::fmt::layer().with_target(false).with_writer(io::stdout).boxed()];

    let mut file_error = None;
    if let Some(path) = log_file {
        match open_log_file(path) {
            Ok(file) => layers.push(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file))
                    .boxed(),
            ),
            Err(err) => file_error = Some(format!("cannot open log file {}: {err}", path.display())),
        }
    }

    if subscriber(filter, layers).try_init().is_err() {
        tracing::debug!("logging already initialized");
    }

    if let Some(error) = file_error {
        tracing::warn!("{error}");
    }
}

fn filter_builder() -> Builder {
    EnvFilter::builder().with_default_directive(LevelFilter::INFO.into())
}

/// Puts every output layer behind `filter`. The filter must wrap the layer
/// list; as an entry of the list it would not restrict its siblings.
fn subscriber(filter: EnvFilter, layers: Vec<BoxedLayer>) -> impl Subscriber + Send + Sync + 'static {
    Registry::default().with(layers.with_filter(filter))
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    /// Collects formatted output in memory.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String { String::from_utf8(self.0.lock().unwrap().clone()).unwrap() }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer { self.clone() }
    }

    fn emit_with(directives: &str) -> String {
        let captured = Captured::default();
        let layers: Vec<BoxedLayer> = vec![
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(captured.clone())
                .boxed(),
        ];
        let subscriber = subscriber(filter_builder().parse_lossy(directives), layers);

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("hidden detail");
            tracing::info!("rotated workspace");
            tracing::error!("setter failed");
        });
        captured.text()
    }

    // ========================================================================
    // Filter tests
    // ========================================================================

    #[test]
    fn test_default_level_hides_debug() {
        let output = emit_with("");
        assert!(!output.contains("hidden detail"));
        assert!(output.contains("rotated workspace"));
        assert!(output.contains("setter failed"));
    }

    #[test]
    fn test_directive_restricts_output() {
        let output = emit_with("error");
        assert!(!output.contains("rotated workspace"));
        assert!(output.contains("setter failed"));
    }

    #[test]
    fn test_directive_enables_debug() {
        assert!(emit_with("debug").contains("hidden detail"));
    }

    // ========================================================================
    // File tests
    // ========================================================================

    #[test]
    fn test_open_log_file_creates_parents_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("wallrus.log");

        drop(open_log_file(&path).unwrap());
        assert!(path.exists());

        fs::write(&path, "first\n").unwrap();
        {
            use std::io::Write;
            let mut file = open_log_file(&path).unwrap();
            writeln!(file, "second").unwrap();
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_init_is_idempotent() {
        init(None);
        init(None);
    }
}
