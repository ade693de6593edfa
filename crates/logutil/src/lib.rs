//! Utilities for logging.

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    HumanReadable,
    Json,
}

/// Build the env filter, falling back to `default_level` when `RUST_LOG` is
/// unset or unparseable.
fn env_filter(default_level: Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy()
}

/// Configure the global subscriber.
///
/// Logs at `default_level` and above are written to `make_writer` unless
/// `RUST_LOG` says otherwise. Does nothing if a global subscriber has already
/// been installed.
pub fn configure_global_logger<W>(default_level: Level, format: LogFormat, make_writer: W)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(make_writer)
        .with_thread_names(true);

    let _ = match format {
        LogFormat::HumanReadable => builder
            .with_file(true)
            .with_line_number(true)
            .finish()
            .try_init(),
        LogFormat::Json => builder.json().finish().try_init(),
    };
}

/// Configure a subscriber that writes through the test harness.
///
/// Safe to call from every test, only the first call installs anything.
pub fn configure_test_logger() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(Level::DEBUG))
        .with_test_writer()
        .finish()
        .try_init();
}
