//! Structured logging setup
//!
//! Console output goes to stderr (plain or JSON), and a copy of every event is
//! written to a log file in the data directory. Filtering honours `RUST_LOG`
//! and falls back to `shipit=info`.

use std::env;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{APP_NAME, log_path};

/// Filter applied when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "shipit=info";

/// Environment switch for JSON console output
const JSON_ENV: &str = "SHIPIT_LOG_JSON";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Emit console events as JSON lines
    pub use_json: bool,
    /// Where the log file is written
    pub file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            use_json: false,
            file: log_path(),
        }
    }
}

impl LoggingConfig {
    /// Default configuration with `SHIPIT_LOG_JSON` applied
    pub fn from_env() -> Self {
        Self {
            use_json: parse_flag(env::var(JSON_ENV).ok().as_deref()),
            ..Default::default()
        }
    }
}

fn parse_flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes")
    )
}

/// Filter from `RUST_LOG`, or the crate default when unset or invalid
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber.
///
/// The returned guard flushes the file writer when dropped and must be held
/// for the lifetime of the process. Installing twice leaves the first
/// subscriber in place.
pub fn init(config: &LoggingConfig) -> std::io::Result<WorkerGuard> {
    let dir = config
        .file
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir)?;
    let file_name = config
        .file
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| format!("{APP_NAME}.log").into());

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));

    let console_json = config
        .use_json
        .then(|| fmt::layer().json().with_writer(std::io::stderr));
    let console_plain = (!config.use_json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });
    let file = fmt::layer().with_ansi(false).with_writer(file_writer);

    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(console_json)
        .with(console_plain)
        .with(file)
        .try_init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("true"), true)]
    #[case(Some("1"), true)]
    #[case(Some(" YES "), true)]
    #[case(Some("false"), false)]
    #[case(Some(""), false)]
    #[case(None, false)]
    fn parse_flag_accepts_common_truthy_values(#[case] value: Option<&str>, #[case] expected: bool) {
        assert_eq!(parse_flag(value), expected);
    }

    #[test]
    fn init_creates_log_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let file = temp_dir.path().join("logs").join("shipit.log");

        let guard = init(&LoggingConfig {
            use_json: false,
            file: file.clone(),
        })
        .unwrap();
        drop(guard);

        assert!(file.parent().unwrap().is_dir());
    }
}
