//! Logging initialization for atelier.
//!
//! Interactive wizard: logs to `<state>/logs/atelier-{datetime}.log`
//! One-shot commands: logs to stderr

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Keeps the session log writer alive; dropping it flushes buffered lines
pub struct LoggingHandle {
    pub guard: Option<WorkerGuard>,
    /// Set only when the interactive wizard logs to a session file
    pub log_file_path: Option<PathBuf>,
}

/// Name of the log file for a session started now
pub fn log_file_name() -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
    format!("atelier-{timestamp}.log")
}

/// Whether logs go to a file rather than stderr
pub fn logs_to_file(config: &Config, interactive: bool) -> bool {
    interactive && config.logging.to_file
}

/// Filter directive when `RUST_LOG` is unset
pub fn level_directive(config: &Config, debug: bool) -> &str {
    if debug {
        "debug"
    } else {
        &config.logging.level
    }
}

/// Open a fresh session file under `logs_dir`
fn session_writer(logs_dir: &Path) -> Result<(NonBlocking, WorkerGuard, PathBuf)> {
    std::fs::create_dir_all(logs_dir)
        .with_context(|| format!("creating log directory {}", logs_dir.display()))?;
    let name = log_file_name();
    let path = logs_dir.join(&name);
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(logs_dir, name));
    Ok((writer, guard, path))
}

/// Install the global subscriber.
///
/// The interactive wizard writes to `<state>/logs` so prompts stay clean;
/// everything else writes to stderr. `RUST_LOG` wins over the configured level.
pub fn init_logging(config: &Config, interactive: bool, debug: bool) -> Result<LoggingHandle> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(config, debug)));

    let session = if logs_to_file(config, interactive) {
        Some(session_writer(&config.logs_path())?)
    } else {
        None
    };

    let (file_layer, stderr_layer, handle) = match session {
        Some((writer, guard, path)) => (
            Some(fmt::layer().with_target(false).with_ansi(false).with_writer(writer)),
            None,
            LoggingHandle {
                guard: Some(guard),
                log_file_path: Some(path),
            },
        ),
        None => (
            None,
            Some(fmt::layer().with_target(false).with_writer(std::io::stderr)),
            LoggingHandle {
                guard: None,
                log_file_path: None,
            },
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.paths.state = temp_dir.path().to_string_lossy().to_string();
        config
    }

    #[test]
    fn test_logs_path_under_state_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let logs_dir = config.logs_path();
        assert!(logs_dir.ends_with("logs"));
        assert!(logs_dir.starts_with(temp_dir.path()));
    }

    #[test]
    fn test_log_file_name_format() {
        let name = log_file_name();
        assert!(name.starts_with("atelier-"));
        assert!(name.ends_with("Z.log"));
    }

    #[test]
    fn test_one_shot_commands_log_to_stderr() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        assert!(!logs_to_file(&config, false));
    }

    #[test]
    fn test_interactive_with_file_disabled() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(&temp_dir);
        assert!(logs_to_file(&config, true));

        config.logging.to_file = false;
        assert!(!logs_to_file(&config, true));
    }

    #[test]
    fn test_debug_flag_overrides_level() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(&temp_dir);
        config.logging.level = "warn".to_string();
        assert_eq!(level_directive(&config, false), "warn");
        assert_eq!(level_directive(&config, true), "debug");
    }

    #[test]
    fn test_session_writer_creates_logs_dir() {
        let temp_dir = TempDir::new().unwrap();
        let logs_dir = temp_dir.path().join("nested").join("logs");

        let (_writer, guard, path) = session_writer(&logs_dir).unwrap();
        drop(guard);

        assert!(logs_dir.is_dir());
        assert_eq!(path.parent(), Some(logs_dir.as_path()));
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("atelier-"));
    }
}
