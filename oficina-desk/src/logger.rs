//! Logging setup
//!
//! Output goes to the console, or only to a daily rolling file
//! (`oficina.YYYY-MM-DD`) when a `log_dir` is given. If that directory
//! cannot be created the console is used instead.
//! `RUST_LOG` takes precedence over the configured level.

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Initialize the logger with the default level
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize the logger with optional file output
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if std::fs::create_dir_all(log_path).is_ok() {
            let file_appender = tracing_appender::rolling::daily(log_path, "oficina");
            // Files carry no colour codes
            let _ = subscriber.with_ansi(false).with_writer(file_appender).try_init();
            return;
        }
    }

    let _ = subscriber.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_dir_is_created() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("logs");
        let dir_str = dir.to_str().unwrap();

        init_logger_with_file(Some("debug"), Some(dir_str));
        tracing::info!("logger ready");

        assert!(dir.is_dir());
    }
}
