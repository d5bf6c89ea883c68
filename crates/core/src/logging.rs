use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn default_log_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".uriscope/logs")
}

/// Daily-rolling non-blocking writer for one component. The guard must be
/// held for the lifetime of the process or buffered lines are lost.
pub fn rolling_writer(log_dir: &Path, component: &str) -> (NonBlocking, WorkerGuard) {
    let _ = std::fs::create_dir_all(log_dir);
    let file_appender = tracing_appender::rolling::daily(log_dir, component);
    tracing_appender::non_blocking(file_appender)
}

/// Installs the global subscriber: an `EnvFilter` (default `info`), a plain
/// file layer under `~/.uriscope/logs`, and optionally a colored stderr
/// layer for interactive hosts.
pub fn init_logging(component: &str, to_stderr: bool) -> WorkerGuard {
    let (writer, guard) = rolling_writer(&default_log_dir(), component);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);
    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    if to_stderr {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);
        registry.with(stderr_layer).init();
    } else {
        registry.init();
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_writer_creates_the_log_directory() {
        let dir = std::env::temp_dir().join("uriscope-logging-test");
        let _ = std::fs::remove_dir_all(&dir);
        let (_writer, _guard) = rolling_writer(&dir, "compiler");
        assert!(dir.is_dir());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
