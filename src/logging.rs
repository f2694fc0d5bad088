use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Stderr logging scoped to the returned guard, used while the config that
/// decides the real log target is still being loaded.
pub fn bootstrap_logging(level: &str) -> DefaultGuard {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter(level))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_default(subscriber)
}

/// Install the process-wide subscriber. Stdout carries the answer, so logs go
/// to stderr unless a log file is configured.
pub fn init_logging(level: &str, log_file: Option<&Path>) -> Result<()> {
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file: {}", path.display()))?;
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter(level))
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_writer(Arc::new(file))
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        None => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter(level))
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    debug!(level, "logging initialized");
    Ok(())
}
