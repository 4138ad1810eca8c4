use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{Builder, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogFormat;

const DAYS_TO_KEEP: usize = 7;

/// Routes `tracing` output to a daily rolling file; the terminal belongs to the UI.
///
/// `RUST_LOG` overrides the default `info` filter. The returned guard must be
/// held until exit so buffered lines are flushed.
pub fn init(log_dir: &Path, format: LogFormat) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_appender = Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(DAYS_TO_KEEP)
        .filename_prefix("reelwatch")
        .filename_suffix("log")
        .build(log_dir)
        .context("failed to create log file appender")?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(non_blocking),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .try_init(),
    }
    .context("failed to install tracing subscriber")?;

    Ok(guard)
}
