//! Tracing subscriber setup.
//!
//! The terminal belongs to the TUI, so logs go to a file through a
//! non-blocking writer.  Filter priority: `SCRIPTDECK_LOG`, then
//! `RUST_LOG`, then `debug` with `--verbose` or `info` without.

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber writing to `path`.
///
/// The returned guard flushes buffered lines on drop; keep it alive for
/// the life of the process.
pub fn init(path: &Path, verbose: bool) -> Result<WorkerGuard> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(build_filter(verbose))
        .with(layer)
        .try_init()
        .context("tracing subscriber already installed")?;

    Ok(guard)
}

fn build_filter(verbose: bool) -> EnvFilter {
    if let Some(filter) = std::env::var("SCRIPTDECK_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
    {
        return filter;
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = if verbose { "debug" } else { "info" };
    EnvFilter::new(format!("{}={level},warn", env!("CARGO_CRATE_NAME")))
}
