use std::path::Path;

use chrono::{DateTime, Local};
use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter, Registry};

use crate::error::FundError;

/// Installs the global subscriber for a pipeline run.
///
/// The console gets `console_level` and above, unless `RUST_LOG` says otherwise.
/// Everything this crate logs at DEBUG+ also goes to a per-run file in
/// `log_dir`. Hold the returned guard until exit or buffered lines are lost.
pub fn setup_tracing(log_dir: &Path, console_level: Level) -> Result<WorkerGuard, FundError> {
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }
    let file_name = log_file_name(Local::now());
    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(log_dir, &file_name));

    let console_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::default().add_directive(Directive::from(console_level)),
    };
    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_filter(console_filter);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_filter(EnvFilter::default().add_directive(crate_directive(Level::DEBUG)?));

    tracing::subscriber::set_global_default(Registry::default().with(console_layer).with(file_layer))
        .map_err(|e| FundError::ConfigError(format!("Failed to install subscriber: {}", e)))?;

    info!("Logging to console and {}", log_dir.join(&file_name).display());
    Ok(guard)
}

/// File name of the run log, e.g. `fundscope_2016-01-05_09-30-00.log`.
pub fn log_file_name(started: DateTime<Local>) -> String {
    format!("{}_{}.log", env!("CARGO_PKG_NAME"), started.format("%Y-%m-%d_%H-%M-%S"))
}

fn crate_directive(level: Level) -> Result<Directive, FundError> {
    let directive = format!("{}={}", env!("CARGO_PKG_NAME"), level);
    directive
        .parse()
        .map_err(|e| FundError::ConfigError(format!("Invalid log directive {}: {}", directive, e)))
}
