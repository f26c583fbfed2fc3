//! File logging for the bt binary.
//!
//! Stdout carries tab listings meant for pipelines, so logs go to
//! `ClientConfig::log_file` through a non-blocking writer. If the file cannot
//! be opened, logs fall back to stderr.

use std::env;

use brotab_core::ClientConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEBUG_ENV: &str = "BROTAB_DEBUG_LOG";
const FILTER_ENV: &str = "BROTAB_LOG";

/// Installs the global subscriber. Keep the guard alive until exit so
/// buffered lines are flushed.
pub fn init(config: &ClientConfig) -> Option<WorkerGuard> {
    let opened = config
        .log_file
        .parent()
        .map_or(Ok(()), |dir| fs_err::create_dir_all(dir))
        .and_then(|_| {
            fs_err::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&config.log_file)
        });

    let (writer, guard) = match opened {
        Ok(file) => tracing_appender::non_blocking(file),
        Err(err) => {
            eprintln!("bt: logging to stderr: {}", err);
            tracing_appender::non_blocking(std::io::stderr())
        }
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(writer)
        .try_init();

    installed.ok().map(|_| guard)
}

fn env_filter() -> EnvFilter {
    let debug_enabled = env::var(DEBUG_ENV)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    if debug_enabled {
        return EnvFilter::new("debug");
    }

    EnvFilter::try_from_env(FILTER_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
