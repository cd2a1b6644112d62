//! Logging configuration and initialization.
//!
//! Uses tracing with environment-based filtering and optional JSON file output.

use std::io::IsTerminal;
use std::path::Path;
use std::sync::{Mutex, Once};

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize logging for the CLI.
///
/// `RUST_LOG` wins when set. Otherwise the filter comes from the verbosity
/// and quiet flags; the `debug` setting counts as one `-v` and adds source
/// locations to each line.
///
/// # Errors
///
/// Returns an error if logging initialization fails.
pub fn init_logging(
    verbosity: u8,
    quiet: bool,
    debug: bool,
    log_file: Option<&Path>,
) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(verbosity, quiet, debug)))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_file(debug)
        .with_line_number(debug)
        .with_ansi(std::io::stderr().is_terminal());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if let Some(path) = log_file {
        let file = std::fs::File::create(path)?;
        let file_layer = fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .json();
        tracing::subscriber::set_global_default(subscriber.with(file_layer))?;
    } else {
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}

/// Filter directives for the crate and the connection pool.
fn default_filter(verbosity: u8, quiet: bool, debug: bool) -> String {
    if quiet {
        return "error".to_string();
    }

    let level = if debug { verbosity.saturating_add(1) } else { verbosity };
    match level {
        0 => "boostme=info,r2d2=warn".to_string(),
        1 => "boostme=debug,r2d2=warn".to_string(),
        2 => "boostme=debug,r2d2=debug".to_string(),
        _ => "boostme=trace,r2d2=trace".to_string(),
    }
}

/// Initialize logging for tests with the test writer.
pub fn init_test_logging() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("boostme=debug,test=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}
