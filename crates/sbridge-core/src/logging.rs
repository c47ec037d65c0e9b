#![forbid(unsafe_code)]

//! Logging setup.
//!
//! Crates in the workspace emit events with `tracing` directly. With the
//! `tracing-json` feature, [`init_file_logging`] installs a JSON subscriber
//! that writes to a file; stdout belongs to the UI and must never receive log
//! lines.

/// Default filter directive used when neither `RUST_LOG` nor an explicit
/// filter is supplied.
pub const DEFAULT_FILTER: &str = "info";

/// Install a global JSON subscriber writing to `path` (appending).
///
/// `RUST_LOG` takes precedence over `filter` when it is set and parses.
///
/// # Errors
///
/// Fails if the file cannot be opened, the filter does not parse, or a
/// global subscriber is already installed.
#[cfg(feature = "tracing-json")]
pub fn init_file_logging(path: &std::path::Path, filter: Option<&str>) -> std::io::Result<()> {
    use std::io;
    use tracing_subscriber::EnvFilter;

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(from_env) => from_env,
        Err(_) => EnvFilter::try_new(filter.unwrap_or(DEFAULT_FILTER))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?,
    };

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_current_span(true)
        .try_init()
        .map_err(io::Error::other)
}
