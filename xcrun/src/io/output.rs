//! Logging to a file or to stderr
//!
//! Stdout is reserved for the configuration echo and the results.

use color_eyre::eyre::{Result, WrapErr};
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime as StdSystemTime;
use tracing::info;
use tracing_subscriber::{
    fmt::format::Writer, fmt::layer, fmt::time::FormatTime, layer::SubscriberExt,
    util::SubscriberInitExt, EnvFilter, Registry,
};

/// Custom time formatter that shows only seconds
struct SecondPrecisionTimer;

impl FormatTime for SecondPrecisionTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let total_seconds = StdSystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        // HH:MM:SS
        let hours = (total_seconds / 3600) % 24;
        let minutes = (total_seconds / 60) % 60;
        let seconds = total_seconds % 60;

        write!(w, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Installs the global subscriber. `RUST_LOG` takes precedence over `level`.
pub fn setup_logging(log_file: Option<&Path>, level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("Invalid log filter: {level}"))?;

    match log_file {
        Some(path) => {
            let log = File::create(path)
                .wrap_err_with(|| format!("Could not create log file: {}", path.display()))?;
            let file_layer = layer()
                .with_writer(Mutex::new(log))
                .with_timer(SecondPrecisionTimer)
                .with_target(false)
                .with_ansi(false);
            Registry::default()
                .with(filter)
                .with(file_layer)
                .try_init()
                .wrap_err("Failed to install log subscriber")?;
            info!("Log output will be written to: {}", path.display());
        }
        None => {
            let stderr_layer = layer()
                .with_writer(std::io::stderr)
                .with_timer(SecondPrecisionTimer)
                .with_target(false)
                .with_ansi(true);
            Registry::default()
                .with(filter)
                .with(stderr_layer)
                .try_init()
                .wrap_err("Failed to install log subscriber")?;
        }
    }
    Ok(())
}
