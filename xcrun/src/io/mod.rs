//! Logging setup for the driver

mod output;

pub use output::setup_logging;
