//! XC integration command-line interface
//!
//! Reads a molecule, basis set and spin densities from a record file and
//! integrates the exchange-correlation energy and potential.

use clap::Parser;
use color_eyre::eyre::Result;
use std::process::ExitCode;
use xcrun::app::XcApplication;
use xcrun::config::Args;
use xcrun::io::setup_logging;

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_logging(args.log_file.as_deref(), &args.log_level)?;

    let app = XcApplication::from_args(args)?;
    Ok(app.run())
}
