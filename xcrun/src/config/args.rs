//! Command-line argument parsing for the XC integration driver

use super::BasisTolerance;
use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Integrate the exchange-correlation energy and potential of a spin-polarized density
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input file containing molecular geometry, basis set and density matrices
    #[arg(value_name = "FILE")]
    pub input_file: Option<PathBuf>,

    /// Model to use, can be a path to a checkpoint
    #[arg(long)]
    pub model: Option<String>,

    /// Atomic grid size (default: Fine). Possible values: Fine, UltraFine, SuperFine, GM3, GM5
    #[arg(long)]
    pub grid_spec: Option<String>,

    /// Radial quadrature scheme (default: MuraKnowles). Possible values: Becke, MuraKnowles, TreutlerAhlrichs, MurrayHandyLaming
    #[arg(long)]
    pub radial_quad: Option<String>,

    /// Pruning scheme (default: Robust). Possible values: Unpruned, Robust, Treutler
    #[arg(long)]
    pub prune_scheme: Option<String>,

    /// Load balancer execution space (default: Host). Possible values: Host, Device
    #[arg(long)]
    pub lb_exec_space: Option<String>,

    /// Integrator execution space (default: Host). Possible values: Host, Device
    #[arg(long)]
    pub int_exec_space: Option<String>,

    /// Batch size for grid point processing (default: 512)
    #[arg(long)]
    pub batch_size: Option<NonZeroUsize>,

    /// Basis function evaluation tolerance (default: 1e-10)
    #[arg(long)]
    pub basis_tol: Option<BasisTolerance>,

    /// YAML file with defaults for the optional settings above
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write log output to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}
