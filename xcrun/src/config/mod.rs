//! Configuration management for the XC integration driver
//!
//! Raw option values come from the command line, an optional YAML defaults
//! file and built-in defaults, in that order of precedence. They are decoded
//! once into an immutable [`Configuration`].

mod args;

pub use args::Args;

use crate::error::DriverError;
use crate::options::{decode, OptionKind};
use color_eyre::eyre::{Result, WrapErr};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use xcgrid::{AtomicGridSize, ExecutionSpace, GridSpec, PruningScheme, RadialQuad};

pub const DEFAULT_GRID_SPEC: &str = "fine";
pub const DEFAULT_RADIAL_QUAD: &str = "muraknowles";
pub const DEFAULT_PRUNE_SCHEME: &str = "robust";
pub const DEFAULT_EXEC_SPACE: &str = "host";
pub const DEFAULT_BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(512) {
    Some(n) => n,
    None => unreachable!(),
};
pub const DEFAULT_BASIS_TOL: f64 = 1e-10;

/// Basis function screening tolerance, always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "f64")]
pub struct BasisTolerance(f64);

impl BasisTolerance {
    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for BasisTolerance {
    fn default() -> Self {
        BasisTolerance(DEFAULT_BASIS_TOL)
    }
}

impl TryFrom<f64> for BasisTolerance {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value > 0.0 && value.is_finite() {
            Ok(BasisTolerance(value))
        } else {
            Err(format!("basis tolerance must be positive and finite, got {value}"))
        }
    }
}

impl FromStr for BasisTolerance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| format!("'{s}' is not a number"))?;
        BasisTolerance::try_from(value)
    }
}

impl fmt::Display for BasisTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:e}", self.0)
    }
}

/// Optional settings read from `--config`. The input file and model can
/// only be given on the command line.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub grid_spec: Option<String>,
    pub radial_quad: Option<String>,
    pub prune_scheme: Option<String>,
    pub lb_exec_space: Option<String>,
    pub int_exec_space: Option<String>,
    pub batch_size: Option<NonZeroUsize>,
    pub basis_tol: Option<BasisTolerance>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).wrap_err_with(|| {
            format!("Unable to read configuration file: {}", path.display())
        })?;
        let config = serde_yml::from_str::<FileConfig>(&content)
            .wrap_err("Failed to parse configuration file")?;
        Ok(config)
    }
}

/// Option values after defaults are applied, before any decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct RawOptions {
    pub input_file: Option<PathBuf>,
    pub model: Option<String>,
    pub grid_spec: String,
    pub radial_quad: String,
    pub prune_scheme: String,
    pub lb_exec_space: String,
    pub int_exec_space: String,
    pub batch_size: NonZeroUsize,
    pub basis_tol: BasisTolerance,
}

impl RawOptions {
    pub fn resolve(args: &Args, file: &FileConfig) -> Self {
        let pick = |cli: &Option<String>, file: &Option<String>, default: &str| {
            cli.clone()
                .or_else(|| file.clone())
                .unwrap_or_else(|| default.to_string())
        };

        RawOptions {
            input_file: args.input_file.clone(),
            model: args.model.clone(),
            grid_spec: pick(&args.grid_spec, &file.grid_spec, DEFAULT_GRID_SPEC),
            radial_quad: pick(&args.radial_quad, &file.radial_quad, DEFAULT_RADIAL_QUAD),
            prune_scheme: pick(&args.prune_scheme, &file.prune_scheme, DEFAULT_PRUNE_SCHEME),
            lb_exec_space: pick(&args.lb_exec_space, &file.lb_exec_space, DEFAULT_EXEC_SPACE),
            int_exec_space: pick(&args.int_exec_space, &file.int_exec_space, DEFAULT_EXEC_SPACE),
            batch_size: args
                .batch_size
                .or(file.batch_size)
                .unwrap_or(DEFAULT_BATCH_SIZE),
            basis_tol: args.basis_tol.or(file.basis_tol).unwrap_or_default(),
        }
    }
}

/// Fully decoded run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    input_file: PathBuf,
    model: String,
    grid_size: AtomicGridSize,
    radial_quad: RadialQuad,
    pruning: PruningScheme,
    lb_exec_space: ExecutionSpace,
    int_exec_space: ExecutionSpace,
    batch_size: NonZeroUsize,
    basis_tol: BasisTolerance,
}

impl Configuration {
    /// Checks the required values, then decodes the enumerations in a fixed
    /// order. The first failure is returned.
    pub fn assemble(raw: RawOptions) -> Result<Self, DriverError> {
        let input_file = raw
            .input_file
            .ok_or(DriverError::MissingRequiredArgument("<FILE>"))?;
        let model = raw
            .model
            .ok_or(DriverError::MissingRequiredArgument("--model"))?;

        Ok(Configuration {
            input_file,
            model,
            grid_size: decode(OptionKind::GridSpec, &raw.grid_spec)?,
            radial_quad: decode(OptionKind::RadialQuad, &raw.radial_quad)?,
            pruning: decode(OptionKind::PruneScheme, &raw.prune_scheme)?,
            lb_exec_space: decode(OptionKind::LbExecSpace, &raw.lb_exec_space)?,
            int_exec_space: decode(OptionKind::IntExecSpace, &raw.int_exec_space)?,
            batch_size: raw.batch_size,
            basis_tol: raw.basis_tol,
        })
    }

    pub fn input_file(&self) -> &Path {
        &self.input_file
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn grid_size(&self) -> AtomicGridSize {
        self.grid_size
    }

    pub fn radial_quad(&self) -> RadialQuad {
        self.radial_quad
    }

    pub fn pruning(&self) -> PruningScheme {
        self.pruning
    }

    pub fn lb_exec_space(&self) -> ExecutionSpace {
        self.lb_exec_space
    }

    pub fn int_exec_space(&self) -> ExecutionSpace {
        self.int_exec_space
    }

    pub fn batch_size(&self) -> NonZeroUsize {
        self.batch_size
    }

    pub fn basis_tol(&self) -> BasisTolerance {
        self.basis_tol
    }

    pub fn grid_spec(&self) -> GridSpec {
        GridSpec {
            size: self.grid_size,
            radial_quad: self.radial_quad,
            pruning: self.pruning,
            batch_size: self.batch_size.get(),
        }
    }
}
