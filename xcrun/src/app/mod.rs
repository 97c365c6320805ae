mod pipeline;
mod registry;
mod report;
mod teardown;

pub use pipeline::{
    Pipeline, Stage, XcResults, BASIS_RECORD, DENSITY_SCALAR_RECORD, DENSITY_Z_RECORD,
    FUNCTIONAL_NAME, MOLECULE_RECORD,
};
pub use registry::ResourceRegistry;
pub use report::{print_configuration, print_results};
pub use teardown::FinalStatus;

use crate::config::{Args, Configuration, FileConfig, RawOptions};
use crate::error::DriverError;
use color_eyre::eyre::Result;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::{info, warn};
use xcgrid::{Backend, Communicator, ReferenceBackend, SingleProcess};

pub struct XcApplication {
    args: Args,
    file_config: FileConfig,
}

impl XcApplication {
    pub fn from_args(args: Args) -> Result<Self> {
        let file_config = match &args.config {
            Some(path) => {
                info!("Reading defaults from: {}", path.display());
                FileConfig::load(path)?
            }
            None => FileConfig::default(),
        };
        Ok(Self { args, file_config })
    }

    pub fn run(self) -> ExitCode {
        let raw = RawOptions::resolve(&self.args, &self.file_config);
        let mut backend = ReferenceBackend::new();
        let summary = run(
            raw,
            &mut backend,
            &SingleProcess,
            &mut io::stdout().lock(),
            &mut io::stderr().lock(),
        );
        summary.status.exit_code()
    }
}

/// What a run produced and how it ended.
#[derive(Debug)]
pub struct RunSummary {
    /// Present only when every stage succeeded.
    pub results: Option<XcResults>,
    /// Number of resources handed to the teardown pass.
    pub released: usize,
    pub status: FinalStatus,
}

/// Executes one run against `backend` and tears it down.
///
/// The configuration echo and results go to `out` on rank zero only;
/// diagnostics go to `err`. Every resource the pipeline registered is
/// released exactly once, whichever stage the run stopped at.
pub fn run<B: Backend, O: Write, E: Write>(
    raw: RawOptions,
    backend: &mut B,
    runtime: &dyn Communicator,
    out: &mut O,
    err: &mut E,
) -> RunSummary {
    let mut registry = ResourceRegistry::new();
    let outcome = execute(raw, backend, runtime, &mut registry, out);

    let released = registry.len();
    let cleanup = registry.release_all(backend).err();
    let (results, failure) = match outcome {
        Ok(results) => (Some(results), None),
        Err(failure) => (None, Some(failure)),
    };

    let status = FinalStatus::resolve(failure, cleanup);
    if let Err(io_err) = status.write_diagnostics(err) {
        warn!(%io_err, "failed to write diagnostics");
    }
    info!(released, code = ?status.code(), "run finished");

    RunSummary {
        results,
        released,
        status,
    }
}

/// Everything up to teardown. The decoded configuration does not outlive
/// this call.
fn execute<B: Backend, O: Write>(
    raw: RawOptions,
    backend: &mut B,
    runtime: &dyn Communicator,
    registry: &mut ResourceRegistry,
    out: &mut O,
) -> Result<XcResults, DriverError> {
    let config = Configuration::assemble(raw)?;
    let reporting = runtime.rank() == 0;

    if reporting {
        if let Err(io_err) = print_configuration(out, &config) {
            warn!(%io_err, "failed to write configuration");
        }
    }

    let results = Pipeline::new(backend, runtime, registry).run(&config)?;

    if reporting {
        if let Err(io_err) = print_results(out, &results) {
            warn!(%io_err, "failed to write results");
        }
    }
    Ok(results)
}
