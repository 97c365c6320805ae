use super::registry::ResourceRegistry;
use crate::config::Configuration;
use crate::error::DriverError;
use nalgebra::DMatrix;
use std::fmt;
use tracing::info;
use xcgrid::{
    kind, Backend, Communicator, Handle, HandleRef, MolecularWeightsSettings, Resource, Status,
};

pub const MOLECULE_RECORD: &str = "/MOLECULE";
pub const BASIS_RECORD: &str = "/BASIS";
pub const DENSITY_SCALAR_RECORD: &str = "/DENSITY_SCALAR";
pub const DENSITY_Z_RECORD: &str = "/DENSITY_Z";

/// The functional handed to the integrator.
pub const FUNCTIONAL_NAME: &str = "PBE";

/// One construction step of the pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Molecule,
    BasisSet,
    MolGrid,
    LoadBalancer,
    MolecularWeights,
    Functional,
    Integrator,
    DensityScalar,
    DensityZ,
    XcEvaluation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Molecule => "molecule",
            Stage::BasisSet => "basis set",
            Stage::MolGrid => "molecular grid",
            Stage::LoadBalancer => "load balancer",
            Stage::MolecularWeights => "molecular weights",
            Stage::Functional => "functional",
            Stage::Integrator => "integrator",
            Stage::DensityScalar => "scalar density",
            Stage::DensityZ => "z density",
            Stage::XcEvaluation => "XC evaluation",
        })
    }
}

/// Energy and potential read back from the evaluation's output matrices.
#[derive(Debug, Clone)]
pub struct XcResults {
    pub exc: f64,
    pub vxc_scalar: DMatrix<f64>,
    pub vxc_z: DMatrix<f64>,
}

/// Builds the backend resources in dependency order.
///
/// Every handle a stage returns goes into the registry before the next stage
/// runs. The first failing stage ends the run; later stages never execute.
pub struct Pipeline<'a, B: Backend> {
    backend: &'a mut B,
    runtime: &'a dyn Communicator,
    registry: &'a mut ResourceRegistry,
}

impl<'a, B: Backend> Pipeline<'a, B> {
    pub fn new(
        backend: &'a mut B,
        runtime: &'a dyn Communicator,
        registry: &'a mut ResourceRegistry,
    ) -> Self {
        Self {
            backend,
            runtime,
            registry,
        }
    }

    fn stage<K, F>(&mut self, stage: Stage, construct: F) -> Result<HandleRef<K>, DriverError>
    where
        K: Resource,
        F: FnOnce(&mut B) -> Result<Handle<K>, Status>,
    {
        info!(%stage, "constructing");
        let handle =
            construct(&mut *self.backend).map_err(|status| DriverError::Backend { stage, status })?;
        let reference = handle.reference();
        self.registry.register(handle);
        Ok(reference)
    }

    pub fn run(&mut self, config: &Configuration) -> Result<XcResults, DriverError> {
        let input = config.input_file();
        let runtime = self.runtime;

        let molecule = self.stage(Stage::Molecule, |b| {
            b.molecule_from_record(input, MOLECULE_RECORD)
        })?;
        let basis = self.stage(Stage::BasisSet, |b| {
            b.basis_set_from_record(input, BASIS_RECORD, config.basis_tol().get())
        })?;
        let grid = self.stage(Stage::MolGrid, |b| {
            b.molgrid_new_default(molecule, &config.grid_spec())
        })?;
        let lb = self.stage(Stage::LoadBalancer, |b| {
            b.load_balancer_new(config.lb_exec_space(), runtime, molecule, grid, basis)
        })?;
        self.stage(Stage::MolecularWeights, |b| {
            b.modify_weights(
                config.int_exec_space(),
                MolecularWeightsSettings::default(),
                lb,
            )
        })?;
        let functional = self.stage(Stage::Functional, |b| {
            b.functional_from_string(FUNCTIONAL_NAME, true)
        })?;
        let integrator = self.stage(Stage::Integrator, |b| {
            b.integrator_new(config.int_exec_space(), functional, lb)
        })?;
        let density_scalar = self.stage(Stage::DensityScalar, |b| {
            b.matrix_from_record(input, DENSITY_SCALAR_RECORD)
        })?;
        let density_z = self.stage(Stage::DensityZ, |b| {
            b.matrix_from_record(input, DENSITY_Z_RECORD)
        })?;

        self.runtime.barrier();
        let results = self.evaluate(integrator, density_scalar, density_z, config.model());
        self.runtime.barrier();
        results
    }

    fn evaluate(
        &mut self,
        integrator: HandleRef<kind::Integrator>,
        density_scalar: HandleRef<kind::Matrix>,
        density_z: HandleRef<kind::Matrix>,
        model: &str,
    ) -> Result<XcResults, DriverError> {
        let stage = Stage::XcEvaluation;
        info!(%stage, model, "constructing");
        let backend_failure = |status| DriverError::Backend { stage, status };

        let evaluation = self
            .backend
            .eval_exc_vxc_uks(integrator, density_scalar, density_z, model)
            .map_err(backend_failure)?;
        let vxc_scalar = evaluation.vxc_scalar.reference();
        let vxc_z = evaluation.vxc_z.reference();
        self.registry.register(evaluation.vxc_scalar);
        self.registry.register(evaluation.vxc_z);

        Ok(XcResults {
            exc: evaluation.exc,
            vxc_scalar: self
                .backend
                .matrix_values(vxc_scalar)
                .map_err(backend_failure)?,
            vxc_z: self.backend.matrix_values(vxc_z).map_err(backend_failure)?,
        })
    }
}
