//! Construction and evaluation operations a backend exposes to the driver.

use crate::handle::{kind, Handle, HandleRef, RawHandle};
use crate::runtime::Communicator;
use crate::status::Status;
use crate::types::{
    AtomicGridSize, ExecutionSpace, MolecularWeightsSettings, PruningScheme, RadialQuad,
};
use nalgebra::DMatrix;
use std::path::Path;

/// Parameters for the default molecular grid constructor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub size: AtomicGridSize,
    pub radial_quad: RadialQuad,
    pub pruning: PruningScheme,
    pub batch_size: usize,
}

/// Output of a spin-polarized exchange–correlation evaluation.
#[derive(Debug)]
pub struct XcEvaluation {
    pub exc: f64,
    pub vxc_scalar: Handle<kind::Matrix>,
    pub vxc_z: Handle<kind::Matrix>,
}

/// A numerical backend that owns every resource it hands out.
///
/// Each construction call either returns a fresh owning handle or a failure
/// [`Status`]; a failed call leaves nothing behind for the caller to release.
pub trait Backend {
    fn molecule_from_record(
        &mut self,
        file: &Path,
        record: &str,
    ) -> Result<Handle<kind::Molecule>, Status>;

    /// Basis functions are treated as zero wherever they fall below `basis_tol`.
    fn basis_set_from_record(
        &mut self,
        file: &Path,
        record: &str,
        basis_tol: f64,
    ) -> Result<Handle<kind::BasisSet>, Status>;

    fn molgrid_new_default(
        &mut self,
        molecule: HandleRef<kind::Molecule>,
        spec: &GridSpec,
    ) -> Result<Handle<kind::MolGrid>, Status>;

    fn load_balancer_new(
        &mut self,
        space: ExecutionSpace,
        runtime: &dyn Communicator,
        molecule: HandleRef<kind::Molecule>,
        grid: HandleRef<kind::MolGrid>,
        basis: HandleRef<kind::BasisSet>,
    ) -> Result<Handle<kind::LoadBalancer>, Status>;

    /// Applies atomic partition weights to the load balancer's grid in place.
    fn modify_weights(
        &mut self,
        space: ExecutionSpace,
        settings: MolecularWeightsSettings,
        load_balancer: HandleRef<kind::LoadBalancer>,
    ) -> Result<Handle<kind::MolecularWeights>, Status>;

    fn functional_from_string(
        &mut self,
        name: &str,
        polarized: bool,
    ) -> Result<Handle<kind::Functional>, Status>;

    fn integrator_new(
        &mut self,
        space: ExecutionSpace,
        functional: HandleRef<kind::Functional>,
        load_balancer: HandleRef<kind::LoadBalancer>,
    ) -> Result<Handle<kind::Integrator>, Status>;

    fn matrix_from_record(
        &mut self,
        file: &Path,
        record: &str,
    ) -> Result<Handle<kind::Matrix>, Status>;

    /// Unrestricted evaluation in the scalar/Z density representation.
    fn eval_exc_vxc_uks(
        &mut self,
        integrator: HandleRef<kind::Integrator>,
        density_scalar: HandleRef<kind::Matrix>,
        density_z: HandleRef<kind::Matrix>,
        model: &str,
    ) -> Result<XcEvaluation, Status>;

    fn matrix_values(&self, matrix: HandleRef<kind::Matrix>) -> Result<DMatrix<f64>, Status>;

    fn release(&mut self, handle: RawHandle) -> Result<(), Status>;
}
