//! A backend double that records every call and fails on request.

#![allow(dead_code)]

use nalgebra::DMatrix;
use std::cell::Cell;
use std::collections::HashMap;
use std::path::Path;
use xcgrid::{
    kind, Backend, Communicator, ExecutionSpace, GridSpec, Handle, HandleRef,
    MolecularWeightsSettings, RawHandle, Resource, ResourceKind, Status, StatusCode,
    XcEvaluation,
};

/// Construction calls in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Molecule,
    BasisSet,
    MolGrid,
    LoadBalancer,
    ModifyWeights,
    Functional,
    Integrator,
    Matrix,
    Eval,
}

pub const PIPELINE_CALLS: [Call; 10] = [
    Call::Molecule,
    Call::BasisSet,
    Call::MolGrid,
    Call::LoadBalancer,
    Call::ModifyWeights,
    Call::Functional,
    Call::Integrator,
    Call::Matrix,
    Call::Matrix,
    Call::Eval,
];

#[derive(Debug, Default)]
pub struct ScriptedBackend {
    pub calls: Vec<Call>,
    /// Release attempts, in order.
    pub released: Vec<(u64, ResourceKind)>,
    pub model_seen: Option<String>,
    pub grid_seen: Option<GridSpec>,
    pub basis_tol_seen: Option<f64>,
    live: HashMap<u64, ResourceKind>,
    next_id: u64,
    fail_call: Option<(usize, Status)>,
    fail_release: Option<(ResourceKind, Status)>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// The construction call with this index (0-based) fails with `status`.
    pub fn failing_call(mut self, index: usize, status: Status) -> Self {
        self.fail_call = Some((index, status));
        self
    }

    /// Releasing any resource of `kind` reports `status`.
    pub fn failing_release(mut self, kind: ResourceKind, status: Status) -> Self {
        self.fail_release = Some((kind, status));
        self
    }

    pub fn live_resources(&self) -> usize {
        self.live.len()
    }

    fn call(&mut self, call: Call) -> Result<(), Status> {
        let index = self.calls.len();
        self.calls.push(call);
        match &self.fail_call {
            Some((at, status)) if *at == index => Err(status.clone()),
            _ => Ok(()),
        }
    }

    fn create<K: Resource>(&mut self, call: Call) -> Result<Handle<K>, Status> {
        self.call(call)?;
        self.next_id += 1;
        self.live.insert(self.next_id, K::KIND);
        Ok(Handle::from_raw_id(self.next_id))
    }

    fn check<K: Resource>(&self, handle: HandleRef<K>) -> Result<(), Status> {
        match self.live.get(&handle.id()) {
            Some(kind) if *kind == K::KIND => Ok(()),
            _ => Err(Status::new(
                StatusCode::INVALID_HANDLE,
                format!("stale {} handle {}", K::KIND, handle.id()),
            )),
        }
    }
}

impl Backend for ScriptedBackend {
    fn molecule_from_record(
        &mut self,
        _file: &Path,
        _record: &str,
    ) -> Result<Handle<kind::Molecule>, Status> {
        self.create(Call::Molecule)
    }

    fn basis_set_from_record(
        &mut self,
        _file: &Path,
        _record: &str,
        basis_tol: f64,
    ) -> Result<Handle<kind::BasisSet>, Status> {
        self.basis_tol_seen = Some(basis_tol);
        self.create(Call::BasisSet)
    }

    fn molgrid_new_default(
        &mut self,
        molecule: HandleRef<kind::Molecule>,
        spec: &GridSpec,
    ) -> Result<Handle<kind::MolGrid>, Status> {
        self.check(molecule)?;
        self.grid_seen = Some(*spec);
        self.create(Call::MolGrid)
    }

    fn load_balancer_new(
        &mut self,
        _space: ExecutionSpace,
        _runtime: &dyn Communicator,
        molecule: HandleRef<kind::Molecule>,
        grid: HandleRef<kind::MolGrid>,
        basis: HandleRef<kind::BasisSet>,
    ) -> Result<Handle<kind::LoadBalancer>, Status> {
        self.check(molecule)?;
        self.check(grid)?;
        self.check(basis)?;
        self.create(Call::LoadBalancer)
    }

    fn modify_weights(
        &mut self,
        _space: ExecutionSpace,
        _settings: MolecularWeightsSettings,
        load_balancer: HandleRef<kind::LoadBalancer>,
    ) -> Result<Handle<kind::MolecularWeights>, Status> {
        self.check(load_balancer)?;
        self.create(Call::ModifyWeights)
    }

    fn functional_from_string(
        &mut self,
        _name: &str,
        _polarized: bool,
    ) -> Result<Handle<kind::Functional>, Status> {
        self.create(Call::Functional)
    }

    fn integrator_new(
        &mut self,
        _space: ExecutionSpace,
        functional: HandleRef<kind::Functional>,
        load_balancer: HandleRef<kind::LoadBalancer>,
    ) -> Result<Handle<kind::Integrator>, Status> {
        self.check(functional)?;
        self.check(load_balancer)?;
        self.create(Call::Integrator)
    }

    fn matrix_from_record(
        &mut self,
        _file: &Path,
        _record: &str,
    ) -> Result<Handle<kind::Matrix>, Status> {
        self.create(Call::Matrix)
    }

    fn eval_exc_vxc_uks(
        &mut self,
        integrator: HandleRef<kind::Integrator>,
        density_scalar: HandleRef<kind::Matrix>,
        density_z: HandleRef<kind::Matrix>,
        model: &str,
    ) -> Result<XcEvaluation, Status> {
        self.check(integrator)?;
        self.check(density_scalar)?;
        self.check(density_z)?;
        self.model_seen = Some(model.to_string());
        self.call(Call::Eval)?;

        let mut output = || {
            self.next_id += 1;
            self.live.insert(self.next_id, ResourceKind::Matrix);
            Handle::from_raw_id(self.next_id)
        };
        Ok(XcEvaluation {
            exc: -1.25,
            vxc_scalar: output(),
            vxc_z: output(),
        })
    }

    fn matrix_values(&self, matrix: HandleRef<kind::Matrix>) -> Result<DMatrix<f64>, Status> {
        self.check(matrix)?;
        Ok(DMatrix::identity(2, 2))
    }

    fn release(&mut self, handle: RawHandle) -> Result<(), Status> {
        self.released.push((handle.id(), handle.kind()));
        if let Some((kind, status)) = &self.fail_release {
            if *kind == handle.kind() {
                return Err(status.clone());
            }
        }
        match self.live.remove(&handle.id()) {
            Some(_) => Ok(()),
            None => Err(Status::new(
                StatusCode::INVALID_HANDLE,
                format!("double release of {}", handle.id()),
            )),
        }
    }
}

/// A world of `size` processes seen from `rank`, counting barrier calls.
#[derive(Debug, Default)]
pub struct FakeWorld {
    pub rank: usize,
    pub size: usize,
    pub barriers: Cell<usize>,
}

impl FakeWorld {
    pub fn new(rank: usize, size: usize) -> Self {
        Self {
            rank,
            size,
            barriers: Cell::new(0),
        }
    }
}

impl Communicator for FakeWorld {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn barrier(&self) {
        self.barriers.set(self.barriers.get() + 1);
    }
}
