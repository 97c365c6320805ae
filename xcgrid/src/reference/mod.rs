//! In-process reference implementation of [`Backend`].
//!
//! Every resource lives in a handle table keyed by a monotonically increasing
//! identifier. Dependent resources hold `Arc` clones of what they were built
//! from, so releasing a dependency never invalidates a dependent.

use crate::backend::{Backend, GridSpec, XcEvaluation};
use crate::basis::{BasisRecord, BasisSet};
use crate::functional::{ExchangeKernel, Functional};
use crate::grid::{GridPoint, MolecularGrid};
use crate::handle::{kind, Handle, HandleRef, RawHandle, Resource, ResourceKind};
use crate::integrator;
use crate::molecule::{Molecule, MoleculeRecord};
use crate::records::read_record;
use crate::runtime::Communicator;
use crate::status::{Status, StatusCode};
use crate::types::{ExecutionSpace, MolecularWeightsSettings};
use crate::weights::partition_weight;
use nalgebra::{DMatrix, Vector3};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Model identifier that defers to the integrator's own functional.
pub const FUNCTIONAL_MODEL: &str = "functional";

/// Square matrix record: a list of rows.
#[derive(Debug, Deserialize)]
struct MatrixRecord {
    rows: Vec<Vec<f64>>,
}

#[derive(Debug)]
struct LoadBalancer {
    basis: Arc<BasisSet>,
    centers: Vec<Vector3<f64>>,
    batches: Vec<Vec<GridPoint>>,
    weights_applied: bool,
}

#[derive(Debug)]
struct Integrator {
    functional: Arc<Functional>,
    load_balancer: Arc<LoadBalancer>,
}

#[derive(Debug)]
enum Object {
    Molecule(Arc<Molecule>),
    BasisSet(Arc<BasisSet>),
    MolGrid(Arc<MolecularGrid>),
    LoadBalancer(Arc<LoadBalancer>),
    MolecularWeights(MolecularWeightsSettings),
    Functional(Arc<Functional>),
    Integrator(Integrator),
    Matrix(DMatrix<f64>),
}

impl Object {
    fn kind(&self) -> ResourceKind {
        match self {
            Object::Molecule(_) => ResourceKind::Molecule,
            Object::BasisSet(_) => ResourceKind::BasisSet,
            Object::MolGrid(_) => ResourceKind::MolGrid,
            Object::LoadBalancer(_) => ResourceKind::LoadBalancer,
            Object::MolecularWeights(_) => ResourceKind::MolecularWeights,
            Object::Functional(_) => ResourceKind::Functional,
            Object::Integrator(_) => ResourceKind::Integrator,
            Object::Matrix(_) => ResourceKind::Matrix,
        }
    }
}

#[derive(Debug, Default)]
pub struct ReferenceBackend {
    objects: HashMap<u64, Object>,
    next_id: u64,
}

impl ReferenceBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of resources created and not yet released.
    pub fn live_resources(&self) -> usize {
        self.objects.len()
    }

    fn insert<K: Resource>(&mut self, object: Object) -> Handle<K> {
        debug_assert_eq!(object.kind(), K::KIND);
        self.next_id += 1;
        let id = self.next_id;
        debug!(id, kind = %K::KIND, "created resource");
        self.objects.insert(id, object);
        Handle::from_raw_id(id)
    }

    fn get<K: Resource>(&self, handle: HandleRef<K>) -> Result<&Object, Status> {
        self.objects
            .get(&handle.id())
            .ok_or_else(|| not_live(handle))
    }

    fn molecule(&self, handle: HandleRef<kind::Molecule>) -> Result<Arc<Molecule>, Status> {
        match self.get(handle)? {
            Object::Molecule(m) => Ok(Arc::clone(m)),
            other => Err(kind_mismatch(handle, other)),
        }
    }

    fn basis_set(&self, handle: HandleRef<kind::BasisSet>) -> Result<Arc<BasisSet>, Status> {
        match self.get(handle)? {
            Object::BasisSet(b) => Ok(Arc::clone(b)),
            other => Err(kind_mismatch(handle, other)),
        }
    }

    fn molgrid(&self, handle: HandleRef<kind::MolGrid>) -> Result<Arc<MolecularGrid>, Status> {
        match self.get(handle)? {
            Object::MolGrid(g) => Ok(Arc::clone(g)),
            other => Err(kind_mismatch(handle, other)),
        }
    }

    fn load_balancer(
        &self,
        handle: HandleRef<kind::LoadBalancer>,
    ) -> Result<Arc<LoadBalancer>, Status> {
        match self.get(handle)? {
            Object::LoadBalancer(lb) => Ok(Arc::clone(lb)),
            other => Err(kind_mismatch(handle, other)),
        }
    }

    fn functional(&self, handle: HandleRef<kind::Functional>) -> Result<Arc<Functional>, Status> {
        match self.get(handle)? {
            Object::Functional(f) => Ok(Arc::clone(f)),
            other => Err(kind_mismatch(handle, other)),
        }
    }

    fn integrator(&self, handle: HandleRef<kind::Integrator>) -> Result<&Integrator, Status> {
        match self.get(handle)? {
            Object::Integrator(i) => Ok(i),
            other => Err(kind_mismatch(handle, other)),
        }
    }

    fn matrix(&self, handle: HandleRef<kind::Matrix>) -> Result<&DMatrix<f64>, Status> {
        match self.get(handle)? {
            Object::Matrix(m) => Ok(m),
            other => Err(kind_mismatch(handle, other)),
        }
    }
}

fn not_live<K: Resource>(handle: HandleRef<K>) -> Status {
    Status::new(
        StatusCode::INVALID_HANDLE,
        format!("{} handle {} is not live", K::KIND, handle.id()),
    )
}

fn kind_mismatch<K: Resource>(handle: HandleRef<K>, object: &Object) -> Status {
    Status::new(
        StatusCode::INVALID_HANDLE,
        format!(
            "handle {} refers to a {}, expected a {}",
            handle.id(),
            object.kind(),
            K::KIND
        ),
    )
}

fn require_host(space: ExecutionSpace, what: &str) -> Result<(), Status> {
    match space {
        ExecutionSpace::Host => Ok(()),
        ExecutionSpace::Device => Err(Status::new(
            StatusCode::UNSUPPORTED,
            format!("device execution space is not available for the {what}"),
        )),
    }
}

/// Resolves the model identifier to the exchange kernel used for evaluation.
fn resolve_model(model: &str, functional: &Functional) -> Result<ExchangeKernel, Status> {
    match model.to_lowercase().as_str() {
        FUNCTIONAL_MODEL => Ok(functional.kernel()),
        "lda-x" | "slater" => Ok(ExchangeKernel::Slater),
        "pbe-x" => Ok(ExchangeKernel::Pbe),
        _ if Path::new(model).exists() => Err(Status::new(
            StatusCode::UNSUPPORTED,
            format!("checkpoint model {model} cannot be loaded by the reference backend"),
        )),
        _ => Err(Status::new(
            StatusCode::UNKNOWN_MODEL,
            format!("unknown model '{model}'"),
        )),
    }
}

impl Backend for ReferenceBackend {
    fn molecule_from_record(
        &mut self,
        file: &Path,
        record: &str,
    ) -> Result<Handle<kind::Molecule>, Status> {
        let molecule = Molecule::from_record(read_record::<MoleculeRecord>(file, record)?)?;
        info!(atoms = molecule.natoms(), "loaded molecule");
        Ok(self.insert(Object::Molecule(Arc::new(molecule))))
    }

    fn basis_set_from_record(
        &mut self,
        file: &Path,
        record: &str,
        basis_tol: f64,
    ) -> Result<Handle<kind::BasisSet>, Status> {
        let basis = BasisSet::from_record(read_record::<BasisRecord>(file, record)?, basis_tol)?;
        info!(
            nbf = basis.nbf(),
            shells = basis.shells().len(),
            tolerance = basis.tolerance(),
            "loaded basis set"
        );
        Ok(self.insert(Object::BasisSet(Arc::new(basis))))
    }

    fn molgrid_new_default(
        &mut self,
        molecule: HandleRef<kind::Molecule>,
        spec: &GridSpec,
    ) -> Result<Handle<kind::MolGrid>, Status> {
        let molecule = self.molecule(molecule)?;
        let grid = MolecularGrid::new(&molecule, spec)?;
        info!(points = grid.points().len(), "built molecular grid");
        Ok(self.insert(Object::MolGrid(Arc::new(grid))))
    }

    fn load_balancer_new(
        &mut self,
        space: ExecutionSpace,
        runtime: &dyn Communicator,
        molecule: HandleRef<kind::Molecule>,
        grid: HandleRef<kind::MolGrid>,
        basis: HandleRef<kind::BasisSet>,
    ) -> Result<Handle<kind::LoadBalancer>, Status> {
        require_host(space, "load balancer")?;
        if runtime.size() != 1 {
            return Err(Status::new(
                StatusCode::UNSUPPORTED,
                format!(
                    "the reference backend runs on a single process, world size is {}",
                    runtime.size()
                ),
            ));
        }

        let centers = self.molecule(molecule)?.centers();
        let batches = self.molgrid(grid)?.batches();
        let basis = self.basis_set(basis)?;

        debug!(batches = batches.len(), "partitioned grid");
        let lb = LoadBalancer {
            basis,
            centers,
            batches,
            weights_applied: false,
        };
        Ok(self.insert(Object::LoadBalancer(Arc::new(lb))))
    }

    fn modify_weights(
        &mut self,
        space: ExecutionSpace,
        settings: MolecularWeightsSettings,
        load_balancer: HandleRef<kind::LoadBalancer>,
    ) -> Result<Handle<kind::MolecularWeights>, Status> {
        require_host(space, "molecular weights")?;
        if settings.becke_size_adjustment {
            return Err(Status::new(
                StatusCode::UNSUPPORTED,
                "Becke atomic size adjustment is not supported",
            ));
        }

        let lb = match self.objects.get_mut(&load_balancer.id()) {
            Some(Object::LoadBalancer(lb)) => lb,
            Some(other) => return Err(kind_mismatch(load_balancer, other)),
            None => return Err(not_live(load_balancer)),
        };
        let lb = Arc::get_mut(lb).ok_or_else(|| {
            Status::new(
                StatusCode::PRECONDITION,
                "load balancer is already shared with an integrator",
            )
        })?;
        if lb.weights_applied {
            return Err(Status::new(
                StatusCode::PRECONDITION,
                "partition weights were already applied to this load balancer",
            ));
        }

        let centers = &lb.centers;
        for point in lb.batches.iter_mut().flatten() {
            point.w *= partition_weight(settings.algorithm, point.atom, &point.r, centers);
        }
        lb.weights_applied = true;

        info!(algorithm = ?settings.algorithm, "applied partition weights");
        Ok(self.insert(Object::MolecularWeights(settings)))
    }

    fn functional_from_string(
        &mut self,
        name: &str,
        polarized: bool,
    ) -> Result<Handle<kind::Functional>, Status> {
        let functional = Functional::from_name(name, polarized)?;
        Ok(self.insert(Object::Functional(Arc::new(functional))))
    }

    fn integrator_new(
        &mut self,
        space: ExecutionSpace,
        functional: HandleRef<kind::Functional>,
        load_balancer: HandleRef<kind::LoadBalancer>,
    ) -> Result<Handle<kind::Integrator>, Status> {
        require_host(space, "integrator")?;
        let functional = self.functional(functional)?;
        let load_balancer = self.load_balancer(load_balancer)?;
        info!(functional = functional.name(), "built integrator");
        Ok(self.insert(Object::Integrator(Integrator {
            functional,
            load_balancer,
        })))
    }

    fn matrix_from_record(
        &mut self,
        file: &Path,
        record: &str,
    ) -> Result<Handle<kind::Matrix>, Status> {
        let MatrixRecord { rows } = read_record(file, record)?;
        let n = rows.len();
        if n == 0 || rows.iter().any(|row| row.len() != n) {
            return Err(Status::new(
                StatusCode::RECORD_MALFORMED,
                format!("record {record} is not a non-empty square matrix"),
            ));
        }
        let matrix = DMatrix::from_fn(n, n, |i, j| rows[i][j]);
        Ok(self.insert(Object::Matrix(matrix)))
    }

    fn eval_exc_vxc_uks(
        &mut self,
        integrator: HandleRef<kind::Integrator>,
        density_scalar: HandleRef<kind::Matrix>,
        density_z: HandleRef<kind::Matrix>,
        model: &str,
    ) -> Result<XcEvaluation, Status> {
        let integrator = self.integrator(integrator)?;
        let functional = Arc::clone(&integrator.functional);
        let lb = Arc::clone(&integrator.load_balancer);
        if !functional.is_polarized() {
            return Err(Status::new(
                StatusCode::PRECONDITION,
                "UKS evaluation requires a spin-polarized functional",
            ));
        }
        if !lb.weights_applied {
            return Err(Status::new(
                StatusCode::PRECONDITION,
                "partition weights have not been applied to the load balancer",
            ));
        }
        let kernel = resolve_model(model, &functional)?;

        let ps = self.matrix(density_scalar)?;
        let pz = self.matrix(density_z)?;
        let nbf = lb.basis.nbf();
        for (name, m) in [("scalar", ps), ("z", pz)] {
            if m.nrows() != nbf || m.ncols() != nbf {
                return Err(Status::new(
                    StatusCode::DIMENSION_MISMATCH,
                    format!(
                        "{name} density is {}x{}, basis has {nbf} functions",
                        m.nrows(),
                        m.ncols()
                    ),
                ));
            }
        }

        let result = integrator::eval_exc_vxc_uks(kernel, &lb.basis, &lb.batches, ps, pz);
        info!(exc = result.exc, ?kernel, "evaluated exchange-correlation energy");

        Ok(XcEvaluation {
            exc: result.exc,
            vxc_scalar: self.insert(Object::Matrix(result.vxc_scalar)),
            vxc_z: self.insert(Object::Matrix(result.vxc_z)),
        })
    }

    fn matrix_values(&self, matrix: HandleRef<kind::Matrix>) -> Result<DMatrix<f64>, Status> {
        self.matrix(matrix).cloned()
    }

    fn release(&mut self, handle: RawHandle) -> Result<(), Status> {
        match self.objects.get(&handle.id()) {
            Some(object) if object.kind() == handle.kind() => {
                self.objects.remove(&handle.id());
                debug!(id = handle.id(), kind = %handle.kind(), "released resource");
                Ok(())
            }
            Some(object) => Err(Status::new(
                StatusCode::INVALID_HANDLE,
                format!(
                    "cannot release handle {} as a {}, it is a {}",
                    handle.id(),
                    handle.kind(),
                    object.kind()
                ),
            )),
            None => Err(Status::new(
                StatusCode::INVALID_HANDLE,
                format!("{} handle {} is not live", handle.kind(), handle.id()),
            )),
        }
    }
}

#[cfg(test)]
mod tests;
