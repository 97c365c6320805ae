use super::*;
use crate::runtime::SingleProcess;
use crate::types::{AtomicGridSize, PruningScheme, RadialQuad, WeightAlgorithm};
use std::io::Write;
use tempfile::NamedTempFile;

const H2_INPUT: &str = r#""/MOLECULE":
  atoms:
    - {element: H, coords: [0.0, 0.0, 0.0]}
    - {element: H, coords: [0.0, 0.0, 1.4]}
"/BASIS":
  shells:
    - center: [0.0, 0.0, 0.0]
      l: 0
      exponents: [3.42525091, 0.62391373, 0.16885540]
      coefficients: [0.15432897, 0.53532814, 0.44463454]
    - center: [0.0, 0.0, 1.4]
      l: 0
      exponents: [3.42525091, 0.62391373, 0.16885540]
      coefficients: [0.15432897, 0.53532814, 0.44463454]
"/DENSITY_SCALAR":
  rows: [[0.6, 0.6], [0.6, 0.6]]
"/DENSITY_Z":
  rows: [[0.0, 0.0], [0.0, 0.0]]
"/DENSITY_SMALL":
  rows: [[1.0]]
"/NOT_SQUARE":
  rows: [[1.0, 0.0]]
"#;

fn input_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(H2_INPUT.as_bytes()).unwrap();
    file
}

fn grid_spec() -> GridSpec {
    GridSpec {
        size: AtomicGridSize::Fine,
        radial_quad: RadialQuad::MuraKnowles,
        pruning: PruningScheme::Robust,
        batch_size: 256,
    }
}

struct World(usize);

impl Communicator for World {
    fn rank(&self) -> usize {
        0
    }
    fn size(&self) -> usize {
        self.0
    }
    fn barrier(&self) {}
}

/// Handles created up to (and including) the integrator.
struct Setup {
    owned: Vec<RawHandle>,
    lb: HandleRef<kind::LoadBalancer>,
    integrator: HandleRef<kind::Integrator>,
}

fn setup(backend: &mut ReferenceBackend, path: &Path, apply_weights: bool) -> Setup {
    let mol = backend.molecule_from_record(path, "/MOLECULE").unwrap();
    let basis = backend
        .basis_set_from_record(path, "/BASIS", 1e-10)
        .unwrap();
    let grid = backend
        .molgrid_new_default(mol.reference(), &grid_spec())
        .unwrap();
    let lb = backend
        .load_balancer_new(
            ExecutionSpace::Host,
            &SingleProcess,
            mol.reference(),
            grid.reference(),
            basis.reference(),
        )
        .unwrap();
    let lb_ref = lb.reference();
    let mut owned = vec![mol.into_raw(), basis.into_raw(), grid.into_raw()];
    if apply_weights {
        let weights = backend
            .modify_weights(
                ExecutionSpace::Host,
                MolecularWeightsSettings::default(),
                lb_ref,
            )
            .unwrap();
        owned.push(weights.into_raw());
    }
    let func = backend.functional_from_string("PBE", true).unwrap();
    let integrator = backend
        .integrator_new(ExecutionSpace::Host, func.reference(), lb_ref)
        .unwrap();
    let integrator_ref = integrator.reference();
    owned.extend([lb.into_raw(), func.into_raw(), integrator.into_raw()]);
    Setup {
        owned,
        lb: lb_ref,
        integrator: integrator_ref,
    }
}

#[test]
fn h2_pipeline_produces_finite_energy_and_releases_cleanly() {
    let file = input_file();
    let mut backend = ReferenceBackend::new();
    let s = setup(&mut backend, file.path(), true);

    let ps = backend
        .matrix_from_record(file.path(), "/DENSITY_SCALAR")
        .unwrap();
    let pz = backend.matrix_from_record(file.path(), "/DENSITY_Z").unwrap();
    let eval = backend
        .eval_exc_vxc_uks(s.integrator, ps.reference(), pz.reference(), "pbe-x")
        .unwrap();

    assert!(eval.exc.is_finite() && eval.exc < 0.0, "{}", eval.exc);
    let vs = backend.matrix_values(eval.vxc_scalar.reference()).unwrap();
    let vz = backend.matrix_values(eval.vxc_z.reference()).unwrap();
    assert_eq!(vs.shape(), (2, 2));
    assert!((vs[(0, 1)] - vs[(1, 0)]).abs() < 1e-10);
    assert!(vz.amax() < 1e-12);

    let mut handles = s.owned;
    handles.extend([
        ps.into_raw(),
        pz.into_raw(),
        eval.vxc_scalar.into_raw(),
        eval.vxc_z.into_raw(),
    ]);
    for handle in handles.into_iter().rev() {
        backend.release(handle).unwrap();
    }
    assert_eq!(backend.live_resources(), 0);
}

#[test]
fn functional_model_and_pbe_x_agree() {
    let file = input_file();
    let mut backend = ReferenceBackend::new();
    let s = setup(&mut backend, file.path(), true);
    let ps = backend
        .matrix_from_record(file.path(), "/DENSITY_SCALAR")
        .unwrap();
    let pz = backend.matrix_from_record(file.path(), "/DENSITY_Z").unwrap();

    let a = backend
        .eval_exc_vxc_uks(s.integrator, ps.reference(), pz.reference(), "pbe-x")
        .unwrap();
    let b = backend
        .eval_exc_vxc_uks(s.integrator, ps.reference(), pz.reference(), FUNCTIONAL_MODEL)
        .unwrap();
    let c = backend
        .eval_exc_vxc_uks(s.integrator, ps.reference(), pz.reference(), "lda-x")
        .unwrap();
    assert!((a.exc - b.exc).abs() < 1e-12);
    assert!((a.exc - c.exc).abs() > 1e-6);
}

#[test]
fn evaluation_requires_partition_weights() {
    let file = input_file();
    let mut backend = ReferenceBackend::new();
    let s = setup(&mut backend, file.path(), false);
    let ps = backend
        .matrix_from_record(file.path(), "/DENSITY_SCALAR")
        .unwrap();
    let pz = backend.matrix_from_record(file.path(), "/DENSITY_Z").unwrap();

    let err = backend
        .eval_exc_vxc_uks(s.integrator, ps.reference(), pz.reference(), "pbe-x")
        .unwrap_err();
    assert_eq!(err.code(), StatusCode::PRECONDITION);

    // the integrator now shares the load balancer
    let err = backend
        .modify_weights(
            ExecutionSpace::Host,
            MolecularWeightsSettings::default(),
            s.lb,
        )
        .unwrap_err();
    assert_eq!(err.code(), StatusCode::PRECONDITION);
}

#[test]
fn unknown_model_and_checkpoint_model_fail() {
    let file = input_file();
    let mut backend = ReferenceBackend::new();
    let s = setup(&mut backend, file.path(), true);
    let ps = backend
        .matrix_from_record(file.path(), "/DENSITY_SCALAR")
        .unwrap();
    let pz = backend.matrix_from_record(file.path(), "/DENSITY_Z").unwrap();

    let err = backend
        .eval_exc_vxc_uks(s.integrator, ps.reference(), pz.reference(), "no-such-model")
        .unwrap_err();
    assert_eq!(err.code(), StatusCode::UNKNOWN_MODEL);

    let checkpoint = NamedTempFile::new().unwrap();
    let model = checkpoint.path().to_string_lossy().into_owned();
    let err = backend
        .eval_exc_vxc_uks(s.integrator, ps.reference(), pz.reference(), &model)
        .unwrap_err();
    assert_eq!(err.code(), StatusCode::UNSUPPORTED);
}

#[test]
fn density_dimensions_must_match_basis() {
    let file = input_file();
    let mut backend = ReferenceBackend::new();
    let s = setup(&mut backend, file.path(), true);
    let small = backend
        .matrix_from_record(file.path(), "/DENSITY_SMALL")
        .unwrap();
    let pz = backend.matrix_from_record(file.path(), "/DENSITY_Z").unwrap();

    let err = backend
        .eval_exc_vxc_uks(s.integrator, small.reference(), pz.reference(), "pbe-x")
        .unwrap_err();
    assert_eq!(err.code(), StatusCode::DIMENSION_MISMATCH);

    let err = backend
        .matrix_from_record(file.path(), "/NOT_SQUARE")
        .unwrap_err();
    assert_eq!(err.code(), StatusCode::RECORD_MALFORMED);
}

#[test]
fn device_space_and_multi_rank_worlds_are_unsupported() {
    let file = input_file();
    let mut backend = ReferenceBackend::new();
    let mol = backend
        .molecule_from_record(file.path(), "/MOLECULE")
        .unwrap();
    let basis = backend
        .basis_set_from_record(file.path(), "/BASIS", 1e-10)
        .unwrap();
    let grid = backend
        .molgrid_new_default(mol.reference(), &grid_spec())
        .unwrap();

    let err = backend
        .load_balancer_new(
            ExecutionSpace::Device,
            &SingleProcess,
            mol.reference(),
            grid.reference(),
            basis.reference(),
        )
        .unwrap_err();
    assert_eq!(err.code(), StatusCode::UNSUPPORTED);

    let err = backend
        .load_balancer_new(
            ExecutionSpace::Host,
            &World(4),
            mol.reference(),
            grid.reference(),
            basis.reference(),
        )
        .unwrap_err();
    assert_eq!(err.code(), StatusCode::UNSUPPORTED);
    assert_eq!(backend.live_resources(), 3);

    let lb = backend
        .load_balancer_new(
            ExecutionSpace::Host,
            &SingleProcess,
            mol.reference(),
            grid.reference(),
            basis.reference(),
        )
        .unwrap();
    let settings = MolecularWeightsSettings {
        becke_size_adjustment: true,
        ..MolecularWeightsSettings::default()
    };
    let err = backend
        .modify_weights(ExecutionSpace::Host, settings, lb.reference())
        .unwrap_err();
    assert_eq!(err.code(), StatusCode::UNSUPPORTED);
    assert_eq!(backend.live_resources(), 4);
}

#[test]
fn handles_are_checked_by_kind_and_liveness() {
    let file = input_file();
    let mut backend = ReferenceBackend::new();
    let mol = backend
        .molecule_from_record(file.path(), "/MOLECULE")
        .unwrap();
    let id = mol.id();

    // a molecule id presented as a matrix
    let err = backend
        .matrix_values(Handle::<kind::Matrix>::from_raw_id(id).reference())
        .unwrap_err();
    assert_eq!(err.code(), StatusCode::INVALID_HANDLE);
    let err = backend
        .release(Handle::<kind::Matrix>::from_raw_id(id).into_raw())
        .unwrap_err();
    assert_eq!(err.code(), StatusCode::INVALID_HANDLE);

    // a molecule id presented to stages expecting other kinds
    let as_lb = Handle::<kind::LoadBalancer>::from_raw_id(id);
    let err = backend
        .modify_weights(
            ExecutionSpace::Host,
            MolecularWeightsSettings::default(),
            as_lb.reference(),
        )
        .unwrap_err();
    assert_eq!(err.code(), StatusCode::INVALID_HANDLE);
    assert!(err.message().unwrap().contains("refers to a"), "{err}");

    let func = backend.functional_from_string("PBE", true).unwrap();
    let err = backend
        .integrator_new(ExecutionSpace::Host, func.reference(), as_lb.reference())
        .unwrap_err();
    assert_eq!(err.code(), StatusCode::INVALID_HANDLE);
    let err = backend
        .molgrid_new_default(
            Handle::<kind::Molecule>::from_raw_id(func.id()).reference(),
            &grid_spec(),
        )
        .unwrap_err();
    assert_eq!(err.code(), StatusCode::INVALID_HANDLE);
    assert_eq!(backend.live_resources(), 2);

    backend.release(func.into_raw()).unwrap();
    backend.release(mol.into_raw()).unwrap();
    let err = backend
        .release(Handle::<kind::Molecule>::from_raw_id(id).into_raw())
        .unwrap_err();
    assert_eq!(err.code(), StatusCode::INVALID_HANDLE);
    assert!(err.message().unwrap().contains("is not live"), "{err}");
}

#[test]
fn weights_depend_on_algorithm() {
    let file = input_file();
    let mut totals = Vec::new();
    for algorithm in [WeightAlgorithm::Becke, WeightAlgorithm::Ssf] {
        let mut backend = ReferenceBackend::new();
        let mol = backend
            .molecule_from_record(file.path(), "/MOLECULE")
            .unwrap();
        let basis = backend
            .basis_set_from_record(file.path(), "/BASIS", 1e-10)
            .unwrap();
        let grid = backend
            .molgrid_new_default(mol.reference(), &grid_spec())
            .unwrap();
        let lb = backend
            .load_balancer_new(
                ExecutionSpace::Host,
                &SingleProcess,
                mol.reference(),
                grid.reference(),
                basis.reference(),
            )
            .unwrap();
        let settings = MolecularWeightsSettings {
            algorithm,
            becke_size_adjustment: false,
        };
        let _weights = backend
            .modify_weights(ExecutionSpace::Host, settings, lb.reference())
            .unwrap();
        let Some(Object::LoadBalancer(lb)) = backend.objects.get(&lb.id()) else {
            panic!("load balancer missing");
        };
        let total: f64 = lb.batches.iter().flatten().map(|p| p.w).sum();
        totals.push(total);
    }
    assert!((totals[0] - totals[1]).abs() > 1e-8);
}
