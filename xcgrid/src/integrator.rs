//! Spin-polarized exchange integration over a weighted, batched grid.

use crate::basis::BasisSet;
use crate::functional::ExchangeKernel;
use crate::grid::GridPoint;
use nalgebra::{DMatrix, Vector3};
use rayon::prelude::*;

/// Densities below this value are skipped.
const RHO_THRESHOLD: f64 = 1e-14;

/// Result of [`eval_exc_vxc_uks`] in the scalar/Z representation.
#[derive(Debug, Clone)]
pub struct UksResult {
    pub exc: f64,
    pub vxc_scalar: DMatrix<f64>,
    pub vxc_z: DMatrix<f64>,
}

/// Integrates E_xc and the α/β potentials, returned as
/// V_s = (Vα + Vβ)/2 and V_z = (Vα − Vβ)/2.
///
/// The densities are given as P_s = Pα + Pβ and P_z = Pα − Pβ.
pub fn eval_exc_vxc_uks(
    kernel: ExchangeKernel,
    basis: &BasisSet,
    batches: &[Vec<GridPoint>],
    density_scalar: &DMatrix<f64>,
    density_z: &DMatrix<f64>,
) -> UksResult {
    let nbf = basis.nbf();
    let p_alpha = (density_scalar + density_z) * 0.5;
    let p_beta = (density_scalar - density_z) * 0.5;

    let zero = || {
        (
            0.0_f64,
            DMatrix::<f64>::zeros(nbf, nbf),
            DMatrix::<f64>::zeros(nbf, nbf),
        )
    };

    let (exc, v_alpha, v_beta) = batches
        .par_iter()
        .flat_map_iter(|batch| batch.iter())
        .fold(zero, |(mut e_acc, mut va, mut vb), gp| {
            let (phi, dphi) = basis.evaluate(&gp.r);
            for (p, v) in [(&p_alpha, &mut va), (&p_beta, &mut vb)] {
                e_acc += accumulate_channel(kernel, p, &phi, &dphi, gp.w, v);
            }
            (e_acc, va, vb)
        })
        .reduce(zero, |(e1, va1, vb1), (e2, va2, vb2)| {
            (e1 + e2, va1 + va2, vb1 + vb2)
        });

    UksResult {
        exc,
        vxc_scalar: (&v_alpha + &v_beta) * 0.5,
        vxc_z: (&v_alpha - &v_beta) * 0.5,
    }
}

/// Adds one spin channel's contribution at a grid point to `v` and returns
/// the weighted energy contribution.
fn accumulate_channel(
    kernel: ExchangeKernel,
    density: &DMatrix<f64>,
    phi: &[f64],
    dphi: &[Vector3<f64>],
    weight: f64,
    v: &mut DMatrix<f64>,
) -> f64 {
    let n = phi.len();

    // x_i = Σ_j P_ij φ_j; ρ = φᵀ x; ∇ρ = 2 Σ_i x_i ∇φ_i (P symmetric)
    let mut x = vec![0.0_f64; n];
    for i in 0..n {
        let mut s = 0.0;
        for j in 0..n {
            s += density[(i, j)] * phi[j];
        }
        x[i] = s;
    }
    let rho: f64 = phi.iter().zip(&x).map(|(p, xi)| p * xi).sum();
    if !rho.is_finite() || rho <= RHO_THRESHOLD {
        return 0.0;
    }
    let grad: Vector3<f64> = if kernel.is_gga() {
        dphi.iter()
            .zip(&x)
            .fold(Vector3::zeros(), |acc, (d, xi)| acc + d * (2.0 * xi))
    } else {
        Vector3::zeros()
    };

    let (e, v_rho, v_grad) = kernel.spin_channel(rho, grad);

    // ∂E/∂P_ij = w [ v_ρ φ_i φ_j + v_∇ · (∇φ_i φ_j + φ_i ∇φ_j) ]
    let scale = weight * v_rho;
    let proj: Vec<f64> = dphi.iter().map(|d| weight * v_grad.dot(d)).collect();
    for i in 0..n {
        for j in 0..n {
            v[(i, j)] += scale * phi[i] * phi[j] + proj[i] * phi[j] + phi[i] * proj[j];
        }
    }

    weight * e
}
