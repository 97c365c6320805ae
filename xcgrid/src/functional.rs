//! Exchange functionals (LDA Slater exchange and PBE exchange).
//!
//! Kernels are written for the unpolarized density; spin-polarized values
//! follow from the exchange spin-scaling relation
//! E_x[ρα, ρβ] = ½ E_x[2ρα] + ½ E_x[2ρβ].

use crate::status::{Status, StatusCode};
use nalgebra::Vector3;
use std::f64::consts::PI;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExchangeKernel {
    /// Local-density approximation exchange only (Slater exchange)
    Slater,
    /// PBE GGA exchange only (no correlation)
    Pbe,
}

impl ExchangeKernel {
    pub fn is_gga(self) -> bool {
        matches!(self, ExchangeKernel::Pbe)
    }

    /// Energy density e (per volume), ∂e/∂ρ and ∂e/∂(∇ρ) for an unpolarized density.
    pub fn unpolarized(self, rho: f64, grad_rho: Vector3<f64>) -> (f64, f64, Vector3<f64>) {
        if rho <= 0.0 {
            return (0.0, 0.0, Vector3::zeros());
        }
        match self {
            ExchangeKernel::Slater => (
                c_x() * rho.powf(4.0 / 3.0),
                lda_x_potential(rho),
                Vector3::zeros(),
            ),
            ExchangeKernel::Pbe => pbe_x(rho, grad_rho),
        }
    }

    /// Energy density contribution of one spin channel and its partials
    /// with respect to that channel's ρσ and ∇ρσ.
    pub fn spin_channel(self, rho_s: f64, grad_s: Vector3<f64>) -> (f64, f64, Vector3<f64>) {
        let (e, de_drho, de_dgrad) = self.unpolarized(2.0 * rho_s, 2.0 * grad_s);
        (0.5 * e, de_drho, de_dgrad)
    }
}

/// c_x = -(3/4) (3/π)^(1/3)
#[inline]
fn c_x() -> f64 {
    -0.75 * (3.0 / PI).powf(1.0 / 3.0)
}

/// v_x(ρ) = d/dρ [c_x ρ^(4/3)] = -(3/π)^(1/3) ρ^(1/3)
fn lda_x_potential(rho: f64) -> f64 {
    -(3.0 / PI).powf(1.0 / 3.0) * rho.powf(1.0 / 3.0)
}

const PBE_KAPPA: f64 = 0.804;
const PBE_MU: f64 = 0.219_514_972_764_517_1;

/// PBE enhancement factor F_x(s) and dF_x/ds.
#[inline]
fn pbe_fx(s: f64) -> (f64, f64) {
    let t = 1.0 + (PBE_MU / PBE_KAPPA) * s * s;
    (1.0 + PBE_KAPPA - PBE_KAPPA / t, 2.0 * PBE_MU * s / (t * t))
}

/// s = |∇ρ| / ( 2 (3π²)^(1/3) ρ^(4/3) )
fn pbe_x(rho: f64, grad_rho: Vector3<f64>) -> (f64, f64, Vector3<f64>) {
    let g = grad_rho.norm();

    let e_lda = c_x() * rho.powf(4.0 / 3.0);
    let de_lda_drho = lda_x_potential(rho);

    let denom = 2.0 * (3.0 * PI * PI).powf(1.0 / 3.0) * rho.powf(4.0 / 3.0);
    let s = g / denom;
    let (fx, dfx_ds) = pbe_fx(s);

    let ds_drho = -(4.0 / 3.0) * s / rho;
    let ds_dgrad = if g > 1e-14 {
        grad_rho / (g * denom)
    } else {
        Vector3::zeros()
    };

    let e = e_lda * fx;
    let de_drho = de_lda_drho * fx + e_lda * dfx_ds * ds_drho;
    let de_dgrad = ds_dgrad * (e_lda * dfx_ds);
    (e, de_drho, de_dgrad)
}

#[derive(Clone, Debug)]
pub struct Functional {
    name: String,
    kernel: ExchangeKernel,
    polarized: bool,
}

impl Functional {
    /// Looks up a functional by name, ignoring case.
    pub fn from_name(name: &str, polarized: bool) -> Result<Self, Status> {
        let kernel = kernel_by_name(name).ok_or_else(|| {
            Status::new(
                StatusCode::UNKNOWN_FUNCTIONAL,
                format!("unknown functional '{name}'"),
            )
        })?;
        Ok(Self {
            name: name.to_string(),
            kernel,
            polarized,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kernel(&self) -> ExchangeKernel {
        self.kernel
    }

    pub fn is_polarized(&self) -> bool {
        self.polarized
    }
}

fn kernel_by_name(name: &str) -> Option<ExchangeKernel> {
    match name.to_lowercase().as_str() {
        "slater" | "lda" | "lda-x" => Some(ExchangeKernel::Slater),
        "pbe" | "pbe-x" => Some(ExchangeKernel::Pbe),
        _ => None,
    }
}
