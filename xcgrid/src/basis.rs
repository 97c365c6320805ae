//! Contracted Cartesian Gaussian basis (s and p shells).

use crate::status::{Status, StatusCode};
use nalgebra::Vector3;
use serde::Deserialize;
use std::f64::consts::PI;

#[derive(Debug, Deserialize)]
struct ShellRecord {
    /// Shell center in bohr.
    center: [f64; 3],
    l: u32,
    exponents: Vec<f64>,
    coefficients: Vec<f64>,
}

/// Payload of the `/BASIS` record.
#[derive(Debug, Deserialize)]
pub struct BasisRecord {
    shells: Vec<ShellRecord>,
}

#[derive(Debug, Clone)]
pub struct Shell {
    center: Vector3<f64>,
    l: u32,
    exponents: Vec<f64>,
    /// Contraction coefficients with primitive and contraction normalization folded in.
    coefficients: Vec<f64>,
    /// Beyond this distance every primitive is below the screening tolerance.
    cutoff_radius: f64,
}

impl Shell {
    fn new(record: ShellRecord, tolerance: f64) -> Result<Self, Status> {
        if record.l > 1 {
            return Err(Status::new(
                StatusCode::UNSUPPORTED,
                format!("shells with l = {} are not supported", record.l),
            ));
        }
        if record.exponents.is_empty() || record.exponents.len() != record.coefficients.len() {
            return Err(Status::new(
                StatusCode::INVALID_INPUT,
                "shell needs matching, non-empty exponent and coefficient lists",
            ));
        }
        if record.exponents.iter().any(|&a| !(a > 0.0 && a.is_finite())) {
            return Err(Status::new(
                StatusCode::INVALID_INPUT,
                "shell exponents must be positive",
            ));
        }

        let l = record.l;
        let mut coefficients: Vec<f64> = record
            .exponents
            .iter()
            .zip(&record.coefficients)
            .map(|(&a, &c)| c * primitive_norm(a, l))
            .collect();

        let mut self_overlap = 0.0;
        for (i, &ai) in record.exponents.iter().enumerate() {
            for (j, &aj) in record.exponents.iter().enumerate() {
                let p = ai + aj;
                let radial = (PI / p).powf(1.5) * (0.5 / p).powi(l as i32);
                self_overlap += coefficients[i] * coefficients[j] * radial;
            }
        }
        if !(self_overlap > 0.0) {
            return Err(Status::new(
                StatusCode::INVALID_INPUT,
                "shell contraction has zero norm",
            ));
        }
        let scale = self_overlap.sqrt().recip();
        for c in &mut coefficients {
            *c *= scale;
        }

        let cutoff_radius = record
            .exponents
            .iter()
            .zip(&coefficients)
            .map(|(&a, &c)| {
                let ratio = c.abs() / tolerance;
                if ratio > 1.0 {
                    (ratio.ln() / a).sqrt()
                } else {
                    0.0
                }
            })
            .fold(0.0_f64, f64::max);

        Ok(Self {
            center: Vector3::new(record.center[0], record.center[1], record.center[2]),
            l,
            exponents: record.exponents,
            coefficients,
            cutoff_radius,
        })
    }

    pub fn size(&self) -> usize {
        if self.l == 0 {
            1
        } else {
            3
        }
    }

    pub fn cutoff_radius(&self) -> f64 {
        self.cutoff_radius
    }
}

/// (2α/π)^{3/4} (4α)^{l/2}, valid for the Cartesian components used here.
fn primitive_norm(alpha: f64, l: u32) -> f64 {
    (2.0 * alpha / PI).powf(0.75) * (4.0 * alpha).powf(l as f64 / 2.0)
}

#[derive(Debug, Clone)]
pub struct BasisSet {
    shells: Vec<Shell>,
    nbf: usize,
    tolerance: f64,
}

impl BasisSet {
    pub fn from_record(record: BasisRecord, tolerance: f64) -> Result<Self, Status> {
        if !(tolerance > 0.0 && tolerance.is_finite()) {
            return Err(Status::new(
                StatusCode::INVALID_INPUT,
                format!("basis tolerance must be positive, got {tolerance}"),
            ));
        }
        if record.shells.is_empty() {
            return Err(Status::new(
                StatusCode::INVALID_INPUT,
                "basis record contains no shells",
            ));
        }
        let shells = record
            .shells
            .into_iter()
            .map(|s| Shell::new(s, tolerance))
            .collect::<Result<Vec<_>, _>>()?;
        let nbf = shells.iter().map(Shell::size).sum();
        Ok(Self {
            shells,
            nbf,
            tolerance,
        })
    }

    pub fn nbf(&self) -> usize {
        self.nbf
    }

    pub fn shells(&self) -> &[Shell] {
        &self.shells
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Values and gradients of every basis function at `point`.
    ///
    /// Shells whose cutoff radius does not reach `point` contribute zeros.
    pub fn evaluate(&self, point: &Vector3<f64>) -> (Vec<f64>, Vec<Vector3<f64>>) {
        let mut values = vec![0.0; self.nbf];
        let mut gradients = vec![Vector3::zeros(); self.nbf];

        let mut offset = 0;
        for shell in &self.shells {
            let d = point - shell.center;
            let r2 = d.norm_squared();
            if r2.sqrt() <= shell.cutoff_radius {
                // radial part g = Σ c e^{-α r²} and its derivative factor Σ -2α c e^{-α r²}
                let (g, dg) = shell
                    .exponents
                    .iter()
                    .zip(&shell.coefficients)
                    .fold((0.0, 0.0), |(g, dg), (&a, &c)| {
                        let e = c * (-a * r2).exp();
                        (g + e, dg - 2.0 * a * e)
                    });

                if shell.l == 0 {
                    values[offset] = g;
                    gradients[offset] = d * dg;
                } else {
                    for k in 0..3 {
                        values[offset + k] = d[k] * g;
                        let mut grad = d * (d[k] * dg);
                        grad[k] += g;
                        gradients[offset + k] = grad;
                    }
                }
            }
            offset += shell.size();
        }

        (values, gradients)
    }
}
