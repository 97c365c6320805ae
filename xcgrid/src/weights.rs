//! Atomic partition weights for overlapping atom-centered grids.

use crate::types::WeightAlgorithm;
use nalgebra::Vector3;

/// SSF cutoff parameter `a`.
const SSF_A: f64 = 0.64;

/// Partition weight of atom `a` at point `r`: w_a = P_a / Σ_b P_b with
/// P_a = Π_{b≠a} s(μ_ab).
pub fn partition_weight(
    algorithm: WeightAlgorithm,
    a: usize,
    r: &Vector3<f64>,
    centers: &[Vector3<f64>],
) -> f64 {
    let na = centers.len();
    if na == 1 {
        return 1.0;
    }

    let dist: Vec<f64> = centers.iter().map(|c| (r - c).norm()).collect();
    let mut raw = vec![1.0_f64; na];
    for i in 0..na {
        for j in 0..na {
            if i == j {
                continue;
            }
            let rij = (centers[i] - centers[j]).norm();
            let s = if rij < 1e-12 {
                0.5
            } else {
                let mu = (dist[i] - dist[j]) / rij;
                match algorithm {
                    WeightAlgorithm::Becke => becke_cell(mu),
                    WeightAlgorithm::Ssf => ssf_cell(mu),
                }
            };
            raw[i] *= s;
            if raw[i] == 0.0 {
                break;
            }
        }
    }

    let denom: f64 = raw.iter().sum();
    if denom <= 0.0 || !denom.is_finite() {
        return 0.0;
    }
    raw[a] / denom
}

/// Becke's step: f(μ) applied three times.
fn becke_cell(mut mu: f64) -> f64 {
    for _ in 0..3 {
        mu = (3.0 * mu - mu * mu * mu) / 2.0;
    }
    0.5 * (1.0 - mu)
}

fn ssf_cell(mu: f64) -> f64 {
    if mu <= -SSF_A {
        1.0
    } else if mu >= SSF_A {
        0.0
    } else {
        let z = mu / SSF_A;
        let z2 = z * z;
        let g = z * (35.0 + z2 * (-35.0 + z2 * (21.0 - 5.0 * z2))) / 16.0;
        0.5 * (1.0 - g)
    }
}
