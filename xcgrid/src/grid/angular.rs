//! Low-order Lebedev rules on the unit sphere. Weights sum to 4π.

use nalgebra::Vector3;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

/// Orders available to the grid builder, ascending.
pub const LEBEDEV_ORDERS: [usize; 3] = [6, 14, 26];

/// Returns the rule with `npts` points; unknown orders fall back to the
/// largest available order not exceeding `npts`.
pub fn lebedev(npts: usize) -> Vec<(Vector3<f64>, f64)> {
    let order = LEBEDEV_ORDERS
        .iter()
        .copied()
        .filter(|&o| o <= npts)
        .max()
        .unwrap_or(LEBEDEV_ORDERS[0]);

    let mut points = Vec::with_capacity(order);
    match order {
        6 => octahedral(&mut points, 1.0 / 6.0),
        14 => {
            octahedral(&mut points, 1.0 / 15.0);
            cube_corners(&mut points, 3.0 / 40.0);
        }
        _ => {
            octahedral(&mut points, 1.0 / 21.0);
            edge_midpoints(&mut points, 4.0 / 105.0);
            cube_corners(&mut points, 9.0 / 280.0);
        }
    }

    for (_, w) in &mut points {
        *w *= 4.0 * PI;
    }
    points
}

fn octahedral(points: &mut Vec<(Vector3<f64>, f64)>, w: f64) {
    for axis in 0..3 {
        for sign in [1.0, -1.0] {
            let mut v = Vector3::zeros();
            v[axis] = sign;
            points.push((v, w));
        }
    }
}

fn edge_midpoints(points: &mut Vec<(Vector3<f64>, f64)>, w: f64) {
    let a = FRAC_1_SQRT_2;
    for (i, j) in [(0, 1), (0, 2), (1, 2)] {
        for si in [a, -a] {
            for sj in [a, -a] {
                let mut v = Vector3::zeros();
                v[i] = si;
                v[j] = sj;
                points.push((v, w));
            }
        }
    }
}

fn cube_corners(points: &mut Vec<(Vector3<f64>, f64)>, w: f64) {
    let a = 1.0 / 3.0_f64.sqrt();
    for x in [a, -a] {
        for y in [a, -a] {
            for z in [a, -a] {
                points.push((Vector3::new(x, y, z), w));
            }
        }
    }
}
