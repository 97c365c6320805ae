//! Radial quadratures on [0, ∞).
//!
//! Every rule returns `(r, w)` pairs sorted by increasing `r`, with the r²
//! Jacobian already folded into `w`.

use crate::types::RadialQuad;
use std::f64::consts::{LN_2, PI};

/// Becke's scaling radius, in bohr.
const BECKE_RADIUS: f64 = 1.0;
/// Mura–Knowles α for main-group elements.
const MURA_KNOWLES_ALPHA: f64 = 5.0;
/// Treutler–Ahlrichs M4 parameters.
const TREUTLER_XI: f64 = 1.0;
const TREUTLER_ALPHA: f64 = 0.6;
const MHL_RADIUS: f64 = 1.0;

pub fn radial_grid(quad: RadialQuad, n: usize) -> Vec<(f64, f64)> {
    let mut nodes = match quad {
        RadialQuad::Becke => becke(n),
        RadialQuad::MuraKnowles => mura_knowles(n),
        RadialQuad::TreutlerAhlrichs => treutler_ahlrichs(n),
        RadialQuad::MurrayHandyLaming => murray_handy_laming(n),
    };
    nodes.retain(|&(r, w)| r.is_finite() && w.is_finite() && w > 0.0);
    nodes.sort_by(|a, b| a.0.total_cmp(&b.0));
    nodes
}

/// Second-kind Gauss–Chebyshev nodes on (-1, 1) with the weight that
/// integrates a plain (unweighted) integrand: (x_i, π/(n+1) sin θ_i).
fn chebyshev_second_kind(n: usize) -> impl Iterator<Item = (f64, f64)> {
    let step = PI / (n as f64 + 1.0);
    (1..=n).map(move |i| {
        let theta = i as f64 * step;
        (theta.cos(), step * theta.sin())
    })
}

fn becke(n: usize) -> Vec<(f64, f64)> {
    chebyshev_second_kind(n)
        .map(|(x, wx)| {
            let r = BECKE_RADIUS * (1.0 + x) / (1.0 - x);
            let dr = 2.0 * BECKE_RADIUS / ((1.0 - x) * (1.0 - x));
            (r, wx * dr * r * r)
        })
        .collect()
}

fn mura_knowles(n: usize) -> Vec<(f64, f64)> {
    let h = 1.0 / n as f64;
    (0..n)
        .map(|i| {
            let x = (i as f64 + 0.5) * h;
            let x3 = x * x * x;
            let r = -MURA_KNOWLES_ALPHA * (1.0 - x3).ln();
            let dr = 3.0 * MURA_KNOWLES_ALPHA * x * x / (1.0 - x3);
            (r, h * dr * r * r)
        })
        .collect()
}

fn treutler_ahlrichs(n: usize) -> Vec<(f64, f64)> {
    chebyshev_second_kind(n)
        .map(|(x, wx)| {
            let log = (2.0 / (1.0 - x)).ln();
            let scale = TREUTLER_XI / LN_2;
            let r = scale * (1.0 + x).powf(TREUTLER_ALPHA) * log;
            let dr = scale
                * (TREUTLER_ALPHA * (1.0 + x).powf(TREUTLER_ALPHA - 1.0) * log
                    + (1.0 + x).powf(TREUTLER_ALPHA) / (1.0 - x));
            (r, wx * dr * r * r)
        })
        .collect()
}

/// Euler–Maclaurin rule of Murray, Handy and Laming (m = 2).
fn murray_handy_laming(n: usize) -> Vec<(f64, f64)> {
    let h = 1.0 / (n as f64 + 1.0);
    (1..=n)
        .map(|i| {
            let x = i as f64 * h;
            let r = MHL_RADIUS * x * x / ((1.0 - x) * (1.0 - x));
            let dr = 2.0 * MHL_RADIUS * x / ((1.0 - x) * (1.0 - x) * (1.0 - x));
            (r, h * dr * r * r)
        })
        .collect()
}
