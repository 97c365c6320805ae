//! Atom-centered molecular integration grids.
//!
//! Each atom carries a product grid of a radial quadrature and a Lebedev
//! angular rule. Inner radial shells use a reduced angular rule according to
//! the pruning scheme. Partition weights are applied later, by the load
//! balancer's weight pass.

mod angular;
mod radial;

pub use angular::{lebedev, LEBEDEV_ORDERS};
pub use radial::radial_grid;

use crate::backend::GridSpec;
use crate::molecule::Molecule;
use crate::status::{Status, StatusCode};
use crate::types::PruningScheme;
use nalgebra::Vector3;

#[derive(Clone, Debug)]
pub struct GridPoint {
    pub r: Vector3<f64>,
    pub w: f64,
    /// Index of the atom whose grid produced this point.
    pub atom: usize,
}

#[derive(Clone, Debug)]
pub struct MolecularGrid {
    points: Vec<GridPoint>,
    batch_size: usize,
}

impl MolecularGrid {
    pub fn new(molecule: &Molecule, spec: &GridSpec) -> Result<Self, Status> {
        if spec.batch_size == 0 {
            return Err(Status::new(
                StatusCode::INVALID_INPUT,
                "grid batch size must be positive",
            ));
        }

        let (nrad, nang) = spec.size.dimensions();
        let radial = radial_grid(spec.radial_quad, nrad);

        let mut points = Vec::new();
        for (a, atom) in molecule.atoms().iter().enumerate() {
            for (i, &(r, wr)) in radial.iter().enumerate() {
                let order = pruned_order(spec.pruning, i, radial.len(), nang);
                for (dir, wang) in lebedev(order) {
                    points.push(GridPoint {
                        r: atom.center + dir * r,
                        w: wr * wang,
                        atom: a,
                    });
                }
            }
        }

        Ok(Self {
            points,
            batch_size: spec.batch_size,
        })
    }

    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Splits the grid into batches of at most `batch_size` points.
    pub fn batches(&self) -> Vec<Vec<GridPoint>> {
        self.points
            .chunks(self.batch_size)
            .map(<[GridPoint]>::to_vec)
            .collect()
    }
}

/// Angular order for radial shell `shell` of `nshells` (sorted outward).
fn pruned_order(scheme: PruningScheme, shell: usize, nshells: usize, full: usize) -> usize {
    let fraction = shell as f64 / nshells as f64;
    let order = match scheme {
        PruningScheme::Unpruned => full,
        PruningScheme::Robust if fraction < 0.25 => 6,
        PruningScheme::Robust if fraction < 0.5 => 14,
        PruningScheme::Robust => full,
        PruningScheme::Treutler if fraction < 1.0 / 3.0 => 14,
        PruningScheme::Treutler => full,
    };
    order.min(full)
}
