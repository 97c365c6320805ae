use crate::status::{Status, StatusCode};
use nalgebra::Vector3;
use periodic_table_on_an_enum::Element;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct AtomRecord {
    element: String,
    /// Cartesian position in bohr.
    coords: [f64; 3],
}

/// Payload of the `/MOLECULE` record.
#[derive(Debug, Deserialize)]
pub struct MoleculeRecord {
    atoms: Vec<AtomRecord>,
}

#[derive(Debug, Clone)]
pub struct Atom {
    pub symbol: String,
    pub atomic_number: u32,
    pub center: Vector3<f64>,
}

#[derive(Debug, Clone)]
pub struct Molecule {
    atoms: Vec<Atom>,
}

impl Molecule {
    pub fn from_record(record: MoleculeRecord) -> Result<Self, Status> {
        if record.atoms.is_empty() {
            return Err(Status::new(
                StatusCode::INVALID_INPUT,
                "molecule record contains no atoms",
            ));
        }

        let mut atoms = Vec::with_capacity(record.atoms.len());
        for atom in record.atoms {
            let element = Element::from_symbol(&atom.element).ok_or_else(|| {
                Status::new(
                    StatusCode::INVALID_INPUT,
                    format!("invalid element symbol: {}", atom.element),
                )
            })?;
            if atom.coords.iter().any(|c| !c.is_finite()) {
                return Err(Status::new(
                    StatusCode::INVALID_INPUT,
                    format!("non-finite coordinates for {}", atom.element),
                ));
            }
            atoms.push(Atom {
                symbol: element.get_symbol().to_string(),
                atomic_number: element.get_atomic_number() as u32,
                center: Vector3::new(atom.coords[0], atom.coords[1], atom.coords[2]),
            });
        }

        Ok(Self { atoms })
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn natoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn centers(&self) -> Vec<Vector3<f64>> {
        self.atoms.iter().map(|a| a.center).collect()
    }
}
