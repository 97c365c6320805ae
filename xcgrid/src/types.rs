//! Closed enumerations understood by the backend construction calls.

use std::fmt;

/// Where a load balancer, weight pass or integrator executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionSpace {
    Host,
    Device,
}

impl ExecutionSpace {
    pub const ALL: [ExecutionSpace; 2] = [ExecutionSpace::Host, ExecutionSpace::Device];
}

impl fmt::Display for ExecutionSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExecutionSpace::Host => "Host",
            ExecutionSpace::Device => "Device",
        })
    }
}

/// Radial quadrature used for each atomic grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RadialQuad {
    Becke,
    MuraKnowles,
    TreutlerAhlrichs,
    MurrayHandyLaming,
}

impl RadialQuad {
    pub const ALL: [RadialQuad; 4] = [
        RadialQuad::Becke,
        RadialQuad::MuraKnowles,
        RadialQuad::TreutlerAhlrichs,
        RadialQuad::MurrayHandyLaming,
    ];
}

impl fmt::Display for RadialQuad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RadialQuad::Becke => "Becke",
            RadialQuad::MuraKnowles => "MuraKnowles",
            RadialQuad::TreutlerAhlrichs => "TreutlerAhlrichs",
            RadialQuad::MurrayHandyLaming => "MurrayHandyLaming",
        })
    }
}

/// Preset atomic grid sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomicGridSize {
    Fine,
    UltraFine,
    SuperFine,
    Gm3,
    Gm5,
}

impl AtomicGridSize {
    pub const ALL: [AtomicGridSize; 5] = [
        AtomicGridSize::Fine,
        AtomicGridSize::UltraFine,
        AtomicGridSize::SuperFine,
        AtomicGridSize::Gm3,
        AtomicGridSize::Gm5,
    ];

    /// Number of radial shells and the widest angular rule used at full order.
    pub fn dimensions(self) -> (usize, usize) {
        match self {
            AtomicGridSize::Fine => (75, 26),
            AtomicGridSize::UltraFine => (99, 26),
            AtomicGridSize::SuperFine => (250, 26),
            AtomicGridSize::Gm3 => (35, 14),
            AtomicGridSize::Gm5 => (50, 26),
        }
    }
}

impl fmt::Display for AtomicGridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AtomicGridSize::Fine => "Fine",
            AtomicGridSize::UltraFine => "UltraFine",
            AtomicGridSize::SuperFine => "SuperFine",
            AtomicGridSize::Gm3 => "GM3",
            AtomicGridSize::Gm5 => "GM5",
        })
    }
}

/// Angular pruning applied to the inner radial shells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PruningScheme {
    Unpruned,
    Robust,
    Treutler,
}

impl PruningScheme {
    pub const ALL: [PruningScheme; 3] = [
        PruningScheme::Unpruned,
        PruningScheme::Robust,
        PruningScheme::Treutler,
    ];
}

impl fmt::Display for PruningScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PruningScheme::Unpruned => "Unpruned",
            PruningScheme::Robust => "Robust",
            PruningScheme::Treutler => "Treutler",
        })
    }
}

/// Atomic partition function used when weighting the molecular grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightAlgorithm {
    Becke,
    /// Stratmann–Scuseria–Frisch.
    Ssf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MolecularWeightsSettings {
    pub algorithm: WeightAlgorithm,
    pub becke_size_adjustment: bool,
}

impl Default for MolecularWeightsSettings {
    fn default() -> Self {
        MolecularWeightsSettings {
            algorithm: WeightAlgorithm::Ssf,
            becke_size_adjustment: false,
        }
    }
}
