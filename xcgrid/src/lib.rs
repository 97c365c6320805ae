//! Exchange–correlation integration backend.
//!
//! The crate exposes the backend surface consumed by the `xcrun` driver:
//! typed resource handles, the failure [`Status`], the [`Backend`] and
//! [`Communicator`] traits, and an in-process [`ReferenceBackend`] that builds
//! molecular grids and integrates spin-polarized exchange functionals.

pub mod backend;
pub mod basis;
pub mod functional;
pub mod grid;
pub mod handle;
pub mod integrator;
pub mod molecule;
pub mod records;
pub mod reference;
pub mod runtime;
pub mod status;
pub mod types;
pub mod weights;

pub use backend::{Backend, GridSpec, XcEvaluation};
pub use handle::{kind, Handle, HandleRef, RawHandle, Resource, ResourceKind};
pub use reference::ReferenceBackend;
pub use runtime::{Communicator, SingleProcess};
pub use status::{Status, StatusCode};
pub use types::{
    AtomicGridSize, ExecutionSpace, MolecularWeightsSettings, PruningScheme, RadialQuad,
    WeightAlgorithm,
};
