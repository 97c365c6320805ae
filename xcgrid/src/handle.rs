//! Typed handles to backend-owned resources.
//!
//! A [`Handle`] is the owning token returned by a construction call. It is
//! neither `Clone` nor `Copy`, so a resource can only be handed to a release
//! path once. Later stages receive the copyable [`HandleRef`] instead.

use std::fmt;
use std::marker::PhantomData;

/// Resource categories issued by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Molecule,
    BasisSet,
    MolGrid,
    LoadBalancer,
    MolecularWeights,
    Functional,
    Integrator,
    Matrix,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Molecule => "molecule",
            ResourceKind::BasisSet => "basis set",
            ResourceKind::MolGrid => "molecular grid",
            ResourceKind::LoadBalancer => "load balancer",
            ResourceKind::MolecularWeights => "molecular weights",
            ResourceKind::Functional => "functional",
            ResourceKind::Integrator => "integrator",
            ResourceKind::Matrix => "matrix",
        };
        f.write_str(name)
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Marker implemented by the uninhabited types in [`kind`].
pub trait Resource: sealed::Sealed {
    const KIND: ResourceKind;
}

/// Type-level tags for [`Handle`] and [`HandleRef`].
pub mod kind {
    use super::{sealed::Sealed, Resource, ResourceKind};

    macro_rules! resource_kinds {
        ($($name:ident),* $(,)?) => {
            $(
                #[derive(Debug)]
                pub enum $name {}
                impl Sealed for $name {}
                impl Resource for $name {
                    const KIND: ResourceKind = ResourceKind::$name;
                }
            )*
        };
    }

    resource_kinds!(
        Molecule,
        BasisSet,
        MolGrid,
        LoadBalancer,
        MolecularWeights,
        Functional,
        Integrator,
        Matrix,
    );
}

/// Owning handle to a resource of kind `K`.
#[must_use = "a backend resource leaks unless its handle is registered or released"]
pub struct Handle<K: Resource> {
    id: u64,
    _kind: PhantomData<fn() -> K>,
}

impl<K: Resource> Handle<K> {
    /// Wraps an identifier minted by a backend.
    pub fn from_raw_id(id: u64) -> Self {
        Self {
            id,
            _kind: PhantomData,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn reference(&self) -> HandleRef<K> {
        HandleRef {
            id: self.id,
            _kind: PhantomData,
        }
    }

    /// Erases the kind parameter, giving up ownership to the caller.
    pub fn into_raw(self) -> RawHandle {
        RawHandle {
            id: self.id,
            kind: K::KIND,
        }
    }
}

impl<K: Resource> fmt::Debug for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle<{}>({})", K::KIND, self.id)
    }
}

/// Borrowed, copyable view of a [`Handle`].
pub struct HandleRef<K: Resource> {
    id: u64,
    _kind: PhantomData<fn() -> K>,
}

impl<K: Resource> HandleRef<K> {
    pub fn id(self) -> u64 {
        self.id
    }
}

impl<K: Resource> Clone for HandleRef<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: Resource> Copy for HandleRef<K> {}

impl<K: Resource> PartialEq for HandleRef<K> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<K: Resource> Eq for HandleRef<K> {}

impl<K: Resource> fmt::Debug for HandleRef<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandleRef<{}>({})", K::KIND, self.id)
    }
}

/// Kind-erased owning handle, as passed to [`crate::Backend::release`].
#[derive(Debug, PartialEq, Eq)]
pub struct RawHandle {
    id: u64,
    kind: ResourceKind,
}

impl RawHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}
