use crate::error::{CleanupFailure, ReleaseFailure};
use tracing::{debug, warn};
use xcgrid::{Backend, Handle, RawHandle, Resource, ResourceKind};

/// Every backend resource created during a run, in creation order.
///
/// Registering takes ownership of the handle, so nothing can be registered
/// twice. [`ResourceRegistry::release_all`] consumes the registry, so the
/// teardown pass can only happen once.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    handles: Vec<RawHandle>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<K: Resource>(&mut self, handle: Handle<K>) {
        let raw = handle.into_raw();
        debug!(id = raw.id(), kind = %raw.kind(), "registered resource");
        self.handles.push(raw);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.handles.iter().map(RawHandle::kind)
    }

    /// Releases every handle, newest first. A failed release does not stop
    /// the pass; all failures are returned together.
    pub fn release_all<B: Backend + ?Sized>(
        mut self,
        backend: &mut B,
    ) -> Result<usize, CleanupFailure> {
        let handles = std::mem::take(&mut self.handles);
        let total = handles.len();
        let mut failures = Vec::new();

        for handle in handles.into_iter().rev() {
            let (id, kind) = (handle.id(), handle.kind());
            match backend.release(handle) {
                Ok(()) => debug!(id, %kind, "released resource"),
                Err(status) => {
                    warn!(id, %kind, %status, "failed to release resource");
                    failures.push(ReleaseFailure { kind, id, status });
                }
            }
        }

        match CleanupFailure::from_failures(failures) {
            None => Ok(total),
            Some(failure) => Err(failure),
        }
    }
}

impl Drop for ResourceRegistry {
    fn drop(&mut self) {
        if !self.handles.is_empty() {
            warn!(
                count = self.handles.len(),
                "resource registry dropped without releasing its handles"
            );
        }
    }
}
