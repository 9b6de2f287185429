use crate::storage::{MemoryStorage, Storage};

/// Physical node registered on the ring.
///
/// A node occupies `replicas` virtual-node positions and owns the store that
/// keys routed to it are delegated to.
#[derive(Debug, Clone)]
pub struct NodeHandle<S = MemoryStorage> {
    id: String,
    replicas: usize,
    storage: S,
}

impl<S: Storage> NodeHandle<S> {
    pub(crate) fn new(id: String, replicas: usize, storage: S) -> Self {
        Self {
            id,
            replicas,
            storage,
        }
    }

    /// Returns the node identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the number of virtual-node placements requested for the node.
    pub fn replicas(&self) -> usize {
        self.replicas
    }

    /// Returns the node's store.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Consumes the handle, returning its store.
    ///
    /// A node removed from the ring hands its data back this way, so that the
    /// caller can copy it to the new owners.
    pub fn into_storage(self) -> S {
        self.storage
    }

    pub(crate) fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }
}
