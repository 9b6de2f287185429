use {crate::RingPosition, std::error::Error as StdError};

/// Errors returned by [`HashRing`](crate::HashRing) operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A virtual-node placement landed on a position that is already taken.
    ///
    /// Placement is deterministic, so retrying would collide again. Placements
    /// made before the collision are kept; remove the node to discard them.
    #[error("hash collision at ring position {position:#018x} (owned by {existing})")]
    HashCollision {
        position: RingPosition,
        existing: String,
    },

    /// The ring has no placements, so no node can own a key.
    #[error("ring is empty")]
    EmptyRing,

    /// The node owning `key` has no value stored for it.
    #[error("key {key:?} not found on node {node}")]
    NotFound { key: String, node: String },

    /// A node with the same id is already on the ring.
    #[error("duplicate node: {0}")]
    DuplicateNode(String),

    /// Error reported by a node's store.
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn storage<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Storage(Box::new(err))
    }
}
