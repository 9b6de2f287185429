use crate::{partitioner::DefaultPartitioner, HashRing, Partitioner, Storage, MIN_REPLICAS};

/// Configures and creates a [`HashRing`].
///
/// # Examples
///
/// ```
/// use vnring::{HashRing, Xxh3Partitioner};
///
/// let ring: HashRing = HashRing::builder()
///     .replicas(160)
///     .partitioner(Xxh3Partitioner::with_seed(7))
///     .build();
/// assert_eq!(ring.replica_floor(), 160);
/// ```
#[derive(Debug, Clone)]
pub struct Builder<P = DefaultPartitioner> {
    replicas: usize,
    partitioner: P,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            replicas: MIN_REPLICAS,
            partitioner: DefaultPartitioner::new(),
        }
    }
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: Partitioner> Builder<P> {
    /// Sets the base number of virtual nodes per node.
    ///
    /// Values below [`MIN_REPLICAS`] are raised to it.
    pub fn replicas(mut self, replicas: usize) -> Self {
        self.replicas = replicas.max(MIN_REPLICAS);
        self
    }

    /// Sets the hash primitive used to place nodes and keys.
    pub fn partitioner<Q: Partitioner>(self, partitioner: Q) -> Builder<Q> {
        Builder {
            replicas: self.replicas,
            partitioner,
        }
    }

    pub fn build<S: Storage>(self) -> HashRing<S, P> {
        HashRing::with_partitioner(self.replicas, self.partitioner)
    }
}
