use {crate::RingPosition, xxhash_rust::xxh3::xxh3_64_with_seed};

/// A keyspace partitioning strategy.
///
/// Partitioner maps raw bytes (keys and virtual-node labels alike) to positions
/// on the ring. Implementations must be deterministic, across calls and across
/// process restarts, and should spread outputs evenly over the `u64` space so
/// that placements do not cluster.
pub trait Partitioner: Send + Sync {
    /// Returns ring position for given bytes.
    fn position(&self, data: &[u8]) -> RingPosition;
}

/// Any plain function or closure can serve as a partitioner.
///
/// ```
/// use vnring::Partitioner;
///
/// let constant = |_: &[u8]| 42u64;
/// assert_eq!(constant.position(b"anything"), 42);
/// ```
impl<F> Partitioner for F
where
    F: Fn(&[u8]) -> RingPosition + Send + Sync,
{
    fn position(&self, data: &[u8]) -> RingPosition {
        self(data)
    }
}

/// Seed used by the default partitioner.
pub const DEFAULT_SEED: u64 = 12345;

/// A partitioner that uses a XXH3 hash function to partition data.
#[derive(Clone, Copy, Debug)]
pub struct Xxh3Partitioner {
    seed: u64,
}

impl Default for Xxh3Partitioner {
    fn default() -> Self {
        Self { seed: DEFAULT_SEED }
    }
}

impl Xxh3Partitioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a partitioner hashing with the given seed.
    ///
    /// Rings built with different seeds place nodes (and keys) differently, so
    /// all parties routing over the same ring must agree on the seed.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Partitioner for Xxh3Partitioner {
    fn position(&self, data: &[u8]) -> RingPosition {
        xxh3_64_with_seed(data, self.seed)
    }
}

/// Default partitioner.
pub type DefaultPartitioner = Xxh3Partitioner;

/// Returns the bytes hashed to place virtual node `index` of node `id`.
///
/// The label is the node id immediately followed by the decimal index, so
/// `("server-1", 2)` becomes `"server-12"`. Adding and removing a node must
/// derive labels identically.
pub fn placement_key(id: &str, index: usize) -> Vec<u8> {
    format!("{id}{index}").into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_labels() {
        assert_eq!(placement_key("server-1", 0), b"server-10".to_vec());
        assert_eq!(placement_key("server-1", 12), b"server-112".to_vec());
        assert_eq!(placement_key("", 7), b"7".to_vec());
    }

    #[test]
    fn seed_changes_positions() {
        let a = Xxh3Partitioner::new();
        let b = Xxh3Partitioner::with_seed(0);
        assert_eq!(a.seed(), DEFAULT_SEED);
        assert_ne!(a.position(b"key"), b.position(b"key"));
        assert_eq!(a.position(b"key"), Xxh3Partitioner::new().position(b"key"));
    }
}
