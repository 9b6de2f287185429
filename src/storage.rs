//! Per-node key/value storage.
//!
//! The ring routes keys, nodes delegate the actual reads and writes to a
//! [`Storage`] implementation. Durability, eviction and similar concerns are
//! entirely up to the implementation.

use {
    std::{collections::HashMap, error::Error as StdError},
    tracing::trace,
};

/// Key/value collaborator a node delegates to.
///
/// Writes take `&mut self`: the ring only calls `put` while holding its
/// exclusive lock, and `get` while holding the shared one.
pub trait Storage: Send + Sync {
    /// Stored value type.
    type Value: Clone + Send + Sync;

    /// Error reported by the backend. The ring passes it through untouched.
    type Error: StdError + Send + Sync + 'static;

    /// Returns the value stored under `key`, or `None` if there is none.
    fn get(&self, key: &str) -> Result<Option<Self::Value>, Self::Error>;

    /// Stores `value` under `key`, replacing any previous value.
    fn put(&mut self, key: &str, value: Self::Value) -> Result<(), Self::Error>;

    /// Number of stored keys.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Errors reported by [`MemoryStorage`].
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage capacity exceeded: limit of {limit} keys reached")]
    CapacityExceeded { limit: usize },
}

/// In-memory storage backed by a `HashMap`.
///
/// Unbounded unless created with [`with_capacity_limit`], in which case
/// inserting a new key past the limit fails. Overwriting an existing key
/// always succeeds.
///
/// [`with_capacity_limit`]: MemoryStorage::with_capacity_limit
#[derive(Debug, Clone)]
pub struct MemoryStorage<V = String> {
    data: HashMap<String, V>,
    limit: Option<usize>,
}

impl<V> Default for MemoryStorage<V> {
    fn default() -> Self {
        Self {
            data: HashMap::new(),
            limit: None,
        }
    }
}

impl<V> MemoryStorage<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding at most `limit` distinct keys.
    pub fn with_capacity_limit(limit: usize) -> Self {
        Self {
            data: HashMap::new(),
            limit: Some(limit),
        }
    }

    /// Maximum number of keys, if bounded.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Iterates over stored keys, in no particular order.
    ///
    /// Useful when moving data off a node after it left the ring.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Removes `key`, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.data.remove(key)
    }
}

impl<V> Storage for MemoryStorage<V>
where
    V: Clone + Send + Sync,
{
    type Value = V;
    type Error = StorageError;

    fn get(&self, key: &str) -> Result<Option<V>, StorageError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: V) -> Result<(), StorageError> {
        if let Some(limit) = self.limit {
            if self.data.len() >= limit && !self.data.contains_key(key) {
                return Err(StorageError::CapacityExceeded { limit });
            }
        }
        trace!(key, "storing value in memory");
        self.data.insert(key.to_owned(), value);
        Ok(())
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}
