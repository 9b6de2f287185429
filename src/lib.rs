#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod builder;
mod error;
mod node;
mod partitioner;
mod range;
pub mod storage;

use {
    std::{
        collections::HashMap,
        sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
    },
    tracing::{debug, trace, warn},
};
pub use {
    builder::Builder,
    error::Error,
    node::NodeHandle,
    partitioner::*,
    range::KeyRange,
    storage::{MemoryStorage, Storage},
};

/// Position on the ring.
pub type RingPosition = u64;

/// Minimum number of virtual nodes per node a ring is configured with.
///
/// Fewer placements make the share of keys each node receives noticeably
/// uneven.
pub const MIN_REPLICAS: usize = 100;

/// Weight at which a node receives exactly the ring's base replica count.
pub const TOP_WEIGHT: usize = 100;

/// A virtual-node placement: ring position and the id of the node owning it.
#[derive(Debug, Clone)]
struct Placement {
    position: RingPosition,
    node: String,
}

/// Mutable ring state, guarded by a single lock.
///
/// Invariants: `placements` is sorted by position with no duplicate positions,
/// and every placement's node is registered in `nodes`.
struct RingState<S> {
    placements: Vec<Placement>,
    nodes: HashMap<String, NodeHandle<S>>,
}

impl<S> Default for RingState<S> {
    fn default() -> Self {
        Self {
            placements: Vec::new(),
            nodes: HashMap::new(),
        }
    }
}

impl<S> RingState<S> {
    /// Records a placement, keeping positions sorted.
    ///
    /// Fails if the position is already taken, by any node.
    fn place(&mut self, position: RingPosition, node: &str) -> Result<(), Error> {
        match self.find(position) {
            Ok(index) => Err(Error::HashCollision {
                position,
                existing: self.placements[index].node.clone(),
            }),
            Err(index) => {
                self.placements.insert(index, Placement {
                    position,
                    node: node.to_owned(),
                });
                Ok(())
            }
        }
    }

    /// Drops the placement at `position`, provided it belongs to `node`.
    fn unplace(&mut self, position: RingPosition, node: &str) -> bool {
        match self.find(position) {
            Ok(index) if self.placements[index].node == node => {
                self.placements.remove(index);
                true
            }
            _ => false,
        }
    }

    fn find(&self, position: RingPosition) -> Result<usize, usize> {
        self.placements
            .binary_search_by_key(&position, |placement| placement.position)
    }

    /// Returns index of the placement owning `position`: the first placement
    /// at or after it, wrapping around to the lowest one.
    fn owner_index(&self, position: RingPosition) -> Result<usize, Error> {
        if self.placements.is_empty() {
            return Err(Error::EmptyRing);
        }
        let index = self
            .placements
            .partition_point(|placement| placement.position < position);
        Ok(if index == self.placements.len() { 0 } else { index })
    }

    fn owner(&self, position: RingPosition) -> Result<&Placement, Error> {
        self.owner_index(position)
            .map(|index| &self.placements[index])
    }

    fn node(&self, id: &str) -> &NodeHandle<S> {
        match self.nodes.get(id) {
            Some(node) => node,
            None => unreachable!("placement owned by unregistered node {id}"),
        }
    }

    fn node_mut(&mut self, id: &str) -> &mut NodeHandle<S> {
        match self.nodes.get_mut(id) {
            Some(node) => node,
            None => unreachable!("placement owned by unregistered node {id}"),
        }
    }
}

/// Consistent hash ring with virtual nodes.
///
/// Every node is placed on the ring several times (once per replica), at
/// positions derived from its id. A key belongs to the node owning the first
/// placement at or after the key's position, wrapping around past the top of
/// the ring. Adding or removing a node therefore moves only the keys falling
/// next to its own placements.
///
/// Each node delegates key/value operations to its own [`Storage`]. The ring
/// never migrates data: after membership changes, keys stored on a node that
/// no longer owns them are not visible through [`get`](Self::get) until the
/// caller moves them (see [`intervals`](Self::intervals) and
/// [`remove_node`](Self::remove_node)).
///
/// All state sits behind a single reader/writer lock. Membership changes and
/// writes take it exclusively, reads share it. Since storage calls happen
/// while the lock is held, a slow store slows down the whole ring.
pub struct HashRing<S = MemoryStorage, P = DefaultPartitioner> {
    /// Partitioner used to compute ring positions.
    partitioner: P,

    /// Base number of virtual nodes per node.
    replicas: usize,

    state: RwLock<RingState<S>>,
}

impl Default for HashRing {
    fn default() -> Self {
        Self::with_partitioner(MIN_REPLICAS, DefaultPartitioner::new())
    }
}

impl HashRing {
    /// Creates a ring with the default replica floor and partitioner, storing
    /// data in memory.
    ///
    /// # Examples
    ///
    /// ```
    /// let ring = vnring::HashRing::new();
    /// ring.add_node("server-1", 3).unwrap();
    /// ring.put("test", "temp".to_string()).unwrap();
    /// assert_eq!(ring.get("test").unwrap(), "temp");
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a [`Builder`] for configuring a ring.
    pub fn builder() -> Builder {
        Builder::new()
    }
}

impl<S: Storage, P: Partitioner> HashRing<S, P> {
    /// Creates a ring with the given base replica count and partitioner.
    ///
    /// `replicas` below [`MIN_REPLICAS`] is raised to it. It is the replica
    /// count of a node added with weight [`TOP_WEIGHT`]; nodes added with an
    /// explicit replica count are not affected by it.
    pub fn with_partitioner(replicas: usize, partitioner: P) -> Self {
        Self {
            partitioner,
            replicas: replicas.max(MIN_REPLICAS),
            state: RwLock::new(RingState::default()),
        }
    }

    /// Returns the base number of virtual nodes per node.
    pub fn replica_floor(&self) -> usize {
        self.replicas
    }

    /// Returns ring position of a given key.
    pub fn position(&self, key: &str) -> RingPosition {
        self.partitioner.position(key.as_bytes())
    }

    /// Adds a node with an empty default store, placing it `replicas` times.
    pub fn add_node(&self, id: impl Into<String>, replicas: usize) -> Result<(), Error>
    where
        S: Default,
    {
        self.add_node_with_storage(id, replicas, S::default())
    }

    /// Adds a node with a replica count proportional to `weight`.
    ///
    /// A node of weight [`TOP_WEIGHT`] gets the ring's base replica count, a
    /// node of half that weight gets half as many placements, and so on.
    pub fn add_node_weighted(&self, id: impl Into<String>, weight: usize) -> Result<(), Error>
    where
        S: Default,
    {
        let replicas = self.replicas * weight / TOP_WEIGHT;
        self.add_node(id, replicas)
    }

    /// Adds a node backed by `storage`, placing it `replicas` times.
    ///
    /// Placement `i` sits at the hash of the id followed by `i` in decimal
    /// (see [`placement_key`]).
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateNode`] if the id is already on the ring; nothing is
    /// changed in that case.
    ///
    /// [`Error::HashCollision`] if a placement lands on an occupied position.
    /// The placements made before the collision stay on the ring and the node
    /// stays registered, so the ring remains consistent, but the node is only
    /// partially placed. Treat this as a configuration error and call
    /// [`remove_node`](Self::remove_node) to undo it.
    pub fn add_node_with_storage(
        &self,
        id: impl Into<String>,
        replicas: usize,
        storage: S,
    ) -> Result<(), Error> {
        let id = id.into();
        let mut state = self.write();
        if state.nodes.contains_key(&id) {
            return Err(Error::DuplicateNode(id));
        }
        state
            .nodes
            .insert(id.clone(), NodeHandle::new(id.clone(), replicas, storage));

        for index in 0..replicas {
            let position = self.partitioner.position(&placement_key(&id, index));
            if let Err(err) = state.place(position, &id) {
                warn!(node = %id, index, position, %err, "virtual node placement failed");
                return Err(err);
            }
        }

        debug!(node = %id, replicas, "added node to ring");
        Ok(())
    }

    /// Removes a node and all of its placements from the ring.
    ///
    /// Returns the removed node, so that the caller can move its data to the
    /// new owners; the ring itself drops it. `None` if no such node exists.
    pub fn remove_node(&self, id: &str) -> Option<NodeHandle<S>> {
        let mut state = self.write();
        let node = state.nodes.remove(id)?;

        let mut removed = 0;
        for index in 0..node.replicas() {
            let position = self.partitioner.position(&placement_key(id, index));
            if state.unplace(position, id) {
                removed += 1;
            }
        }

        debug!(node = %id, placements = removed, "removed node from ring");
        Some(node)
    }

    /// Returns the id of the node owning `key`.
    ///
    /// The owner is the node of the first placement at or after the key's
    /// position. Keys beyond the highest placement wrap around to the lowest.
    pub fn resolve(&self, key: &str) -> Result<String, Error> {
        let position = self.position(key);
        let state = self.read();
        let owner = state.owner(position)?;
        trace!(key, position, node = %owner.node, "resolved key");
        Ok(owner.node.clone())
    }

    /// Returns up to `k` distinct nodes responsible for `key`.
    ///
    /// Nodes are collected walking clockwise from the key's position. The first
    /// one is always the node returned by [`resolve`](Self::resolve). Fewer than
    /// `k` nodes are returned if the ring does not have that many.
    pub fn replicas(&self, key: &str, k: usize) -> Result<Vec<String>, Error> {
        let state = self.read();
        let start = state.owner_index(self.position(key))?;
        let (head, tail) = state.placements.split_at(start);

        let mut nodes: Vec<String> = Vec::with_capacity(k);
        for placement in tail.iter().chain(head) {
            if nodes.len() == k {
                break;
            }
            if !nodes.contains(&placement.node) {
                nodes.push(placement.node.clone());
            }
        }
        Ok(nodes)
    }

    /// Stores `value` under `key` on the owning node.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyRing`] if there are no nodes, [`Error::Storage`] if the
    /// node's store rejects the write.
    pub fn put(&self, key: &str, value: S::Value) -> Result<(), Error> {
        let position = self.position(key);
        let mut state = self.write();
        let id = state.owner(position)?.node.clone();
        trace!(key, position, node = %id, "storing key");
        state
            .node_mut(&id)
            .storage_mut()
            .put(key, value)
            .map_err(Error::storage)
    }

    /// Fetches the value stored under `key` from the owning node.
    ///
    /// Only the current owner is consulted. A key written before a membership
    /// change that moved it to another node is reported as
    /// [`Error::NotFound`], even if the previous owner still holds it.
    pub fn get(&self, key: &str) -> Result<S::Value, Error> {
        let position = self.position(key);
        let state = self.read();
        let id = &state.owner(position)?.node;
        match state.node(id).storage().get(key).map_err(Error::storage)? {
            Some(value) => Ok(value),
            None => Err(Error::NotFound {
                key: key.to_owned(),
                node: id.clone(),
            }),
        }
    }

    /// Returns the key ranges currently owned by node `id`.
    ///
    /// Adjacent ranges are joined. A node that is alone on the ring owns a
    /// single range covering it whole. Returns `None` for an unknown node, and
    /// an empty list for a node without placements.
    ///
    /// Before removing a node, its data needs to be moved. Keys hashing into
    /// these ranges are the ones to move.
    pub fn intervals(&self, id: &str) -> Option<Vec<KeyRange>> {
        let state = self.read();
        if !state.nodes.contains_key(id) {
            return None;
        }

        let placements = &state.placements;
        let mut ranges: Vec<KeyRange> = Vec::new();
        for (index, placement) in placements.iter().enumerate() {
            if placement.node != id {
                continue;
            }
            let prev = placements[(index + placements.len() - 1) % placements.len()].position;
            let range = KeyRange::owned_by(prev, placement.position);
            if let Some(last) = ranges.last_mut() {
                if let Some(joined) = last.joined(&range) {
                    *last = joined;
                    continue;
                }
            }
            ranges.push(range);
        }

        // The last range may continue into the first one, across the origin.
        if ranges.len() > 1 {
            let (first, last) = (ranges[0], ranges[ranges.len() - 1]);
            if let Some(joined) = last.joined(&first) {
                ranges[0] = joined;
                ranges.pop();
            }
        }
        Some(ranges)
    }

    /// Returns the ring positions occupied by node `id`, in ascending order.
    pub fn placements(&self, id: &str) -> Vec<RingPosition> {
        self.read()
            .placements
            .iter()
            .filter(|placement| placement.node == id)
            .map(|placement| placement.position)
            .collect()
    }

    /// Returns ids of all nodes on the ring, sorted.
    pub fn nodes(&self) -> Vec<String> {
        let mut ids = self.read().nodes.keys().cloned().collect::<Vec<_>>();
        ids.sort_unstable();
        ids
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.read().nodes.contains_key(id)
    }

    /// Returns number of nodes on the ring.
    pub fn node_count(&self) -> usize {
        self.read().nodes.len()
    }

    /// Returns number of placements (virtual nodes) on the ring.
    pub fn len(&self) -> usize {
        self.read().placements.len()
    }

    /// Returns `true` if the ring has no placements.
    pub fn is_empty(&self) -> bool {
        self.read().placements.is_empty()
    }

    /// All positions on the ring, in ascending order.
    #[cfg(test)]
    fn positions(&self) -> Vec<RingPosition> {
        self.read()
            .placements
            .iter()
            .map(|placement| placement.position)
            .collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, RingState<S>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RingState<S>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
