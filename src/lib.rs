//! fifo-hashmap: a single-threaded keyed FIFO collection, being a hash map
//! and a queue over the same entries, with O(1) keyed access and strict
//! insertion-order traversal.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: fuse an open-addressing hash table with an intrusive
//!   insertion-order list so that every mutating operation keeps both
//!   invariant systems (probe reachability, list connectivity) consistent,
//!   in safe, verifiable layers.
//! - Layers:
//!   - ProbeTable: power-of-two slot array with linear probing and
//!     tombstone-free backward-shift deletion. Stores arena handles plus
//!     each entry's precomputed hash; key equality is injected as a closure.
//!   - FifoHashMap<K, V, S>: the collection. Owns the entry arena
//!     (slotmap, so handles are generational and never dangle), threads the
//!     FIFO chain through entry `prev`/`next` handles, and drives placement,
//!     deletion repair, and inline rehashing.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` by design; no operation suspends.
//! - Duplicate keys are permitted and form independent entries; keyed
//!   operations resolve to the first match in probe order.
//! - Capacity is always a power of two and only grows. Rehash triggers when
//!   the post-insertion load factor exceeds the threshold (0.5 default),
//!   doubles the table, and re-places entries by their stored hashes; the
//!   FIFO links never change, so order is preserved for free.
//! - `K: Hash` runs once per key, at insertion; `K: Eq` runs only while
//!   probing. A debug-only guard panics if either re-enters the map.
//!
//! Why this split?
//! - Localize invariants: the table knows nothing about keys, values, or
//!   ordering; the map layer never reasons about probe mechanics beyond the
//!   slot indices the table hands back.
//! - The deletion-repair algorithm (the subtle part) lives in one place with
//!   its own direct tests, away from list splicing and arena bookkeeping.
//!
//! Hash strategies
//! - The hasher is a `BuildHasher` fixed at construction: `RandomState` by
//!   default, [`IdentityState`] for dense numeric ids (a scheduler ready
//!   queue keyed by thread id), [`Fnv1aState`] for cheap mixing of
//!   clustered key ranges.

mod exclusion;
pub mod fifo_hash_map;
mod fifo_hash_map_proptest;
pub mod hashers;
mod probe_table;

// Public surface
pub use fifo_hash_map::{
    FifoHashMap, InsertError, Iter, IterMut, INITIAL_CAPACITY, REHASH_THRESHOLD,
};
pub use hashers::{Fnv1aState, IdentityState};
