//! FifoHashMap: keyed FIFO collection fusing an open-addressing probe table
//! with an intrusive insertion-order list over a slotmap arena.

use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;
use slotmap::{DefaultKey, SlotMap};
use std::collections::hash_map::RandomState;

use crate::exclusion::DebugExclusion;
use crate::probe_table::ProbeTable;

/// Default slot-table capacity. Must be a power of two.
pub const INITIAL_CAPACITY: usize = 128;

/// Default load-factor threshold; the table doubles when the post-insertion
/// load factor exceeds it.
pub const REHASH_THRESHOLD: f64 = 0.5;

/// One owned entry. The `prev`/`next` handles thread the FIFO chain through
/// the arena; `slot` caches the entry's current table index so dequeuing
/// skips the probe walk. The table is the source of truth for placement, the
/// cache merely mirrors it.
#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
    slot: usize,
}

/// A hash map that is simultaneously a FIFO queue.
///
/// Keys resolve in expected O(1) through a linear-probing table with
/// tombstone-free backward-shift deletion; `pop_front` and iteration follow
/// global insertion order through an intrusive doubly linked list. Duplicate
/// keys are permitted and form independent entries; keyed operations resolve
/// to the first match in probe order.
///
/// Single-threaded by design. Iterators borrow the map, so the compiler
/// rules out mutation during iteration.
pub struct FifoHashMap<K, V, S = RandomState> {
    hasher: S,
    table: ProbeTable,
    entries: SlotMap<DefaultKey, Entry<K, V>>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
    threshold: f64,
    exclusion: DebugExclusion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertError {
    /// Every slot is occupied and no rehash is pending. Unreachable under the
    /// default threshold; only a map configured with `rehash_threshold(1.0)`
    /// can fill completely. The map is left untouched.
    TableFull,
}

impl<K, V> FifoHashMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_capacity_and_hasher(INITIAL_CAPACITY, RandomState::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }
}

impl<K, V> Default for FifoHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> FifoHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(INITIAL_CAPACITY, hasher)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            hasher,
            table: ProbeTable::with_capacity(capacity),
            entries: SlotMap::with_key(),
            head: None,
            tail: None,
            threshold: REHASH_THRESHOLD,
            exclusion: DebugExclusion::new(),
        }
    }

    /// Replace the rehash threshold, consuming the map. Only valid on an
    /// empty map: the growth policy is fixed before the first insert, like
    /// the hasher.
    pub fn rehash_threshold(mut self, threshold: f64) -> Self {
        assert!(
            self.is_empty(),
            "rehash threshold must be chosen before the first insert"
        );
        assert!(
            threshold > 0.0 && threshold <= 1.0,
            "rehash threshold must be in (0, 1], got {threshold}"
        );
        self.threshold = threshold;
        self
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn load_factor(&self) -> f64 {
        self.entries.len() as f64 / self.table.capacity() as f64
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Append an entry at the tail of the FIFO order.
    ///
    /// The key is hashed exactly once, here; rehashing reuses the stored
    /// hash and never re-invokes `K: Hash`. If the post-insertion load
    /// factor exceeds the threshold, the table doubles before returning.
    pub fn push_back(&mut self, key: K, value: V) -> Result<(), InsertError> {
        {
            let _g = self.exclusion.enter();
            let hash = self.make_hash(&key);
            let slot = self
                .table
                .find_insert_slot(hash)
                .ok_or(InsertError::TableFull)?;
            let entry = Entry {
                key,
                value,
                prev: self.tail,
                next: None,
                slot,
            };
            let handle = self.entries.insert(entry);
            self.table.occupy(slot, hash, handle);
            match self.tail {
                Some(tail) => self.entries[tail].next = Some(handle),
                None => self.head = Some(handle),
            }
            self.tail = Some(handle);
        }

        // Post-insertion load-factor check. Growth runs on stored hashes
        // only, so it sits outside the guard.
        if self.load_factor() > self.threshold {
            self.grow();
        }
        Ok(())
    }

    /// Remove and return the oldest entry, or `None` if the map is empty.
    /// Never triggers a rehash; capacity only grows.
    pub fn pop_front(&mut self) -> Option<(K, V)> {
        let _g = self.exclusion.enter();
        let handle = self.head?;
        // Cached slot: the head is dequeued without a probe walk.
        let slot = self.entries[handle].slot;

        let next = self.entries[handle].next;
        match next {
            Some(n) => self.entries[n].prev = None,
            None => self.tail = None,
        }
        self.head = next;

        let entries = &mut self.entries;
        self.table
            .vacate(slot, |moved, new_slot| entries[moved].slot = new_slot);
        let entry = entries.remove(handle).expect("head handle is live");
        Some((entry.key, entry.value))
    }

    /// Remove the first probe-order entry matching `q`, splicing it out of
    /// the FIFO chain and repairing the probe chain behind its slot.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.exclusion.enter();
        let hash = self.make_hash(q);
        let (slot, handle) = self
            .table
            .probe_find(hash, |h| self.entries[h].key.borrow() == q)?;

        let (prev, next) = {
            let e = &self.entries[handle];
            (e.prev, e.next)
        };
        match prev {
            Some(p) => self.entries[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.entries[n].prev = prev,
            None => self.tail = prev,
        }

        let entries = &mut self.entries;
        self.table
            .vacate(slot, |moved, new_slot| entries[moved].slot = new_slot);
        let entry = entries.remove(handle).expect("probed handle is live");
        Some((entry.key, entry.value))
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.exclusion.enter();
        let hash = self.make_hash(q);
        let (_, handle) = self
            .table
            .probe_find(hash, |h| self.entries[h].key.borrow() == q)?;
        Some(&self.entries[handle].value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.exclusion.enter();
        let hash = self.make_hash(q);
        let (_, handle) = self
            .table
            .probe_find(hash, |h| self.entries[h].key.borrow() == q)?;
        Some(&mut self.entries[handle].value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(q).is_some()
    }

    /// Peek at the oldest entry without removing it.
    pub fn front(&self) -> Option<(&K, &V)> {
        let e = &self.entries[self.head?];
        Some((&e.key, &e.value))
    }

    /// Iterate entries in FIFO insertion order.
    ///
    /// The cursor borrows the map, so mutating while iterating does not
    /// compile:
    ///
    /// ```compile_fail
    /// let mut q = fifo_hashmap::FifoHashMap::new();
    /// q.push_back("a", 1).unwrap();
    /// for _ in q.iter() {
    ///     q.pop_front();
    /// }
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            entries: &self.entries,
            cursor: self.head,
            remaining: self.entries.len(),
        }
    }

    /// Iterate in FIFO insertion order with mutable access to values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let remaining = self.entries.len();
        IterMut {
            entries: &mut self.entries,
            cursor: self.head,
            remaining,
            _marker: PhantomData,
        }
    }

    /// Double the table and re-place every live entry by its stored hash,
    /// walking the old table in slot order. List links are untouched: they
    /// reference arena handles, so FIFO order survives trivially.
    fn grow(&mut self) {
        let mut next = ProbeTable::with_capacity(self.table.capacity() * 2);
        for (_, hash, handle) in self.table.occupied() {
            let slot = next
                .find_insert_slot(hash)
                .expect("doubled table cannot be full");
            next.occupy(slot, hash, handle);
            self.entries[handle].slot = slot;
        }
        self.table = next;
    }

    /// Walks every structural invariant; test builds only.
    ///
    /// 1. probe reachability, 2. slot-cache coherence, 3. list/table
    /// correspondence, 4. size correspondence, 5. power-of-two capacity.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        use std::collections::HashSet;

        let capacity = self.table.capacity();
        assert!(capacity.is_power_of_two(), "capacity must stay a power of two");
        assert!(self.load_factor() <= 1.0);

        let occupied: Vec<(usize, u64, DefaultKey)> = self.table.occupied().collect();
        assert_eq!(occupied.len(), self.entries.len(), "slot count != arena count");

        let mask = capacity - 1;
        for &(slot, hash, handle) in &occupied {
            let entry = self.entries.get(handle).expect("table handle must be live");
            assert_eq!(entry.slot, slot, "cached slot out of sync");
            let mut probe = (hash as usize) & mask;
            while probe != slot {
                assert!(
                    self.table.entry_at(probe).is_some(),
                    "gap between home {} and slot {slot} breaks reachability",
                    (hash as usize) & mask,
                );
                probe = (probe + 1) & mask;
            }
        }

        let mut seen = HashSet::new();
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(handle) = cursor {
            let entry = &self.entries[handle];
            assert_eq!(entry.prev, prev, "list backlink out of sync");
            assert!(seen.insert(handle), "cycle in FIFO chain");
            prev = Some(handle);
            cursor = entry.next;
        }
        assert_eq!(self.tail, prev, "tail does not terminate the chain");
        assert_eq!(seen.len(), self.entries.len(), "list length != arena count");
        for &(_, _, handle) in &occupied {
            assert!(seen.contains(&handle), "table entry missing from list");
        }
    }
}

/// Borrowing FIFO-order cursor. Holding one keeps the map immutably
/// borrowed, so mutation during iteration is a compile error.
pub struct Iter<'a, K, V> {
    entries: &'a SlotMap<DefaultKey, Entry<K, V>>,
    cursor: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let entries = self.entries;
        let entry = &entries[self.cursor?];
        self.cursor = entry.next;
        self.remaining -= 1;
        Some((&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// FIFO-order cursor with mutable access to values.
pub struct IterMut<'a, K, V> {
    entries: *mut SlotMap<DefaultKey, Entry<K, V>>,
    cursor: Option<DefaultKey>,
    remaining: usize,
    _marker: PhantomData<&'a mut SlotMap<DefaultKey, Entry<K, V>>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.cursor?;
        // Safety: `entries` came from an exclusive borrow living for 'a, and
        // the FIFO chain is acyclic, so each handle is yielded at most once;
        // the returned borrows are therefore disjoint.
        let entries = unsafe { &mut *self.entries };
        let entry = &mut entries[handle];
        self.cursor = entry.next;
        self.remaining -= 1;
        Some((&entry.key, &mut entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
