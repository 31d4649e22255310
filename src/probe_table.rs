//! ProbeTable: open-addressing slot layer with linear probing and
//! backward-shift deletion.
//!
//! The table stores arena handles together with the precomputed 64-bit hash of
//! the entry behind each handle. It never touches keys or values: hashes come
//! in through arguments, key equality comes in through a caller closure. This
//! keeps the table free of user code except for the `is_match` probe hook.

use slotmap::DefaultKey;

/// One occupied slot: the entry's full hash plus its arena handle. The hash is
/// stored so deletion repair and rehashing never re-derive it.
#[derive(Clone, Copy, Debug)]
struct Slot {
    hash: u64,
    entry: DefaultKey,
}

/// Power-of-two slot array. Empty slots are `None`; there are no tombstones.
pub(crate) struct ProbeTable {
    slots: Box<[Option<Slot>]>,
}

impl ProbeTable {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        assert!(
            capacity.is_power_of_two(),
            "table capacity must be a power of two, got {capacity}"
        );
        Self {
            slots: vec![None; capacity].into_boxed_slice(),
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn mask(&self) -> usize {
        self.slots.len() - 1
    }

    /// The slot a hash maps to before any probing.
    #[inline]
    pub(crate) fn home(&self, hash: u64) -> usize {
        (hash as usize) & self.mask()
    }

    /// First empty slot on the probe path from the hash's home slot, or `None`
    /// if every slot is occupied. The full-table case is a defensive bound:
    /// the load-factor policy rehashes long before it can occur, except when
    /// the threshold is configured at 1.0.
    pub(crate) fn find_insert_slot(&self, hash: u64) -> Option<usize> {
        let mask = self.mask();
        let mut slot = self.home(hash);
        for _ in 0..self.slots.len() {
            if self.slots[slot].is_none() {
                return Some(slot);
            }
            slot = (slot + 1) & mask;
        }
        None
    }

    /// Mark `slot` occupied. The slot must be empty and must have come from
    /// `find_insert_slot` with the same hash, or reachability breaks.
    pub(crate) fn occupy(&mut self, slot: usize, hash: u64, entry: DefaultKey) {
        debug_assert!(self.slots[slot].is_none(), "occupying a full slot");
        self.slots[slot] = Some(Slot { hash, entry });
    }

    /// Probe from the hash's home slot, applying `is_match` to each occupied
    /// slot in probe order, stopping at the first empty slot. Reachability
    /// guarantees a present key is never separated from its home by a gap, so
    /// hitting a gap means not-found.
    pub(crate) fn probe_find(
        &self,
        hash: u64,
        mut is_match: impl FnMut(DefaultKey) -> bool,
    ) -> Option<(usize, DefaultKey)> {
        let mask = self.mask();
        let mut slot = self.home(hash);
        for _ in 0..self.slots.len() {
            match self.slots[slot] {
                None => return None,
                Some(s) if s.hash == hash && is_match(s.entry) => return Some((slot, s.entry)),
                Some(_) => slot = (slot + 1) & mask,
            }
        }
        None
    }

    /// Clear `slot` and repair the probe chain behind it by shifting entries
    /// backward into the hole, without tombstones. `moved` is invoked for each
    /// relocated entry with its new slot so the caller can refresh cached
    /// indices. Runs until the scan reaches an empty slot; the hole itself is
    /// empty, so termination is guaranteed even on an otherwise full table.
    pub(crate) fn vacate(&mut self, slot: usize, mut moved: impl FnMut(DefaultKey, usize)) {
        let mask = self.mask();
        debug_assert!(self.slots[slot].is_some(), "vacating an empty slot");
        self.slots[slot] = None;

        let mut empty = slot;
        let mut inspect = (slot + 1) & mask;
        while let Some(s) = self.slots[inspect] {
            let home = (s.hash as usize) & mask;
            // An entry may shift backward into the hole only if that does not
            // place it before its own home slot on its probe path, which
            // would make it unreachable by forward probing.
            if !stays_put(home, empty, inspect) {
                self.slots[empty] = Some(s);
                self.slots[inspect] = None;
                moved(s.entry, empty);
                empty = inspect;
            }
            inspect = (inspect + 1) & mask;
        }
    }

    /// Occupied slots in slot-index order: `(slot, hash, entry)`.
    pub(crate) fn occupied(&self) -> impl Iterator<Item = (usize, u64, DefaultKey)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, &s)| s.map(|s| (i, s.hash, s.entry)))
    }

    #[cfg(test)]
    pub(crate) fn entry_at(&self, slot: usize) -> Option<DefaultKey> {
        self.slots[slot].map(|s| s.entry)
    }
}

/// Cyclic-betweenness test deciding whether the entry at `inspect` keeps its
/// slot while the hole sits at `empty`. True iff the entry is already at its
/// home slot, or its home lies on the forward arc from `empty` to `inspect`.
/// Exactly one of the three rotations holds for any three distinct indices,
/// which covers wraparound without modular subtraction.
fn stays_put(home: usize, empty: usize, inspect: usize) -> bool {
    home == inspect
        || (empty < home && home < inspect)
        || (home < inspect && inspect < empty)
        || (inspect < empty && empty < home)
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    // Mints arena handles without involving the map layer; the table only
    // needs handles to be distinct.
    fn mint(n: usize) -> Vec<DefaultKey> {
        let mut arena: SlotMap<DefaultKey, ()> = SlotMap::with_key();
        (0..n).map(|_| arena.insert(())).collect()
    }

    fn place(table: &mut ProbeTable, hash: u64, entry: DefaultKey) -> usize {
        let slot = table.find_insert_slot(hash).expect("table has room");
        table.occupy(slot, hash, entry);
        slot
    }

    /// Invariant: an entry stays put iff its home equals the inspected slot or
    /// lies on the forward arc between hole and inspected slot.
    #[test]
    fn stays_put_rotations() {
        // At home.
        assert!(stays_put(5, 2, 5));
        // Home strictly between hole and inspected slot, no wraparound.
        assert!(stays_put(4, 2, 6));
        // Same arc, wrapped once: hole near the top, inspect below it.
        assert!(stays_put(1, 6, 3));
        // Same arc, wrapped the other way.
        assert!(stays_put(7, 5, 2));
        // Home at the hole: shifting back lands the entry exactly on its home.
        assert!(!stays_put(3, 3, 6));
        // Home before the hole: entry is out of place, must shift.
        assert!(!stays_put(1, 2, 6));
        // Wrapped probe chain, home behind the hole.
        assert!(!stays_put(6, 7, 2));
    }

    /// Invariant: linear probing resolves collisions by arrival order. Keys
    /// hashing to 0, 0, 0, 3, 1, 1 at capacity 128 land in slots 0..=5.
    #[test]
    fn linear_probe_placement() {
        let keys = mint(6);
        let mut table = ProbeTable::with_capacity(128);
        let hashes = [0u64, 128, 256, 3, 1, 129];
        let expected = [0usize, 1, 2, 3, 4, 5];
        for (i, (&hash, &slot)) in hashes.iter().zip(&expected).enumerate() {
            assert_eq!(place(&mut table, hash, keys[i]), slot, "key {hash}");
        }
    }

    /// Invariant: vacating a slot cascades displaced entries backward until
    /// the scan hits a gap. Removing the entry at slot 0 from the placement
    /// above relocates four entries and leaves slot 5 empty.
    #[test]
    fn backward_shift_cascade() {
        let keys = mint(6);
        let mut table = ProbeTable::with_capacity(128);
        for (i, &hash) in [0u64, 128, 256, 3, 1, 129].iter().enumerate() {
            place(&mut table, hash, keys[i]);
        }

        let mut moves = Vec::new();
        table.vacate(0, |entry, slot| moves.push((entry, slot)));

        assert_eq!(table.entry_at(0), Some(keys[1])); // hash 128
        assert_eq!(table.entry_at(1), Some(keys[2])); // hash 256
        assert_eq!(table.entry_at(2), Some(keys[4])); // hash 1
        assert_eq!(table.entry_at(3), Some(keys[3])); // hash 3, already home
        assert_eq!(table.entry_at(4), Some(keys[5])); // hash 129
        assert_eq!(table.entry_at(5), None);
        assert_eq!(
            moves,
            vec![(keys[1], 0), (keys[2], 1), (keys[4], 2), (keys[5], 4)]
        );
    }

    /// Invariant: repair follows the probe chain across the wraparound
    /// boundary. Entries wrapped past slot 0 shift back toward the top of the
    /// table when a hole opens below them.
    #[test]
    fn backward_shift_across_wraparound() {
        let keys = mint(6);
        let mut table = ProbeTable::with_capacity(128);
        // Slots 124..=127 then wrapping into 0 and 1.
        for (i, &hash) in [124u64, 252, 380, 508].iter().enumerate() {
            assert_eq!(place(&mut table, hash, keys[i]), 124 + i);
        }
        assert_eq!(place(&mut table, 0, keys[4]), 0);
        assert_eq!(place(&mut table, 636, keys[5]), 1);

        // Remove hash 380 from slot 126.
        table.vacate(126, |_, _| {});

        assert_eq!(table.entry_at(126), Some(keys[3])); // hash 508
        assert_eq!(table.entry_at(127), Some(keys[5])); // hash 636, wrapped back
        assert_eq!(table.entry_at(0), Some(keys[4])); // hash 0 stays home
        assert_eq!(table.entry_at(1), None);
    }

    /// Invariant: probing stops at the first gap, so a vacated chain never
    /// leaves an entry stranded behind an empty slot.
    #[test]
    fn probe_find_stops_at_gap() {
        let keys = mint(3);
        let mut table = ProbeTable::with_capacity(8);
        place(&mut table, 2, keys[0]);
        place(&mut table, 2, keys[1]);
        place(&mut table, 2, keys[2]);

        // All three share hash 2; matching on handle picks the probe-order hit.
        let hit = table.probe_find(2, |e| e == keys[2]);
        assert_eq!(hit, Some((4, keys[2])));

        table.vacate(3, |_, _| {});
        // keys[2] shifted back into slot 3; slot 4 is now the gap.
        assert_eq!(table.probe_find(2, |e| e == keys[2]), Some((3, keys[2])));
        assert_eq!(table.probe_find(2, |e| e == keys[1]), None);
    }

    /// Invariant: a completely full table reports no insert slot instead of
    /// probing forever.
    #[test]
    fn full_table_is_detected() {
        let keys = mint(4);
        let mut table = ProbeTable::with_capacity(4);
        for (i, key) in keys.iter().enumerate() {
            place(&mut table, i as u64, *key);
        }
        assert_eq!(table.find_insert_slot(0), None);
        // Lookup of an absent hash also terminates.
        assert_eq!(table.probe_find(7, |_| false), None);
    }
}
