//! Open-addressing hash table with quadratic probing.
//!
//! The table is a flat array of slots whose length is always a power of two.
//! Removing a key leaves a hole so later probe chains stay intact; holes are
//! only dropped when the table is rehashed by [`ProbeTable::grow`] or
//! [`ProbeTable::shrink`]. Hashing and key equality come from a
//! [`TablePolicy`], so each dictionary flavour decides how its keys compare.

use std::fmt;
use std::marker::PhantomData;

/// Smallest table size.
pub const MIN_SIZE: usize = 4;
/// A shrink never produces a table smaller than this.
pub const MIN_SHRINK_SIZE: usize = 16;

/// Hash and equality for one kind of table key.
pub trait TablePolicy {
    /// Key stored in each occupied slot
    type Key: Clone;
    /// Value stored next to the key
    type Value: Clone;

    /// Hash of `key`.
    fn hash(key: &Self::Key) -> u32;

    /// Whether two keys denote the same entry.
    fn is_match(key: &Self::Key, other: &Self::Key) -> bool;
}

#[derive(Clone)]
enum Slot<K, V> {
    Empty,
    Hole,
    Occupied { key: K, value: V },
}

/// Smallest legal table size able to hold `at_least` entries with room for
/// collisions: `at_least * 1.5` rounded up to a power of two.
pub fn compute_hash_table_size(at_least: usize) -> usize {
    let raw = at_least + (at_least >> 1);
    raw.next_power_of_two().max(MIN_SIZE)
}

/// Size a shrink should target, or `current` when shrinking is not worth it.
pub fn recalculate_table_size(current: usize, at_least: usize) -> usize {
    // More than a quarter full: keep the current size.
    if at_least > current / 4 {
        return current;
    }
    let new_size = compute_hash_table_size(at_least);
    if new_size < MIN_SHRINK_SIZE {
        return current;
    }
    new_size
}

#[inline]
fn first_position(hash: u32, size: usize) -> usize {
    hash as usize & (size - 1)
}

#[inline]
fn next_position(last: usize, count: usize, size: usize) -> usize {
    (last + count * (count + 1) / 2) & (size - 1)
}

/// Steps after which the probe sequence has visited every slot of a
/// power-of-two table.
#[inline]
fn probe_limit(size: usize) -> usize {
    2 * size
}

/// A generic open-addressing table.
///
/// # Example
///
/// ```
/// use object_model::{ProbeTable, TablePolicy};
///
/// struct Ints;
/// impl TablePolicy for Ints {
///     type Key = u32;
///     type Value = &'static str;
///     fn hash(key: &u32) -> u32 { *key }
///     fn is_match(a: &u32, b: &u32) -> bool { a == b }
/// }
///
/// let mut table = ProbeTable::<Ints>::create(4);
/// let entry = table.insert(7, "seven");
/// assert_eq!(table.find_entry(&7), Some(entry));
/// assert_eq!(table.value(entry), Some(&"seven"));
/// ```
pub struct ProbeTable<P: TablePolicy> {
    slots: Vec<Slot<P::Key, P::Value>>,
    entries: usize,
    holes: usize,
    _policy: PhantomData<P>,
}

impl<P: TablePolicy> Clone for ProbeTable<P> {
    fn clone(&self) -> Self {
        ProbeTable {
            slots: self.slots.clone(),
            entries: self.entries,
            holes: self.holes,
            _policy: PhantomData,
        }
    }
}

impl<P: TablePolicy> fmt::Debug for ProbeTable<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeTable")
            .field("size", &self.size())
            .field("entries", &self.entries)
            .field("holes", &self.holes)
            .finish()
    }
}

impl<P: TablePolicy> ProbeTable<P> {
    /// Creates an empty table of `capacity` slots, rounded up to a power of
    /// two no smaller than [`MIN_SIZE`].
    pub fn create(capacity: usize) -> Self {
        let size = capacity.max(MIN_SIZE).next_power_of_two();
        ProbeTable {
            slots: vec![Slot::Empty; size],
            entries: 0,
            holes: 0,
            _policy: PhantomData,
        }
    }

    /// Number of slots
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots
    pub fn entries_count(&self) -> usize {
        self.entries
    }

    /// Number of slots left behind by removals
    pub fn hole_entries_count(&self) -> usize {
        self.holes
    }

    /// Entry holding `key`, if present.
    pub fn find_entry(&self, key: &P::Key) -> Option<usize> {
        let size = self.size();
        let mut entry = first_position(P::hash(key), size);
        for count in 1..=probe_limit(size) {
            match &self.slots[entry] {
                Slot::Empty => return None,
                Slot::Occupied { key: existing, .. } if P::is_match(existing, key) => {
                    return Some(entry);
                }
                _ => {}
            }
            entry = next_position(entry, count, size);
        }
        None
    }

    /// First free or hole slot on the probe path of `hash`.
    pub(crate) fn find_insert_index(&self, hash: u32) -> usize {
        let size = self.size();
        let mut entry = first_position(hash, size);
        for count in 1..=probe_limit(size) {
            if !matches!(self.slots[entry], Slot::Occupied { .. }) {
                return entry;
            }
            entry = next_position(entry, count, size);
        }
        // Unreachable while grow() keeps free slots available.
        debug_assert!(false, "probe table is full");
        self.slots
            .iter()
            .position(|slot| !matches!(slot, Slot::Occupied { .. }))
            .unwrap_or(0)
    }

    /// Whether adding `additional` entries requires a larger table.
    pub fn is_need_grow(&self, additional: usize) -> bool {
        let size = self.size();
        let filled = self.entries + additional;
        // No growth while half of the free slots remain after the insert,
        // holes use at most half of them, and the load stays below two thirds.
        let roomy = filled < size && self.holes <= (size - filled) / 2 && filled + filled / 2 <= size;
        !roomy
    }

    /// Rehashes into a larger table when `additional` entries would not fit.
    pub fn grow(&mut self, additional: usize) {
        if !self.is_need_grow(additional) {
            return;
        }
        let new_size = compute_hash_table_size(self.size() + additional);
        log::debug!(
            "growing probe table from {} to {} slots ({} entries, {} holes)",
            self.size(),
            new_size,
            self.entries,
            self.holes
        );
        self.rehash(new_size);
    }

    /// Rehashes into a smaller table if at most a quarter of it would be used
    /// after adding `additional` entries. Never automatic.
    pub fn shrink(&mut self, additional: usize) {
        let new_size = recalculate_table_size(self.size(), self.entries + additional);
        if new_size == self.size() {
            return;
        }
        log::debug!("shrinking probe table from {} to {} slots", self.size(), new_size);
        self.rehash(new_size);
    }

    fn rehash(&mut self, new_size: usize) {
        debug_assert!(new_size.is_power_of_two() && new_size >= self.entries);
        let old = std::mem::replace(&mut self.slots, vec![Slot::Empty; new_size]);
        self.holes = 0;
        for slot in old {
            if let Slot::Occupied { key, value } = slot {
                let entry = self.find_insert_index(P::hash(&key));
                self.slots[entry] = Slot::Occupied { key, value };
            }
        }
    }

    /// Inserts or overwrites `key`, growing first if needed. Returns the entry.
    pub fn insert(&mut self, key: P::Key, value: P::Value) -> usize {
        if let Some(entry) = self.find_entry(&key) {
            if let Slot::Occupied { value: existing, .. } = &mut self.slots[entry] {
                *existing = value;
            }
            return entry;
        }
        self.add_new(key, value)
    }

    /// Inserts a key known to be absent.
    pub(crate) fn add_new(&mut self, key: P::Key, value: P::Value) -> usize {
        self.grow(1);
        let entry = self.find_insert_index(P::hash(&key));
        self.set_entry(entry, key, value);
        entry
    }

    /// Removes the entry at `entry`, leaving a hole. Returns false if the
    /// slot was not occupied.
    pub fn remove(&mut self, entry: usize) -> bool {
        match self.slots.get(entry) {
            Some(Slot::Occupied { .. }) => {
                self.slots[entry] = Slot::Hole;
                self.entries -= 1;
                self.holes += 1;
                true
            }
            _ => false,
        }
    }

    /// Removes `key` if present.
    pub fn remove_key(&mut self, key: &P::Key) -> bool {
        match self.find_entry(key) {
            Some(entry) => self.remove(entry),
            None => false,
        }
    }

    /// Writes `key` and `value` into slot `entry`, keeping the counters
    /// consistent. The slot must lie on the key's probe path.
    pub fn set_entry(&mut self, entry: usize, key: P::Key, value: P::Value) {
        debug_assert!(entry < self.size(), "entry {} out of range", entry);
        let Some(slot) = self.slots.get_mut(entry) else {
            return;
        };
        match slot {
            Slot::Empty => self.entries += 1,
            Slot::Hole => {
                self.entries += 1;
                self.holes -= 1;
            }
            Slot::Occupied { .. } => {}
        }
        *slot = Slot::Occupied { key, value };
    }

    /// Key at `entry`, if the slot is occupied.
    pub fn key(&self, entry: usize) -> Option<&P::Key> {
        match self.slots.get(entry) {
            Some(Slot::Occupied { key, .. }) => Some(key),
            _ => None,
        }
    }

    /// Value at `entry`, if the slot is occupied.
    pub fn value(&self, entry: usize) -> Option<&P::Value> {
        match self.slots.get(entry) {
            Some(Slot::Occupied { value, .. }) => Some(value),
            _ => None,
        }
    }

    /// Mutable value at `entry`, if the slot is occupied.
    pub fn value_mut(&mut self, entry: usize) -> Option<&mut P::Value> {
        match self.slots.get_mut(entry) {
            Some(Slot::Occupied { value, .. }) => Some(value),
            _ => None,
        }
    }

    /// Whether slot `entry` is a hole.
    pub fn is_hole(&self, entry: usize) -> bool {
        matches!(self.slots.get(entry), Some(Slot::Hole))
    }

    /// Occupied entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &P::Key, &P::Value)> + '_ {
        self.slots.iter().enumerate().filter_map(|(entry, slot)| match slot {
            Slot::Occupied { key, value } => Some((entry, key, value)),
            _ => None,
        })
    }
}
