//! Insertion-ordered dictionaries on top of [`ProbeTable`].
//!
//! Every entry carries [`DictionaryAttributes`] whose `DictionaryOrder` is
//! stamped from a per-table counter when the key is first inserted. Key
//! enumeration sorts by that order, so a hash table can still report keys in
//! the order they were added.

use std::fmt;
use std::marker::PhantomData;

use core_types::Value;

use crate::attributes::{DictionaryAttributes, INITIAL_PROPERTY_INDEX, MAX_DICTIONARY_ORDER};
use crate::hash_table::{ProbeTable, TablePolicy};

/// Key policy of an ordered dictionary.
pub trait OrderedPolicy {
    /// Key stored in each entry
    type Key: Clone;
    /// Value stored in each entry
    type Value: Clone;

    /// Hash of `key`.
    fn hash(key: &Self::Key) -> u32;

    /// Whether two keys denote the same entry.
    fn is_match(key: &Self::Key, other: &Self::Key) -> bool;

    /// The key as written by the key-enumeration operations.
    fn key_to_value(key: &Self::Key) -> Value;

    /// Sort key used when enumerating keys. Defaults to insertion order.
    fn enumeration_rank(_key: &Self::Key, attributes: DictionaryAttributes) -> u64 {
        u64::from(attributes.dictionary_order())
    }

    /// Whether `key` may be reported by the enumerable-keys operation.
    fn is_enumerable_key(_key: &Self::Key) -> bool {
        true
    }
}

/// A value together with its attributes.
#[derive(Debug, Clone)]
pub struct OrderedEntry<V> {
    /// Stored value
    pub value: V,
    /// Attributes, including the insertion order
    pub attributes: DictionaryAttributes,
}

/// Adapts an [`OrderedPolicy`] to the underlying table.
pub struct WithAttributes<P>(PhantomData<P>);

impl<P: OrderedPolicy> TablePolicy for WithAttributes<P> {
    type Key = P::Key;
    type Value = OrderedEntry<P::Value>;

    fn hash(key: &Self::Key) -> u32 {
        P::hash(key)
    }

    fn is_match(key: &Self::Key, other: &Self::Key) -> bool {
        P::is_match(key, other)
    }
}

/// An open-addressing dictionary that remembers insertion order.
pub struct OrderedProbeTable<P: OrderedPolicy> {
    table: ProbeTable<WithAttributes<P>>,
    next_enumeration_index: u32,
}

impl<P: OrderedPolicy> Clone for OrderedProbeTable<P> {
    fn clone(&self) -> Self {
        OrderedProbeTable {
            table: self.table.clone(),
            next_enumeration_index: self.next_enumeration_index,
        }
    }
}

impl<P: OrderedPolicy> fmt::Debug for OrderedProbeTable<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedProbeTable")
            .field("table", &self.table)
            .field("next_enumeration_index", &self.next_enumeration_index)
            .finish()
    }
}

impl<P: OrderedPolicy> OrderedProbeTable<P> {
    /// Creates an empty dictionary of `capacity` slots (rounded up to a power of two).
    pub fn create(capacity: usize) -> Self {
        OrderedProbeTable {
            table: ProbeTable::create(capacity),
            next_enumeration_index: INITIAL_PROPERTY_INDEX,
        }
    }

    /// Number of slots
    pub fn size(&self) -> usize {
        self.table.size()
    }

    /// Number of live entries
    pub fn entries_count(&self) -> usize {
        self.table.entries_count()
    }

    /// Number of holes
    pub fn hole_entries_count(&self) -> usize {
        self.table.hole_entries_count()
    }

    /// Order that the next inserted key will receive.
    pub fn next_enumeration_index(&self) -> u32 {
        self.next_enumeration_index
    }

    /// Entry holding `key`, if present.
    pub fn find_entry(&self, key: &P::Key) -> Option<usize> {
        self.table.find_entry(key)
    }

    /// Key at `entry`.
    pub fn key(&self, entry: usize) -> Option<&P::Key> {
        self.table.key(entry)
    }

    /// Value at `entry`.
    pub fn value(&self, entry: usize) -> Option<&P::Value> {
        self.table.value(entry).map(|e| &e.value)
    }

    /// Attributes at `entry`.
    pub fn attributes(&self, entry: usize) -> Option<DictionaryAttributes> {
        self.table.value(entry).map(|e| e.attributes)
    }

    /// Whether adding `additional` entries would rehash the table.
    pub fn is_need_grow(&self, additional: usize) -> bool {
        self.table.is_need_grow(additional)
    }

    /// Inserts `key` unless it is already present. The attributes' order is
    /// replaced with the next enumeration index. Returns the key's entry.
    pub fn put_if_absent(
        &mut self,
        key: P::Key,
        value: P::Value,
        attributes: DictionaryAttributes,
    ) -> usize {
        if let Some(entry) = self.find_entry(&key) {
            return entry;
        }
        self.add_stamped(key, value, attributes)
    }

    /// Inserts `key`, or overwrites its value and attributes if present. An
    /// existing entry keeps its original order.
    pub fn put(&mut self, key: P::Key, value: P::Value, attributes: DictionaryAttributes) -> usize {
        if let Some(entry) = self.find_entry(&key) {
            let order = self.attributes(entry).map_or(0, |a| a.dictionary_order());
            self.update_value_and_attributes(entry, value, attributes.with_dictionary_order(order));
            return entry;
        }
        self.add_stamped(key, value, attributes)
    }

    fn add_stamped(&mut self, key: P::Key, value: P::Value, attributes: DictionaryAttributes) -> usize {
        let order = self.take_enumeration_index();
        let attributes = attributes.with_dictionary_order(order);
        let entry = self.table.add_new(key, OrderedEntry { value, attributes });
        self.next_enumeration_index = order + 1;
        entry
    }

    /// Next order to stamp, renumbering live entries densely if the counter
    /// has run past the order field.
    fn take_enumeration_index(&mut self) -> u32 {
        let index = self.next_enumeration_index;
        if index <= MAX_DICTIONARY_ORDER {
            return index;
        }
        let order = self.enumeration_order();
        log::debug!("renumbering {} dictionary entries", order.len());
        for (position, entry) in order.iter().enumerate() {
            if let Some(slot) = self.table.value_mut(*entry) {
                slot.attributes
                    .set_dictionary_order(INITIAL_PROPERTY_INDEX + position as u32);
            }
        }
        INITIAL_PROPERTY_INDEX + order.len() as u32
    }

    /// Removes the entry, leaving a hole. The table never shrinks here.
    pub fn remove(&mut self, entry: usize) -> bool {
        self.table.remove(entry)
    }

    /// Same as [`OrderedProbeTable::remove`], ignoring whether anything was there.
    pub fn clear_entry(&mut self, entry: usize) {
        self.table.remove(entry);
    }

    /// Rehashes into a smaller table when sparsely used. The enumeration
    /// counter carries over unchanged.
    pub fn shrink(&mut self, additional: usize) {
        self.table.shrink(additional);
    }

    /// Writes a whole entry into slot `entry`.
    pub fn set_entry(
        &mut self,
        entry: usize,
        key: P::Key,
        value: P::Value,
        attributes: DictionaryAttributes,
    ) {
        self.table.set_entry(entry, key, OrderedEntry { value, attributes });
    }

    /// Replaces the attributes at `entry`.
    pub fn set_attributes(&mut self, entry: usize, attributes: DictionaryAttributes) {
        debug_assert!(self.table.key(entry).is_some(), "no entry at {}", entry);
        if let Some(slot) = self.table.value_mut(entry) {
            slot.attributes = attributes;
        }
    }

    /// Replaces the value at `entry`.
    pub fn update_value(&mut self, entry: usize, value: P::Value) {
        debug_assert!(self.table.key(entry).is_some(), "no entry at {}", entry);
        if let Some(slot) = self.table.value_mut(entry) {
            slot.value = value;
        }
    }

    /// Replaces value and attributes at `entry` in one step.
    pub fn update_value_and_attributes(
        &mut self,
        entry: usize,
        value: P::Value,
        attributes: DictionaryAttributes,
    ) {
        debug_assert!(self.table.key(entry).is_some(), "no entry at {}", entry);
        if let Some(slot) = self.table.value_mut(entry) {
            slot.value = value;
            slot.attributes = attributes;
        }
    }

    /// Live entries sorted by insertion order.
    pub fn enumeration_order(&self) -> Vec<usize> {
        let mut order: Vec<(usize, u32)> = self
            .table
            .iter()
            .map(|(entry, _, slot)| (entry, slot.attributes.dictionary_order()))
            .collect();
        order.sort_by_key(|&(_, dictionary_order)| dictionary_order);
        order.into_iter().map(|(entry, _)| entry).collect()
    }

    fn sorted_keys(&self, enumerable_only: bool) -> Vec<Value> {
        let mut keys: Vec<(u64, Value)> = self
            .table
            .iter()
            .filter(|(_, key, slot)| {
                !enumerable_only || (slot.attributes.flags().is_enumerable() && P::is_enumerable_key(key))
            })
            .map(|(_, key, slot)| (P::enumeration_rank(key, slot.attributes), P::key_to_value(key)))
            .collect();
        keys.sort_by_key(|(rank, _)| *rank);
        keys.into_iter().map(|(_, key)| key).collect()
    }

    /// Writes every key, in enumeration order, into `dest` starting at
    /// `offset`. Returns the number written; `dest` must be large enough.
    pub fn get_all_keys(&self, offset: usize, dest: &mut [Value]) -> usize {
        let keys = self.sorted_keys(false);
        let count = keys.len();
        for (slot, key) in dest[offset..offset + count].iter_mut().zip(keys) {
            *slot = key;
        }
        count
    }

    /// Like [`OrderedProbeTable::get_all_keys`] but only for enumerable
    /// entries whose key kind takes part in enumeration.
    pub fn get_enum_all_keys(&self, offset: usize, dest: &mut [Value]) -> usize {
        let keys = self.sorted_keys(true);
        let count = keys.len();
        for (slot, key) in dest[offset..offset + count].iter_mut().zip(keys) {
            *slot = key;
        }
        count
    }

    /// Every key in enumeration order.
    pub fn all_keys(&self) -> Vec<Value> {
        self.sorted_keys(false)
    }

    /// Enumerable keys in enumeration order.
    pub fn enum_keys(&self) -> Vec<Value> {
        self.sorted_keys(true)
    }

    /// Live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &P::Key, &OrderedEntry<P::Value>)> + '_ {
        self.table.iter()
    }
}
