//! The three dictionary flavours.
//!
//! - [`NameDictionary`]: named properties of an object in dictionary mode
//! - [`NumberDictionary`]: sparse or non-default-attribute elements
//! - [`GlobalDictionary`]: bindings of the global object, each boxed in a
//!   [`PropertyCell`]

use std::hash::{Hash, Hasher};
use std::rc::Rc;

use core_types::Value;
use rustc_hash::FxHasher;

use crate::attributes::{DictionaryAttributes, PropertyBoxType};
use crate::intern::PropertyKey;
use crate::ordered_table::{OrderedPolicy, OrderedProbeTable};
use crate::property_cell::{CellHandle, PropertyCell};

/// String and symbol keys; only strings take part in `for-in`.
pub struct NamePolicy;

impl OrderedPolicy for NamePolicy {
    type Key = PropertyKey;
    type Value = Value;

    fn hash(key: &PropertyKey) -> u32 {
        key.hash_code()
    }

    fn is_match(key: &PropertyKey, other: &PropertyKey) -> bool {
        key == other
    }

    fn key_to_value(key: &PropertyKey) -> Value {
        key.to_value()
    }

    fn is_enumerable_key(key: &PropertyKey) -> bool {
        key.is_string()
    }
}

/// Element indices. Keys enumerate in ascending numeric order and are
/// reported as strings.
pub struct NumberPolicy;

impl OrderedPolicy for NumberPolicy {
    type Key = u32;
    type Value = Value;

    fn hash(key: &u32) -> u32 {
        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        hasher.finish() as u32
    }

    fn is_match(key: &u32, other: &u32) -> bool {
        key == other
    }

    fn key_to_value(key: &u32) -> Value {
        Value::String(key.to_string())
    }

    fn enumeration_rank(key: &u32, _attributes: DictionaryAttributes) -> u64 {
        u64::from(*key)
    }
}

/// Global bindings; values are property cells.
pub struct GlobalPolicy;

impl OrderedPolicy for GlobalPolicy {
    type Key = PropertyKey;
    type Value = CellHandle;

    fn hash(key: &PropertyKey) -> u32 {
        key.hash_code()
    }

    fn is_match(key: &PropertyKey, other: &PropertyKey) -> bool {
        key == other
    }

    fn key_to_value(key: &PropertyKey) -> Value {
        key.to_value()
    }

    fn is_enumerable_key(key: &PropertyKey) -> bool {
        key.is_string()
    }
}

/// Named properties of a dictionary-mode object.
pub type NameDictionary = OrderedProbeTable<NamePolicy>;
/// Dictionary-mode elements.
pub type NumberDictionary = OrderedProbeTable<NumberPolicy>;
/// Properties of the global object.
pub type GlobalDictionary = OrderedProbeTable<GlobalPolicy>;

impl OrderedProbeTable<GlobalPolicy> {
    /// The cell stored at `entry`.
    pub fn get_box(&self, entry: usize) -> Option<&CellHandle> {
        self.value(entry)
    }

    /// The value boxed by the cell at `entry`.
    pub fn get_value(&self, entry: usize) -> Option<Value> {
        self.get_box(entry).map(|cell| cell.value())
    }

    /// Box type a freshly created binding holding `value` starts with.
    pub fn initial_box_type(value: &Value) -> PropertyBoxType {
        if value.is_undefined() {
            PropertyBoxType::Undefined
        } else {
            PropertyBoxType::Constant
        }
    }

    /// Replaces the cell at `entry` with a new one holding the same value,
    /// stores `attributes` with a `Mutable` box type, and poisons the old cell
    /// so weak holders re-resolve.
    pub fn invalidate_property_box(&mut self, entry: usize, attributes: DictionaryAttributes) {
        let Some(old) = self.get_box(entry).map(Rc::clone) else {
            debug_assert!(false, "no global binding at entry {}", entry);
            return;
        };
        debug_assert!(!old.is_dead(), "property cell at {} is already dead", entry);

        let replacement = PropertyCell::new(old.value());
        let attributes = attributes.with_box_type(PropertyBoxType::Mutable);
        self.update_value_and_attributes(entry, replacement, attributes);
        old.poison();
        log::debug!("invalidated property cell at global entry {}", entry);
    }
}
