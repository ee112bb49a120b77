//! JavaScript object representation
//!
//! An object owns its hidden class, its named-property storage and its
//! element storage. Named properties start in fast mode (inline slots plus an
//! out-of-line array addressed through the hidden class) and move to a
//! [`NameDictionary`] when the shape stops being useful. The global object
//! always keeps its properties in a [`GlobalDictionary`]. Elements start as a
//! flat array and move to a [`NumberDictionary`] when they become sparse or
//! get non-default attributes.

use core_types::Value;

use crate::attributes::{AttributeFlags, DictionaryAttributes};
use crate::config::StorageConfig;
use crate::dictionary::{GlobalDictionary, NameDictionary, NumberDictionary};
use crate::hash_table::compute_hash_table_size;
use crate::hidden_class::HiddenClass;
use crate::intern::PropertyKey;

/// What kind of exotic or ordinary object this is.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    /// Plain object
    Ordinary,
    /// Array exotic object
    Array {
        /// Value of the `length` property
        length: u32,
        /// Whether `length` may still change
        length_writable: bool,
    },
    /// The global object
    Global,
    /// `String` wrapper object; its characters are read-only elements
    StringWrapper(String),
    /// Proxy; lookups stop here and defer to trap dispatch
    Proxy {
        /// Proxy target
        target: Value,
    },
}

/// Named-property storage.
#[derive(Debug, Clone)]
pub enum PropertyStorage {
    /// Slots addressed by the hidden class
    Fast {
        /// In-object slots
        inlined: Vec<Value>,
        /// Overflow slots; empty until first needed
        out_of_line: Vec<Value>,
    },
    /// Hash dictionary
    Dictionary(NameDictionary),
    /// Global object storage, created on first add
    Global(Option<GlobalDictionary>),
}

/// Indexed-element storage.
#[derive(Debug, Clone)]
pub enum ElementStorage {
    /// Dense array; empty slots hold [`Value::Hole`]
    Fast(Vec<Value>),
    /// Sparse dictionary
    Dictionary(NumberDictionary),
}

/// JavaScript object with hidden class-based property storage
#[derive(Debug, Clone)]
pub struct JSObject {
    /// Kind of object
    pub kind: ObjectKind,
    /// `[[Prototype]]`; `Value::Null` ends the chain
    pub prototype: Value,
    /// Shape describing fast-mode slots
    pub class: HiddenClass,
    /// Named properties
    pub properties: PropertyStorage,
    /// Indexed elements
    pub elements: ElementStorage,
}

impl JSObject {
    /// Creates an empty object.
    pub fn new(kind: ObjectKind, prototype: Value, config: &StorageConfig) -> Self {
        let properties = if kind == ObjectKind::Global {
            PropertyStorage::Global(None)
        } else {
            PropertyStorage::Fast {
                inlined: vec![Value::Undefined; config.inlined_properties as usize],
                out_of_line: Vec::new(),
            }
        };
        JSObject {
            kind,
            prototype,
            class: HiddenClass::new(config.inlined_properties, config.max_out_of_line()),
            properties,
            elements: ElementStorage::Fast(Vec::new()),
        }
    }

    /// Whether this is the global object.
    pub fn is_global(&self) -> bool {
        matches!(self.kind, ObjectKind::Global)
    }

    /// Whether this is an array.
    pub fn is_array(&self) -> bool {
        matches!(self.kind, ObjectKind::Array { .. })
    }

    /// Whether this is a proxy.
    pub fn is_proxy(&self) -> bool {
        matches!(self.kind, ObjectKind::Proxy { .. })
    }

    /// The wrapped string of a `String` wrapper.
    pub fn string_data(&self) -> Option<&str> {
        match &self.kind {
            ObjectKind::StringWrapper(s) => Some(s),
            _ => None,
        }
    }

    /// The array `length`, for arrays.
    pub fn array_length(&self) -> Option<u32> {
        match self.kind {
            ObjectKind::Array { length, .. } => Some(length),
            _ => None,
        }
    }

    /// Makes the array `length` read-only.
    pub fn freeze_array_length(&mut self) {
        if let ObjectKind::Array { length_writable, .. } = &mut self.kind {
            *length_writable = false;
        }
    }

    /// Whether named properties are addressed through the hidden class.
    pub fn is_fast_mode(&self) -> bool {
        matches!(self.properties, PropertyStorage::Fast { .. })
    }

    /// The named-property dictionary, in dictionary mode.
    pub fn name_dictionary(&self) -> Option<&NameDictionary> {
        match &self.properties {
            PropertyStorage::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    /// Mutable named-property dictionary, in dictionary mode.
    pub fn name_dictionary_mut(&mut self) -> Option<&mut NameDictionary> {
        match &mut self.properties {
            PropertyStorage::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    /// The global dictionary, once created.
    pub fn global_dictionary(&self) -> Option<&GlobalDictionary> {
        match &self.properties {
            PropertyStorage::Global(dict) => dict.as_ref(),
            _ => None,
        }
    }

    /// Mutable global dictionary, once created.
    pub fn global_dictionary_mut(&mut self) -> Option<&mut GlobalDictionary> {
        match &mut self.properties {
            PropertyStorage::Global(dict) => dict.as_mut(),
            _ => None,
        }
    }

    /// Global dictionary, created with `capacity` slots on first use.
    pub(crate) fn global_dictionary_or_create(&mut self, capacity: usize) -> Option<&mut GlobalDictionary> {
        match &mut self.properties {
            PropertyStorage::Global(dict) => {
                Some(dict.get_or_insert_with(|| GlobalDictionary::create(capacity)))
            }
            _ => None,
        }
    }

    /// The element dictionary, when elements are in dictionary mode.
    pub fn number_dictionary(&self) -> Option<&NumberDictionary> {
        match &self.elements {
            ElementStorage::Dictionary(dict) => Some(dict),
            ElementStorage::Fast(_) => None,
        }
    }

    /// Mutable element dictionary.
    pub fn number_dictionary_mut(&mut self) -> Option<&mut NumberDictionary> {
        match &mut self.elements {
            ElementStorage::Dictionary(dict) => Some(dict),
            ElementStorage::Fast(_) => None,
        }
    }

    /// Moves fast-mode named properties into a [`NameDictionary`], in layout
    /// order. No-op if already in dictionary mode or for the global object.
    pub fn transition_to_dictionary(&mut self) {
        let PropertyStorage::Fast { inlined, out_of_line } = &self.properties else {
            return;
        };
        let inlined_capacity = self.class.inlined_properties();
        let mut dict = NameDictionary::create(compute_hash_table_size(self.class.number_of_props() as usize));
        for entry in self.class.layout() {
            let offset = entry.attributes.offset();
            let value = if offset < inlined_capacity {
                inlined.get(offset as usize)
            } else {
                out_of_line.get((offset - inlined_capacity) as usize)
            };
            dict.put_if_absent(
                entry.key.clone(),
                value.cloned().unwrap_or(Value::Undefined),
                DictionaryAttributes::new(entry.attributes.flags()),
            );
        }
        log::debug!(
            "object properties to dictionary mode ({} properties)",
            dict.entries_count()
        );
        self.properties = PropertyStorage::Dictionary(dict);
        self.class.transition_to_dictionary();
    }

    /// Moves fast elements into a [`NumberDictionary`] with default
    /// attributes, skipping holes. No-op if already a dictionary.
    pub fn elements_to_dictionary(&mut self, capacity: usize) {
        let ElementStorage::Fast(elements) = &self.elements else {
            return;
        };
        let mut dict = NumberDictionary::create(capacity);
        for (index, value) in elements.iter().enumerate() {
            if value.is_hole() {
                continue;
            }
            dict.put_if_absent(
                index as u32,
                value.clone(),
                DictionaryAttributes::new(AttributeFlags::DEFAULT),
            );
        }
        log::debug!("elements to dictionary mode ({} elements)", dict.entries_count());
        self.elements = ElementStorage::Dictionary(dict);
        self.class.transition_elements_to_dictionary();
    }

    /// Adds or overwrites element `index`, maintaining array `length` and
    /// switching to dictionary elements when the write would leave too large
    /// a gap or the attributes are not the default ones. Returns false when
    /// the array `length` is read-only and would have to grow.
    pub fn add_element_internal(
        &mut self,
        index: u32,
        value: Value,
        flags: AttributeFlags,
        config: &StorageConfig,
    ) -> bool {
        if let ObjectKind::Array { length, length_writable } = &mut self.kind {
            if index >= *length {
                if !*length_writable {
                    return false;
                }
                *length = index.saturating_add(1);
            }
        }

        if let ElementStorage::Fast(elements) = &self.elements {
            let capacity = elements.len() as u32;
            if !flags.is_default() || config.should_elements_go_to_dictionary(capacity, index) {
                self.elements_to_dictionary(config.dictionary_capacity as usize);
            }
        }

        match &mut self.elements {
            ElementStorage::Dictionary(dict) => {
                dict.put(index, value, DictionaryAttributes::new(flags));
            }
            ElementStorage::Fast(elements) => {
                if index as usize >= elements.len() {
                    let new_capacity = config.compute_element_capacity(index.saturating_add(1));
                    elements.resize(new_capacity as usize, Value::Hole);
                }
                self.class.update_representation(&value);
                elements[index as usize] = value;
            }
        }
        true
    }

    /// Removes a named property found at `entry`. Fast-mode objects move to
    /// dictionary mode first, after which `entry` is re-resolved by key.
    pub fn delete_property_internal(&mut self, key: &PropertyKey, entry: usize) {
        if self.is_fast_mode() {
            self.transition_to_dictionary();
            if let Some(dict) = self.name_dictionary_mut() {
                if let Some(entry) = dict.find_entry(key) {
                    dict.remove(entry);
                }
            }
            return;
        }
        match &mut self.properties {
            PropertyStorage::Global(Some(dict)) => {
                dict.remove(entry);
            }
            PropertyStorage::Dictionary(dict) => {
                dict.remove(entry);
            }
            _ => {}
        }
    }

    /// Own property keys: element indices ascending, then string keys in
    /// creation order, then symbols in creation order.
    pub fn own_property_keys(&self) -> Vec<Value> {
        let mut keys = match &self.elements {
            ElementStorage::Fast(elements) => elements
                .iter()
                .enumerate()
                .filter(|(_, value)| !value.is_hole())
                .map(|(index, _)| Value::String(index.to_string()))
                .collect(),
            ElementStorage::Dictionary(dict) => dict.all_keys(),
        };
        if let Some(s) = self.string_data() {
            let chars = s.encode_utf16().count();
            let mut indices: Vec<Value> = (0..chars).map(|i| Value::String(i.to_string())).collect();
            indices.append(&mut keys);
            keys = indices;
        }

        let named: Vec<Value> = match &self.properties {
            PropertyStorage::Fast { .. } => self
                .class
                .layout()
                .iter()
                .map(|entry| entry.key.to_value())
                .collect(),
            PropertyStorage::Dictionary(dict) => dict.all_keys(),
            PropertyStorage::Global(Some(dict)) => dict.all_keys(),
            PropertyStorage::Global(None) => Vec::new(),
        };
        let (strings, symbols): (Vec<Value>, Vec<Value>) =
            named.into_iter().partition(|key| matches!(key, Value::String(_)));
        keys.extend(strings);
        keys.extend(symbols);
        keys
    }
}
