//! Property lookup cursor.
//!
//! A [`LookupCursor`] resolves one property key against one holder, walking
//! the prototype chain when asked to, and remembers where the property was
//! found: the slot or dictionary entry, the value, the attributes and whether
//! the holder was in fast mode. The same cursor then drives the follow-up
//! mutation (add, update, attribute change, delete) without searching again.
//!
//! Keys are canonicalised on construction. Array indices become element
//! keys, every other string is interned, and non-key values are coerced
//! through [`HostHooks::to_primitive`](crate::HostHooks::to_primitive).
//!
//! The cursor never borrows the heap between calls; it holds values and
//! indices only, so every operation takes the [`Heap`] explicitly.
//!
//! # Example
//!
//! ```
//! use core_types::Value;
//! use object_model::{AttributeFlags, Heap, LookupCursor, LookupMode};
//!
//! let mut heap = Heap::new();
//! let obj = heap.allocate_object(Value::Null);
//! let key = Value::String("x".to_string());
//!
//! let mut cursor = LookupCursor::new(&mut heap, obj.clone(), &key, LookupMode::Own).unwrap();
//! assert!(!cursor.is_found());
//! assert!(cursor.add_property(&mut heap, obj.clone(), Value::Smi(1), AttributeFlags::DEFAULT));
//!
//! let found = LookupCursor::new(&mut heap, obj, &key, LookupMode::Own).unwrap();
//! assert_eq!(found.fast_get_value(&heap).unwrap(), Value::Smi(1));
//! ```

use core_types::{JsError, Value};

use crate::attributes::{
    AttributeFlags, DictionaryAttributes, FastAttributes, PropertyAttributes, Representation,
    MAX_CAPACITY_OF_PROPERTIES,
};
use crate::descriptor::PropertyDescriptor;
use crate::dictionary::GlobalDictionary;
use crate::heap::Heap;
use crate::intern::PropertyKey;
use crate::object::{ElementStorage, JSObject, PropertyStorage};
use crate::property_cell::{CellHandle, PropertyCell, WeakCell};

/// How far a lookup searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupMode {
    /// Only the holder itself
    Own,
    /// The holder, then its prototypes
    #[default]
    PrototypeChain,
}

/// Where a lookup ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupState {
    /// No lookup has run
    Unstarted,
    /// Found on the holder the cursor started from
    FoundOwn,
    /// Not found on the holder; the chain was not searched
    NotFoundInHolder,
    /// Found on an object further up the prototype chain
    FoundOnPrototype,
    /// The prototype chain ended without a match
    NotFoundTerminal,
    /// The walk reached a proxy; the caller must dispatch to its traps
    StoppedAtProxy,
}

/// Returns the array index named by `text`: canonical decimal, no leading
/// zeros, below `2^32 - 1`.
///
/// # Example
///
/// ```
/// use object_model::array_index;
///
/// assert_eq!(array_index("42"), Some(42));
/// assert_eq!(array_index("042"), None);
/// assert_eq!(array_index("4294967295"), None);
/// ```
pub fn array_index(text: &str) -> Option<u32> {
    let bytes = text.as_bytes();
    if bytes.is_empty() || bytes.len() > 10 || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    if bytes.len() > 1 && bytes[0] == b'0' {
        return None;
    }
    let index: u64 = text.parse().ok()?;
    (index < u64::from(u32::MAX)).then_some(index as u32)
}

#[derive(Debug, Clone, PartialEq)]
enum CursorKey {
    Element(u32),
    Named(PropertyKey),
}

impl CursorKey {
    fn from_string(heap: &mut Heap, text: &str) -> Self {
        match array_index(text) {
            Some(index) => CursorKey::Element(index),
            None => CursorKey::Named(PropertyKey::from(heap.intern(text))),
        }
    }

    fn from_value(heap: &mut Heap, key: &Value) -> Result<Self, JsError> {
        match key {
            Value::Smi(n) if *n >= 0 => Ok(CursorKey::Element(*n as u32)),
            Value::Double(d) if *d >= 0.0 && d.fract() == 0.0 && *d < f64::from(u32::MAX) => {
                Ok(CursorKey::Element(*d as u32))
            }
            Value::Smi(_) | Value::Double(_) => Ok(CursorKey::from_string(heap, &key.to_string())),
            Value::String(text) => Ok(CursorKey::from_string(heap, text)),
            Value::Symbol(id) => Ok(CursorKey::Named(PropertyKey::Symbol(*id))),
            other => match heap.hooks().to_primitive(other)? {
                Value::Symbol(id) => Ok(CursorKey::Named(PropertyKey::Symbol(id))),
                Value::String(text) => Ok(CursorKey::from_string(heap, &text)),
                Value::HeapObject(_) => Err(JsError::type_error(
                    "Cannot convert object to primitive value",
                )),
                primitive => Ok(CursorKey::from_string(heap, &primitive.to_string())),
            },
        }
    }
}

struct Hit {
    index: usize,
    value: Value,
    cell: Option<WeakCell>,
    attributes: PropertyAttributes,
    fast_mode: bool,
}

/// Code unit `index` of a string as a read-only, enumerable element.
///
/// The result is a one-unit string. A lone surrogate half has no `String`
/// form, so either half of a surrogate pair reads as U+FFFD.
fn string_element(data: &str, index: u32) -> Option<Hit> {
    let unit = data.encode_utf16().nth(index as usize)?;
    Some(Hit {
        index: index as usize,
        value: Value::String(String::from_utf16_lossy(&[unit])),
        cell: None,
        attributes: FastAttributes::new(AttributeFlags::ENUMERABLE).into(),
        fast_mode: true,
    })
}

fn lookup_element(obj: &JSObject, index: u32) -> Option<Hit> {
    if let Some(hit) = obj.string_data().and_then(|data| string_element(data, index)) {
        return Some(hit);
    }
    match &obj.elements {
        ElementStorage::Fast(elements) => {
            let value = elements.get(index as usize)?;
            if value.is_hole() {
                return None;
            }
            Some(Hit {
                index: index as usize,
                value: value.clone(),
                cell: None,
                attributes: PropertyAttributes::default(),
                fast_mode: true,
            })
        }
        ElementStorage::Dictionary(dict) => {
            let entry = dict.find_entry(&index)?;
            Some(Hit {
                index: entry,
                value: dict.value(entry)?.clone(),
                cell: None,
                attributes: dict.attributes(entry)?.into(),
                fast_mode: false,
            })
        }
    }
}

fn lookup_named(obj: &JSObject, key: &PropertyKey) -> Option<Hit> {
    match &obj.properties {
        PropertyStorage::Global(dict) => {
            let dict = dict.as_ref()?;
            let entry = dict.find_entry(key)?;
            let cell = dict.get_box(entry)?;
            Some(Hit {
                index: entry,
                value: cell.value(),
                cell: Some(PropertyCell::downgrade(cell)),
                attributes: dict.attributes(entry)?.into(),
                fast_mode: true,
            })
        }
        PropertyStorage::Fast {
            inlined,
            out_of_line,
        } => {
            let attrs = obj.class.lookup_property(key)?;
            let (index, slot) = if attrs.is_inlined() {
                let index = attrs.offset() as usize;
                (index, inlined.get(index))
            } else {
                let index = (attrs.offset() - obj.class.inlined_properties()) as usize;
                (index, out_of_line.get(index))
            };
            Some(Hit {
                index,
                value: slot.cloned().unwrap_or(Value::Undefined),
                cell: None,
                attributes: attrs.into(),
                fast_mode: true,
            })
        }
        PropertyStorage::Dictionary(dict) => {
            let entry = dict.find_entry(key)?;
            Some(Hit {
                index: entry,
                value: dict.value(entry)?.clone(),
                cell: None,
                attributes: dict.attributes(entry)?.into(),
                fast_mode: false,
            })
        }
    }
}

/// Result of resolving a property key against a holder.
#[derive(Debug, Clone)]
pub struct LookupCursor {
    key: CursorKey,
    holder: Value,
    receiver: Value,
    value: Value,
    cell: Option<WeakCell>,
    attributes: PropertyAttributes,
    index: Option<usize>,
    mode: LookupMode,
    state: LookupState,
    fast_mode: bool,
    on_prototype: bool,
    has_receiver: bool,
    is_transition: bool,
}

impl LookupCursor {
    fn blank(key: CursorKey, holder: Value, receiver: Value, mode: LookupMode) -> Self {
        LookupCursor {
            key,
            holder,
            receiver,
            value: Value::Undefined,
            cell: None,
            attributes: PropertyAttributes::none(),
            index: None,
            mode,
            state: LookupState::Unstarted,
            fast_mode: false,
            on_prototype: false,
            has_receiver: false,
            is_transition: false,
        }
    }

    /// Looks `key` up on the global object.
    pub fn global(heap: &mut Heap, key: &Value, mode: LookupMode) -> Result<Self, JsError> {
        let global = heap.global_object();
        LookupCursor::new(heap, global, key, mode)
    }

    /// Looks `key` up on `holder`, which is also the receiver.
    ///
    /// # Errors
    ///
    /// Fails only if `key` has to be converted to a primitive and the
    /// conversion throws.
    pub fn new(heap: &mut Heap, holder: Value, key: &Value, mode: LookupMode) -> Result<Self, JsError> {
        let key = CursorKey::from_value(heap, key)?;
        let mut cursor = LookupCursor::blank(key, holder.clone(), holder, mode);
        cursor.start_lookup(heap);
        Ok(cursor)
    }

    /// Looks `key` up on `holder` on behalf of a distinct `receiver`.
    pub fn with_receiver(
        heap: &mut Heap,
        holder: Value,
        receiver: Value,
        key: &Value,
        mode: LookupMode,
    ) -> Result<Self, JsError> {
        let key = CursorKey::from_value(heap, key)?;
        let mut cursor = LookupCursor::blank(key, holder, receiver, mode);
        cursor.has_receiver = true;
        cursor.start_lookup(heap);
        Ok(cursor)
    }

    /// Looks up element `index` on `holder`.
    pub fn element(heap: &mut Heap, holder: Value, index: u32, mode: LookupMode) -> Self {
        let mut cursor = LookupCursor::blank(CursorKey::Element(index), holder.clone(), holder, mode);
        cursor.start_lookup(heap);
        cursor
    }

    /// Looks up an already canonical key; used by inline caches.
    pub fn fast(heap: &mut Heap, receiver: Value, key: PropertyKey, mode: LookupMode) -> Self {
        let mut cursor = LookupCursor::blank(CursorKey::Named(key), receiver.clone(), receiver, mode);
        cursor.start_lookup(heap);
        cursor
    }

    /// A cursor positioned for adding `key` to `receiver` with `flags`,
    /// without any lookup. The caller guarantees the key is absent.
    pub fn pending_add(receiver: Value, key: PropertyKey, flags: AttributeFlags) -> Self {
        let mut cursor = LookupCursor::blank(
            CursorKey::Named(key),
            receiver.clone(),
            receiver,
            LookupMode::Own,
        );
        cursor.attributes = FastAttributes::new(flags).into();
        cursor
    }

    /// Adds an absent named property without searching first.
    pub fn fast_add(
        heap: &mut Heap,
        receiver: Value,
        key: PropertyKey,
        value: Value,
        flags: AttributeFlags,
    ) -> bool {
        LookupCursor::pending_add(receiver, key, flags).add_property_internal(heap, value)
    }

    /// Named key, or `None` for element lookups.
    pub fn key(&self) -> Option<&PropertyKey> {
        match &self.key {
            CursorKey::Named(key) => Some(key),
            CursorKey::Element(_) => None,
        }
    }

    /// Element index, or `None` for named lookups.
    pub fn element_index(&self) -> Option<u32> {
        match self.key {
            CursorKey::Element(index) => Some(index),
            CursorKey::Named(_) => None,
        }
    }

    /// Whether the key is an array index.
    pub fn is_element(&self) -> bool {
        matches!(self.key, CursorKey::Element(_))
    }

    /// Object the property was found on, or where the search stopped.
    pub fn holder(&self) -> &Value {
        &self.holder
    }

    /// `this` for accessor calls and target of adds.
    pub fn receiver(&self) -> &Value {
        &self.receiver
    }

    /// Raw value of the property: a cell's current content for globals, an
    /// accessor reference for accessors, `undefined` when not found.
    ///
    /// Once the cell has been replaced this is the value seen by the last
    /// lookup or write through this cursor.
    pub fn value(&self) -> Value {
        self.cell
            .as_ref()
            .and_then(WeakCell::read)
            .unwrap_or_else(|| self.value.clone())
    }

    /// Property cell for global bindings, as last resolved by this cursor.
    /// The cursor only holds it weakly; the dictionary owns it.
    pub fn cell(&self) -> Option<CellHandle> {
        self.cell.as_ref().and_then(WeakCell::upgrade)
    }

    /// Attributes as recorded by the lookup.
    pub fn attributes(&self) -> PropertyAttributes {
        self.attributes
    }

    /// Slot index or dictionary entry.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Search mode.
    pub fn mode(&self) -> LookupMode {
        self.mode
    }

    /// Where the last lookup ended.
    pub fn state(&self) -> LookupState {
        self.state
    }

    /// Whether the property exists.
    pub fn is_found(&self) -> bool {
        self.index.is_some()
    }

    /// Whether the property was found in a hidden-class slot, a fast element
    /// array or a global cell.
    pub fn is_fast_mode(&self) -> bool {
        self.fast_mode
    }

    /// Whether the holder is a prototype of the starting object.
    pub fn is_on_prototype(&self) -> bool {
        self.on_prototype
    }

    /// Whether a receiver distinct from the holder was supplied.
    pub fn has_receiver(&self) -> bool {
        self.has_receiver
    }

    /// Whether the last operation changed the holder's layout.
    pub fn is_transition(&self) -> bool {
        self.is_transition
    }

    /// `[[Writable]]` of the found property.
    pub fn is_writable(&self) -> bool {
        self.attributes.is_writable()
    }

    /// `[[Enumerable]]` of the found property.
    pub fn is_enumerable(&self) -> bool {
        self.attributes.is_enumerable()
    }

    /// `[[Configurable]]` of the found property.
    pub fn is_configurable(&self) -> bool {
        self.attributes.is_configurable()
    }

    /// Whether the found property is an accessor.
    pub fn is_accessor_descriptor(&self) -> bool {
        self.is_found() && self.attributes.is_accessor()
    }

    /// Whether the found property is an engine-implemented accessor.
    pub fn is_internal_accessor(&self, heap: &Heap) -> bool {
        self.is_accessor_descriptor()
            && heap
                .accessor_of(&self.value())
                .is_some_and(|accessor| accessor.is_internal())
    }

    fn start_lookup(&mut self, heap: &Heap) {
        if !self.update_holder(heap) {
            self.state = LookupState::NotFoundTerminal;
            return;
        }
        self.lookup_property(heap);
    }

    /// Replaces a primitive holder by the object that stands in for it. A
    /// string stays the holder for its own code units, which are read in
    /// place.
    fn update_holder(&mut self, heap: &Heap) -> bool {
        if self.holder.is_heap_object() {
            return true;
        }
        if let (Value::String(data), CursorKey::Element(index)) = (&self.holder, &self.key) {
            if (*index as usize) < data.encode_utf16().count() {
                return true;
            }
        }
        match heap.primitive_prototype(&self.holder) {
            Some(prototype) => {
                self.holder = prototype;
                true
            }
            None => false,
        }
    }

    fn lookup_property(&mut self, heap: &Heap) {
        loop {
            if heap.object_of(&self.holder).is_some_and(JSObject::is_proxy) {
                log::trace!("lookup stopped at proxy {:?}", self.holder);
                self.state = LookupState::StoppedAtProxy;
                return;
            }
            if self.lookup_in_holder(heap) {
                self.state = if self.on_prototype {
                    LookupState::FoundOnPrototype
                } else {
                    LookupState::FoundOwn
                };
                return;
            }
            if self.mode == LookupMode::Own {
                self.state = LookupState::NotFoundInHolder;
                return;
            }
            let prototype = match heap.object_of(&self.holder) {
                Some(obj) if heap.object_of(&obj.prototype).is_some() => obj.prototype.clone(),
                _ => {
                    self.state = LookupState::NotFoundTerminal;
                    return;
                }
            };
            log::trace!("ascending from {:?} to prototype {:?}", self.holder, prototype);
            self.holder = prototype;
            if heap.object_of(&self.holder).is_some_and(JSObject::is_proxy) {
                log::trace!("lookup stopped at proxy {:?}", self.holder);
                self.state = LookupState::StoppedAtProxy;
                return;
            }
            self.on_prototype = true;
        }
    }

    fn lookup_in_holder(&mut self, heap: &Heap) -> bool {
        let hit = match (&self.holder, &self.key) {
            (Value::String(data), CursorKey::Element(index)) => string_element(data, *index),
            (holder, key) => heap.object_of(holder).and_then(|obj| match key {
                CursorKey::Element(index) => lookup_element(obj, *index),
                CursorKey::Named(key) => lookup_named(obj, key),
            }),
        };
        match hit {
            Some(hit) => {
                self.index = Some(hit.index);
                self.value = hit.value;
                self.cell = hit.cell;
                self.attributes = hit.attributes;
                self.fast_mode = hit.fast_mode;
                self.is_transition = false;
                true
            }
            None => false,
        }
    }

    fn set_found(
        &mut self,
        index: usize,
        value: Value,
        attributes: PropertyAttributes,
        fast_mode: bool,
        is_transition: bool,
    ) {
        self.index = Some(index);
        self.value = value;
        self.cell = None;
        self.attributes = attributes;
        self.fast_mode = fast_mode;
        self.is_transition = is_transition;
        self.state = LookupState::FoundOwn;
    }

    fn update_found(
        &mut self,
        index: usize,
        attributes: PropertyAttributes,
        fast_mode: bool,
        is_transition: bool,
    ) {
        self.index = Some(index);
        self.attributes = attributes;
        self.fast_mode = fast_mode;
        self.is_transition = is_transition;
    }

    fn reset_state(&mut self) {
        self.index = None;
        self.value = Value::Undefined;
        self.cell = None;
        self.attributes = PropertyAttributes::none();
        self.fast_mode = false;
        self.on_prototype = false;
        self.is_transition = false;
        self.state = LookupState::Unstarted;
    }

    /// Marks the cursor not-found with default attributes, ready for an add.
    pub fn set_as_default_attr(&mut self) {
        self.reset_state();
        self.attributes = PropertyAttributes::default();
    }

    /// Repeats the lookup on the receiver only.
    pub fn re_lookup_property_in_receiver(&mut self, heap: &Heap) {
        self.reset_state();
        self.holder = self.receiver.clone();
        self.state = if self.lookup_in_holder(heap) {
            LookupState::FoundOwn
        } else {
            LookupState::NotFoundInHolder
        };
    }

    /// The property's value as script sees it. Cells are dereferenced and
    /// accessors are invoked against the receiver.
    ///
    /// # Errors
    ///
    /// Propagates an exception thrown by a script getter.
    pub fn fast_get_value(&self, heap: &Heap) -> Result<Value, JsError> {
        let value = self.value();
        if !self.is_accessor_descriptor() {
            return Ok(value);
        }
        let Some(accessor) = heap.accessor_of(&value) else {
            return Ok(value);
        };
        if let Some(internal) = accessor.internal {
            return Ok((internal.getter)(heap, &self.holder));
        }
        if accessor.getter.is_undefined() {
            return Ok(Value::Undefined);
        }
        let getter = accessor.getter.clone();
        heap.hooks().call_getter(&getter, &self.receiver)
    }

    /// Describes the found property, or `None` if nothing was found.
    pub fn to_property_descriptor(&self, heap: &Heap) -> Option<PropertyDescriptor> {
        if !self.is_found() {
            return None;
        }
        let mut desc = PropertyDescriptor::default();
        let value = self.value();
        match heap.accessor_of(&value).filter(|_| self.attributes.is_accessor()) {
            Some(accessor) => match accessor.internal {
                Some(internal) => {
                    desc.writable = Some(self.is_writable());
                    desc.value = Some((internal.getter)(heap, &self.holder));
                }
                None => {
                    desc.getter = Some(accessor.getter.clone());
                    desc.setter = Some(accessor.setter.clone());
                }
            },
            None => {
                desc.writable = Some(self.is_writable());
                desc.value = Some(value);
            }
        }
        desc.enumerable = Some(self.is_enumerable());
        desc.configurable = Some(self.is_configurable());
        Some(desc)
    }

    /// Adds the property to `receiver`. Element keys go to the receiver's
    /// elements; named keys reset the cursor and go through
    /// [`LookupCursor::add_property_internal`]. Returns false if the receiver
    /// is not an object or the write was refused.
    pub fn add_property(&mut self, heap: &mut Heap, receiver: Value, value: Value, flags: AttributeFlags) -> bool {
        if let CursorKey::Element(index) = self.key {
            let config = *heap.config();
            let Some(obj) = receiver.as_heap_object().and_then(|id| heap.object_mut(id)) else {
                return false;
            };
            return obj.add_element_internal(index, value, flags, &config);
        }
        self.reset_state();
        self.receiver = receiver;
        self.attributes = FastAttributes::new(flags).into();
        self.add_property_internal(heap, value)
    }

    /// [`LookupCursor::add_property`] with the holder as receiver.
    pub fn add_property_in_holder(&mut self, heap: &mut Heap, value: Value, flags: AttributeFlags) -> bool {
        let holder = self.holder.clone();
        self.add_property(heap, holder, value, flags)
    }

    /// Stores a new named property on the receiver with the cursor's flags
    /// and records where it went.
    pub fn add_property_internal(&mut self, heap: &mut Heap, value: Value) -> bool {
        let CursorKey::Named(key) = self.key.clone() else {
            return false;
        };
        let config = *heap.config();
        let flags = self.attributes.flags();
        let Some(obj) = self.receiver.as_heap_object().and_then(|id| heap.object_mut(id)) else {
            return false;
        };

        if obj.is_global() {
            let attrs = DictionaryAttributes::new(flags)
                .with_box_type(GlobalDictionary::initial_box_type(&value));
            let Some(dict) = obj.global_dictionary_or_create(config.dictionary_capacity as usize) else {
                return false;
            };
            let entry = dict.put_if_absent(key, PropertyCell::new(value.clone()), attrs);
            self.index = Some(entry);
            self.value = dict.get_value(entry).unwrap_or(value);
            self.cell = dict.get_box(entry).map(PropertyCell::downgrade);
            self.attributes = dict.attributes(entry).unwrap_or(attrs).into();
            self.fast_mode = true;
            self.is_transition = false;
            self.state = LookupState::FoundOwn;
            return true;
        }

        if obj.is_array() && key.as_str() == Some("constructor") {
            obj.class.set_has_constructor(true);
        }

        let inlined_capacity = obj.class.inlined_properties();
        let unused_inlined = obj.class.unused_inlined_props();
        let used = obj.class.used_non_inlined_props();
        let out_of_line_exhausted = matches!(
            &obj.properties,
            PropertyStorage::Fast { out_of_line, .. }
                if unused_inlined == 0
                    && used >= out_of_line.len() as u32
                    && out_of_line.len() as u32 >= config.max_out_of_line()
        );
        if out_of_line_exhausted {
            return self.add_to_new_dictionary(obj, key, value, flags);
        }
        match &mut obj.properties {
            PropertyStorage::Fast { inlined, .. } if unused_inlined > 0 => {
                let order = inlined_capacity - unused_inlined;
                let mut attrs = FastAttributes::new(flags);
                attrs.set_offset(order);
                attrs.set_inlined(true);
                attrs.set_representation(Representation::of(&value));
                inlined[order as usize] = value.clone();
                obj.class.add_property(key, attrs);
                self.set_found(order as usize, value, attrs.into(), true, true);
                true
            }
            PropertyStorage::Fast { out_of_line, .. } => {
                let capacity = out_of_line.len() as u32;
                if capacity == 0 {
                    out_of_line.resize(config.min_properties_length as usize, Value::Undefined);
                } else if used >= capacity {
                    let new_capacity = config.compute_property_capacity(capacity);
                    log::debug!("growing out-of-line properties from {} to {}", capacity, new_capacity);
                    out_of_line.resize(new_capacity as usize, Value::Undefined);
                }
                out_of_line[used as usize] = value.clone();
                let mut attrs = FastAttributes::new(flags);
                attrs.set_offset(used + inlined_capacity);
                attrs.set_representation(Representation::of(&value));
                obj.class.add_property(key, attrs);
                self.set_found(used as usize, value, attrs.into(), true, true);
                true
            }
            PropertyStorage::Dictionary(dict) => {
                let entry = dict.put_if_absent(key, value.clone(), DictionaryAttributes::new(flags));
                let attrs = dict.attributes(entry).unwrap_or_default();
                self.set_found(entry, value, attrs.into(), false, false);
                true
            }
            PropertyStorage::Global(_) => false,
        }
    }

    /// The out-of-line array is at its maximum: the object moves to
    /// dictionary mode and the new key takes the order just past the last
    /// fast slot.
    fn add_to_new_dictionary(&mut self, obj: &mut JSObject, key: PropertyKey, value: Value, flags: AttributeFlags) -> bool {
        obj.transition_to_dictionary();
        let Some(dict) = obj.name_dictionary_mut() else {
            return false;
        };
        let attrs = DictionaryAttributes::new(flags).with_dictionary_order(MAX_CAPACITY_OF_PROPERTIES);
        let entry = dict.put_if_absent(key, value.clone(), attrs);
        let attrs = dict.attributes(entry).unwrap_or(attrs);
        debug_assert_eq!(attrs.dictionary_order(), MAX_CAPACITY_OF_PROPERTIES);
        self.set_found(entry, value, attrs.into(), false, true);
        true
    }

    /// Stores new attribute flags for the found property on `receiver`,
    /// moving storage to a dictionary where the fast form cannot express
    /// them. The property keeps its enumeration order.
    pub fn transition_for_attribute_changed(&mut self, heap: &mut Heap, receiver: &Value, flags: AttributeFlags) {
        let config = *heap.config();
        let Some(obj) = receiver.as_heap_object().and_then(|id| heap.object_mut(id)) else {
            return;
        };
        match &self.key {
            CursorKey::Element(index) => {
                obj.elements_to_dictionary(config.dictionary_capacity as usize);
                let Some(dict) = obj.number_dictionary_mut() else {
                    return;
                };
                let Some(entry) = dict.find_entry(index) else {
                    return;
                };
                let order = dict.attributes(entry).map_or(0, |a| a.dictionary_order());
                let attrs = DictionaryAttributes::new(flags).with_dictionary_order(order);
                dict.set_attributes(entry, attrs);
                self.update_found(entry, attrs.into(), false, true);
            }
            CursorKey::Named(_) if obj.is_global() => {
                let Some(entry) = self.index else {
                    return;
                };
                let Some(dict) = obj.global_dictionary_mut() else {
                    return;
                };
                let order = dict.attributes(entry).map_or(0, |a| a.dictionary_order());
                dict.invalidate_property_box(entry, DictionaryAttributes::new(flags).with_dictionary_order(order));
                self.cell = dict.get_box(entry).map(PropertyCell::downgrade);
                if let Some(attrs) = dict.attributes(entry) {
                    self.attributes = attrs.into();
                }
            }
            CursorKey::Named(key) => {
                obj.transition_to_dictionary();
                let Some(dict) = obj.name_dictionary_mut() else {
                    return;
                };
                let Some(entry) = dict.find_entry(key) else {
                    return;
                };
                let order = dict.attributes(entry).map_or(0, |a| a.dictionary_order());
                let attrs = DictionaryAttributes::new(flags).with_dictionary_order(order);
                dict.set_attributes(entry, attrs);
                self.update_found(entry, attrs.into(), false, true);
            }
        }
    }

    /// Writes `value` into the found slot of `receiver`.
    ///
    /// If `is_internal_accessor` is set and the slot's accessor has a
    /// setter, the setter runs instead. A failing setter propagates its error
    /// when `may_throw` is set and yields `Ok(false)` otherwise.
    pub fn update_data_value(
        &mut self,
        heap: &mut Heap,
        receiver: &Value,
        value: Value,
        is_internal_accessor: bool,
        may_throw: bool,
    ) -> Result<bool, JsError> {
        let Some(id) = receiver.as_heap_object() else {
            return Ok(false);
        };

        if is_internal_accessor {
            let setter = heap
                .accessor_of(&self.value())
                .and_then(|accessor| accessor.internal)
                .and_then(|internal| internal.setter);
            if let Some(setter) = setter {
                return match setter(heap, receiver, &value) {
                    Ok(done) => Ok(done),
                    Err(err) if may_throw => Err(err),
                    Err(err) => {
                        log::debug!("internal setter failed silently: {}", err);
                        Ok(false)
                    }
                };
            }
        }

        let Some(obj) = heap.object_mut(id) else {
            return Ok(false);
        };
        let Some(index) = self.index else {
            return Ok(false);
        };

        if self.is_element() {
            match &mut obj.elements {
                ElementStorage::Fast(elements) => {
                    let Some(slot) = elements.get_mut(index) else {
                        return Ok(false);
                    };
                    *slot = value.clone();
                    obj.class.update_representation(&value);
                }
                ElementStorage::Dictionary(dict) => dict.update_value(index, value.clone()),
            }
            self.value = value;
            return Ok(true);
        }

        match &mut obj.properties {
            PropertyStorage::Global(dict) => {
                // Another cursor may have swapped the cell since this one
                // looked; write to whatever the entry holds now.
                let Some(dict) = dict.as_ref() else {
                    return Ok(false);
                };
                let (CursorKey::Named(key), Some(stored)) = (&self.key, dict.key(index)) else {
                    return Ok(false);
                };
                if key != stored {
                    return Ok(false);
                }
                let Some(cell) = dict.get_box(index) else {
                    return Ok(false);
                };
                cell.set_value(value.clone());
                self.cell = Some(PropertyCell::downgrade(cell));
            }
            PropertyStorage::Fast { inlined, out_of_line } => {
                let slots = if self.attributes.is_inlined() {
                    inlined
                } else {
                    out_of_line
                };
                let Some(slot) = slots.get_mut(index) else {
                    return Ok(false);
                };
                *slot = value.clone();
            }
            PropertyStorage::Dictionary(dict) => dict.update_value(index, value.clone()),
        }
        self.value = value;
        Ok(true)
    }

    /// Changes attributes if needed, then writes the value. Whether the old
    /// slot held an engine accessor is decided before any transition.
    pub fn update_value_and_details(
        &mut self,
        heap: &mut Heap,
        receiver: &Value,
        value: Value,
        flags: AttributeFlags,
        attr_changed: bool,
    ) -> Result<bool, JsError> {
        let is_internal = self.is_internal_accessor(heap);
        if attr_changed {
            self.transition_for_attribute_changed(heap, receiver, flags);
        }
        self.update_data_value(heap, receiver, value, is_internal, false)
    }

    /// Applies a partial descriptor to the found property of `receiver`,
    /// converting between data and accessor properties as required.
    pub fn write_data_property(
        &mut self,
        heap: &mut Heap,
        receiver: &Value,
        desc: &PropertyDescriptor,
    ) -> Result<bool, JsError> {
        let mut flags = self.attributes.flags();
        let mut attr_changed = false;

        if let Some(configurable) = desc.configurable {
            if flags.is_configurable() != configurable {
                flags.set(AttributeFlags::CONFIGURABLE, configurable);
                attr_changed = true;
            }
        }
        if let Some(enumerable) = desc.enumerable {
            if flags.is_enumerable() != enumerable {
                flags.set(AttributeFlags::ENUMERABLE, enumerable);
                attr_changed = true;
            }
        }

        if !desc.is_accessor_descriptor() {
            if let Some(writable) = desc.writable {
                if flags.is_writable() != writable {
                    flags.set(AttributeFlags::WRITABLE, writable);
                    attr_changed = true;
                }
            }
            let Some(value) = desc.value.clone() else {
                if attr_changed {
                    self.transition_for_attribute_changed(heap, receiver, flags);
                }
                return Ok(true);
            };
            if self.is_accessor_descriptor() {
                let keeps_setter = heap
                    .accessor_of(&self.value())
                    .is_some_and(|accessor| accessor.is_internal() && accessor.has_setter());
                if !keeps_setter {
                    flags.remove(AttributeFlags::ACCESSOR);
                    attr_changed = true;
                }
            }
            return self.update_value_and_details(heap, receiver, value, flags, attr_changed);
        }

        let current = self.value();
        let was_accessor = self.is_accessor_descriptor();
        let old_pair = heap
            .accessor_of(&current)
            .filter(|_| was_accessor)
            .map(|accessor| (accessor.getter.clone(), accessor.setter.clone()));

        let fast_named = !self.is_element()
            && heap
                .object_of(receiver)
                .is_some_and(|obj| obj.is_fast_mode());
        if let (Some((old_getter, old_setter)), true) = (&old_pair, fast_named) {
            let getter = desc.getter.clone().unwrap_or_else(|| old_getter.clone());
            let setter = desc.setter.clone().unwrap_or_else(|| old_setter.clone());
            let accessor = heap.new_accessor(getter, setter);
            return Ok(self.replace_accessor_in_dictionary(heap, receiver, accessor, flags));
        }

        let accessor = match old_pair {
            Some(_) => current,
            None => heap.new_accessor(Value::Undefined, Value::Undefined),
        };
        if let Some(data) = accessor.as_heap_object().and_then(|id| heap.accessor_mut(id)) {
            if let Some(getter) = &desc.getter {
                data.getter = getter.clone();
            }
            if let Some(setter) = &desc.setter {
                data.setter = setter.clone();
            }
        }
        if !was_accessor {
            flags.insert(AttributeFlags::ACCESSOR);
            attr_changed = true;
        }
        self.update_value_and_details(heap, receiver, accessor, flags, attr_changed)
    }

    /// Moves a fast-mode object to dictionary mode and stores a fresh
    /// accessor in place of the old one.
    fn replace_accessor_in_dictionary(
        &mut self,
        heap: &mut Heap,
        receiver: &Value,
        accessor: Value,
        flags: AttributeFlags,
    ) -> bool {
        let CursorKey::Named(key) = &self.key else {
            return false;
        };
        let Some(obj) = receiver.as_heap_object().and_then(|id| heap.object_mut(id)) else {
            return false;
        };
        obj.transition_to_dictionary();
        let Some(dict) = obj.name_dictionary_mut() else {
            return false;
        };
        let Some(entry) = dict.find_entry(key) else {
            debug_assert!(false, "accessor {:?} vanished during transition", key);
            return false;
        };
        let order = dict.attributes(entry).map_or(0, |a| a.dictionary_order());
        let attrs = DictionaryAttributes::new(flags).with_dictionary_order(order);
        dict.update_value_and_attributes(entry, accessor.clone(), attrs);
        self.value = accessor;
        self.update_found(entry, attrs.into(), false, true);
        true
    }

    /// [`LookupCursor::write_data_property`] against the holder.
    pub fn write_data_property_in_holder(
        &mut self,
        heap: &mut Heap,
        desc: &PropertyDescriptor,
    ) -> Result<bool, JsError> {
        let holder = self.holder.clone();
        self.write_data_property(heap, &holder, desc)
    }

    /// Removes the found property from the holder. Fast elements are holed
    /// and then converted to a dictionary. Afterwards the cursor reports
    /// not-found.
    pub fn delete_property_in_holder(&mut self, heap: &mut Heap) -> bool {
        let Some(index) = self.index else {
            return false;
        };
        let config = *heap.config();
        let Some(obj) = self.holder.as_heap_object().and_then(|id| heap.object_mut(id)) else {
            return false;
        };
        match &self.key {
            CursorKey::Element(element) => match &mut obj.elements {
                ElementStorage::Fast(elements) => {
                    if let Some(slot) = elements.get_mut(*element as usize) {
                        *slot = Value::Hole;
                    }
                    obj.elements_to_dictionary(config.dictionary_capacity as usize);
                }
                ElementStorage::Dictionary(dict) => {
                    dict.remove(index);
                }
            },
            CursorKey::Named(key) => obj.delete_property_internal(key, index),
        }
        self.reset_state();
        self.state = LookupState::NotFoundInHolder;
        true
    }

    /// Installs `getter` on the found accessor and stores it back.
    pub fn define_getter(&mut self, heap: &mut Heap, getter: Value) -> Result<bool, JsError> {
        self.define_accessor_half(heap, Some(getter), None)
    }

    /// Installs `setter` on the found accessor and stores it back.
    pub fn define_setter(&mut self, heap: &mut Heap, setter: Value) -> Result<bool, JsError> {
        self.define_accessor_half(heap, None, Some(setter))
    }

    fn define_accessor_half(
        &mut self,
        heap: &mut Heap,
        getter: Option<Value>,
        setter: Option<Value>,
    ) -> Result<bool, JsError> {
        debug_assert!(self.is_accessor_descriptor(), "no accessor at the cursor");
        let accessor = self.value();
        let Some(data) = accessor.as_heap_object().and_then(|id| heap.accessor_mut(id)) else {
            return Ok(false);
        };
        if let Some(getter) = getter {
            data.getter = getter;
        }
        if let Some(setter) = setter {
            data.setter = setter;
        }
        let receiver = self.receiver.clone();
        self.update_data_value(heap, &receiver, accessor, false, false)
    }
}
