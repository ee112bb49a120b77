//! Hidden class: the per-object shape consulted by fast-mode property access.
//!
//! A hidden class records, in insertion order, which key lives at which slot
//! offset and with what attributes. Offsets below the inlined capacity address
//! slots inside the object; the rest address the out-of-line array. Once an
//! object switches to dictionary mode the layout is dropped and the
//! [`NameDictionary`](crate::NameDictionary) becomes the source of truth.

use rustc_hash::FxHashMap;

use crate::attributes::{FastAttributes, Representation};
use crate::intern::PropertyKey;

/// One property of a fast-mode layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutEntry {
    /// Name of the property
    pub key: PropertyKey,
    /// Attributes, including the slot offset
    pub attributes: FastAttributes,
}

/// Shape of one object.
///
/// # Example
///
/// ```
/// use object_model::{AttributeFlags, FastAttributes, HiddenClass, PropertyKey, StringTable};
///
/// let mut strings = StringTable::new();
/// let x = PropertyKey::from(strings.intern("x"));
/// let mut class = HiddenClass::new(4, 1020);
///
/// let mut attrs = FastAttributes::new(AttributeFlags::DEFAULT);
/// attrs.set_offset(0);
/// attrs.set_inlined(true);
/// class.add_property(x.clone(), attrs);
///
/// assert_eq!(class.lookup_property(&x).map(|a| a.offset()), Some(0));
/// assert_eq!(class.unused_inlined_props(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct HiddenClass {
    /// Properties in offset order
    layout: Vec<LayoutEntry>,
    /// Key to position in `layout`
    index: FxHashMap<PropertyKey, usize>,
    inlined_properties: u32,
    max_out_of_line: u32,
    dictionary_mode: bool,
    dictionary_elements: bool,
    has_constructor: bool,
    element_representation: Representation,
}

impl HiddenClass {
    /// Creates an empty fast-mode class.
    ///
    /// # Arguments
    ///
    /// * `inlined_properties` - Number of slots stored inside the object
    /// * `max_out_of_line` - Maximum length of the out-of-line array
    pub fn new(inlined_properties: u32, max_out_of_line: u32) -> Self {
        HiddenClass {
            layout: Vec::new(),
            index: FxHashMap::default(),
            inlined_properties,
            max_out_of_line,
            dictionary_mode: false,
            dictionary_elements: false,
            has_constructor: false,
            element_representation: Representation::None,
        }
    }

    /// Registers a new property. Its offset must be the next free slot.
    pub fn add_property(&mut self, key: PropertyKey, mut attributes: FastAttributes) {
        debug_assert!(!self.dictionary_mode, "add_property on a dictionary-mode class");
        debug_assert!(!self.index.contains_key(&key), "duplicate key {:?}", key);
        debug_assert_eq!(attributes.offset() as usize, self.layout.len());
        let position = self.layout.len();
        attributes.set_sorted_index(position as u32);
        self.index.insert(key.clone(), position);
        self.layout.push(LayoutEntry { key, attributes });
    }

    /// Looks up a property and returns its attributes, offset included.
    ///
    /// # Returns
    ///
    /// `Some(attributes)` if the property exists, `None` otherwise or in
    /// dictionary mode.
    pub fn lookup_property(&self, key: &PropertyKey) -> Option<FastAttributes> {
        let position = *self.index.get(key)?;
        self.layout.get(position).map(|entry| entry.attributes)
    }

    /// Properties in offset order.
    pub fn layout(&self) -> &[LayoutEntry] {
        &self.layout
    }

    /// Number of properties described by the layout.
    pub fn number_of_props(&self) -> u32 {
        self.layout.len() as u32
    }

    /// Capacity of in-object slots
    pub fn inlined_properties(&self) -> u32 {
        self.inlined_properties
    }

    /// In-object slots not yet used.
    pub fn unused_inlined_props(&self) -> u32 {
        self.inlined_properties.saturating_sub(self.number_of_props())
    }

    /// Out-of-line slots not yet used.
    pub fn unused_non_inlined_props(&self) -> u32 {
        self.max_out_of_line.saturating_sub(self.used_non_inlined_props())
    }

    /// Out-of-line slots in use.
    pub fn used_non_inlined_props(&self) -> u32 {
        self.number_of_props().saturating_sub(self.inlined_properties)
    }

    /// Named properties live in a dictionary.
    pub fn is_dictionary_mode(&self) -> bool {
        self.dictionary_mode
    }

    /// Elements live in a dictionary.
    pub fn is_dictionary_element(&self) -> bool {
        self.dictionary_elements
    }

    /// Drops the layout; the object's properties now live in a dictionary.
    pub fn transition_to_dictionary(&mut self) {
        self.dictionary_mode = true;
        self.layout.clear();
        self.index.clear();
    }

    /// Marks the elements as dictionary backed.
    pub fn transition_elements_to_dictionary(&mut self) {
        self.dictionary_elements = true;
    }

    /// Whether `"constructor"` was added to this array.
    pub fn has_constructor(&self) -> bool {
        self.has_constructor
    }

    /// Sets the `HasConstructor` flag.
    pub fn set_has_constructor(&mut self, value: bool) {
        self.has_constructor = value;
    }

    /// Representation observed across fast elements.
    pub fn element_representation(&self) -> Representation {
        self.element_representation
    }

    /// Widens the element representation after storing `value`.
    pub fn update_representation(&mut self, value: &core_types::Value) {
        self.element_representation = self.element_representation.update(Representation::of(value));
    }
}
