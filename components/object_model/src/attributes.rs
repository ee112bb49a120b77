//! Property attribute words.
//!
//! An attribute word has four flags shared by every storage mode, then a
//! mode-specific payload. Fast-mode properties (slots laid out by the hidden
//! class) carry the slot offset and a value representation; dictionary-mode
//! properties carry an insertion order and, for globals, the kind of cell that
//! boxes the value. Both payloads occupy the same bits of the packed word:
//!
//! ```text
//!  bit  0   1   2   3 | 4    5..7  8..17   18..27
//! fast  W   E   C   A | INL  REP   OFFSET  SORTED_INDEX
//! dict  W   E   C   A | BOX(4..5)  ORDER(6..25)
//! ```
//!
//! The mode is never recorded in the bits; it is implied by the structure that
//! stores the word. [`PropertyAttributes`] makes that explicit as a tagged union.

use bitflags::bitflags;
use core_types::Value;

/// Bits available to the fast-mode `Offset` field.
pub const OFFSET_BITS: u32 = 10;
/// Bits available to the fast-mode `SortedIndex` field.
pub const SORTED_INDEX_BITS: u32 = 10;
/// Bits available to the dictionary-mode `DictionaryOrder` field.
pub const DICTIONARY_ORDER_BITS: u32 = 20;
/// Number of properties an object can hold before it must use a dictionary.
pub const MAX_CAPACITY_OF_PROPERTIES: u32 = 1 << OFFSET_BITS;
/// Largest legal `DictionaryOrder`.
pub const MAX_DICTIONARY_ORDER: u32 = (1 << DICTIONARY_ORDER_BITS) - 1;
/// First order stamped into a fresh dictionary.
pub const INITIAL_PROPERTY_INDEX: u32 = 0;

const FLAGS_MASK: u32 = 0b1111;
const INLINED_SHIFT: u32 = 4;
const REPRESENTATION_SHIFT: u32 = 5;
const REPRESENTATION_MASK: u32 = 0b111;
const OFFSET_SHIFT: u32 = 8;
const OFFSET_MASK: u32 = (1 << OFFSET_BITS) - 1;
const SORTED_INDEX_SHIFT: u32 = 18;
const SORTED_INDEX_MASK: u32 = (1 << SORTED_INDEX_BITS) - 1;
const BOX_TYPE_SHIFT: u32 = 4;
const BOX_TYPE_MASK: u32 = 0b11;
const DICTIONARY_ORDER_SHIFT: u32 = 6;

bitflags! {
    /// The four flags shared by both storage modes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AttributeFlags: u32 {
        /// `[[Writable]]`
        const WRITABLE = 1 << 0;
        /// `[[Enumerable]]`
        const ENUMERABLE = 1 << 1;
        /// `[[Configurable]]`
        const CONFIGURABLE = 1 << 2;
        /// The slot holds an accessor pair rather than a data value.
        const ACCESSOR = 1 << 3;
        /// Writable, enumerable and configurable data property.
        const DEFAULT = Self::WRITABLE.bits() | Self::ENUMERABLE.bits() | Self::CONFIGURABLE.bits();
    }
}

impl Default for AttributeFlags {
    fn default() -> Self {
        AttributeFlags::DEFAULT
    }
}

impl AttributeFlags {
    /// Flags for an accessor property.
    pub fn default_accessor(writable: bool, enumerable: bool, configurable: bool) -> Self {
        let mut flags = AttributeFlags::ACCESSOR;
        flags.set(AttributeFlags::WRITABLE, writable);
        flags.set(AttributeFlags::ENUMERABLE, enumerable);
        flags.set(AttributeFlags::CONFIGURABLE, configurable);
        flags
    }

    /// True when exactly writable, enumerable and configurable are set.
    pub fn is_default(self) -> bool {
        self == AttributeFlags::DEFAULT
    }

    /// `[[Writable]]`
    pub fn is_writable(self) -> bool {
        self.contains(AttributeFlags::WRITABLE)
    }

    /// `[[Enumerable]]`
    pub fn is_enumerable(self) -> bool {
        self.contains(AttributeFlags::ENUMERABLE)
    }

    /// `[[Configurable]]`
    pub fn is_configurable(self) -> bool {
        self.contains(AttributeFlags::CONFIGURABLE)
    }

    /// Whether the slot holds an accessor.
    pub fn is_accessor(self) -> bool {
        self.contains(AttributeFlags::ACCESSOR)
    }
}

/// Observed value representation of a fast-mode slot or element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Representation {
    /// Nothing stored yet
    #[default]
    None = 0,
    /// Only small integers
    Int = 1,
    /// Only doubles
    Double = 2,
    /// Integers and doubles
    Number = 3,
    /// Only non-numbers
    Object = 4,
    /// Anything
    Mixed = 5,
}

impl Representation {
    /// Representation of a single value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Smi(_) => Representation::Int,
            Value::Double(_) => Representation::Double,
            _ => Representation::Object,
        }
    }

    /// Whether this is one of the numeric kinds.
    pub fn is_number(self) -> bool {
        matches!(
            self,
            Representation::Int | Representation::Double | Representation::Number
        )
    }

    /// Widens `self` after observing a value of representation `observed`.
    ///
    /// # Example
    ///
    /// ```
    /// use object_model::Representation;
    ///
    /// assert_eq!(Representation::None.update(Representation::Int), Representation::Int);
    /// assert_eq!(Representation::Int.update(Representation::Double), Representation::Number);
    /// assert_eq!(Representation::Number.update(Representation::Object), Representation::Mixed);
    /// ```
    pub fn update(self, observed: Representation) -> Self {
        if self == Representation::None || observed == Representation::None {
            return if self == Representation::None { observed } else { self };
        }
        if self == observed {
            return self;
        }
        if self == Representation::Mixed || observed == Representation::Mixed {
            return Representation::Mixed;
        }
        if self.is_number() && observed.is_number() {
            return Representation::Number;
        }
        Representation::Mixed
    }

    fn from_bits(bits: u32) -> Self {
        match bits {
            1 => Representation::Int,
            2 => Representation::Double,
            3 => Representation::Number,
            4 => Representation::Object,
            5 => Representation::Mixed,
            _ => Representation::None,
        }
    }
}

/// Kind of the cell boxing a global binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum PropertyBoxType {
    /// Holds `undefined`
    #[default]
    Undefined = 0,
    /// Holds a value that has never changed
    Constant = 1,
    /// Holds values of a single type
    ConstantType = 2,
    /// Holds arbitrary values; caches must re-read
    Mutable = 3,
}

impl PropertyBoxType {
    fn from_bits(bits: u32) -> Self {
        match bits {
            1 => PropertyBoxType::Constant,
            2 => PropertyBoxType::ConstantType,
            3 => PropertyBoxType::Mutable,
            _ => PropertyBoxType::Undefined,
        }
    }
}

/// Attributes of a property stored in a hidden-class slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FastAttributes {
    flags: AttributeFlags,
    inlined: bool,
    representation: Representation,
    offset: u32,
    sorted_index: u32,
}

impl FastAttributes {
    /// Attributes with the given flags and zeroed payload.
    pub fn new(flags: AttributeFlags) -> Self {
        FastAttributes {
            flags,
            ..FastAttributes::default()
        }
    }

    /// Shared flags
    pub fn flags(&self) -> AttributeFlags {
        self.flags
    }

    /// Replaces the shared flags.
    pub fn set_flags(&mut self, flags: AttributeFlags) {
        self.flags = flags;
    }

    /// Whether the slot lives inside the object rather than the out-of-line array.
    pub fn is_inlined(&self) -> bool {
        self.inlined
    }

    /// Sets `IsInlinedProps`.
    pub fn set_inlined(&mut self, inlined: bool) {
        self.inlined = inlined;
    }

    /// Observed representation of the slot.
    pub fn representation(&self) -> Representation {
        self.representation
    }

    /// Sets the representation.
    pub fn set_representation(&mut self, representation: Representation) {
        self.representation = representation;
    }

    /// Slot offset counted across inline and out-of-line storage.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Sets the offset, which must fit in ten bits.
    pub fn set_offset(&mut self, offset: u32) {
        debug_assert!(offset <= OFFSET_MASK, "offset {} out of range", offset);
        self.offset = offset & OFFSET_MASK;
    }

    /// Position of the key in the layout's key list.
    pub fn sorted_index(&self) -> u32 {
        self.sorted_index
    }

    /// Sets the sorted index, which must fit in ten bits.
    pub fn set_sorted_index(&mut self, index: u32) {
        debug_assert!(index <= SORTED_INDEX_MASK, "sorted index {} out of range", index);
        self.sorted_index = index & SORTED_INDEX_MASK;
    }

    /// Packs into the 28-bit word.
    pub fn to_bits(&self) -> u32 {
        self.flags.bits()
            | (u32::from(self.inlined) << INLINED_SHIFT)
            | ((self.representation as u32) << REPRESENTATION_SHIFT)
            | (self.offset << OFFSET_SHIFT)
            | (self.sorted_index << SORTED_INDEX_SHIFT)
    }

    /// Unpacks a word written by [`FastAttributes::to_bits`].
    pub fn from_bits(bits: u32) -> Self {
        FastAttributes {
            flags: AttributeFlags::from_bits_truncate(bits & FLAGS_MASK),
            inlined: (bits >> INLINED_SHIFT) & 1 == 1,
            representation: Representation::from_bits((bits >> REPRESENTATION_SHIFT) & REPRESENTATION_MASK),
            offset: (bits >> OFFSET_SHIFT) & OFFSET_MASK,
            sorted_index: (bits >> SORTED_INDEX_SHIFT) & SORTED_INDEX_MASK,
        }
    }
}

/// Attributes of a property stored in a dictionary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DictionaryAttributes {
    flags: AttributeFlags,
    box_type: PropertyBoxType,
    dictionary_order: u32,
}

impl DictionaryAttributes {
    /// Attributes with the given flags, an `Undefined` box type and order zero.
    pub fn new(flags: AttributeFlags) -> Self {
        DictionaryAttributes {
            flags,
            ..DictionaryAttributes::default()
        }
    }

    /// Shared flags
    pub fn flags(&self) -> AttributeFlags {
        self.flags
    }

    /// Replaces the shared flags.
    pub fn set_flags(&mut self, flags: AttributeFlags) {
        self.flags = flags;
    }

    /// Box kind; only meaningful in a global dictionary.
    pub fn box_type(&self) -> PropertyBoxType {
        self.box_type
    }

    /// Sets the box kind.
    pub fn set_box_type(&mut self, box_type: PropertyBoxType) {
        self.box_type = box_type;
    }

    /// Insertion sequence number.
    pub fn dictionary_order(&self) -> u32 {
        self.dictionary_order
    }

    /// Sets the insertion sequence number, which must fit in twenty bits.
    pub fn set_dictionary_order(&mut self, order: u32) {
        debug_assert!(order <= MAX_DICTIONARY_ORDER, "dictionary order {} out of range", order);
        self.dictionary_order = order & MAX_DICTIONARY_ORDER;
    }

    /// Builder form of [`DictionaryAttributes::set_box_type`].
    pub fn with_box_type(mut self, box_type: PropertyBoxType) -> Self {
        self.set_box_type(box_type);
        self
    }

    /// Builder form of [`DictionaryAttributes::set_dictionary_order`].
    pub fn with_dictionary_order(mut self, order: u32) -> Self {
        self.set_dictionary_order(order);
        self
    }

    /// Packs into the 26-bit word.
    pub fn to_bits(&self) -> u32 {
        self.flags.bits()
            | ((self.box_type as u32) << BOX_TYPE_SHIFT)
            | (self.dictionary_order << DICTIONARY_ORDER_SHIFT)
    }

    /// Unpacks a word written by [`DictionaryAttributes::to_bits`].
    pub fn from_bits(bits: u32) -> Self {
        DictionaryAttributes {
            flags: AttributeFlags::from_bits_truncate(bits & FLAGS_MASK),
            box_type: PropertyBoxType::from_bits((bits >> BOX_TYPE_SHIFT) & BOX_TYPE_MASK),
            dictionary_order: (bits >> DICTIONARY_ORDER_SHIFT) & MAX_DICTIONARY_ORDER,
        }
    }
}

/// Attributes tagged with the storage mode they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyAttributes {
    /// Stored in a hidden-class slot or a fast element array
    Fast(FastAttributes),
    /// Stored in a dictionary entry
    Dictionary(DictionaryAttributes),
}

impl Default for PropertyAttributes {
    fn default() -> Self {
        PropertyAttributes::Fast(FastAttributes::new(AttributeFlags::DEFAULT))
    }
}

impl PropertyAttributes {
    /// No flags set.
    pub fn none() -> Self {
        PropertyAttributes::Fast(FastAttributes::new(AttributeFlags::empty()))
    }

    /// Shared flags regardless of mode.
    pub fn flags(&self) -> AttributeFlags {
        match self {
            PropertyAttributes::Fast(attrs) => attrs.flags(),
            PropertyAttributes::Dictionary(attrs) => attrs.flags(),
        }
    }

    /// Replaces the shared flags, keeping the mode payload.
    pub fn set_flags(&mut self, flags: AttributeFlags) {
        match self {
            PropertyAttributes::Fast(attrs) => attrs.set_flags(flags),
            PropertyAttributes::Dictionary(attrs) => attrs.set_flags(flags),
        }
    }

    /// `[[Writable]]`
    pub fn is_writable(&self) -> bool {
        self.flags().is_writable()
    }

    /// `[[Enumerable]]`
    pub fn is_enumerable(&self) -> bool {
        self.flags().is_enumerable()
    }

    /// `[[Configurable]]`
    pub fn is_configurable(&self) -> bool {
        self.flags().is_configurable()
    }

    /// Whether the slot holds an accessor.
    pub fn is_accessor(&self) -> bool {
        self.flags().is_accessor()
    }

    /// `IsInlinedProps`; always false in dictionary mode.
    pub fn is_inlined(&self) -> bool {
        matches!(self, PropertyAttributes::Fast(attrs) if attrs.is_inlined())
    }

    /// The fast payload, if in fast mode.
    pub fn as_fast(&self) -> Option<FastAttributes> {
        match self {
            PropertyAttributes::Fast(attrs) => Some(*attrs),
            PropertyAttributes::Dictionary(_) => None,
        }
    }

    /// The dictionary payload, if in dictionary mode.
    pub fn as_dictionary(&self) -> Option<DictionaryAttributes> {
        match self {
            PropertyAttributes::Dictionary(attrs) => Some(*attrs),
            PropertyAttributes::Fast(_) => None,
        }
    }

    /// Packed word in whichever layout the mode uses.
    pub fn to_bits(&self) -> u32 {
        match self {
            PropertyAttributes::Fast(attrs) => attrs.to_bits(),
            PropertyAttributes::Dictionary(attrs) => attrs.to_bits(),
        }
    }
}

impl From<FastAttributes> for PropertyAttributes {
    fn from(attrs: FastAttributes) -> Self {
        PropertyAttributes::Fast(attrs)
    }
}

impl From<DictionaryAttributes> for PropertyAttributes {
    fn from(attrs: DictionaryAttributes) -> Self {
        PropertyAttributes::Dictionary(attrs)
    }
}
