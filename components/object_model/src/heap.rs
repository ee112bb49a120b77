//! Object arena.
//!
//! Objects and accessor pairs live in one growable arena and are referenced
//! by index through [`Value::HeapObject`]. Nothing is ever freed or moved, so
//! an index stays valid for the lifetime of the heap and cursors can hold
//! plain values instead of borrows.
//!
//! The heap also owns the per-context tables that property lookup consults:
//! the string intern table, the symbol table, the prototypes registered for
//! primitive types, the storage configuration and the host hooks.

use std::fmt;
use std::rc::Rc;

use core_types::{JsError, SymbolId, Value};
use rustc_hash::FxHashMap;

use crate::config::{ConfigError, StorageConfig};
use crate::hooks::{DefaultHooks, HostHooks};
use crate::intern::{InternedString, StringTable, SymbolTable};
use crate::object::{JSObject, ObjectKind};

/// Read path of an engine-implemented accessor. Receives the holder.
pub type InternalGetter = fn(&Heap, &Value) -> Value;

/// Write path of an engine-implemented accessor. Receives the receiver and
/// the new value; returns whether the write took effect.
pub type InternalSetter = fn(&mut Heap, &Value, &Value) -> Result<bool, JsError>;

/// Accessor implemented by the engine rather than by script.
#[derive(Debug, Clone, Copy)]
pub struct InternalAccessor {
    /// Read path
    pub getter: InternalGetter,
    /// Write path; `None` for read-only accessors
    pub setter: Option<InternalSetter>,
}

/// The value stored in a property slot whose `ACCESSOR` flag is set.
#[derive(Debug, Clone)]
pub struct AccessorData {
    /// Script getter, or `undefined`
    pub getter: Value,
    /// Script setter, or `undefined`
    pub setter: Value,
    /// Engine callbacks for internal accessors
    pub internal: Option<InternalAccessor>,
}

impl AccessorData {
    /// Whether the engine implements this accessor.
    pub fn is_internal(&self) -> bool {
        self.internal.is_some()
    }

    /// Whether writes can go through this accessor.
    pub fn has_setter(&self) -> bool {
        match &self.internal {
            Some(internal) => internal.setter.is_some(),
            None => !self.setter.is_undefined(),
        }
    }
}

/// One arena slot.
#[derive(Debug, Clone)]
pub enum HeapEntry {
    /// A JavaScript object
    Object(JSObject),
    /// A getter/setter pair
    Accessor(AccessorData),
}

/// Primitive types that can have a registered prototype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// `boolean`
    Boolean,
    /// `number`
    Number,
    /// `string`
    String,
    /// `symbol`
    Symbol,
    /// `bigint`
    BigInt,
}

impl PrimitiveKind {
    /// The primitive type of `value`, or `None` for objects, `null` and `undefined`.
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Boolean(_) => Some(PrimitiveKind::Boolean),
            Value::Smi(_) | Value::Double(_) => Some(PrimitiveKind::Number),
            Value::String(_) => Some(PrimitiveKind::String),
            Value::Symbol(_) => Some(PrimitiveKind::Symbol),
            Value::BigInt(_) => Some(PrimitiveKind::BigInt),
            _ => None,
        }
    }
}

/// Arena of objects and accessors plus the tables lookups depend on.
pub struct Heap {
    entries: Vec<HeapEntry>,
    strings: StringTable,
    symbols: SymbolTable,
    global: usize,
    primitive_prototypes: FxHashMap<PrimitiveKind, Value>,
    config: StorageConfig,
    hooks: Rc<dyn HostHooks>,
}

impl fmt::Debug for Heap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heap")
            .field("entries", &self.entries.len())
            .field("strings", &self.strings.len())
            .field("global", &self.global)
            .field("config", &self.config)
            .finish()
    }
}

impl Default for Heap {
    fn default() -> Self {
        Heap::build(StorageConfig::default())
    }
}

impl Heap {
    /// Creates a heap with the default configuration and a fresh global object.
    pub fn new() -> Self {
        Heap::default()
    }

    /// Creates a heap with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the configuration does not fit the
    /// packed attribute layout.
    pub fn with_config(config: StorageConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Heap::build(config))
    }

    fn build(config: StorageConfig) -> Self {
        let mut heap = Heap {
            entries: Vec::new(),
            strings: StringTable::new(),
            symbols: SymbolTable::default(),
            global: 0,
            primitive_prototypes: FxHashMap::default(),
            config,
            hooks: Rc::new(DefaultHooks),
        };
        let global = heap.allocate(ObjectKind::Global, Value::Null);
        heap.global = global;
        heap
    }

    fn allocate(&mut self, kind: ObjectKind, prototype: Value) -> usize {
        let id = self.entries.len();
        self.entries
            .push(HeapEntry::Object(JSObject::new(kind, prototype, &self.config)));
        id
    }

    /// The global object.
    pub fn global_object(&self) -> Value {
        Value::HeapObject(self.global)
    }

    /// Allocates an ordinary object.
    pub fn allocate_object(&mut self, prototype: Value) -> Value {
        Value::HeapObject(self.allocate(ObjectKind::Ordinary, prototype))
    }

    /// Allocates an array with the given `length` and no elements.
    pub fn allocate_array(&mut self, prototype: Value, length: u32) -> Value {
        let kind = ObjectKind::Array {
            length,
            length_writable: true,
        };
        Value::HeapObject(self.allocate(kind, prototype))
    }

    /// Allocates a `String` wrapper object.
    pub fn allocate_string_wrapper(&mut self, data: &str, prototype: Value) -> Value {
        let kind = ObjectKind::StringWrapper(data.to_string());
        Value::HeapObject(self.allocate(kind, prototype))
    }

    /// Allocates a proxy around `target`.
    pub fn allocate_proxy(&mut self, target: Value) -> Value {
        Value::HeapObject(self.allocate(ObjectKind::Proxy { target }, Value::Null))
    }

    /// Allocates a script accessor pair.
    pub fn new_accessor(&mut self, getter: Value, setter: Value) -> Value {
        self.push_accessor(AccessorData {
            getter,
            setter,
            internal: None,
        })
    }

    /// Allocates an engine accessor.
    pub fn new_internal_accessor(&mut self, accessor: InternalAccessor) -> Value {
        self.push_accessor(AccessorData {
            getter: Value::Undefined,
            setter: Value::Undefined,
            internal: Some(accessor),
        })
    }

    fn push_accessor(&mut self, data: AccessorData) -> Value {
        let id = self.entries.len();
        self.entries.push(HeapEntry::Accessor(data));
        Value::HeapObject(id)
    }

    /// Object at `id`, if `id` refers to an object.
    pub fn object(&self, id: usize) -> Option<&JSObject> {
        match self.entries.get(id) {
            Some(HeapEntry::Object(obj)) => Some(obj),
            _ => None,
        }
    }

    /// Mutable object at `id`.
    pub fn object_mut(&mut self, id: usize) -> Option<&mut JSObject> {
        match self.entries.get_mut(id) {
            Some(HeapEntry::Object(obj)) => Some(obj),
            _ => None,
        }
    }

    /// Object referenced by `value`, if it is one.
    pub fn object_of(&self, value: &Value) -> Option<&JSObject> {
        value.as_heap_object().and_then(|id| self.object(id))
    }

    /// Accessor pair at `id`.
    pub fn accessor(&self, id: usize) -> Option<&AccessorData> {
        match self.entries.get(id) {
            Some(HeapEntry::Accessor(data)) => Some(data),
            _ => None,
        }
    }

    /// Mutable accessor pair at `id`.
    pub fn accessor_mut(&mut self, id: usize) -> Option<&mut AccessorData> {
        match self.entries.get_mut(id) {
            Some(HeapEntry::Accessor(data)) => Some(data),
            _ => None,
        }
    }

    /// Accessor pair referenced by `value`.
    pub fn accessor_of(&self, value: &Value) -> Option<&AccessorData> {
        value.as_heap_object().and_then(|id| self.accessor(id))
    }

    /// Number of arena slots in use.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the arena is empty. Never true: the global object always exists.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Interns `text`.
    pub fn intern(&mut self, text: &str) -> InternedString {
        self.strings.intern(text)
    }

    /// The intern table.
    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    /// Creates a new unique symbol.
    pub fn new_symbol(&mut self, description: Option<&str>) -> SymbolId {
        self.symbols.create(description)
    }

    /// Description given to a symbol at creation.
    pub fn symbol_description(&self, id: SymbolId) -> Option<&str> {
        self.symbols.description(id)
    }

    /// Registers the prototype consulted when a primitive of `kind` is used
    /// as a lookup holder.
    pub fn set_primitive_prototype(&mut self, kind: PrimitiveKind, prototype: Value) {
        self.primitive_prototypes.insert(kind, prototype);
    }

    /// Prototype registered for the type of `value`.
    pub fn primitive_prototype(&self, value: &Value) -> Option<Value> {
        let kind = PrimitiveKind::of(value)?;
        self.primitive_prototypes.get(&kind).cloned()
    }

    /// Storage tunables.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Replaces the host hooks.
    pub fn set_hooks(&mut self, hooks: Rc<dyn HostHooks>) {
        self.hooks = hooks;
    }

    /// Shared handle to the host hooks.
    pub fn hooks(&self) -> Rc<dyn HostHooks> {
        Rc::clone(&self.hooks)
    }
}
