//! Object Model - property storage and lookup
//!
//! This component provides:
//! - Packed property attributes for fast and dictionary storage
//! - Open-addressing probe tables and their insertion-ordered variant
//! - Name, number and global dictionaries
//! - Property cells boxing global bindings
//! - Hidden classes, objects and the heap arena that owns them
//! - The lookup cursor that finds, adds, updates and deletes properties
//!
//! # Example
//!
//! ```
//! use core_types::Value;
//! use object_model::{Heap, LookupCursor, LookupMode, PropertyDescriptor};
//!
//! let mut heap = Heap::new();
//! let obj = heap.allocate_object(Value::Null);
//! let key = Value::String("answer".to_string());
//!
//! let mut cursor = LookupCursor::new(&mut heap, obj.clone(), &key, LookupMode::Own).unwrap();
//! cursor.add_property(&mut heap, obj.clone(), Value::Smi(41), Default::default());
//! cursor.write_data_property(&mut heap, &obj, &PropertyDescriptor::data(Value::Smi(42))).unwrap();
//!
//! let desc = LookupCursor::new(&mut heap, obj, &key, LookupMode::Own)
//!     .unwrap()
//!     .to_property_descriptor(&heap)
//!     .unwrap();
//! assert_eq!(desc.value, Some(Value::Smi(42)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod attributes;
pub mod config;
pub mod descriptor;
pub mod dictionary;
pub mod hash_table;
pub mod heap;
pub mod hidden_class;
pub mod hooks;
pub mod intern;
pub mod lookup;
pub mod object;
pub mod ordered_table;
pub mod property_cell;

// Re-export main types
pub use attributes::{
    AttributeFlags, DictionaryAttributes, FastAttributes, PropertyAttributes, PropertyBoxType,
    Representation, MAX_CAPACITY_OF_PROPERTIES,
};
pub use config::{ConfigError, StorageConfig};
pub use descriptor::PropertyDescriptor;
pub use dictionary::{GlobalDictionary, NameDictionary, NumberDictionary};
pub use hash_table::{compute_hash_table_size, ProbeTable, TablePolicy};
pub use heap::{AccessorData, Heap, InternalAccessor, PrimitiveKind};
pub use hidden_class::HiddenClass;
pub use hooks::{DefaultHooks, HostHooks};
pub use intern::{string_hash, InternedString, PropertyKey, StringTable};
pub use lookup::{array_index, LookupCursor, LookupMode, LookupState};
pub use object::{ElementStorage, JSObject, ObjectKind, PropertyStorage};
pub use ordered_table::{OrderedPolicy, OrderedProbeTable};
pub use property_cell::{CellHandle, PropertyCell, WeakCell};
