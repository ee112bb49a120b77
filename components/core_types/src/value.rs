//! JavaScript value representation.
//!
//! This module provides the core `Value` enum that represents every value a
//! property slot can hold, plus the internal *hole* marker used for empty
//! element slots and dead property cells.

use num_bigint::BigInt;
use std::fmt;

use crate::number::number_to_string;

/// Identity of a JavaScript symbol.
///
/// Symbols are compared by identity only; the description lives in the
/// symbol table of whichever heap created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// Represents any JavaScript value.
///
/// Primitive values are stored inline, while objects are referenced by their
/// index in the owning heap.
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// let number = Value::Smi(42);
/// let float = Value::Double(3.14);
///
/// assert!(number.is_number());
/// assert_eq!(float.to_string(), "3.14");
/// assert!(!Value::Undefined.is_heap_object());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JavaScript undefined value
    Undefined,
    /// JavaScript null value
    Null,
    /// JavaScript boolean (true or false)
    Boolean(bool),
    /// Small integer (fits in 32 bits, tagged representation)
    Smi(i32),
    /// Heap-allocated object (referenced by index for safety)
    HeapObject(usize),
    /// IEEE 754 double-precision floating point
    Double(f64),
    /// JavaScript string value
    String(String),
    /// JavaScript symbol
    Symbol(SymbolId),
    /// JavaScript BigInt (arbitrary precision integer)
    BigInt(BigInt),
    /// Internal marker: an empty element slot or a dead property cell.
    ///
    /// Never observable from script.
    Hole,
}

impl Value {
    /// Returns true for the internal hole marker.
    pub fn is_hole(&self) -> bool {
        matches!(self, Value::Hole)
    }

    /// Returns true for `undefined`.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Returns true if this value references a heap object.
    pub fn is_heap_object(&self) -> bool {
        matches!(self, Value::HeapObject(_))
    }

    /// Returns the heap index if this value references a heap object.
    pub fn as_heap_object(&self) -> Option<usize> {
        match self {
            Value::HeapObject(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns true for Smi and Double values.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Smi(_) | Value::Double(_))
    }

    /// Returns true for string and symbol values, the two property key types.
    pub fn is_string_or_symbol(&self) -> bool {
        matches!(self, Value::String(_) | Value::Symbol(_))
    }
}


/// Implementation of Display trait for JavaScript string conversion.
///
/// This follows JavaScript's `String()` conversion rules:
/// - undefined → "undefined"
/// - null → "null"
/// - boolean → "true" or "false"
/// - number → shortest round-trip digits, exponent form outside `[1e-6, 1e21)`
/// - object → "[object Object]" (simplified)
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// assert_eq!(Value::Boolean(true).to_string(), "true");
/// assert_eq!(Value::Smi(42).to_string(), "42");
/// assert_eq!(Value::Double(2.0).to_string(), "2");
/// ```
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined | Value::Hole => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Smi(n) => write!(f, "{}", n),
            Value::Double(n) => f.write_str(&number_to_string(*n)),
            Value::HeapObject(_) => write!(f, "[object Object]"),
            Value::String(s) => write!(f, "{}", s),
            Value::Symbol(_) => write!(f, "Symbol()"),
            Value::BigInt(n) => write!(f, "{}", n),
        }
    }
}
