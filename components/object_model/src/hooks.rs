//! Callbacks into the embedding engine.
//!
//! Property lookup needs two things it cannot do by itself: run a
//! user-defined getter, and coerce an arbitrary value to a primitive when it
//! is used as a property key. The embedder supplies both through
//! [`HostHooks`].

use core_types::{JsError, Value};

/// Engine services the lookup cursor calls back into.
pub trait HostHooks {
    /// Invokes a JavaScript getter with `receiver` as `this`.
    fn call_getter(&self, getter: &Value, receiver: &Value) -> Result<Value, JsError>;

    /// `ToPrimitive(value, hint String)`.
    fn to_primitive(&self, value: &Value) -> Result<Value, JsError>;
}

/// Hooks for a heap with no interpreter attached.
///
/// Getters evaluate to `undefined` and objects convert to
/// `"[object Object]"`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHooks;

impl HostHooks for DefaultHooks {
    fn call_getter(&self, _getter: &Value, _receiver: &Value) -> Result<Value, JsError> {
        Ok(Value::Undefined)
    }

    fn to_primitive(&self, value: &Value) -> Result<Value, JsError> {
        match value {
            Value::HeapObject(_) => Ok(Value::String("[object Object]".to_string())),
            other => Ok(other.clone()),
        }
    }
}
