//! Partial property descriptors as used by `[[DefineOwnProperty]]`.

use core_types::Value;

/// A property descriptor where every field may be absent.
///
/// # Example
///
/// ```
/// use core_types::Value;
/// use object_model::PropertyDescriptor;
///
/// let desc = PropertyDescriptor::data(Value::Smi(1)).with_writable(false);
/// assert!(desc.is_data_descriptor());
/// assert_eq!(desc.writable, Some(false));
/// assert_eq!(desc.enumerable, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyDescriptor {
    /// `[[Value]]`
    pub value: Option<Value>,
    /// `[[Writable]]`
    pub writable: Option<bool>,
    /// `[[Get]]`
    pub getter: Option<Value>,
    /// `[[Set]]`
    pub setter: Option<Value>,
    /// `[[Enumerable]]`
    pub enumerable: Option<bool>,
    /// `[[Configurable]]`
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    /// Descriptor carrying only a value.
    pub fn data(value: Value) -> Self {
        PropertyDescriptor {
            value: Some(value),
            ..PropertyDescriptor::default()
        }
    }

    /// Descriptor carrying a getter and/or a setter.
    pub fn accessor(getter: Option<Value>, setter: Option<Value>) -> Self {
        PropertyDescriptor {
            getter,
            setter,
            ..PropertyDescriptor::default()
        }
    }

    /// Sets `[[Writable]]`.
    pub fn with_writable(mut self, writable: bool) -> Self {
        self.writable = Some(writable);
        self
    }

    /// Sets `[[Enumerable]]`.
    pub fn with_enumerable(mut self, enumerable: bool) -> Self {
        self.enumerable = Some(enumerable);
        self
    }

    /// Sets `[[Configurable]]`.
    pub fn with_configurable(mut self, configurable: bool) -> Self {
        self.configurable = Some(configurable);
        self
    }

    /// Has `[[Get]]` or `[[Set]]`.
    pub fn is_accessor_descriptor(&self) -> bool {
        self.getter.is_some() || self.setter.is_some()
    }

    /// Has `[[Value]]` or `[[Writable]]`.
    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }
}
