//! Boxes for global bindings.
//!
//! A global dictionary entry stores a [`CellHandle`] instead of the value
//! itself. The dictionary is the only strong owner of a live cell; external
//! caches keep a [`WeakCell`]. Invalidating a binding swaps in a new cell and
//! poisons the old one with [`Value::Hole`], so every cache notices on its
//! next read without being enumerated.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use core_types::Value;

/// Strong reference to a cell, held by exactly one dictionary slot.
pub type CellHandle = Rc<PropertyCell>;

/// Indirection cell holding a global binding's value.
#[derive(Debug)]
pub struct PropertyCell {
    value: RefCell<Value>,
}

impl PropertyCell {
    /// Allocates a live cell holding `value`.
    pub fn new(value: Value) -> CellHandle {
        debug_assert!(!value.is_hole(), "cells cannot be created dead");
        Rc::new(PropertyCell {
            value: RefCell::new(value),
        })
    }

    /// Current value; [`Value::Hole`] once the cell is dead.
    pub fn value(&self) -> Value {
        self.value.borrow().clone()
    }

    /// Overwrites the value in place.
    pub fn set_value(&self, value: Value) {
        debug_assert!(!self.is_dead(), "write to a dead property cell");
        *self.value.borrow_mut() = value;
    }

    /// Whether the cell has been replaced.
    pub fn is_dead(&self) -> bool {
        self.value.borrow().is_hole()
    }

    pub(crate) fn poison(&self) {
        *self.value.borrow_mut() = Value::Hole;
    }

    /// Weak handle for caches.
    pub fn downgrade(cell: &CellHandle) -> WeakCell {
        WeakCell(Rc::downgrade(cell))
    }
}

/// A cache's reference to a cell. Reads fail once the cell is dead or dropped.
///
/// # Example
///
/// ```
/// use core_types::Value;
/// use object_model::PropertyCell;
///
/// let cell = PropertyCell::new(Value::Smi(1));
/// let cached = PropertyCell::downgrade(&cell);
/// assert_eq!(cached.read(), Some(Value::Smi(1)));
/// drop(cell);
/// assert_eq!(cached.read(), None);
/// ```
#[derive(Debug, Clone)]
pub struct WeakCell(Weak<PropertyCell>);

impl WeakCell {
    /// The cell's value, or `None` if the cached reference must be re-resolved.
    pub fn read(&self) -> Option<Value> {
        let cell = self.0.upgrade()?;
        let value = cell.value();
        if value.is_hole() {
            None
        } else {
            Some(value)
        }
    }

    /// The cell itself while something still owns it, dead or not.
    pub fn upgrade(&self) -> Option<CellHandle> {
        self.0.upgrade()
    }

    /// Whether a read would succeed.
    pub fn is_live(&self) -> bool {
        self.read().is_some()
    }

    /// Whether this handle refers to `cell`.
    pub fn points_to(&self, cell: &CellHandle) -> bool {
        std::ptr::eq(self.0.as_ptr(), Rc::as_ptr(cell))
    }
}
