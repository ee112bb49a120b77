//! Global binding integration tests
//!
//! Global variables live in property cells. These tests check the cell
//! protocol an inline cache relies on: stable cells while attributes hold,
//! dead cells after an attribute change.

use std::rc::Rc;

use core_types::Value;
use object_model::{
    AttributeFlags, Heap, LookupCursor, LookupMode, PropertyBoxType, PropertyCell,
    PropertyDescriptor,
};

fn key(text: &str) -> Value {
    Value::String(text.to_string())
}

fn declare(heap: &mut Heap, name: &str, value: Value) -> LookupCursor {
    let global = heap.global_object();
    let mut cursor = LookupCursor::global(heap, &key(name), LookupMode::Own).unwrap();
    assert!(cursor.add_property(heap, global, value, AttributeFlags::DEFAULT));
    cursor
}

/// Test: a cached weak cell sees writes until the binding is reconfigured
#[test]
fn test_inline_cache_protocol() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut heap = Heap::new();
    let global = heap.global_object();
    let cursor = declare(&mut heap, "counter", Value::Smi(0));
    let cache = PropertyCell::downgrade(&cursor.cell().unwrap());

    let mut writer = LookupCursor::global(&mut heap, &key("counter"), LookupMode::Own).unwrap();
    assert!(writer.is_fast_mode());
    writer
        .update_data_value(&mut heap, &global, Value::Smi(1), false, false)
        .unwrap();
    assert_eq!(cache.read(), Some(Value::Smi(1)));

    let desc = PropertyDescriptor::default().with_enumerable(false);
    writer.write_data_property(&mut heap, &global, &desc).unwrap();
    assert!(!cache.is_live());

    // A fresh lookup finds the replacement cell with the current value.
    let fresh = LookupCursor::global(&mut heap, &key("counter"), LookupMode::Own).unwrap();
    assert_eq!(fresh.fast_get_value(&heap).unwrap(), Value::Smi(1));
    assert!(!fresh.is_enumerable());
    let refreshed = PropertyCell::downgrade(&fresh.cell().unwrap());
    assert!(refreshed.points_to(&writer.cell().unwrap()));
}

/// Test: box types start from the initial value and become mutable on reconfiguration
#[test]
fn test_box_type_progression() {
    let mut heap = Heap::new();
    let global = heap.global_object();
    let declared = declare(&mut heap, "late", Value::Undefined);
    let dict_attrs = declared.attributes().as_dictionary().unwrap();
    assert_eq!(dict_attrs.box_type(), PropertyBoxType::Undefined);

    let mut cursor = LookupCursor::global(&mut heap, &key("late"), LookupMode::Own).unwrap();
    let desc = PropertyDescriptor::data(Value::Smi(5)).with_writable(false);
    cursor.write_data_property(&mut heap, &global, &desc).unwrap();

    let found = LookupCursor::global(&mut heap, &key("late"), LookupMode::Own).unwrap();
    let attrs = found.attributes().as_dictionary().unwrap();
    assert_eq!(attrs.box_type(), PropertyBoxType::Mutable);
    assert!(!attrs.flags().is_writable());
    assert_eq!(found.value(), Value::Smi(5));
}

/// Test: global keys enumerate in declaration order and deletion drops the cell
#[test]
fn test_declaration_order_and_delete() {
    let mut heap = Heap::new();
    let global = heap.global_object();
    let first = declare(&mut heap, "first", Value::Smi(1));
    declare(&mut heap, "second", Value::Smi(2));
    declare(&mut heap, "third", Value::Smi(3));
    let held = first.cell().unwrap();

    assert_eq!(
        heap.object_of(&global).unwrap().own_property_keys(),
        vec![key("first"), key("second"), key("third")]
    );

    let mut cursor = LookupCursor::global(&mut heap, &key("first"), LookupMode::Own).unwrap();
    assert!(cursor.delete_property_in_holder(&mut heap));
    assert_eq!(
        heap.object_of(&global).unwrap().own_property_keys(),
        vec![key("second"), key("third")]
    );
    assert_eq!(Rc::strong_count(&held), 1);
    assert!(!LookupCursor::global(&mut heap, &key("first"), LookupMode::Own)
        .unwrap()
        .is_found());
}

/// Test: a cursor that looked before a reconfiguration still writes to the live binding
#[test]
fn test_stale_cursor_write_reaches_new_cell() {
    let mut heap = Heap::new();
    let global = heap.global_object();
    declare(&mut heap, "flag", Value::Boolean(false));
    let mut stale = LookupCursor::global(&mut heap, &key("flag"), LookupMode::Own).unwrap();
    let cache = PropertyCell::downgrade(&stale.cell().unwrap());

    let mut other = LookupCursor::global(&mut heap, &key("flag"), LookupMode::Own).unwrap();
    let desc = PropertyDescriptor::default().with_enumerable(false);
    other.write_data_property(&mut heap, &global, &desc).unwrap();
    assert!(!cache.is_live());

    assert!(stale
        .update_data_value(&mut heap, &global, Value::Boolean(true), false, false)
        .unwrap());
    let found = LookupCursor::global(&mut heap, &key("flag"), LookupMode::Own).unwrap();
    assert_eq!(found.fast_get_value(&heap).unwrap(), Value::Boolean(true));
    assert!(PropertyCell::downgrade(&found.cell().unwrap()).points_to(&stale.cell().unwrap()));
}

/// Test: a cursor whose entry was deleted refuses the write
#[test]
fn test_stale_cursor_after_delete() {
    let mut heap = Heap::new();
    let global = heap.global_object();
    let mut stale = declare(&mut heap, "gone", Value::Smi(1));
    let mut cursor = LookupCursor::global(&mut heap, &key("gone"), LookupMode::Own).unwrap();
    assert!(cursor.delete_property_in_holder(&mut heap));

    assert!(stale.cell().is_none());
    assert!(!stale
        .update_data_value(&mut heap, &global, Value::Smi(2), false, false)
        .unwrap());
    assert!(!LookupCursor::global(&mut heap, &key("gone"), LookupMode::Own)
        .unwrap()
        .is_found());
}
