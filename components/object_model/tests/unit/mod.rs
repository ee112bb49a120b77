//! Unit tests for object_model components

use std::collections::HashMap;
use std::rc::Rc;

use core_types::{JsError, Value};
use object_model::attributes::MAX_DICTIONARY_ORDER;
use object_model::{
    AttributeFlags, DictionaryAttributes, FastAttributes, Heap, HostHooks, InternalAccessor,
    LookupCursor, LookupMode, LookupState, NameDictionary, PropertyBoxType, PropertyCell,
    PropertyDescriptor, PropertyKey, ProbeTable, Representation, StorageConfig, StringTable,
    TablePolicy, MAX_CAPACITY_OF_PROPERTIES,
};
use proptest::prelude::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn string(text: &str) -> Value {
    Value::String(text.to_string())
}

fn lookup_own(heap: &mut Heap, holder: &Value, key: &str) -> LookupCursor {
    LookupCursor::new(heap, holder.clone(), &string(key), LookupMode::Own).unwrap()
}

fn add(heap: &mut Heap, holder: &Value, key: &str, value: Value, flags: AttributeFlags) -> LookupCursor {
    let mut cursor = lookup_own(heap, holder, key);
    assert!(cursor.add_property(heap, holder.clone(), value, flags));
    cursor
}

/// Getters return the receiver they were called with.
struct EchoHooks;

impl HostHooks for EchoHooks {
    fn call_getter(&self, _getter: &Value, receiver: &Value) -> Result<Value, JsError> {
        Ok(receiver.clone())
    }

    fn to_primitive(&self, value: &Value) -> Result<Value, JsError> {
        match value {
            Value::HeapObject(_) => Err(JsError::type_error("no toString")),
            other => Ok(other.clone()),
        }
    }
}

fn read_seven(_heap: &Heap, _holder: &Value) -> Value {
    Value::Smi(7)
}

/// Stores the written value as element 0 of the receiver; rejects non-numbers.
fn store_number(heap: &mut Heap, receiver: &Value, value: &Value) -> Result<bool, JsError> {
    if !value.is_number() {
        return Err(JsError::type_error("expected a number"));
    }
    let config = *heap.config();
    let Some(obj) = receiver.as_heap_object().and_then(|id| heap.object_mut(id)) else {
        return Ok(false);
    };
    Ok(obj.add_element_internal(0, value.clone(), AttributeFlags::DEFAULT, &config))
}

fn internal_accessor(heap: &mut Heap) -> Value {
    heap.new_internal_accessor(InternalAccessor {
        getter: read_seven,
        setter: Some(store_number),
    })
}

// ============================================================================
// Fast-mode named properties
// ============================================================================

#[test]
fn test_fifth_property_goes_out_of_line() {
    init_logging();
    let mut heap = Heap::new();
    let obj = heap.allocate_object(Value::Null);
    for key in ["a", "b", "c", "d"] {
        add(&mut heap, &obj, key, Value::Smi(0), AttributeFlags::DEFAULT);
    }
    let cursor = add(&mut heap, &obj, "e", Value::Smi(5), AttributeFlags::DEFAULT);

    assert_eq!(cursor.index(), Some(0));
    assert!(cursor.is_transition());
    assert!(cursor.is_fast_mode());
    let attrs = cursor.attributes().as_fast().unwrap();
    assert_eq!(attrs.offset(), 4);
    assert!(!attrs.is_inlined());
    assert_eq!(attrs.representation(), Representation::Int);
}

#[test]
fn test_property_overflow_moves_to_dictionary() {
    init_logging();
    let mut heap = Heap::new();
    let obj = heap.allocate_object(Value::Null);
    let limit = MAX_CAPACITY_OF_PROPERTIES as usize;
    for i in 0..limit {
        add(&mut heap, &obj, &format!("p{}", i), Value::Smi(i as i32), AttributeFlags::DEFAULT);
    }
    assert!(heap.object_of(&obj).unwrap().is_fast_mode());

    let cursor = add(&mut heap, &obj, "overflow", Value::Smi(-1), AttributeFlags::DEFAULT);
    assert!(!cursor.is_fast_mode());
    assert!(cursor.is_transition());
    let attrs = cursor.attributes().as_dictionary().unwrap();
    assert_eq!(attrs.dictionary_order(), MAX_CAPACITY_OF_PROPERTIES);

    let obj_ref = heap.object_of(&obj).unwrap();
    assert!(!obj_ref.is_fast_mode());
    let keys = obj_ref.own_property_keys();
    assert_eq!(keys.len(), limit + 1);
    assert_eq!(keys[0], string("p0"));
    assert_eq!(keys[limit], string("overflow"));

    let found = lookup_own(&mut heap, &obj, "p1000");
    assert_eq!(found.fast_get_value(&heap).unwrap(), Value::Smi(1000));
}

#[test]
fn test_constructor_on_array_sets_flag() {
    let mut heap = Heap::new();
    let arr = heap.allocate_array(Value::Null, 0);
    let obj = heap.allocate_object(Value::Null);
    add(&mut heap, &arr, "constructor", Value::Null, AttributeFlags::DEFAULT);
    add(&mut heap, &obj, "constructor", Value::Null, AttributeFlags::DEFAULT);
    assert!(heap.object_of(&arr).unwrap().class.has_constructor());
    assert!(!heap.object_of(&obj).unwrap().class.has_constructor());
}

#[test]
fn test_fast_add_skips_lookup() {
    let mut heap = Heap::new();
    let obj = heap.allocate_object(Value::Null);
    let key = PropertyKey::from(heap.intern("quick"));
    assert!(LookupCursor::fast_add(
        &mut heap,
        obj.clone(),
        key.clone(),
        Value::Smi(3),
        AttributeFlags::DEFAULT
    ));
    let cursor = LookupCursor::fast(&mut heap, obj, key, LookupMode::Own);
    assert_eq!(cursor.state(), LookupState::FoundOwn);
    assert_eq!(cursor.value(), Value::Smi(3));
}

// ============================================================================
// Attribute changes
// ============================================================================

#[test]
fn test_attribute_change_preserves_order() {
    let mut heap = Heap::new();
    let obj = heap.allocate_object(Value::Null);
    for key in ["a", "b", "c"] {
        add(&mut heap, &obj, key, Value::Smi(1), AttributeFlags::DEFAULT);
    }
    let mut cursor = lookup_own(&mut heap, &obj, "b");
    let desc = PropertyDescriptor::default().with_writable(false);
    assert!(cursor.write_data_property(&mut heap, &obj, &desc).unwrap());

    assert!(!cursor.is_fast_mode());
    assert!(!cursor.is_writable());
    let obj_ref = heap.object_of(&obj).unwrap();
    assert!(!obj_ref.is_fast_mode());
    assert_eq!(obj_ref.own_property_keys(), vec![string("a"), string("b"), string("c")]);

    let again = lookup_own(&mut heap, &obj, "b");
    assert!(!again.is_writable());
    assert!(again.is_enumerable());
    assert_eq!(again.value(), Value::Smi(1));
}

#[test]
fn test_unchanged_descriptor_keeps_fast_mode() {
    let mut heap = Heap::new();
    let obj = heap.allocate_object(Value::Null);
    add(&mut heap, &obj, "a", Value::Smi(1), AttributeFlags::DEFAULT);
    let mut cursor = lookup_own(&mut heap, &obj, "a");
    let desc = PropertyDescriptor::data(Value::Smi(2)).with_enumerable(true);
    assert!(cursor.write_data_property(&mut heap, &obj, &desc).unwrap());
    assert!(heap.object_of(&obj).unwrap().is_fast_mode());
    assert_eq!(lookup_own(&mut heap, &obj, "a").value(), Value::Smi(2));
}

#[test]
fn test_global_attribute_change_invalidates_cell() {
    init_logging();
    let mut heap = Heap::new();
    let global = heap.global_object();
    let mut cursor = LookupCursor::global(&mut heap, &string("g"), LookupMode::Own).unwrap();
    cursor.add_property(&mut heap, global.clone(), Value::Smi(42), AttributeFlags::DEFAULT);
    let old_cell = cursor.cell().unwrap();
    let cached = PropertyCell::downgrade(&old_cell);

    let desc = PropertyDescriptor::default().with_configurable(false);
    cursor.write_data_property(&mut heap, &global, &desc).unwrap();

    assert!(old_cell.is_dead());
    assert_eq!(cached.read(), None);
    let new_cell = cursor.cell().unwrap();
    assert!(!Rc::ptr_eq(&old_cell, &new_cell));
    assert_eq!(new_cell.value(), Value::Smi(42));
    let attrs = cursor.attributes().as_dictionary().unwrap();
    assert_eq!(attrs.box_type(), PropertyBoxType::Mutable);
    assert!(!attrs.flags().is_configurable());

    // Writes after invalidation go to the new cell.
    cursor.update_data_value(&mut heap, &global, Value::Smi(1), false, false).unwrap();
    let found = LookupCursor::global(&mut heap, &string("g"), LookupMode::Own).unwrap();
    assert_eq!(found.fast_get_value(&heap).unwrap(), Value::Smi(1));
}

#[test]
fn test_global_undefined_binding_box_type() {
    let mut heap = Heap::new();
    let global = heap.global_object();
    let mut cursor = LookupCursor::global(&mut heap, &string("u"), LookupMode::Own).unwrap();
    cursor.add_property(&mut heap, global, Value::Undefined, AttributeFlags::DEFAULT);
    assert_eq!(
        cursor.attributes().as_dictionary().unwrap().box_type(),
        PropertyBoxType::Undefined
    );
}

// ============================================================================
// Accessors
// ============================================================================

#[test]
fn test_data_to_accessor_conversion() {
    let mut heap = Heap::new();
    let obj = heap.allocate_object(Value::Null);
    let getter = heap.allocate_object(Value::Null);
    add(&mut heap, &obj, "p", Value::Smi(1), AttributeFlags::DEFAULT);

    let mut cursor = lookup_own(&mut heap, &obj, "p");
    let desc = PropertyDescriptor::accessor(Some(getter.clone()), None);
    assert!(cursor.write_data_property(&mut heap, &obj, &desc).unwrap());
    assert!(cursor.is_accessor_descriptor());

    let found = lookup_own(&mut heap, &obj, "p");
    let desc = found.to_property_descriptor(&heap).unwrap();
    assert_eq!(desc.getter, Some(getter));
    assert_eq!(desc.setter, Some(Value::Undefined));
    assert_eq!(desc.value, None);
    assert_eq!(desc.enumerable, Some(true));
}

#[test]
fn test_redefine_fast_accessor_creates_new_pair() {
    let mut heap = Heap::new();
    let obj = heap.allocate_object(Value::Null);
    let getter = heap.allocate_object(Value::Null);
    let setter = heap.allocate_object(Value::Null);
    let pair = heap.new_accessor(getter.clone(), Value::Undefined);
    add(&mut heap, &obj, "acc", pair.clone(), AttributeFlags::default_accessor(false, true, true));
    assert!(heap.object_of(&obj).unwrap().is_fast_mode());

    let mut cursor = lookup_own(&mut heap, &obj, "acc");
    assert!(cursor.is_accessor_descriptor());
    let desc = PropertyDescriptor::accessor(None, Some(setter.clone()));
    assert!(cursor.write_data_property(&mut heap, &obj, &desc).unwrap());

    assert!(!heap.object_of(&obj).unwrap().is_fast_mode());
    assert_ne!(cursor.value(), pair);
    let old = heap.accessor_of(&pair).unwrap();
    assert_eq!(old.setter, Value::Undefined);

    let found = lookup_own(&mut heap, &obj, "acc");
    let desc = found.to_property_descriptor(&heap).unwrap();
    assert_eq!(desc.getter, Some(getter));
    assert_eq!(desc.setter, Some(setter));
}

#[test]
fn test_define_getter_and_setter() {
    let mut heap = Heap::new();
    let obj = heap.allocate_object(Value::Null);
    let getter = heap.allocate_object(Value::Null);
    let setter = heap.allocate_object(Value::Null);
    let pair = heap.new_accessor(Value::Undefined, Value::Undefined);
    add(&mut heap, &obj, "x", pair.clone(), AttributeFlags::default_accessor(false, true, true));

    let mut cursor = lookup_own(&mut heap, &obj, "x");
    assert!(cursor.define_getter(&mut heap, getter.clone()).unwrap());
    assert!(cursor.define_setter(&mut heap, setter.clone()).unwrap());

    let data = heap.accessor_of(&pair).unwrap();
    assert_eq!(data.getter, getter);
    assert_eq!(data.setter, setter);
    assert!(data.has_setter());
}

#[test]
fn test_getter_runs_against_receiver() {
    let mut heap = Heap::new();
    heap.set_hooks(Rc::new(EchoHooks));
    let proto = heap.allocate_object(Value::Null);
    let obj = heap.allocate_object(proto.clone());
    let getter = heap.allocate_object(Value::Null);
    let pair = heap.new_accessor(getter, Value::Undefined);
    add(&mut heap, &proto, "who", pair, AttributeFlags::default_accessor(false, true, true));

    let cursor = LookupCursor::new(&mut heap, obj.clone(), &string("who"), LookupMode::PrototypeChain).unwrap();
    assert!(cursor.is_on_prototype());
    assert_eq!(cursor.fast_get_value(&heap).unwrap(), obj);

    let other = heap.allocate_object(Value::Null);
    let cursor = LookupCursor::with_receiver(&mut heap, proto, other.clone(), &string("who"), LookupMode::Own).unwrap();
    assert!(cursor.has_receiver());
    assert_eq!(cursor.fast_get_value(&heap).unwrap(), other);
}

#[test]
fn test_accessor_without_getter_reads_undefined() {
    let mut heap = Heap::new();
    heap.set_hooks(Rc::new(EchoHooks));
    let obj = heap.allocate_object(Value::Null);
    let pair = heap.new_accessor(Value::Undefined, Value::Undefined);
    add(&mut heap, &obj, "w", pair, AttributeFlags::default_accessor(false, true, true));
    let cursor = lookup_own(&mut heap, &obj, "w");
    assert_eq!(cursor.fast_get_value(&heap).unwrap(), Value::Undefined);
}

#[test]
fn test_internal_accessor_read_path() {
    let mut heap = Heap::new();
    let obj = heap.allocate_object(Value::Null);
    let accessor = internal_accessor(&mut heap);
    add(&mut heap, &obj, "length", accessor, AttributeFlags::default_accessor(true, false, false));

    let cursor = lookup_own(&mut heap, &obj, "length");
    assert!(cursor.is_internal_accessor(&heap));
    assert_eq!(cursor.fast_get_value(&heap).unwrap(), Value::Smi(7));

    let desc = cursor.to_property_descriptor(&heap).unwrap();
    assert_eq!(desc.value, Some(Value::Smi(7)));
    assert_eq!(desc.writable, Some(true));
    assert_eq!(desc.getter, None);
}

#[test]
fn test_internal_setter_may_throw_switch() {
    let mut heap = Heap::new();
    let obj = heap.allocate_object(Value::Null);
    let accessor = internal_accessor(&mut heap);
    add(&mut heap, &obj, "length", accessor, AttributeFlags::default_accessor(true, false, false));
    let mut cursor = lookup_own(&mut heap, &obj, "length");

    let err = cursor
        .update_data_value(&mut heap, &obj, string("bad"), true, true)
        .unwrap_err();
    assert_eq!(err, JsError::type_error("expected a number"));

    let absorbed = cursor.update_data_value(&mut heap, &obj, string("bad"), true, false);
    assert_eq!(absorbed, Ok(false));

    assert_eq!(cursor.update_data_value(&mut heap, &obj, Value::Smi(3), true, true), Ok(true));
    let element = LookupCursor::element(&mut heap, obj, 0, LookupMode::Own);
    assert_eq!(element.value(), Value::Smi(3));
}

#[test]
fn test_data_write_through_internal_setter_keeps_accessor() {
    let mut heap = Heap::new();
    let obj = heap.allocate_object(Value::Null);
    let accessor = internal_accessor(&mut heap);
    add(&mut heap, &obj, "length", accessor.clone(), AttributeFlags::default_accessor(true, false, false));

    let mut cursor = lookup_own(&mut heap, &obj, "length");
    let desc = PropertyDescriptor::data(Value::Smi(9));
    assert!(cursor.write_data_property(&mut heap, &obj, &desc).unwrap());

    let found = lookup_own(&mut heap, &obj, "length");
    assert!(found.is_accessor_descriptor());
    assert_eq!(found.value(), accessor);
    let element = LookupCursor::element(&mut heap, obj, 0, LookupMode::Own);
    assert_eq!(element.value(), Value::Smi(9));
}

// ============================================================================
// Elements
// ============================================================================

#[test]
fn test_array_elements_and_length() {
    let mut heap = Heap::new();
    let arr = heap.allocate_array(Value::Null, 0);
    for i in 0..3 {
        let mut cursor = LookupCursor::element(&mut heap, arr.clone(), i, LookupMode::Own);
        assert!(cursor.add_property(&mut heap, arr.clone(), Value::Smi(i as i32), AttributeFlags::DEFAULT));
    }
    let obj = heap.object_of(&arr).unwrap();
    assert_eq!(obj.array_length(), Some(3));
    assert_eq!(obj.class.element_representation(), Representation::Int);

    let mut cursor = LookupCursor::element(&mut heap, arr.clone(), 1, LookupMode::Own);
    assert!(cursor.is_fast_mode());
    assert!(cursor.delete_property_in_holder(&mut heap));
    assert!(!cursor.is_found());

    let obj = heap.object_of(&arr).unwrap();
    assert!(obj.class.is_dictionary_element());
    assert_eq!(obj.own_property_keys(), vec![string("0"), string("2")]);
    assert!(!LookupCursor::element(&mut heap, arr, 1, LookupMode::Own).is_found());
}

#[test]
fn test_frozen_length_refuses_growth() {
    let mut heap = Heap::new();
    let arr = heap.allocate_array(Value::Null, 0);
    heap.object_mut(arr.as_heap_object().unwrap()).unwrap().freeze_array_length();
    let mut cursor = LookupCursor::element(&mut heap, arr.clone(), 0, LookupMode::Own);
    assert!(!cursor.add_property(&mut heap, arr.clone(), Value::Smi(1), AttributeFlags::DEFAULT));
    assert_eq!(heap.object_of(&arr).unwrap().array_length(), Some(0));
}

#[test]
fn test_sparse_elements_enumerate_numerically() {
    let mut heap = Heap::new();
    let obj = heap.allocate_object(Value::Null);
    for index in [5000u32, 2, 700, 0] {
        let mut cursor = LookupCursor::element(&mut heap, obj.clone(), index, LookupMode::Own);
        cursor.add_property(&mut heap, obj.clone(), Value::Smi(1), AttributeFlags::DEFAULT);
    }
    let obj_ref = heap.object_of(&obj).unwrap();
    assert!(obj_ref.number_dictionary().is_some());
    assert_eq!(
        obj_ref.own_property_keys(),
        vec![string("0"), string("2"), string("700"), string("5000")]
    );
}

#[test]
fn test_element_attribute_change() {
    let mut heap = Heap::new();
    let obj = heap.allocate_object(Value::Null);
    let mut cursor = LookupCursor::element(&mut heap, obj.clone(), 0, LookupMode::Own);
    cursor.add_property(&mut heap, obj.clone(), Value::Smi(1), AttributeFlags::DEFAULT);

    let mut cursor = LookupCursor::element(&mut heap, obj.clone(), 0, LookupMode::Own);
    let desc = PropertyDescriptor::data(Value::Smi(2)).with_writable(false);
    assert!(cursor.write_data_property(&mut heap, &obj, &desc).unwrap());

    let found = LookupCursor::element(&mut heap, obj, 0, LookupMode::Own);
    assert!(!found.is_fast_mode());
    assert!(!found.is_writable());
    assert_eq!(found.value(), Value::Smi(2));
}

// ============================================================================
// Lookup
// ============================================================================

#[test]
fn test_to_primitive_failure_propagates() {
    let mut heap = Heap::new();
    heap.set_hooks(Rc::new(EchoHooks));
    let obj = heap.allocate_object(Value::Null);
    let key = heap.allocate_object(Value::Null);
    let result = LookupCursor::new(&mut heap, obj, &key, LookupMode::Own);
    assert_eq!(result.unwrap_err(), JsError::type_error("no toString"));
}

#[test]
fn test_primitive_holder_uses_registered_prototype() {
    let mut heap = Heap::new();
    let number_proto = heap.allocate_object(Value::Null);
    add(&mut heap, &number_proto, "toFixed", Value::Smi(1), AttributeFlags::DEFAULT);
    heap.set_primitive_prototype(object_model::PrimitiveKind::Number, number_proto.clone());

    let cursor = LookupCursor::new(&mut heap, Value::Double(1.5), &string("toFixed"), LookupMode::PrototypeChain).unwrap();
    assert!(cursor.is_found());
    assert_eq!(cursor.holder(), &number_proto);
    assert_eq!(cursor.receiver(), &Value::Double(1.5));

    let none = LookupCursor::new(&mut heap, Value::Boolean(true), &string("toFixed"), LookupMode::PrototypeChain).unwrap();
    assert_eq!(none.state(), LookupState::NotFoundTerminal);
}

#[test]
fn test_re_lookup_in_receiver() {
    let mut heap = Heap::new();
    let proto = heap.allocate_object(Value::Null);
    let obj = heap.allocate_object(proto.clone());
    add(&mut heap, &proto, "shared", Value::Smi(1), AttributeFlags::DEFAULT);

    let mut cursor = LookupCursor::new(&mut heap, obj.clone(), &string("shared"), LookupMode::PrototypeChain).unwrap();
    assert_eq!(cursor.state(), LookupState::FoundOnPrototype);
    cursor.re_lookup_property_in_receiver(&heap);
    assert_eq!(cursor.holder(), &obj);
    assert_eq!(cursor.state(), LookupState::NotFoundInHolder);

    assert!(cursor.add_property_in_holder(&mut heap, Value::Smi(2), AttributeFlags::DEFAULT));
    let own = lookup_own(&mut heap, &obj, "shared");
    assert_eq!(own.value(), Value::Smi(2));
}

#[test]
fn test_write_data_property_in_holder() {
    let mut heap = Heap::new();
    let obj = heap.allocate_object(Value::Null);
    add(&mut heap, &obj, "v", Value::Smi(1), AttributeFlags::DEFAULT);
    let mut cursor = lookup_own(&mut heap, &obj, "v");
    let desc = PropertyDescriptor::data(Value::Smi(10)).with_configurable(false);
    assert!(cursor.write_data_property_in_holder(&mut heap, &desc).unwrap());
    let found = lookup_own(&mut heap, &obj, "v");
    assert_eq!(found.value(), Value::Smi(10));
    assert!(!found.is_configurable());
}

#[test]
fn test_symbol_keys_are_not_enumerable_keys() {
    let mut heap = Heap::new();
    let obj = heap.allocate_object(Value::Null);
    let symbol = heap.new_symbol(Some("tag"));
    let mut cursor = LookupCursor::new(&mut heap, obj.clone(), &Value::Symbol(symbol), LookupMode::Own).unwrap();
    cursor.add_property(&mut heap, obj.clone(), Value::Smi(1), AttributeFlags::DEFAULT);
    add(&mut heap, &obj, "name", Value::Smi(2), AttributeFlags::DEFAULT);

    let obj_id = obj.as_heap_object().unwrap();
    heap.object_mut(obj_id).unwrap().transition_to_dictionary();
    let dict = heap.object(obj_id).unwrap().name_dictionary().unwrap();
    assert_eq!(dict.enum_keys(), vec![string("name")]);
    assert_eq!(dict.all_keys(), vec![Value::Symbol(symbol), string("name")]);
    assert_eq!(
        heap.object(obj_id).unwrap().own_property_keys(),
        vec![string("name"), Value::Symbol(symbol)]
    );
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_small_inline_capacity() {
    let config = StorageConfig::from_json(r#"{ "inlined_properties": 1, "min_properties_length": 2 }"#).unwrap();
    let mut heap = Heap::with_config(config).unwrap();
    let obj = heap.allocate_object(Value::Null);
    add(&mut heap, &obj, "a", Value::Smi(0), AttributeFlags::DEFAULT);
    let second = add(&mut heap, &obj, "b", Value::Smi(1), AttributeFlags::DEFAULT);
    assert_eq!(second.attributes().as_fast().unwrap().offset(), 1);
    assert_eq!(second.index(), Some(0));
}

// ============================================================================
// Properties
// ============================================================================

struct Ints;

impl TablePolicy for Ints {
    type Key = u32;
    type Value = u32;

    fn hash(key: &u32) -> u32 {
        key.wrapping_mul(0x9E37_79B9)
    }

    fn is_match(key: &u32, other: &u32) -> bool {
        key == other
    }
}

#[derive(Debug, Clone)]
enum TableOp {
    Insert(u32, u32),
    Remove(u32),
}

fn table_op() -> impl Strategy<Value = TableOp> {
    prop_oneof![
        (0u32..64, any::<u32>()).prop_map(|(k, v)| TableOp::Insert(k, v)),
        (0u32..64).prop_map(TableOp::Remove),
    ]
}

proptest! {
    #[test]
    fn prop_probe_table_matches_model(ops in prop::collection::vec(table_op(), 0..200)) {
        let mut table = ProbeTable::<Ints>::create(4);
        let mut model = HashMap::new();
        for op in ops {
            match op {
                TableOp::Insert(k, v) => {
                    table.insert(k, v);
                    model.insert(k, v);
                }
                TableOp::Remove(k) => {
                    prop_assert_eq!(table.remove_key(&k), model.remove(&k).is_some());
                }
            }
            prop_assert!(table.size().is_power_of_two());
            prop_assert!(table.size() >= 4);
            prop_assert!(table.entries_count() + table.hole_entries_count() <= table.size());
            prop_assert_eq!(table.entries_count(), model.len());
        }
        for k in 0u32..64 {
            let found = table.find_entry(&k).and_then(|entry| table.value(entry)).copied();
            prop_assert_eq!(found, model.get(&k).copied());
        }
    }

    #[test]
    fn prop_name_dictionary_keeps_insertion_order(
        count in 1usize..60,
        removed in prop::collection::vec(any::<bool>(), 60),
    ) {
        let mut strings = StringTable::new();
        let mut dict = NameDictionary::create(4);
        let keys: Vec<PropertyKey> = (0..count)
            .map(|i| PropertyKey::from(strings.intern(&format!("k{}", i))))
            .collect();
        let mut last_index = dict.next_enumeration_index();
        for key in &keys {
            dict.put_if_absent(key.clone(), Value::Undefined, DictionaryAttributes::new(AttributeFlags::DEFAULT));
            prop_assert!(dict.next_enumeration_index() > last_index);
            last_index = dict.next_enumeration_index();
        }
        let mut expected = Vec::new();
        for (i, key) in keys.iter().enumerate() {
            if removed[i] {
                let entry = dict.find_entry(key).unwrap();
                dict.remove(entry);
            } else {
                expected.push(key.to_value());
            }
        }
        prop_assert_eq!(dict.all_keys(), expected.clone());

        dict.shrink(0);
        prop_assert_eq!(dict.next_enumeration_index(), last_index);
        prop_assert_eq!(dict.all_keys(), expected);
    }

    #[test]
    fn prop_fast_attribute_fields_are_isolated(
        flags in 0u32..16,
        inlined in any::<bool>(),
        rep in 0usize..6,
        offset in 0u32..1024,
        sorted in 0u32..1024,
    ) {
        let reps = [
            Representation::None,
            Representation::Int,
            Representation::Double,
            Representation::Number,
            Representation::Object,
            Representation::Mixed,
        ];
        let mut attrs = FastAttributes::new(AttributeFlags::from_bits_truncate(flags));
        attrs.set_inlined(inlined);
        attrs.set_representation(reps[rep]);
        attrs.set_offset(offset);
        attrs.set_sorted_index(sorted);

        let decoded = FastAttributes::from_bits(attrs.to_bits());
        prop_assert_eq!(decoded.flags().bits(), flags);
        prop_assert_eq!(decoded.is_inlined(), inlined);
        prop_assert_eq!(decoded.representation(), reps[rep]);
        prop_assert_eq!(decoded.offset(), offset);
        prop_assert_eq!(decoded.sorted_index(), sorted);
    }

    #[test]
    fn prop_dictionary_attribute_fields_are_isolated(
        flags in 0u32..16,
        box_type in 0usize..4,
        order in 0u32..=MAX_DICTIONARY_ORDER,
    ) {
        let boxes = [
            PropertyBoxType::Undefined,
            PropertyBoxType::Constant,
            PropertyBoxType::ConstantType,
            PropertyBoxType::Mutable,
        ];
        let attrs = DictionaryAttributes::new(AttributeFlags::from_bits_truncate(flags))
            .with_box_type(boxes[box_type])
            .with_dictionary_order(order);

        let decoded = DictionaryAttributes::from_bits(attrs.to_bits());
        prop_assert_eq!(decoded.flags().bits(), flags);
        prop_assert_eq!(decoded.box_type(), boxes[box_type]);
        prop_assert_eq!(decoded.dictionary_order(), order);
    }
}
