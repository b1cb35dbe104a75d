// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Field accessor tests: direct container manipulation.

mod common;

use common::{minimal_person, registry};
use protomap::{MapperOptions, MessageValue, Value};

#[test]
fn test_get_returns_default_when_absent() {
    let registry = registry(MapperOptions::default());
    let mapper = registry.mapper_for("test.Person").unwrap();
    let message = MessageValue::new("test.Person".to_string());

    let score = mapper.field_accessor("score").unwrap();
    assert_eq!(score.get(&message), Value::Int32(7));
    let active = mapper.field_accessor("active").unwrap();
    assert_eq!(active.get(&message), Value::Bool(false));
    let color = mapper.field_accessor("color").unwrap();
    assert_eq!(color.get(&message), Value::Int32(0));
    let tags = mapper.field_accessor("tags").unwrap();
    assert_eq!(tags.get(&message), Value::List(Vec::new()));
    let address = mapper.field_accessor("address").unwrap();
    assert_eq!(address.get(&message), Value::Null);
}

#[test]
fn test_get_returns_stored_value() {
    let registry = registry(MapperOptions::default());
    let mapper = registry.mapper_for("test.Person").unwrap();
    let message = minimal_person();
    let name = mapper.field_accessor("name").unwrap();
    assert_eq!(name.get(&message), Value::String("ada".to_string()));
}

#[test]
fn test_set_coerces() {
    let registry = registry(MapperOptions::default());
    let mapper = registry.mapper_for("test.Person").unwrap();
    let mut message = MessageValue::new("test.Person".to_string());

    let big = mapper.field_accessor("big").unwrap();
    big.set(&mut message, Value::Int32(5)).unwrap();
    assert_eq!(message.fields["big"], Value::Int64(5));

    let score = mapper.field_accessor("score").unwrap();
    assert!(score.set(&mut message, Value::String("x".to_string())).is_err());
}

#[test]
fn test_set_oneof_clears_siblings() {
    let registry = registry(MapperOptions::default());
    let mapper = registry.mapper_for("test.Person").unwrap();
    let mut message = MessageValue::new("test.Person".to_string());

    let phone = mapper.field_accessor("phone").unwrap();
    let pager = mapper.field_accessor("pager").unwrap();
    phone
        .set(&mut message, Value::String("555".to_string()))
        .unwrap();
    pager.set(&mut message, Value::UInt32(42)).unwrap();

    assert!(!phone.has(&message));
    assert_eq!(message.fields["pager"], Value::UInt32(42));
}

#[test]
fn test_set_outside_oneof_leaves_other_fields() {
    let registry = registry(MapperOptions::default());
    let mapper = registry.mapper_for("test.Person").unwrap();
    let mut message = minimal_person();

    let phone = mapper.field_accessor("phone").unwrap();
    phone
        .set(&mut message, Value::String("555".to_string()))
        .unwrap();
    // clearing applies to the oneof group only
    assert!(message.fields.contains_key("name"));
    assert!(message.fields.contains_key("id"));
}

#[test]
fn test_has_and_clear() {
    let registry = registry(MapperOptions::default());
    let mapper = registry.mapper_for("test.Person").unwrap();
    let mut message = minimal_person();

    let name = mapper.field_accessor("name").unwrap();
    assert!(name.has(&message));
    let removed = name.clear(&mut message);
    assert_eq!(removed, Some(Value::String("ada".to_string())));
    assert!(!name.has(&message));
    assert_eq!(name.clear(&mut message), None);
}

#[test]
fn test_add_item_creates_list_lazily() {
    let registry = registry(MapperOptions::default());
    let mapper = registry.mapper_for("test.Person").unwrap();
    let mut message = MessageValue::new("test.Person".to_string());

    let tags = mapper.field_accessor("tags").unwrap();
    assert_eq!(tags.list_len(&message).unwrap(), None);
    tags.add_item(&mut message, Value::String("a".to_string()))
        .unwrap();
    tags.add_item(&mut message, Value::String("b".to_string()))
        .unwrap();
    assert_eq!(tags.list_len(&message).unwrap(), Some(2));
    assert_eq!(
        tags.get_item(&message, 1).unwrap(),
        Value::String("b".to_string())
    );
    assert!(tags.get_item(&message, 2).is_err());
}

#[test]
fn test_set_item_grows_with_defaults() {
    let registry = registry(MapperOptions::default());
    let mapper = registry.mapper_for("test.Person").unwrap();
    let mut message = MessageValue::new("test.Person".to_string());

    let counts = mapper.field_accessor("counts").unwrap();
    counts.set_item(&mut message, 2, Value::Int32(9)).unwrap();
    assert_eq!(
        message.fields["counts"],
        Value::List(vec![Value::Int32(0), Value::Int32(0), Value::Int32(9)])
    );
}

#[test]
fn test_set_item_grows_message_field_with_empty_containers() {
    use protomap::schema::{DescriptorSet, FieldDescriptor, FieldKind, MessageDescriptor};
    use protomap::MapperRegistry;

    let mut schema = DescriptorSet::new();
    schema.add_message(
        MessageDescriptor::new("test.Item")
            .field(FieldDescriptor::new("n", 1, FieldKind::Int32)),
    );
    schema.add_message(
        MessageDescriptor::new("test.Bag").field(
            FieldDescriptor::new("items", 1, FieldKind::Message("test.Item".to_string()))
                .repeated(),
        ),
    );
    let registry = MapperRegistry::new(schema, MapperOptions::default());
    let mapper = registry.mapper_for("test.Bag").unwrap();
    let mut bag = MessageValue::new("test.Bag".to_string());

    let mut item = MessageValue::new("test.Item".to_string());
    item.fields.insert("n".to_string(), Value::Int32(5));
    let items = mapper.field_accessor("items").unwrap();
    items.set_item(&mut bag, 1, Value::Message(item)).unwrap();

    // the filler element is a well-typed empty message, not null
    assert_eq!(
        items.get_item(&bag, 0).unwrap(),
        Value::Message(MessageValue::new("test.Item".to_string()))
    );

    // the padded container still encodes
    let bytes = mapper.encode(&Value::Message(bag)).unwrap();
    assert_eq!(bytes, vec![0x0A, 0x00, 0x0A, 0x02, 0x08, 0x05]);
}

#[test]
fn test_whole_list_replacement() {
    let registry = registry(MapperOptions::default());
    let mapper = registry.mapper_for("test.Person").unwrap();
    let mut message = MessageValue::new("test.Person".to_string());

    let counts = mapper.field_accessor("counts").unwrap();
    assert_eq!(counts.get_list(&message).unwrap(), None);
    let previous = counts
        .set_list(&mut message, vec![Value::Int32(1), Value::Int32(2)])
        .unwrap();
    assert_eq!(previous, None);
    let previous = counts
        .set_list(&mut message, vec![Value::Int64(3)])
        .unwrap();
    assert_eq!(previous, Some(vec![Value::Int32(1), Value::Int32(2)]));
    // elements are coerced to the field's type on the way in
    assert_eq!(
        counts.get_list(&message).unwrap(),
        Some(vec![Value::Int32(3)])
    );
}

#[test]
fn test_list_operations_reject_singular_fields() {
    let registry = registry(MapperOptions::default());
    let mapper = registry.mapper_for("test.Person").unwrap();
    let mut message = minimal_person();

    let name = mapper.field_accessor("name").unwrap();
    assert!(name.list_len(&message).is_err());
    assert!(name.add_item(&mut message, Value::String("x".to_string())).is_err());
    assert!(name.set_list(&mut message, Vec::new()).is_err());
}

#[test]
fn test_set_repeated_requires_list() {
    let registry = registry(MapperOptions::default());
    let mapper = registry.mapper_for("test.Person").unwrap();
    let mut message = MessageValue::new("test.Person".to_string());
    let counts = mapper.field_accessor("counts").unwrap();
    assert!(counts.set(&mut message, Value::Int32(1)).is_err());
    assert!(counts
        .set(&mut message, Value::List(vec![Value::Int32(1)]))
        .is_ok());
}

#[test]
fn test_enum_validation_applies_to_set() {
    let registry = registry(MapperOptions {
        check_enum_values: true,
        ..Default::default()
    });
    let mapper = registry.mapper_for("test.Person").unwrap();
    let mut message = MessageValue::new("test.Person".to_string());
    let color = mapper.field_accessor("color").unwrap();
    assert!(color.set(&mut message, Value::Int32(2)).is_err());
    assert!(color.set(&mut message, Value::Int32(4)).is_ok());
}

#[test]
fn test_accessor_edits_survive_round_trip() {
    let registry = registry(MapperOptions::default());
    let mapper = registry.mapper_for("test.Person").unwrap();
    let mut message = minimal_person();

    let tags = mapper.field_accessor("tags").unwrap();
    tags.add_item(&mut message, Value::String("x".to_string()))
        .unwrap();
    let pager = mapper.field_accessor("pager").unwrap();
    pager.set(&mut message, Value::UInt32(9)).unwrap();

    let original = Value::Message(message);
    let bytes = mapper.encode(&original).unwrap();
    let decoded = mapper.decode(&bytes).unwrap();
    assert_eq!(decoded, original);
}

#[test]
fn test_unknown_field_has_no_accessor() {
    let registry = registry(MapperOptions::default());
    let mapper = registry.mapper_for("test.Person").unwrap();
    assert!(mapper.field_accessor("nope").is_none());
}
