// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common fixtures for integration tests: hand-built descriptor sets.

#![allow(dead_code)]

use protomap::schema::{
    DefaultValue, DescriptorSet, EnumDescriptor, FieldDescriptor, FieldKind, MessageDescriptor,
};
use protomap::{MapperOptions, MapperRegistry, MessageValue, Value};

/// Schema used across the suites:
///
/// - `test.Person`: required name/id, defaulted score, repeated tags and
///   packed counts, a sub-message address, an enum, 64-bit fields, and a
///   `contact` oneof over phone/pager.
/// - `test.Address`: plain two-field message.
/// - `test.Node`: self-referential linked-list node.
pub fn test_schema() -> DescriptorSet {
    let mut set = DescriptorSet::new();
    set.add_enum(
        EnumDescriptor::new("test.Color")
            .value("RED", 0)
            .value("GREEN", 1)
            .value("BLUE", 4),
    );
    set.add_message(
        MessageDescriptor::new("test.Address")
            .field(FieldDescriptor::new("street", 1, FieldKind::String))
            .field(FieldDescriptor::new("zip", 2, FieldKind::Int32)),
    );
    set.add_message(
        MessageDescriptor::new("test.Person")
            .field(FieldDescriptor::new("name", 1, FieldKind::String).required())
            .field(FieldDescriptor::new("id", 2, FieldKind::Int32).required())
            .field(
                FieldDescriptor::new("score", 3, FieldKind::Int32)
                    .with_default(DefaultValue::Int(7)),
            )
            .field(FieldDescriptor::new("tags", 4, FieldKind::String).repeated())
            .field(FieldDescriptor::new("counts", 5, FieldKind::Int32).repeated().packed())
            .field(FieldDescriptor::new(
                "address",
                6,
                FieldKind::Message("test.Address".to_string()),
            ))
            .field(FieldDescriptor::new(
                "color",
                7,
                FieldKind::Enum("test.Color".to_string()),
            ))
            .field(FieldDescriptor::new("big", 8, FieldKind::Int64))
            .field(FieldDescriptor::new("ubig", 9, FieldKind::UInt64))
            .field(FieldDescriptor::new("weight", 10, FieldKind::Double))
            .field(FieldDescriptor::new("ratio", 11, FieldKind::Float))
            .field(FieldDescriptor::new("active", 12, FieldKind::Bool))
            .field(FieldDescriptor::new("data", 13, FieldKind::Bytes))
            .field(FieldDescriptor::new("phone", 14, FieldKind::String))
            .field(FieldDescriptor::new("pager", 15, FieldKind::UInt32))
            .oneof("contact", &["phone", "pager"]),
    );
    set.add_message(
        MessageDescriptor::new("test.Node")
            .field(FieldDescriptor::new("value", 1, FieldKind::Int32))
            .field(FieldDescriptor::new(
                "next",
                2,
                FieldKind::Message("test.Node".to_string()),
            )),
    );
    set
}

/// Registry over [`test_schema`] with the given options.
pub fn registry(options: MapperOptions) -> MapperRegistry {
    MapperRegistry::new(test_schema(), options)
}

/// A minimal valid `test.Person` container (required fields only).
pub fn minimal_person() -> MessageValue {
    let mut message = MessageValue::new("test.Person".to_string());
    message
        .fields
        .insert("name".to_string(), Value::String("ada".to_string()));
    message.fields.insert("id".to_string(), Value::Int32(1));
    message
}
