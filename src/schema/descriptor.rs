// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Descriptor model driving all mapping decisions.
//!
//! Descriptors are plain data, built programmatically and read-only once
//! handed to a [`crate::mapper::MapperRegistry`]. There is no `.proto` text
//! parsing here; a descriptor set is the already-loaded schema object graph.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Declared type of a field.
///
/// Message and enum kinds carry the fully-qualified name of their target
/// type, resolved against the owning [`DescriptorSet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldKind {
    Float,
    Double,
    Bool,
    String,
    Bytes,
    /// Sub-message field; payload is the target message type name.
    Message(String),
    /// Enum field; payload is the target enum type name.
    Enum(String),
    Int32,
    UInt32,
    Int64,
    UInt64,
}

impl FieldKind {
    /// Check if this kind is a sub-message type.
    pub fn is_message(&self) -> bool {
        matches!(self, FieldKind::Message(_))
    }

    /// Check if this kind is an enum type.
    pub fn is_enum(&self) -> bool {
        matches!(self, FieldKind::Enum(_))
    }

    /// Check if this kind is eligible for packed encoding.
    ///
    /// Strings, bytes, and sub-messages are never packed.
    pub fn is_packable(&self) -> bool {
        !matches!(
            self,
            FieldKind::String | FieldKind::Bytes | FieldKind::Message(_)
        )
    }

    /// Human-readable kind name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Float => "float",
            FieldKind::Double => "double",
            FieldKind::Bool => "bool",
            FieldKind::String => "string",
            FieldKind::Bytes => "bytes",
            FieldKind::Message(_) => "message",
            FieldKind::Enum(_) => "enum",
            FieldKind::Int32 => "int32",
            FieldKind::UInt32 => "uint32",
            FieldKind::Int64 => "int64",
            FieldKind::UInt64 => "uint64",
        }
    }
}

/// Field label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Optional,
    Required,
    Repeated,
}

/// Declared default of an optional scalar field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
}

/// One field of a message type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Short field name.
    pub name: String,
    /// Wire field number.
    pub number: u32,
    /// Declared type.
    pub kind: FieldKind,
    /// optional/required/repeated.
    pub label: Label,
    /// Declared default, if any.
    pub default: Option<DefaultValue>,
    /// Packed encoding requested for this repeated field.
    pub packed: bool,
    /// Fully-qualified name when this field is an extension, None otherwise.
    pub extension: Option<String>,
}

impl FieldDescriptor {
    /// Create an optional field with the given name, number, and kind.
    pub fn new(name: impl Into<String>, number: u32, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            number,
            kind,
            label: Label::Optional,
            default: None,
            packed: false,
            extension: None,
        }
    }

    /// Mark the field required.
    pub fn required(mut self) -> Self {
        self.label = Label::Required;
        self
    }

    /// Mark the field repeated.
    pub fn repeated(mut self) -> Self {
        self.label = Label::Repeated;
        self
    }

    /// Request packed encoding (only meaningful for repeated primitives).
    pub fn packed(mut self) -> Self {
        self.packed = true;
        self
    }

    /// Attach a declared default value.
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Mark the field as an extension with its fully-qualified name.
    pub fn extension(mut self, full_name: impl Into<String>) -> Self {
        self.extension = Some(full_name.into());
        self
    }

    /// Check if this field is an extension.
    pub fn is_extension(&self) -> bool {
        self.extension.is_some()
    }
}

/// A oneof group: the names of the member fields, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneofDescriptor {
    /// Oneof group name.
    pub name: String,
    /// Member field names.
    pub fields: Vec<String>,
}

/// One message type: fields and oneof groups, both in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDescriptor {
    /// Fully-qualified type name (e.g. "test.Person").
    pub full_name: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
    /// Oneof groups in declaration order.
    pub oneofs: Vec<OneofDescriptor>,
}

impl MessageDescriptor {
    /// Create an empty message descriptor.
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            fields: Vec::new(),
            oneofs: Vec::new(),
        }
    }

    /// Append a field.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Append a oneof group over the named fields.
    pub fn oneof(mut self, name: impl Into<String>, fields: &[&str]) -> Self {
        self.oneofs.push(OneofDescriptor {
            name: name.into(),
            fields: fields.iter().map(|s| s.to_string()).collect(),
        });
        self
    }
}

/// One enum type: named ordinals in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDescriptor {
    /// Fully-qualified type name (e.g. "test.Color").
    pub full_name: String,
    /// (name, number) pairs in declaration order.
    pub values: Vec<(String, i32)>,
}

impl EnumDescriptor {
    /// Create an empty enum descriptor.
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            values: Vec::new(),
        }
    }

    /// Append a named value.
    pub fn value(mut self, name: impl Into<String>, number: i32) -> Self {
        self.values.push((name.into(), number));
        self
    }

    /// The enum's default ordinal: the first declared value.
    pub fn default_number(&self) -> i32 {
        self.values.first().map(|(_, n)| *n).unwrap_or(0)
    }

    /// Check if the given ordinal is a declared value.
    pub fn contains(&self, number: i32) -> bool {
        self.values.iter().any(|(_, n)| *n == number)
    }
}

/// The complete schema object graph for one loading session.
///
/// Message and enum types are looked up by fully-qualified name. Message
/// type graphs may be cyclic (a message with a field of its own type, or
/// mutually-referencing types); the set only stores names, so cycles cost
/// nothing here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptorSet {
    messages: IndexMap<String, MessageDescriptor>,
    enums: IndexMap<String, EnumDescriptor>,
}

impl DescriptorSet {
    /// Create an empty descriptor set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a message type, replacing any previous definition.
    pub fn add_message(&mut self, message: MessageDescriptor) {
        self.messages.insert(message.full_name.clone(), message);
    }

    /// Register an enum type, replacing any previous definition.
    pub fn add_enum(&mut self, en: EnumDescriptor) {
        self.enums.insert(en.full_name.clone(), en);
    }

    /// Look up a message type by fully-qualified name.
    pub fn message(&self, full_name: &str) -> Option<&MessageDescriptor> {
        self.messages.get(full_name)
    }

    /// Look up an enum type by fully-qualified name.
    pub fn enum_type(&self, full_name: &str) -> Option<&EnumDescriptor> {
        self.enums.get(full_name)
    }

    /// All registered message type names, in registration order.
    pub fn message_names(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(|s| s.as_str())
    }
}
