// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema mappers: per-message-type field tables driving decode and encode.
//!
//! A [`Mapper`] is built once per message type from its descriptor, resolved
//! against sibling mappers by the [`MapperRegistry`], and immutable from then
//! on. Decode and encode state is strictly per call; a resolved mapper is
//! safe to share read-only across threads.

pub mod accessor;
pub mod decode;
pub mod encode;
pub mod field;
pub mod registry;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::core::{MapperError, MessageValue, Result, Value};
use crate::schema::{DescriptorSet, FieldKind, MessageDescriptor};
use crate::wire::PushDecoder;

pub use accessor::FieldAccessor;
pub use field::Field;
pub use registry::MapperRegistry;

use field::EnumInfo;

/// Per-registry mapping options.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapperOptions {
    /// Materialize schema defaults for absent fields on decode.
    pub decode_explicit_defaults: bool,
    /// Reserved: always emit default-valued fields on encode.
    pub encode_defaults: bool,
    /// Validate enum ordinals on both paths.
    pub check_enum_values: bool,
    /// Enforce required-field presence on decode and encode.
    pub check_required_fields: bool,
    /// Surface 64-bit values outside the 32-bit range as [`crate::BigInt`].
    pub use_bigints: bool,
}

/// The field table and handlers for one message type.
pub struct Mapper {
    type_name: String,
    /// Fields in declaration order.
    fields: Vec<Field>,
    by_number: HashMap<u32, usize>,
    by_key: HashMap<String, usize>,
    oneof_count: usize,
    options: MapperOptions,
    /// True when the type has a required field and the option asks for the
    /// check, so the hot path tests one bool.
    check_required: bool,
}

impl Mapper {
    /// Build the field table for `descriptor`.
    ///
    /// Message-typed fields are left unresolved; the registry links them in
    /// a second pass once every mapper for the schema exists.
    pub(crate) fn build(
        descriptor: &MessageDescriptor,
        schema: &DescriptorSet,
        options: MapperOptions,
    ) -> Result<Self> {
        let type_name = descriptor.full_name.clone();
        let mut fields = Vec::with_capacity(descriptor.fields.len());
        let mut by_number = HashMap::with_capacity(descriptor.fields.len());
        let mut by_key = HashMap::with_capacity(descriptor.fields.len());

        for field_desc in &descriptor.fields {
            let enum_info = match &field_desc.kind {
                FieldKind::Enum(enum_name) => {
                    let en = schema.enum_type(enum_name).ok_or_else(|| {
                        MapperError::schema(
                            type_name.clone(),
                            format!(
                                "field '{}' references unknown enum '{enum_name}'",
                                field_desc.name
                            ),
                        )
                    })?;
                    Some(EnumInfo {
                        default: en.default_number(),
                        valid: options
                            .check_enum_values
                            .then(|| en.values.iter().map(|(_, n)| *n).collect()),
                    })
                }
                _ => None,
            };
            let field = Field::new(field_desc.clone(), &type_name, enum_info);
            let index = fields.len();
            if by_number.insert(field.number(), index).is_some() {
                return Err(MapperError::schema(
                    type_name.clone(),
                    format!("duplicate field number {}", field.number()),
                ));
            }
            if by_key.insert(field.key().to_string(), index).is_some() {
                return Err(MapperError::schema(
                    type_name.clone(),
                    format!("duplicate field key '{}'", field.key()),
                ));
            }
            fields.push(field);
        }

        // Oneof membership is assigned after the full field scan.
        for (oneof_index, oneof) in descriptor.oneofs.iter().enumerate() {
            for member in &oneof.fields {
                let index = *by_key.get(member.as_str()).ok_or_else(|| {
                    MapperError::schema(
                        type_name.clone(),
                        format!("oneof '{}' lists unknown field '{member}'", oneof.name),
                    )
                })?;
                fields[index].assign_oneof(oneof_index as i32);
            }
        }

        let check_required =
            options.check_required_fields && fields.iter().any(Field::is_required);
        debug!(
            type_name = %type_name,
            fields = fields.len(),
            oneofs = descriptor.oneofs.len(),
            "built mapper"
        );
        Ok(Self {
            type_name,
            fields,
            by_number,
            by_key,
            oneof_count: descriptor.oneofs.len(),
            options,
            check_required,
        })
    }

    /// Fully-qualified message type name this mapper serves.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub(crate) fn field_index_by_number(&self, number: u32) -> Option<usize> {
        self.by_number.get(&number).copied()
    }

    pub(crate) fn field_index_by_key(&self, key: &str) -> Option<usize> {
        self.by_key.get(key).copied()
    }

    /// Look up a field by its container key.
    pub fn field_by_key(&self, key: &str) -> Option<&Field> {
        self.field_index_by_key(key).map(|i| &self.fields[i])
    }

    pub(crate) fn oneof_count(&self) -> usize {
        self.oneof_count
    }

    pub fn options(&self) -> MapperOptions {
        self.options
    }

    pub(crate) fn check_required(&self) -> bool {
        self.check_required
    }

    /// Decode one wire-format message into a fresh dynamic tree.
    pub fn decode(self: &Arc<Self>, data: &[u8]) -> Result<Value> {
        let mut message = MessageValue::new(self.type_name.clone());
        self.decode_into(data, &mut message)?;
        Ok(Value::Message(message))
    }

    /// Decode into an existing container, merging field-by-field.
    ///
    /// Re-running decode against a populated container exercises protobuf
    /// merge semantics: scalar slots are overwritten by wire values,
    /// sub-message slots merge recursively, and default materialization
    /// leaves already-populated slots untouched. The container is only
    /// updated when the whole decode succeeds.
    pub fn decode_into(self: &Arc<Self>, data: &[u8], message: &mut MessageValue) -> Result<()> {
        let mut context = decode::DecodeContext::new(Arc::clone(self), message.clone());
        PushDecoder::new().decode(data, &mut context)?;
        *message = context.finish()?;
        Ok(())
    }

    /// Encode a dynamic tree into wire-format bytes.
    pub fn encode(self: &Arc<Self>, value: &Value) -> Result<Vec<u8>> {
        encode::encode(self, value)
    }

    /// Accessor for direct get/set manipulation of one field.
    pub fn field_accessor(&self, key: &str) -> Option<FieldAccessor<'_>> {
        self.field_index_by_key(key)
            .map(|index| FieldAccessor::new(self, index))
    }
}

impl std::fmt::Debug for Mapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapper")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields.len())
            .field("oneofs", &self.oneof_count)
            .finish()
    }
}
