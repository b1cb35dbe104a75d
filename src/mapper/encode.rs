// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Encode traversal: walks a dynamic tree in declared field order and
//! emits wire bytes.
//!
//! Iteration follows the mapper's field sequence, not the container's key
//! order, so wire output is deterministic for any insertion history.

use std::sync::Arc;

use crate::core::{MapperError, MessageValue, Result, Value};
use crate::schema::FieldKind;
use crate::wire::WireWriter;

use super::field::Field;
use super::Mapper;

/// Encode one dynamic tree against its mapper.
pub(crate) fn encode(mapper: &Arc<Mapper>, value: &Value) -> Result<Vec<u8>> {
    let message = value.as_message().ok_or_else(|| {
        MapperError::type_mismatch(mapper.type_name(), "message", value.type_name())
    })?;
    let mut writer = WireWriter::new();
    encode_message(mapper, message, &mut writer)?;
    writer.into_bytes()
}

fn encode_message(
    mapper: &Arc<Mapper>,
    message: &MessageValue,
    writer: &mut WireWriter,
) -> Result<()> {
    // One slot per oneof group; declared order decides which populated
    // member wins if a container somehow holds more than one.
    let mut oneof_emitted = vec![false; mapper.oneof_count()];

    for field in mapper.fields() {
        let Some(value) = message.fields.get(field.key()) else {
            if field.is_required() && mapper.check_required() {
                return Err(MapperError::required_field_missing(field.full_name()));
            }
            continue;
        };
        let group = field.oneof_index();
        if group >= 0 {
            let group = group as usize;
            if oneof_emitted[group] {
                continue;
            }
            oneof_emitted[group] = true;
        }
        if field.is_repeated() {
            encode_repeated(field, value, writer)?;
        } else {
            encode_single(field, value, writer)?;
        }
    }
    Ok(())
}

fn encode_repeated(field: &Field, value: &Value, writer: &mut WireWriter) -> Result<()> {
    let items = value.as_list().ok_or_else(|| {
        MapperError::type_mismatch(field.full_name(), "list", value.type_name())
    })?;
    if field.encodes_packed() {
        if items.is_empty() {
            return Ok(());
        }
        writer.begin_scope(field.number());
        for item in items {
            put_bare(field, item, writer)?;
        }
        writer.end_scope()
    } else {
        for item in items {
            encode_single(field, item, writer)?;
        }
        Ok(())
    }
}

fn encode_single(field: &Field, value: &Value, writer: &mut WireWriter) -> Result<()> {
    match field.kind() {
        FieldKind::String => {
            let text = value.as_str().ok_or_else(|| {
                MapperError::type_mismatch(field.full_name(), "string", value.type_name())
            })?;
            writer.put_bytes(field.number(), text.as_bytes());
            Ok(())
        }
        FieldKind::Bytes => {
            let data = value.as_bytes().ok_or_else(|| {
                MapperError::type_mismatch(field.full_name(), "bytes", value.type_name())
            })?;
            writer.put_bytes(field.number(), data);
            Ok(())
        }
        FieldKind::Message(_) => {
            let child = value.as_message().ok_or_else(|| {
                MapperError::type_mismatch(field.full_name(), "message", value.type_name())
            })?;
            let sub_mapper = field.sub_mapper()?;
            writer.begin_scope(field.number());
            encode_message(&sub_mapper, child, writer)?;
            writer.end_scope()
        }
        _ => {
            let bits = scalar_bits(field, value)?;
            writer.put_key(field.selectors().value);
            match bits {
                WireScalar::Varint(v) => writer.put_bare_varint(v),
                WireScalar::Fixed32(v) => writer.put_bare_fixed32(v),
                WireScalar::Fixed64(v) => writer.put_bare_fixed64(v),
            }
            Ok(())
        }
    }
}

/// Packed-run element: same coercion as keyed emission, bare on the wire.
fn put_bare(field: &Field, value: &Value, writer: &mut WireWriter) -> Result<()> {
    match scalar_bits(field, value)? {
        WireScalar::Varint(v) => writer.put_bare_varint(v),
        WireScalar::Fixed32(v) => writer.put_bare_fixed32(v),
        WireScalar::Fixed64(v) => writer.put_bare_fixed64(v),
    }
    Ok(())
}

enum WireScalar {
    Varint(u64),
    Fixed32(u32),
    Fixed64(u64),
}

/// Coerce one scalar value to its wire representation.
///
/// Out-of-native-range 64-bit values arrive as [`crate::BigInt`]; sign and
/// magnitude are taken from that representation directly instead of going
/// through a native conversion.
fn scalar_bits(field: &Field, value: &Value) -> Result<WireScalar> {
    let mismatch = || {
        MapperError::type_mismatch(
            field.full_name(),
            field.kind().type_name(),
            value.type_name(),
        )
    };
    match field.kind() {
        FieldKind::Bool => {
            let b = match value {
                Value::Bool(b) => *b,
                other => other.as_i64().ok_or_else(mismatch)? != 0,
            };
            Ok(WireScalar::Varint(u64::from(b)))
        }
        FieldKind::Int32 => {
            let v = value.as_i64().ok_or_else(mismatch)?;
            // Negative int32 values go out sign-extended to 64 bits.
            Ok(WireScalar::Varint((v as i32) as i64 as u64))
        }
        FieldKind::UInt32 => {
            let v = value.as_u64().ok_or_else(mismatch)?;
            Ok(WireScalar::Varint(u64::from(v as u32)))
        }
        FieldKind::Int64 => match value {
            Value::BigInt(big) => Ok(WireScalar::Varint(big.to_bits())),
            other => Ok(WireScalar::Varint(other.as_i64().ok_or_else(mismatch)? as u64)),
        },
        FieldKind::UInt64 => {
            let v = value.as_u64().ok_or_else(mismatch)?;
            Ok(WireScalar::Varint(v))
        }
        FieldKind::Enum(_) => {
            let ordinal = value.as_i64().ok_or_else(mismatch)? as i32;
            if !field.enum_ordinal_valid(ordinal) {
                return Err(MapperError::invalid_enum_value(field.full_name(), ordinal));
            }
            Ok(WireScalar::Varint(ordinal as i64 as u64))
        }
        FieldKind::Float => {
            let f = value.as_f64().ok_or_else(mismatch)?;
            Ok(WireScalar::Fixed32((f as f32).to_bits()))
        }
        FieldKind::Double => {
            let f = value.as_f64().ok_or_else(mismatch)?;
            Ok(WireScalar::Fixed64(f.to_bits()))
        }
        FieldKind::String | FieldKind::Bytes | FieldKind::Message(_) => Err(mismatch()),
    }
}
