// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Per-field mapping state: cached descriptor metadata, precomputed
//! selectors, and the resolved link to a sub-message's mapper.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock, Weak};

use crate::core::{BigInt, MapperError, Result, Value};
use crate::schema::{DefaultValue, FieldDescriptor, FieldKind, Label};
use crate::wire::{Selector, WireType};

use super::Mapper;

/// Precomputed wire selectors for one field.
///
/// Computed once at mapper build time so neither traversal re-derives tag
/// keys per value.
#[derive(Debug, Clone, Copy)]
pub struct Selectors {
    /// Tag for one unpacked value of this field.
    pub value: Selector,
    /// Tag for a packed run, present when the field encodes packed.
    pub packed: Option<Selector>,
}

/// Enum metadata captured at build time.
#[derive(Debug, Clone)]
pub(crate) struct EnumInfo {
    /// The enum's declared default ordinal.
    pub default: i32,
    /// Valid ordinals; `None` when enum validation is disabled.
    pub valid: Option<HashSet<i32>>,
}

/// One field of a [`Mapper`]'s field table.
///
/// Owned by exactly one mapper. Message-typed fields hold a non-owning
/// reference to the target type's mapper, set in the registry's resolution
/// pass; the registry is the owner, which is what tolerates cyclic type
/// graphs.
pub struct Field {
    descriptor: FieldDescriptor,
    /// Container lookup key: field name, or `[qualified.name]` for extensions.
    key: String,
    /// `Type.field`, used in error messages.
    full_name: String,
    /// True only for optional, non-message, non-oneof fields.
    has_default: bool,
    /// Index of the containing oneof group, -1 if none.
    oneof_index: i32,
    enum_info: Option<EnumInfo>,
    selectors: Selectors,
    sub_mapper: OnceLock<Weak<Mapper>>,
}

impl Field {
    pub(crate) fn new(
        descriptor: FieldDescriptor,
        message_name: &str,
        enum_info: Option<EnumInfo>,
    ) -> Self {
        let key = match &descriptor.extension {
            Some(full) => format!("[{full}]"),
            None => descriptor.name.clone(),
        };
        let full_name = format!("{message_name}.{}", descriptor.name);
        let has_default =
            descriptor.label == Label::Optional && !descriptor.kind.is_message();
        let selectors = Selectors {
            value: Selector::new(descriptor.number, wire_type_for(&descriptor.kind)),
            packed: if descriptor.label == Label::Repeated
                && descriptor.packed
                && descriptor.kind.is_packable()
            {
                Some(Selector::new(descriptor.number, WireType::LengthDelimited))
            } else {
                None
            },
        };
        Self {
            descriptor,
            key,
            full_name,
            has_default,
            oneof_index: -1,
            enum_info,
            selectors,
            sub_mapper: OnceLock::new(),
        }
    }

    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn number(&self) -> u32 {
        self.descriptor.number
    }

    pub fn kind(&self) -> &FieldKind {
        &self.descriptor.kind
    }

    pub fn label(&self) -> Label {
        self.descriptor.label
    }

    pub fn is_repeated(&self) -> bool {
        self.descriptor.label == Label::Repeated
    }

    pub fn is_required(&self) -> bool {
        self.descriptor.label == Label::Required
    }

    pub fn has_default(&self) -> bool {
        self.has_default
    }

    pub fn oneof_index(&self) -> i32 {
        self.oneof_index
    }

    pub fn selectors(&self) -> &Selectors {
        &self.selectors
    }

    /// Whether encode emits this field as one packed run.
    pub fn encodes_packed(&self) -> bool {
        self.selectors.packed.is_some()
    }

    pub(crate) fn enum_info(&self) -> Option<&EnumInfo> {
        self.enum_info.as_ref()
    }

    /// Check a decoded enum ordinal. `true` when valid or validation is off.
    pub(crate) fn enum_ordinal_valid(&self, ordinal: i32) -> bool {
        match self.enum_info.as_ref().and_then(|info| info.valid.as_ref()) {
            Some(valid) => valid.contains(&ordinal),
            None => true,
        }
    }

    pub(crate) fn assign_oneof(&mut self, index: i32) {
        self.oneof_index = index;
        // Oneof members never get synthesized defaults.
        self.has_default = false;
    }

    pub(crate) fn link_sub_mapper(&self, mapper: &Arc<Mapper>) {
        let _ = self.sub_mapper.set(Arc::downgrade(mapper));
    }

    /// The resolved mapper of a message-typed field.
    pub fn sub_mapper(&self) -> Result<Arc<Mapper>> {
        self.sub_mapper
            .get()
            .and_then(Weak::upgrade)
            .ok_or_else(|| {
                MapperError::schema(
                    self.full_name.clone(),
                    "message field is not resolved to a mapper",
                )
            })
    }

    /// The synthesized default for this field's type.
    ///
    /// Declared defaults win; otherwise numeric zero, empty string/bytes, or
    /// the enum's first declared value. Message fields have no default.
    pub fn default_value(&self) -> Value {
        if let Some(default) = &self.descriptor.default {
            return match (default, &self.descriptor.kind) {
                (DefaultValue::Bool(b), _) => Value::Bool(*b),
                (DefaultValue::Int(i), FieldKind::Int64) => Value::Int64(*i),
                (DefaultValue::Int(i), FieldKind::Enum(_)) => Value::Int32(*i as i32),
                (DefaultValue::Int(i), _) => Value::Int32(*i as i32),
                (DefaultValue::UInt(u), FieldKind::UInt64) => Value::UInt64(*u),
                (DefaultValue::UInt(u), _) => Value::UInt32(*u as u32),
                (DefaultValue::Float(f), FieldKind::Float) => Value::Float32(*f as f32),
                (DefaultValue::Float(f), _) => Value::Float64(*f),
                (DefaultValue::String(s), _) => Value::String(s.clone()),
                (DefaultValue::Bytes(b), _) => Value::Bytes(b.clone()),
            };
        }
        match &self.descriptor.kind {
            FieldKind::Float => Value::Float32(0.0),
            FieldKind::Double => Value::Float64(0.0),
            FieldKind::Bool => Value::Bool(false),
            FieldKind::String => Value::String(String::new()),
            FieldKind::Bytes => Value::Bytes(Vec::new()),
            FieldKind::Message(_) => Value::Null,
            FieldKind::Enum(_) => Value::Int32(
                self.enum_info.as_ref().map(|info| info.default).unwrap_or(0),
            ),
            FieldKind::Int32 => Value::Int32(0),
            FieldKind::UInt32 => Value::UInt32(0),
            FieldKind::Int64 => Value::Int64(0),
            FieldKind::UInt64 => Value::UInt64(0),
        }
    }

    /// Coerce a caller-supplied value to this field's element type.
    ///
    /// Shared by the accessor and encode paths so direct manipulation and
    /// wire round-trips agree. Repeated fields coerce per element; this
    /// handles the element type.
    pub(crate) fn coerce(&self, value: Value) -> Result<Value> {
        let mismatch = |actual: &Value| {
            MapperError::type_mismatch(
                self.full_name.clone(),
                self.descriptor.kind.type_name(),
                actual.type_name(),
            )
        };
        match &self.descriptor.kind {
            FieldKind::Bool => match value_to_bool(&value) {
                Some(b) => Ok(Value::Bool(b)),
                None => Err(mismatch(&value)),
            },
            FieldKind::Int32 => match value.as_i64() {
                Some(i) => Ok(Value::Int32(i as i32)),
                None => Err(mismatch(&value)),
            },
            FieldKind::UInt32 => match value.as_u64() {
                Some(u) => Ok(Value::UInt32(u as u32)),
                None => Err(mismatch(&value)),
            },
            FieldKind::Int64 => match &value {
                Value::BigInt(_) => Ok(value),
                _ => match value.as_i64() {
                    Some(i) => Ok(Value::Int64(i)),
                    None => Err(mismatch(&value)),
                },
            },
            FieldKind::UInt64 => match &value {
                Value::BigInt(big) if !big.negative => Ok(value),
                _ => match value.as_u64() {
                    Some(u) => Ok(Value::UInt64(u)),
                    None => Err(mismatch(&value)),
                },
            },
            FieldKind::Float => match value.as_f64() {
                Some(f) => Ok(Value::Float32(f as f32)),
                None => Err(mismatch(&value)),
            },
            FieldKind::Double => match value.as_f64() {
                Some(f) => Ok(Value::Float64(f)),
                None => Err(mismatch(&value)),
            },
            FieldKind::Enum(_) => match value.as_i64() {
                Some(i) => {
                    let ordinal = i as i32;
                    if !self.enum_ordinal_valid(ordinal) {
                        return Err(MapperError::invalid_enum_value(
                            self.full_name.clone(),
                            ordinal,
                        ));
                    }
                    Ok(Value::Int32(ordinal))
                }
                None => Err(mismatch(&value)),
            },
            FieldKind::String => match value {
                Value::String(_) => Ok(value),
                other => Err(mismatch(&other)),
            },
            FieldKind::Bytes => match value {
                Value::Bytes(_) => Ok(value),
                Value::String(s) => Ok(Value::Bytes(s.into_bytes())),
                other => Err(mismatch(&other)),
            },
            FieldKind::Message(target) => match value {
                Value::Message(ref m) if m.type_name == *target => Ok(value),
                other => Err(mismatch(&other)),
            },
        }
    }
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("key", &self.key)
            .field("number", &self.descriptor.number)
            .field("kind", &self.descriptor.kind)
            .field("label", &self.descriptor.label)
            .field("oneof_index", &self.oneof_index)
            .finish()
    }
}

/// Wire type of one unpacked value of the given kind.
fn wire_type_for(kind: &FieldKind) -> WireType {
    match kind {
        FieldKind::Float => WireType::Fixed32,
        FieldKind::Double => WireType::Fixed64,
        FieldKind::Bool
        | FieldKind::Enum(_)
        | FieldKind::Int32
        | FieldKind::UInt32
        | FieldKind::Int64
        | FieldKind::UInt64 => WireType::Varint,
        FieldKind::String | FieldKind::Bytes | FieldKind::Message(_) => {
            WireType::LengthDelimited
        }
    }
}

/// Truthiness across the numeric kinds, for bool coercion.
fn value_to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Int32(i) => Some(*i != 0),
        Value::Int64(i) => Some(*i != 0),
        Value::UInt32(u) => Some(*u != 0),
        Value::UInt64(u) => Some(*u != 0),
        Value::BigInt(big) => Some(big.magnitude != 0),
        _ => None,
    }
}

/// Route a decoded 64-bit value through [`BigInt`] when it falls outside
/// the 32-bit native range.
pub(crate) fn widen_i64(value: i64, use_bigints: bool) -> Value {
    if use_bigints && (value < i64::from(i32::MIN) || value > i64::from(i32::MAX)) {
        Value::BigInt(BigInt::from_i64(value))
    } else {
        Value::Int64(value)
    }
}

/// Unsigned counterpart of [`widen_i64`].
pub(crate) fn widen_u64(value: u64, use_bigints: bool) -> Value {
    if use_bigints && value > u64::from(u32::MAX) {
        Value::BigInt(BigInt::from_u64(value))
    } else {
        Value::UInt64(value)
    }
}
