// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decode state machine: assembles a dynamic tree from wire events.
//!
//! The context is a stack of message frames, one per open message. Each
//! frame tracks which fields have been seen and which member of each oneof
//! group was set last. Closing a frame runs default materialization and the
//! required-field check against that frame, so nested messages complete
//! their checks before their parents do.

use std::sync::Arc;

use tracing::trace;

use crate::core::{MapperError, MessageValue, Result, Value};
use crate::schema::FieldKind;
use crate::wire::{DelimitedClass, EventSink, WireType};

use super::field::{widen_i64, widen_u64};
use super::Mapper;

/// One open message: the container under construction and its seen state.
struct Frame {
    mapper: Arc<Mapper>,
    value: MessageValue,
    seen: Vec<bool>,
    /// Last-set field index per oneof group, -1 when none. Empty when the
    /// message has no oneofs.
    oneof_last: Vec<i32>,
    /// Field index in the parent frame this message belongs to. None for
    /// the root frame.
    parent_field: Option<usize>,
}

impl Frame {
    fn new(mapper: Arc<Mapper>, value: MessageValue, parent_field: Option<usize>) -> Self {
        let field_count = mapper.fields().len();
        let oneof_count = mapper.oneof_count();
        Self {
            mapper,
            value,
            seen: vec![false; field_count],
            oneof_last: vec![-1; oneof_count],
            parent_field,
        }
    }
}

/// In-progress string/bytes payload, accumulated across chunks.
struct BytesAccum {
    field_index: usize,
    data: Vec<u8>,
}

/// Per-call decode state machine; implements [`EventSink`].
pub(crate) struct DecodeContext {
    frames: Vec<Frame>,
    bytes: Option<BytesAccum>,
}

impl DecodeContext {
    pub(crate) fn new(mapper: Arc<Mapper>, target: MessageValue) -> Self {
        let root = Frame::new(mapper, target, None);
        Self {
            frames: vec![root],
            bytes: None,
        }
    }

    /// Close the root frame and hand back the finished container.
    pub(crate) fn finish(mut self) -> Result<MessageValue> {
        if self.frames.len() != 1 {
            return Err(MapperError::malformed_wire("unclosed nested message"));
        }
        let mut root = self
            .frames
            .pop()
            .ok_or_else(|| MapperError::Other("decode context has no root frame".to_string()))?;
        close_frame(&mut root)?;
        Ok(root.value)
    }

    fn frame(&self) -> &Frame {
        // frames is never empty between new() and finish()
        self.frames.last().unwrap_or_else(|| unreachable!())
    }

    fn frame_mut(&mut self) -> &mut Frame {
        self.frames.last_mut().unwrap_or_else(|| unreachable!())
    }

    /// Mark a field seen and displace any previously-set oneof sibling.
    fn mark_seen(&mut self, index: usize) {
        let frame = self.frame_mut();
        frame.seen[index] = true;
        let group = frame.mapper.fields()[index].oneof_index();
        if group >= 0 {
            let group = group as usize;
            let last = frame.oneof_last[group];
            if last >= 0 && last as usize != index {
                let displaced = last as usize;
                let key = frame.mapper.fields()[displaced].key().to_string();
                frame.value.fields.shift_remove(&key);
                frame.seen[displaced] = false;
            }
            frame.oneof_last[group] = index as i32;
        }
    }

    /// Write a decoded value into the field's slot: next list slot for
    /// repeated fields, keyed slot otherwise.
    fn store(&mut self, index: usize, value: Value) -> Result<()> {
        self.mark_seen(index);
        let frame = self.frame_mut();
        let field = &frame.mapper.fields()[index];
        let key = field.key().to_string();
        if field.is_repeated() {
            let slot = frame
                .value
                .fields
                .entry(key)
                .or_insert_with(|| Value::List(Vec::new()));
            match slot.as_list_mut() {
                Some(list) => list.push(value),
                None => {
                    return Err(MapperError::type_mismatch(
                        field.full_name(),
                        "list",
                        slot.type_name(),
                    ))
                }
            }
        } else {
            frame.value.fields.insert(key, value);
        }
        Ok(())
    }
}

impl EventSink for DecodeContext {
    fn delimited_class(&self, number: u32) -> DelimitedClass {
        let frame = self.frame();
        let Some(index) = frame.mapper.field_index_by_number(number) else {
            return DelimitedClass::Unknown;
        };
        let field = &frame.mapper.fields()[index];
        match field.kind() {
            FieldKind::String | FieldKind::Bytes => DelimitedClass::Bytes,
            FieldKind::Message(_) => DelimitedClass::Message,
            // A delimited payload on a numeric field is a packed run.
            FieldKind::Float => DelimitedClass::PackedFixed32,
            FieldKind::Double => DelimitedClass::PackedFixed64,
            FieldKind::Bool
            | FieldKind::Enum(_)
            | FieldKind::Int32
            | FieldKind::UInt32
            | FieldKind::Int64
            | FieldKind::UInt64 => DelimitedClass::PackedVarint,
        }
    }

    fn on_varint(&mut self, number: u32, raw: u64) -> Result<()> {
        // Decode under the shared frame borrow, store after it ends.
        let (index, decoded) = {
            let frame = self.frame();
            let Some(index) = frame.mapper.field_index_by_number(number) else {
                trace!(number, "ignoring unknown varint field");
                return Ok(());
            };
            let options = frame.mapper.options();
            let field = &frame.mapper.fields()[index];
            let decoded = match field.kind() {
                FieldKind::Bool => Some(Value::Bool(raw != 0)),
                FieldKind::Int32 => Some(Value::Int32(raw as i32)),
                FieldKind::UInt32 => Some(Value::UInt32(raw as u32)),
                FieldKind::Int64 => Some(widen_i64(raw as i64, options.use_bigints)),
                FieldKind::UInt64 => Some(widen_u64(raw, options.use_bigints)),
                FieldKind::Enum(_) => {
                    let ordinal = raw as i32;
                    if field.enum_ordinal_valid(ordinal) {
                        Some(Value::Int32(ordinal))
                    } else if field.is_repeated() {
                        // Unknown ordinals are dropped rather than failed,
                        // so newer writers stay readable. Inside a list the
                        // slot still has to exist, so the declared default
                        // fills it; singular fields stay unseen and pick up
                        // their default at message close.
                        Some(field.default_value())
                    } else {
                        trace!(
                            field = field.full_name(),
                            ordinal,
                            "dropping invalid enum ordinal"
                        );
                        None
                    }
                }
                other => {
                    return Err(MapperError::malformed_wire(format!(
                        "varint data for {} field '{}'",
                        other.type_name(),
                        field.full_name()
                    )))
                }
            };
            (index, decoded)
        };
        match decoded {
            Some(value) => self.store(index, value),
            None => Ok(()),
        }
    }

    fn on_fixed32(&mut self, number: u32, raw: u32) -> Result<()> {
        let index = {
            let frame = self.frame();
            let Some(index) = frame.mapper.field_index_by_number(number) else {
                return Ok(());
            };
            let field = &frame.mapper.fields()[index];
            if !matches!(field.kind(), FieldKind::Float) {
                return Err(MapperError::malformed_wire(format!(
                    "fixed32 data for {} field '{}'",
                    field.kind().type_name(),
                    field.full_name()
                )));
            }
            index
        };
        self.store(index, Value::Float32(f32::from_bits(raw)))
    }

    fn on_fixed64(&mut self, number: u32, raw: u64) -> Result<()> {
        let index = {
            let frame = self.frame();
            let Some(index) = frame.mapper.field_index_by_number(number) else {
                return Ok(());
            };
            let field = &frame.mapper.fields()[index];
            if !matches!(field.kind(), FieldKind::Double) {
                return Err(MapperError::malformed_wire(format!(
                    "fixed64 data for {} field '{}'",
                    field.kind().type_name(),
                    field.full_name()
                )));
            }
            index
        };
        self.store(index, Value::Float64(f64::from_bits(raw)))
    }

    fn begin_bytes(&mut self, number: u32, len: usize) -> Result<()> {
        if self.bytes.is_some() {
            return Err(MapperError::malformed_wire("nested string payload"));
        }
        let frame = self.frame();
        let Some(index) = frame.mapper.field_index_by_number(number) else {
            return Ok(());
        };
        self.bytes = Some(BytesAccum {
            field_index: index,
            data: Vec::with_capacity(len),
        });
        Ok(())
    }

    fn bytes_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        if let Some(accum) = self.bytes.as_mut() {
            accum.data.extend_from_slice(chunk);
        }
        Ok(())
    }

    fn end_bytes(&mut self) -> Result<()> {
        let Some(accum) = self.bytes.take() else {
            return Ok(());
        };
        let field = &self.frame().mapper.fields()[accum.field_index];
        let value = match field.kind() {
            FieldKind::String => {
                let text = String::from_utf8(accum.data).map_err(|_| {
                    MapperError::malformed_wire(format!(
                        "invalid UTF-8 in string field '{}'",
                        field.full_name()
                    ))
                })?;
                Value::String(text)
            }
            _ => Value::Bytes(accum.data),
        };
        self.store(accum.field_index, value)
    }

    fn begin_message(&mut self, number: u32) -> Result<()> {
        let frame = self.frame();
        let Some(index) = frame.mapper.field_index_by_number(number) else {
            return Err(MapperError::malformed_wire(format!(
                "message payload for unknown field {number}"
            )));
        };
        self.mark_seen(index);

        let frame = self.frame_mut();
        let field = &frame.mapper.fields()[index];
        let sub_mapper = field.sub_mapper()?;
        let child = if field.is_repeated() {
            // Repeated sub-messages never merge; each occurrence is a new
            // element, appended when the frame closes.
            MessageValue::new(sub_mapper.type_name().to_string())
        } else {
            // A re-occurring singular sub-message merges into the existing
            // container, so take it out of the slot while it is open.
            match frame.value.fields.shift_remove(field.key()) {
                Some(Value::Message(existing)) => existing,
                Some(other) => {
                    return Err(MapperError::type_mismatch(
                        field.full_name(),
                        "message",
                        other.type_name(),
                    ))
                }
                None => MessageValue::new(sub_mapper.type_name().to_string()),
            }
        };
        self.frames.push(Frame::new(sub_mapper, child, Some(index)));
        Ok(())
    }

    fn end_message(&mut self) -> Result<()> {
        // The root frame is only closed by finish().
        if self.frames.len() <= 1 {
            return Err(MapperError::malformed_wire("unbalanced end of message"));
        }
        let mut closing = self
            .frames
            .pop()
            .ok_or_else(|| MapperError::malformed_wire("unbalanced end of message"))?;
        let Some(parent_field) = closing.parent_field else {
            return Err(MapperError::malformed_wire("end of message at top level"));
        };
        close_frame(&mut closing)?;

        let parent = self.frame_mut();
        let field = &parent.mapper.fields()[parent_field];
        let key = field.key().to_string();
        let value = Value::Message(closing.value);
        if field.is_repeated() {
            let slot = parent
                .value
                .fields
                .entry(key)
                .or_insert_with(|| Value::List(Vec::new()));
            match slot.as_list_mut() {
                Some(list) => list.push(value),
                None => {
                    return Err(MapperError::type_mismatch(
                        field.full_name(),
                        "list",
                        slot.type_name(),
                    ))
                }
            }
        } else {
            parent.value.fields.insert(key, value);
        }
        Ok(())
    }

    fn on_unknown(&mut self, number: u32, _wire_type: WireType) -> Result<()> {
        trace!(number, "skipped unknown field");
        Ok(())
    }
}

/// End-of-message processing: default materialization, then the
/// required-field check, both driven by the frame's seen bitmap.
fn close_frame(frame: &mut Frame) -> Result<()> {
    let options = frame.mapper.options();
    if options.decode_explicit_defaults {
        for (index, field) in frame.mapper.fields().iter().enumerate() {
            if frame.seen[index] || !field.has_default() {
                continue;
            }
            // A slot populated by an earlier decode pass into the same
            // container is left alone; defaults only fill true absences.
            if frame.value.fields.contains_key(field.key()) {
                continue;
            }
            frame
                .value
                .fields
                .insert(field.key().to_string(), field.default_value());
        }
    }
    if frame.mapper.check_required() {
        for (index, field) in frame.mapper.fields().iter().enumerate() {
            if field.is_required() && !frame.seen[index] {
                return Err(MapperError::required_field_missing(field.full_name()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::{MapperOptions, MapperRegistry};
    use crate::schema::{DescriptorSet, FieldDescriptor, FieldKind, MessageDescriptor};

    fn context_for(type_name: &str) -> DecodeContext {
        let mut schema = DescriptorSet::new();
        schema.add_message(
            MessageDescriptor::new("t.M")
                .field(FieldDescriptor::new("text", 1, FieldKind::String))
                .field(FieldDescriptor::new("raw", 2, FieldKind::Bytes))
                .field(FieldDescriptor::new("a", 3, FieldKind::Int32))
                .field(FieldDescriptor::new("b", 4, FieldKind::Int32))
                .oneof("pick", &["a", "b"]),
        );
        let registry = MapperRegistry::new(schema, MapperOptions::default());
        let mapper = registry.mapper_for(type_name).unwrap();
        let target = MessageValue::new(type_name.to_string());
        DecodeContext::new(mapper, target)
    }

    #[test]
    fn test_string_assembled_from_chunks() {
        let mut ctx = context_for("t.M");
        ctx.begin_bytes(1, 10).unwrap();
        ctx.bytes_chunk(b"hello").unwrap();
        ctx.bytes_chunk(b" ").unwrap();
        ctx.bytes_chunk(b"world").unwrap();
        ctx.end_bytes().unwrap();
        let message = ctx.finish().unwrap();
        assert_eq!(
            message.fields["text"],
            Value::String("hello world".to_string())
        );
    }

    #[test]
    fn test_bytes_field_skips_utf8_validation() {
        let mut ctx = context_for("t.M");
        ctx.begin_bytes(2, 2).unwrap();
        ctx.bytes_chunk(&[0xFF, 0xFE]).unwrap();
        ctx.end_bytes().unwrap();
        let message = ctx.finish().unwrap();
        assert_eq!(message.fields["raw"], Value::Bytes(vec![0xFF, 0xFE]));
    }

    #[test]
    fn test_oneof_displacement_removes_earlier_member() {
        let mut ctx = context_for("t.M");
        ctx.on_varint(3, 1).unwrap();
        ctx.on_varint(4, 2).unwrap();
        ctx.on_varint(3, 3).unwrap();
        let message = ctx.finish().unwrap();
        assert!(!message.fields.contains_key("b"));
        assert_eq!(message.fields["a"], Value::Int32(3));
    }

    #[test]
    fn test_unbalanced_end_message_rejected() {
        let mut ctx = context_for("t.M");
        assert!(ctx.end_message().is_err());
    }
}
