// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Wire-format primitives and the decode event interface.

use crate::core::{MapperError, Result};

/// Protobuf wire types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    Fixed32 = 5,
}

impl WireType {
    /// Decode a wire type from the low three bits of a tag key.
    ///
    /// Group wire types (3 and 4) are rejected; groups are not supported.
    pub fn from_tag(tag: u64) -> Result<Self> {
        match tag & 0x7 {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::LengthDelimited),
            5 => Ok(WireType::Fixed32),
            other => Err(MapperError::malformed_wire(format!(
                "unsupported wire type {other}"
            ))),
        }
    }
}

/// A precomputed (field number, wire type) pair.
///
/// Selectors are the per-field handles computed once at mapper build time,
/// so encode and decode never re-derive tag keys per value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selector {
    pub number: u32,
    pub wire_type: WireType,
}

impl Selector {
    pub fn new(number: u32, wire_type: WireType) -> Self {
        Self { number, wire_type }
    }

    /// The encoded tag key for this selector.
    pub fn key(&self) -> u64 {
        (u64::from(self.number) << 3) | u64::from(self.wire_type as u8)
    }
}

/// How a length-delimited payload should be interpreted for a field.
///
/// The decoder is schema-blind; the sink answers this per field number so
/// the decoder knows whether to recurse, deliver bytes, or unroll a packed
/// run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimitedClass {
    /// Deliver the payload as byte chunks (string and bytes fields).
    Bytes,
    /// Recurse into the payload as a nested message.
    Message,
    /// Unroll the payload as a packed run of varints.
    PackedVarint,
    /// Unroll the payload as a packed run of 32-bit fixed values.
    PackedFixed32,
    /// Unroll the payload as a packed run of 64-bit fixed values.
    PackedFixed64,
    /// Field is unknown to the schema; skip the payload.
    Unknown,
}

/// Receiver for decode events pushed by [`crate::wire::PushDecoder`].
///
/// One scalar event fires per value, including each element of a packed
/// run. Nested messages are bracketed by `begin_message`/`end_message`;
/// string and bytes payloads are bracketed by `begin_bytes`/`end_bytes`
/// and may arrive in more than one chunk.
pub trait EventSink {
    /// Classify a length-delimited payload for the given field number.
    fn delimited_class(&self, number: u32) -> DelimitedClass;

    /// A varint value for the given field.
    fn on_varint(&mut self, number: u32, value: u64) -> Result<()>;

    /// A 32-bit fixed value for the given field.
    fn on_fixed32(&mut self, number: u32, value: u32) -> Result<()>;

    /// A 64-bit fixed value for the given field.
    fn on_fixed64(&mut self, number: u32, value: u64) -> Result<()>;

    /// Start of a string/bytes payload of the given total length.
    fn begin_bytes(&mut self, number: u32, len: usize) -> Result<()>;

    /// One chunk of the current string/bytes payload.
    fn bytes_chunk(&mut self, chunk: &[u8]) -> Result<()>;

    /// End of the current string/bytes payload.
    fn end_bytes(&mut self) -> Result<()>;

    /// Start of a nested message for the given field.
    fn begin_message(&mut self, number: u32) -> Result<()>;

    /// End of the innermost open nested message.
    fn end_message(&mut self) -> Result<()>;

    /// A field not covered by the schema; its payload was skipped.
    fn on_unknown(&mut self, _number: u32, _wire_type: WireType) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_key() {
        let sel = Selector::new(1, WireType::Varint);
        assert_eq!(sel.key(), 0x08);
        let sel = Selector::new(2, WireType::LengthDelimited);
        assert_eq!(sel.key(), 0x12);
        let sel = Selector::new(16, WireType::Fixed64);
        assert_eq!(sel.key(), 0x81);
    }

    #[test]
    fn test_wire_type_from_tag() {
        assert_eq!(WireType::from_tag(0x08).unwrap(), WireType::Varint);
        assert_eq!(WireType::from_tag(0x12).unwrap(), WireType::LengthDelimited);
        assert_eq!(WireType::from_tag(0x0D).unwrap(), WireType::Fixed32);
        assert!(WireType::from_tag(0x0B).is_err()); // start-group
        assert!(WireType::from_tag(0x0C).is_err()); // end-group
    }
}
