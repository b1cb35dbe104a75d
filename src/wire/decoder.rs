// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Push-mode wire decoder.
//!
//! The decoder walks a wire buffer and pushes typed events into an
//! [`EventSink`]. It carries no schema of its own: the sink classifies
//! length-delimited payloads per field number, which is what lets one
//! decoder serve strings, nested messages, and packed runs alike.

use tracing::trace;

use super::events::{DelimitedClass, EventSink, WireType};
use super::reader::WireReader;
use crate::core::{MapperError, Result};

/// Default bound on message nesting.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Schema-blind protobuf decoder that pushes events into a sink.
pub struct PushDecoder {
    max_depth: usize,
}

impl Default for PushDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PushDecoder {
    /// Create a decoder with the default nesting bound.
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Override the nesting bound.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Decode `data` as one message body, pushing events into `sink`.
    pub fn decode(&self, data: &[u8], sink: &mut dyn EventSink) -> Result<()> {
        self.decode_scope(data, sink, 0)
    }

    fn decode_scope(&self, data: &[u8], sink: &mut dyn EventSink, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(MapperError::malformed_wire(format!(
                "message nesting exceeds {} levels",
                self.max_depth
            )));
        }

        let mut reader = WireReader::new(data);
        while !reader.is_empty() {
            let (number, wire_type) = reader.read_key()?;
            match wire_type {
                WireType::Varint => {
                    let value = reader.read_varint()?;
                    sink.on_varint(number, value)?;
                }
                WireType::Fixed32 => {
                    let value = reader.read_fixed32()?;
                    sink.on_fixed32(number, value)?;
                }
                WireType::Fixed64 => {
                    let value = reader.read_fixed64()?;
                    sink.on_fixed64(number, value)?;
                }
                WireType::LengthDelimited => {
                    let len = usize::try_from(reader.read_varint()?).map_err(|_| {
                        MapperError::malformed_wire("length-delimited size overflows usize")
                    })?;
                    let payload = reader.read_slice(len)?;
                    self.decode_delimited(number, payload, sink, depth)?;
                }
            }
        }
        Ok(())
    }

    fn decode_delimited(
        &self,
        number: u32,
        payload: &[u8],
        sink: &mut dyn EventSink,
        depth: usize,
    ) -> Result<()> {
        match sink.delimited_class(number) {
            DelimitedClass::Bytes => {
                sink.begin_bytes(number, payload.len())?;
                if !payload.is_empty() {
                    sink.bytes_chunk(payload)?;
                }
                sink.end_bytes()
            }
            DelimitedClass::Message => {
                sink.begin_message(number)?;
                self.decode_scope(payload, sink, depth + 1)?;
                sink.end_message()
            }
            DelimitedClass::PackedVarint => {
                let mut reader = WireReader::new(payload);
                while !reader.is_empty() {
                    let value = reader.read_varint()?;
                    sink.on_varint(number, value)?;
                }
                Ok(())
            }
            DelimitedClass::PackedFixed32 => {
                let mut reader = WireReader::new(payload);
                while !reader.is_empty() {
                    let value = reader.read_fixed32()?;
                    sink.on_fixed32(number, value)?;
                }
                Ok(())
            }
            DelimitedClass::PackedFixed64 => {
                let mut reader = WireReader::new(payload);
                while !reader.is_empty() {
                    let value = reader.read_fixed64()?;
                    sink.on_fixed64(number, value)?;
                }
                Ok(())
            }
            DelimitedClass::Unknown => {
                trace!(number, len = payload.len(), "skipping unknown field");
                sink.on_unknown(number, WireType::LengthDelimited)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sink that records events as strings for assertion.
    struct RecordingSink {
        events: Vec<String>,
        message_fields: Vec<u32>,
        bytes_fields: Vec<u32>,
        packed_varint_fields: Vec<u32>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                events: Vec::new(),
                message_fields: Vec::new(),
                bytes_fields: Vec::new(),
                packed_varint_fields: Vec::new(),
            }
        }
    }

    impl EventSink for RecordingSink {
        fn delimited_class(&self, number: u32) -> DelimitedClass {
            if self.message_fields.contains(&number) {
                DelimitedClass::Message
            } else if self.bytes_fields.contains(&number) {
                DelimitedClass::Bytes
            } else if self.packed_varint_fields.contains(&number) {
                DelimitedClass::PackedVarint
            } else {
                DelimitedClass::Unknown
            }
        }

        fn on_varint(&mut self, number: u32, value: u64) -> Result<()> {
            self.events.push(format!("varint {number} {value}"));
            Ok(())
        }

        fn on_fixed32(&mut self, number: u32, value: u32) -> Result<()> {
            self.events.push(format!("fixed32 {number} {value}"));
            Ok(())
        }

        fn on_fixed64(&mut self, number: u32, value: u64) -> Result<()> {
            self.events.push(format!("fixed64 {number} {value}"));
            Ok(())
        }

        fn begin_bytes(&mut self, number: u32, len: usize) -> Result<()> {
            self.events.push(format!("begin_bytes {number} {len}"));
            Ok(())
        }

        fn bytes_chunk(&mut self, chunk: &[u8]) -> Result<()> {
            self.events.push(format!("chunk {}", chunk.len()));
            Ok(())
        }

        fn end_bytes(&mut self) -> Result<()> {
            self.events.push("end_bytes".to_string());
            Ok(())
        }

        fn begin_message(&mut self, number: u32) -> Result<()> {
            self.events.push(format!("begin_message {number}"));
            Ok(())
        }

        fn end_message(&mut self) -> Result<()> {
            self.events.push("end_message".to_string());
            Ok(())
        }

        fn on_unknown(&mut self, number: u32, _wire_type: WireType) -> Result<()> {
            self.events.push(format!("unknown {number}"));
            Ok(())
        }
    }

    #[test]
    fn test_scalar_events() {
        // field 1 varint 150, field 2 fixed32 1
        let data = [0x08, 0x96, 0x01, 0x15, 0x01, 0x00, 0x00, 0x00];
        let mut sink = RecordingSink::new();
        PushDecoder::new().decode(&data, &mut sink).unwrap();
        assert_eq!(sink.events, vec!["varint 1 150", "fixed32 2 1"]);
    }

    #[test]
    fn test_string_events() {
        // field 1, "hi"
        let data = [0x0A, 0x02, b'h', b'i'];
        let mut sink = RecordingSink::new();
        sink.bytes_fields.push(1);
        PushDecoder::new().decode(&data, &mut sink).unwrap();
        assert_eq!(sink.events, vec!["begin_bytes 1 2", "chunk 2", "end_bytes"]);
    }

    #[test]
    fn test_nested_message_events() {
        // field 3 { field 1 varint 7 }
        let data = [0x1A, 0x02, 0x08, 0x07];
        let mut sink = RecordingSink::new();
        sink.message_fields.push(3);
        PushDecoder::new().decode(&data, &mut sink).unwrap();
        assert_eq!(
            sink.events,
            vec!["begin_message 3", "varint 1 7", "end_message"]
        );
    }

    #[test]
    fn test_packed_run_unrolled() {
        // field 4 packed [3, 270]
        let data = [0x22, 0x03, 0x03, 0x8E, 0x02];
        let mut sink = RecordingSink::new();
        sink.packed_varint_fields.push(4);
        PushDecoder::new().decode(&data, &mut sink).unwrap();
        assert_eq!(sink.events, vec!["varint 4 3", "varint 4 270"]);
    }

    #[test]
    fn test_unknown_delimited_skipped() {
        let data = [0x3A, 0x03, 0x01, 0x02, 0x03, 0x08, 0x05];
        let mut sink = RecordingSink::new();
        PushDecoder::new().decode(&data, &mut sink).unwrap();
        assert_eq!(sink.events, vec!["unknown 7", "varint 1 5"]);
    }

    #[test]
    fn test_truncated_payload_fails() {
        let data = [0x0A, 0x05, b'h', b'i'];
        let mut sink = RecordingSink::new();
        sink.bytes_fields.push(1);
        assert!(PushDecoder::new().decode(&data, &mut sink).is_err());
    }

    #[test]
    fn test_depth_guard() {
        // field 1 as message nested three deep
        let data = [0x0A, 0x04, 0x0A, 0x02, 0x0A, 0x00];
        let mut sink = RecordingSink::new();
        sink.message_fields.push(1);
        let decoder = PushDecoder::new().with_max_depth(3);
        assert!(decoder.decode(&data, &mut sink).is_ok());
        let decoder = PushDecoder::new().with_max_depth(2);
        let mut sink2 = RecordingSink::new();
        sink2.message_fields.push(1);
        assert!(decoder.decode(&data, &mut sink2).is_err());
    }
}
