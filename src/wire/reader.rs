// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Byte-level cursor over protobuf wire data.

use byteorder::{ByteOrder, LittleEndian};

use crate::core::{MapperError, Result};

/// Maximum number of bytes a well-formed varint may occupy.
const MAX_VARINT_BYTES: usize = 10;

/// Forward-only cursor over a wire-format buffer.
///
/// The cursor tracks a read position and fails with
/// [`MapperError::MalformedWire`] on any read past the end of the buffer.
pub struct WireReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> WireReader<'a> {
    /// Create a cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Check if the cursor has consumed the whole buffer.
    pub fn is_empty(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Current read position.
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Read one base-128 varint.
    pub fn read_varint(&mut self) -> Result<u64> {
        let mut value: u64 = 0;
        let mut shift = 0u32;
        for count in 0..MAX_VARINT_BYTES {
            let byte = self.read_byte()?;
            // The tenth byte may only carry the final bit of a 64-bit value.
            if count == MAX_VARINT_BYTES - 1 && byte > 0x01 {
                return Err(MapperError::malformed_wire("varint overflows 64 bits"));
            }
            value |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
        Err(MapperError::malformed_wire("varint exceeds 10 bytes"))
    }

    /// Read a little-endian 32-bit fixed value.
    pub fn read_fixed32(&mut self) -> Result<u32> {
        let bytes = self.read_slice(4)?;
        Ok(LittleEndian::read_u32(bytes))
    }

    /// Read a little-endian 64-bit fixed value.
    pub fn read_fixed64(&mut self) -> Result<u64> {
        let bytes = self.read_slice(8)?;
        Ok(LittleEndian::read_u64(bytes))
    }

    /// Read a tag key and split it into field number and wire type.
    pub fn read_key(&mut self) -> Result<(u32, super::WireType)> {
        let tag = self.read_varint()?;
        let number = u32::try_from(tag >> 3)
            .map_err(|_| MapperError::malformed_wire("field number overflows 32 bits"))?;
        if number == 0 {
            return Err(MapperError::malformed_wire("field number 0 is invalid"));
        }
        let wire_type = super::WireType::from_tag(tag)?;
        Ok((number, wire_type))
    }

    /// Borrow the next `len` bytes and advance past them.
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(MapperError::malformed_wire(format!(
                "need {len} bytes at offset {}, only {} remain",
                self.offset,
                self.remaining()
            )));
        }
        let slice = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn read_byte(&mut self) -> Result<u8> {
        if self.is_empty() {
            return Err(MapperError::malformed_wire("unexpected end of input"));
        }
        let byte = self.data[self.offset];
        self.offset += 1;
        Ok(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_varint_single_byte() {
        let mut reader = WireReader::new(&[0x2A]);
        assert_eq!(reader.read_varint().unwrap(), 42);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_read_varint_multi_byte() {
        // 300 = 0b1_0010_1100
        let mut reader = WireReader::new(&[0xAC, 0x02]);
        assert_eq!(reader.read_varint().unwrap(), 300);
    }

    #[test]
    fn test_read_varint_max_u64() {
        let mut reader = WireReader::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]);
        assert_eq!(reader.read_varint().unwrap(), u64::MAX);
    }

    #[test]
    fn test_read_varint_overflow() {
        let mut reader = WireReader::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F]);
        assert!(reader.read_varint().is_err());
    }

    #[test]
    fn test_read_varint_truncated() {
        let mut reader = WireReader::new(&[0x80]);
        assert!(reader.read_varint().is_err());
    }

    #[test]
    fn test_read_fixed() {
        let mut reader = WireReader::new(&[0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(reader.read_fixed32().unwrap(), 1);
        assert_eq!(reader.read_fixed64().unwrap(), 2);
        assert!(reader.read_fixed32().is_err());
    }

    #[test]
    fn test_read_key() {
        let mut reader = WireReader::new(&[0x08]);
        let (number, wire_type) = reader.read_key().unwrap();
        assert_eq!(number, 1);
        assert_eq!(wire_type, crate::wire::WireType::Varint);
    }

    #[test]
    fn test_read_key_field_zero_rejected() {
        let mut reader = WireReader::new(&[0x00]);
        assert!(reader.read_key().is_err());
    }
}
