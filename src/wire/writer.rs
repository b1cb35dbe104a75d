// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Wire-format writer with nested length-delimited scopes.

use byteorder::{ByteOrder, LittleEndian};

use super::events::{Selector, WireType};
use crate::core::{MapperError, Result};

/// Append-only wire writer.
///
/// Nested messages and packed runs are written as scopes: `begin_scope`
/// emits the tag key and remembers the payload start, `end_scope` patches
/// the varint length in once the payload size is known. Scopes nest; the
/// writer refuses to hand out its buffer while any scope is open.
pub struct WireWriter {
    buf: Vec<u8>,
    scopes: Vec<usize>,
}

impl Default for WireWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl WireWriter {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            scopes: Vec::new(),
        }
    }

    /// Bytes written so far, across all open scopes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Open a length-delimited scope for the given field number.
    pub fn begin_scope(&mut self, number: u32) {
        self.put_key(Selector::new(number, WireType::LengthDelimited));
        self.scopes.push(self.buf.len());
    }

    /// Close the innermost scope, patching its length prefix in.
    pub fn end_scope(&mut self) -> Result<()> {
        let start = self
            .scopes
            .pop()
            .ok_or_else(|| MapperError::encode("end_scope with no open scope"))?;
        let len = (self.buf.len() - start) as u64;
        let mut prefix = [0u8; 10];
        let prefix_len = encode_varint(len, &mut prefix);
        self.buf
            .splice(start..start, prefix[..prefix_len].iter().copied());
        Ok(())
    }

    /// Write a tag key.
    pub fn put_key(&mut self, selector: Selector) {
        self.put_bare_varint(selector.key());
    }

    /// Write a keyed varint field.
    pub fn put_varint(&mut self, number: u32, value: u64) {
        self.put_key(Selector::new(number, WireType::Varint));
        self.put_bare_varint(value);
    }

    /// Write a keyed 32-bit fixed field.
    pub fn put_fixed32(&mut self, number: u32, value: u32) {
        self.put_key(Selector::new(number, WireType::Fixed32));
        self.put_bare_fixed32(value);
    }

    /// Write a keyed 64-bit fixed field.
    pub fn put_fixed64(&mut self, number: u32, value: u64) {
        self.put_key(Selector::new(number, WireType::Fixed64));
        self.put_bare_fixed64(value);
    }

    /// Write a keyed string/bytes field.
    pub fn put_bytes(&mut self, number: u32, data: &[u8]) {
        self.put_key(Selector::new(number, WireType::LengthDelimited));
        self.put_bare_varint(data.len() as u64);
        self.buf.extend_from_slice(data);
    }

    /// Append raw bytes as-is.
    ///
    /// Inside a scope this streams a string or bytes payload one chunk at a
    /// time; the length prefix is patched in by `end_scope`.
    pub fn put_raw(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Write a bare varint (packed runs and lengths).
    pub fn put_bare_varint(&mut self, value: u64) {
        let mut scratch = [0u8; 10];
        let len = encode_varint(value, &mut scratch);
        self.buf.extend_from_slice(&scratch[..len]);
    }

    /// Write a bare little-endian 32-bit value (packed runs).
    pub fn put_bare_fixed32(&mut self, value: u32) {
        let mut scratch = [0u8; 4];
        LittleEndian::write_u32(&mut scratch, value);
        self.buf.extend_from_slice(&scratch);
    }

    /// Write a bare little-endian 64-bit value (packed runs).
    pub fn put_bare_fixed64(&mut self, value: u64) {
        let mut scratch = [0u8; 8];
        LittleEndian::write_u64(&mut scratch, value);
        self.buf.extend_from_slice(&scratch);
    }

    /// Take the finished buffer. Fails if a scope is still open.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        if !self.scopes.is_empty() {
            return Err(MapperError::encode(format!(
                "{} scope(s) left open",
                self.scopes.len()
            )));
        }
        Ok(self.buf)
    }
}

/// Encode a varint into `out`, returning the number of bytes used.
fn encode_varint(mut value: u64, out: &mut [u8; 10]) -> usize {
    let mut i = 0;
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out[i] = byte;
            return i + 1;
        }
        out[i] = byte | 0x80;
        i += 1;
    }
}
