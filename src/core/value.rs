// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Dynamic value type system.
//!
//! Provides the tree representation produced by decode and consumed by encode:
//! nested ordered maps and lists of tagged scalar values. All variants are
//! serde-serializable.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered field name -> value mapping of one decoded message.
///
/// Insertion order is preserved so a decoded tree reads in wire order and a
/// hand-built tree reads in construction order. Encode order is governed by
/// the schema's declaration order, never by this map's order.
pub type MessageFields = IndexMap<String, Value>;

/// A decoded message: its ordered fields plus the fully-qualified name of the
/// message type that produced it, kept for later re-encoding.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageValue {
    /// Fully-qualified message type name (e.g. "test.Person").
    pub type_name: String,
    /// Field name -> value, in insertion order.
    pub fields: MessageFields,
}

impl MessageValue {
    /// Create an empty message value for the given type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: MessageFields::new(),
        }
    }
}

/// Sign/magnitude integer used when a 64-bit wire value does not fit the
/// configured native integer range.
///
/// Protobuf wire integers are at most 64 bits wide, so a u64 magnitude plus a
/// sign covers every representable value, including `u64::MAX` and
/// `i64::MIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigInt {
    /// True for negative values. Never set together with a magnitude of zero.
    pub negative: bool,
    /// Absolute value. For `i64::MIN` this is `2^63`.
    pub magnitude: u64,
}

impl BigInt {
    /// Build from a signed 64-bit value.
    pub fn from_i64(value: i64) -> Self {
        if value < 0 {
            Self {
                negative: true,
                magnitude: (value as u64).wrapping_neg(),
            }
        } else {
            Self {
                negative: false,
                magnitude: value as u64,
            }
        }
    }

    /// Build from an unsigned 64-bit value.
    pub fn from_u64(value: u64) -> Self {
        Self {
            negative: false,
            magnitude: value,
        }
    }

    /// Recover the signed 64-bit value, if it fits.
    pub fn to_i64(self) -> Option<i64> {
        if self.negative {
            if self.magnitude <= i64::MAX as u64 + 1 {
                Some((self.magnitude as i64).wrapping_neg())
            } else {
                None
            }
        } else if self.magnitude <= i64::MAX as u64 {
            Some(self.magnitude as i64)
        } else {
            None
        }
    }

    /// Recover the unsigned 64-bit value, if non-negative.
    pub fn to_u64(self) -> Option<u64> {
        if self.negative {
            None
        } else {
            Some(self.magnitude)
        }
    }

    /// Two's-complement bit pattern, as the wire varint carries it.
    pub fn to_bits(self) -> u64 {
        if self.negative {
            self.magnitude.wrapping_neg()
        } else {
            self.magnitude
        }
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.magnitude)
        } else {
            write!(f, "{}", self.magnitude)
        }
    }
}

/// Dynamic tagged value for decoded protobuf data.
///
/// This enum represents every value shape the mapping engine produces or
/// consumes. It is serde-serializable and deliberately host-agnostic: no
/// generated message types, only containers and tagged scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Absent/unset marker for optional fields.
    Null,

    Bool(bool),

    // Signed integers
    Int32(i32),
    Int64(i64),

    // Unsigned integers
    UInt32(u32),
    UInt64(u64),

    // Floating point
    Float32(f32),
    Float64(f64),

    // UTF-8 text
    String(String),

    // Raw binary data
    Bytes(Vec<u8>),

    // Out-of-native-range 64-bit integer (only with `use_bigints`)
    BigInt(BigInt),

    // Repeated field contents
    List(Vec<Value>),

    // Nested message
    Message(MessageValue),
}

impl Value {
    /// Check if this value is an integer type (signed, unsigned, or bigint).
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Value::Int32(_)
                | Value::Int64(_)
                | Value::UInt32(_)
                | Value::UInt64(_)
                | Value::BigInt(_)
        )
    }

    /// Check if this value is a floating-point type.
    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float32(_) | Value::Float64(_))
    }

    /// Check if this value is a container type (list or message).
    pub fn is_container(&self) -> bool {
        matches!(self, Value::List(_) | Value::Message(_))
    }

    /// Check if this value is the null marker.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to convert this value to f64 (numeric values only).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int32(v) => Some(*v as f64),
            Value::Int64(v) => Some(*v as f64),
            Value::UInt32(v) => Some(*v as f64),
            Value::UInt64(v) => Some(*v as f64),
            Value::Float32(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            Value::BigInt(b) => Some(if b.negative {
                -(b.magnitude as f64)
            } else {
                b.magnitude as f64
            }),
            _ => None,
        }
    }

    /// Try to convert this value to i64 (integer types only).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(v) => Some(*v as i64),
            Value::Int64(v) => Some(*v),
            Value::UInt32(v) => Some(*v as i64),
            Value::UInt64(v) => {
                if *v <= i64::MAX as u64 {
                    Some(*v as i64)
                } else {
                    None
                }
            }
            Value::BigInt(b) => b.to_i64(),
            _ => None,
        }
    }

    /// Try to convert this value to u64 (non-negative integers only).
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt32(v) => Some(*v as u64),
            Value::UInt64(v) => Some(*v),
            Value::Int32(v) => {
                if *v >= 0 {
                    Some(*v as u64)
                } else {
                    None
                }
            }
            Value::Int64(v) => {
                if *v >= 0 {
                    Some(*v as u64)
                } else {
                    None
                }
            }
            Value::BigInt(b) => b.to_u64(),
            _ => None,
        }
    }

    /// Try to get the inner boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get the inner string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the inner bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Try to get the inner message.
    pub fn as_message(&self) -> Option<&MessageValue> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    /// Try to get a mutable reference to the inner message.
    pub fn as_message_mut(&mut self) -> Option<&mut MessageValue> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    /// Try to get the inner list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Try to get a mutable reference to the inner list.
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get the type name of this value as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::UInt32(_) => "uint32",
            Value::UInt64(_) => "uint64",
            Value::Float32(_) => "float",
            Value::Float64(_) => "double",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::BigInt(_) => "bigint",
            Value::List(_) => "list",
            Value::Message(_) => "message",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::UInt32(v) => write!(f, "{v}"),
            Value::UInt64(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "\"{v}\""),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::BigInt(v) => write!(f, "{v}"),
            Value::List(v) => write!(f, "[{} elements]", v.len()),
            Value::Message(v) => write!(f, "{}{{{} fields}}", v.type_name, v.fields.len()),
        }
    }
}
