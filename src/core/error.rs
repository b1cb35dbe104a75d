// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for protomap.
//!
//! Provides error types for the mapping engine:
//! - Schema/descriptor validation
//! - Decode failures (wire-level and semantic)
//! - Encode failures (value shape and range)

use std::fmt;

/// Errors that can occur while building mappers or mapping messages.
///
/// Every failure aborts the whole top-level decode or encode call; there is
/// no partial result.
#[derive(Debug, Clone)]
pub enum MapperError {
    /// Malformed or unmappable descriptor, raised at mapper construction
    Schema {
        /// Message or enum type name
        type_name: String,
        /// Validation error message
        reason: String,
    },

    /// Caller-supplied dynamic value has the wrong shape
    TypeMismatch {
        /// Fully-qualified field name
        field: String,
        /// Expected value shape
        expected: String,
        /// Actual value shape
        actual: String,
    },

    /// Required field absent at message close (decode) or during traversal (encode)
    RequiredFieldMissing {
        /// Fully-qualified field name
        field: String,
    },

    /// Enum ordinal outside the declared value set (encode-side, fatal)
    InvalidEnumValue {
        /// Fully-qualified field name
        field: String,
        /// Offending ordinal
        value: i32,
    },

    /// Malformed wire bytes, propagated as a decode failure
    MalformedWire {
        /// What the wire parser stumbled on
        message: String,
    },

    /// Downstream emission failure during encode
    Encode {
        /// Error message
        message: String,
    },

    /// Other error
    Other(String),
}

impl MapperError {
    /// Create a schema error.
    pub fn schema(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        MapperError::Schema {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        MapperError::TypeMismatch {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a "missing required field" error.
    pub fn required_field_missing(field: impl Into<String>) -> Self {
        MapperError::RequiredFieldMissing {
            field: field.into(),
        }
    }

    /// Create an invalid enum value error.
    pub fn invalid_enum_value(field: impl Into<String>, value: i32) -> Self {
        MapperError::InvalidEnumValue {
            field: field.into(),
            value,
        }
    }

    /// Create a malformed wire error.
    pub fn malformed_wire(message: impl Into<String>) -> Self {
        MapperError::MalformedWire {
            message: message.into(),
        }
    }

    /// Create an encode error.
    pub fn encode(message: impl Into<String>) -> Self {
        MapperError::Encode {
            message: message.into(),
        }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            MapperError::Schema { type_name, reason } => {
                vec![("type", type_name.clone()), ("reason", reason.clone())]
            }
            MapperError::TypeMismatch {
                field,
                expected,
                actual,
            } => vec![
                ("field", field.clone()),
                ("expected", expected.clone()),
                ("actual", actual.clone()),
            ],
            MapperError::RequiredFieldMissing { field } => vec![("field", field.clone())],
            MapperError::InvalidEnumValue { field, value } => {
                vec![("field", field.clone()), ("value", value.to_string())]
            }
            MapperError::MalformedWire { message } => vec![("message", message.clone())],
            MapperError::Encode { message } => vec![("message", message.clone())],
            MapperError::Other(msg) => vec![("message", msg.clone())],
        }
    }
}

impl fmt::Display for MapperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapperError::Schema { type_name, reason } => {
                write!(f, "Invalid schema for '{type_name}': {reason}")
            }
            MapperError::TypeMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "Type mismatch for field '{field}': expected {expected}, got {actual}"
            ),
            MapperError::RequiredFieldMissing { field } => {
                write!(f, "Missing required field '{field}'")
            }
            MapperError::InvalidEnumValue { field, value } => {
                write!(f, "Invalid enumeration value {value} for field '{field}'")
            }
            MapperError::MalformedWire { message } => {
                write!(f, "Malformed wire data: {message}")
            }
            MapperError::Encode { message } => write!(f, "Encode error: {message}"),
            MapperError::Other(msg) => write!(f, "Other error: {msg}"),
        }
    }
}

impl std::error::Error for MapperError {}

/// Result type for protomap operations.
pub type Result<T> = std::result::Result<T, MapperError>;
