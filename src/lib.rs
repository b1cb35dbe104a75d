// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Protomap
//!
//! Schema-driven mapping between protobuf wire bytes and dynamic tree
//! values, without generated message types.
//!
//! Message descriptors drive everything at runtime: a [`MapperRegistry`]
//! turns each message type into a [`Mapper`] (a per-type field table), and
//! mappers decode wire bytes into nested ordered maps and lists, and encode
//! such trees back into bytes. Protobuf merge, default, oneof, and
//! required-field semantics are reproduced over plain [`Value`] containers.
//!
//! ## Architecture
//!
//! - `schema/` - Plain-data descriptors (messages, fields, enums, oneofs)
//! - `wire/` - Wire format: push decoder, writer, and the event interface
//! - `mapper/` - Field tables, the registry, decode/encode, field accessors
//! - `core/` - Dynamic [`Value`] tree and the error taxonomy
//!
//! ## Example: Round trip
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use protomap::schema::{DescriptorSet, FieldDescriptor, FieldKind, MessageDescriptor};
//! use protomap::{MapperOptions, MapperRegistry, Value};
//!
//! let mut schema = DescriptorSet::new();
//! schema.add_message(
//!     MessageDescriptor::new("demo.Point")
//!         .field(FieldDescriptor::new("x", 1, FieldKind::Int32))
//!         .field(FieldDescriptor::new("y", 2, FieldKind::Int32)),
//! );
//! let registry = MapperRegistry::new(schema, MapperOptions::default());
//! let mapper = registry.mapper_for("demo.Point")?;
//!
//! let decoded = mapper.decode(&[0x08, 0x03, 0x10, 0x04])?;
//! let bytes = mapper.encode(&decoded)?;
//! assert_eq!(bytes, vec![0x08, 0x03, 0x10, 0x04]);
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use core::{BigInt, MapperError, MessageFields, MessageValue, Result, Value};

// Schema descriptors
pub mod schema;

// Wire format
pub mod wire;

// Mapping engine
pub mod mapper;

pub use mapper::{FieldAccessor, Mapper, MapperOptions, MapperRegistry};
