// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout protomap.
//!
//! This module provides the foundational types for the library:
//! - [`MapperError`] - Comprehensive error handling
//! - [`Value`] - Dynamic tagged value representation
//! - [`MessageValue`] - Ordered field map tagged with its message type

pub mod error;
pub mod value;

pub use error::{MapperError, Result};
pub use value::{BigInt, MessageFields, MessageValue, Value};
