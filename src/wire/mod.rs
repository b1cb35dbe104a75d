// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Protobuf wire format: push decoder, writer, and the event interface
//! between the wire layer and the mappers.

pub mod decoder;
pub mod events;
pub mod reader;
pub mod writer;

pub use decoder::{PushDecoder, DEFAULT_MAX_DEPTH};
pub use events::{DelimitedClass, EventSink, Selector, WireType};
pub use reader::WireReader;
pub use writer::WireWriter;
