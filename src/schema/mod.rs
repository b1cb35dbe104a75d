// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema descriptors: the plain-data type model mappers are built from.

pub mod descriptor;

pub use descriptor::{
    DefaultValue, DescriptorSet, EnumDescriptor, FieldDescriptor, FieldKind, Label,
    MessageDescriptor, OneofDescriptor,
};
