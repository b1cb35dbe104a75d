// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Direct per-field get/set operations on a message container.
//!
//! Accessors reuse the mapper's coercion and oneof-clearing rules, so a
//! container edited directly round-trips the same as one built by decode.

use crate::core::{MapperError, MessageValue, Result, Value};
use crate::schema::FieldKind;

use super::field::Field;
use super::Mapper;

/// Stateless handle for one field of one mapper.
///
/// Obtained via [`Mapper::field_accessor`]; all operations take the target
/// container explicitly.
pub struct FieldAccessor<'a> {
    mapper: &'a Mapper,
    index: usize,
}

impl<'a> FieldAccessor<'a> {
    pub(crate) fn new(mapper: &'a Mapper, index: usize) -> Self {
        Self { mapper, index }
    }

    fn field(&self) -> &Field {
        &self.mapper.fields()[self.index]
    }

    /// The field's container key.
    pub fn key(&self) -> &str {
        self.field().key()
    }

    /// Get the field's value, or its type default when absent.
    ///
    /// Repeated fields yield an empty list when absent; absent message
    /// fields yield null.
    pub fn get(&self, message: &MessageValue) -> Value {
        if let Some(value) = message.fields.get(self.field().key()) {
            return value.clone();
        }
        if self.field().is_repeated() {
            Value::List(Vec::new())
        } else {
            self.field().default_value()
        }
    }

    /// Set the field, clearing any sibling of the same oneof group first.
    pub fn set(&self, message: &mut MessageValue, value: Value) -> Result<()> {
        let field = self.field();
        let value = if field.is_repeated() {
            match value {
                Value::List(items) => Value::List(
                    items
                        .into_iter()
                        .map(|item| field.coerce(item))
                        .collect::<Result<Vec<_>>>()?,
                ),
                other => {
                    return Err(MapperError::type_mismatch(
                        field.full_name(),
                        "list",
                        other.type_name(),
                    ))
                }
            }
        } else {
            field.coerce(value)?
        };
        self.clear_oneof_siblings(message);
        message
            .fields
            .insert(self.field().key().to_string(), value);
        Ok(())
    }

    /// Check whether the field holds a value.
    pub fn has(&self, message: &MessageValue) -> bool {
        message.fields.contains_key(self.field().key())
    }

    /// Remove the field's value, returning it if present.
    pub fn clear(&self, message: &mut MessageValue) -> Option<Value> {
        message.fields.shift_remove(self.field().key())
    }

    /// Get one element of a repeated field.
    pub fn get_item(&self, message: &MessageValue, index: usize) -> Result<Value> {
        let list = self.backing_list(message)?;
        list.and_then(|items| items.get(index).cloned())
            .ok_or_else(|| {
                MapperError::Other(format!(
                    "index {index} out of bounds for field '{}'",
                    self.field().full_name()
                ))
            })
    }

    /// Set one element of a repeated field, growing the list with type
    /// defaults if `index` is past the end. Message fields grow with empty
    /// containers of the target type, so the padded list still encodes.
    pub fn set_item(&self, message: &mut MessageValue, index: usize, value: Value) -> Result<()> {
        let field = self.field();
        let value = field.coerce(value)?;
        let filler = match field.kind() {
            FieldKind::Message(target) => Value::Message(MessageValue::new(target.clone())),
            _ => field.default_value(),
        };
        let list = self.backing_list_mut(message)?;
        while list.len() <= index {
            list.push(filler.clone());
        }
        list[index] = value;
        Ok(())
    }

    /// Append to a repeated field, creating the backing list on first use.
    pub fn add_item(&self, message: &mut MessageValue, value: Value) -> Result<()> {
        let value = self.field().coerce(value)?;
        self.backing_list_mut(message)?.push(value);
        Ok(())
    }

    /// Length of a repeated field's list; None when the list is absent.
    pub fn list_len(&self, message: &MessageValue) -> Result<Option<usize>> {
        Ok(self.backing_list(message)?.map(<[Value]>::len))
    }

    /// Clone out the whole backing list, if any.
    pub fn get_list(&self, message: &MessageValue) -> Result<Option<Vec<Value>>> {
        Ok(self.backing_list(message)?.map(<[Value]>::to_vec))
    }

    /// Replace the whole backing list, returning the previous one.
    pub fn set_list(
        &self,
        message: &mut MessageValue,
        items: Vec<Value>,
    ) -> Result<Option<Vec<Value>>> {
        let field = self.field();
        if !field.is_repeated() {
            return Err(MapperError::type_mismatch(
                field.full_name(),
                "repeated field",
                "singular field",
            ));
        }
        let items = items
            .into_iter()
            .map(|item| field.coerce(item))
            .collect::<Result<Vec<_>>>()?;
        let previous = message
            .fields
            .insert(field.key().to_string(), Value::List(items));
        match previous {
            Some(Value::List(old)) => Ok(Some(old)),
            Some(_) | None => Ok(None),
        }
    }

    fn clear_oneof_siblings(&self, message: &mut MessageValue) {
        let group = self.field().oneof_index();
        if group < 0 {
            return;
        }
        for (index, other) in self.mapper.fields().iter().enumerate() {
            if index != self.index && other.oneof_index() == group {
                message.fields.shift_remove(other.key());
            }
        }
    }

    fn backing_list<'m>(&self, message: &'m MessageValue) -> Result<Option<&'m [Value]>> {
        let field = self.field();
        if !field.is_repeated() {
            return Err(MapperError::type_mismatch(
                field.full_name(),
                "repeated field",
                "singular field",
            ));
        }
        match message.fields.get(field.key()) {
            None => Ok(None),
            Some(Value::List(items)) => Ok(Some(items)),
            Some(other) => Err(MapperError::type_mismatch(
                field.full_name(),
                "list",
                other.type_name(),
            )),
        }
    }

    fn backing_list_mut<'m>(&self, message: &'m mut MessageValue) -> Result<&'m mut Vec<Value>> {
        let field = self.field();
        if !field.is_repeated() {
            return Err(MapperError::type_mismatch(
                field.full_name(),
                "repeated field",
                "singular field",
            ));
        }
        let slot = message
            .fields
            .entry(field.key().to_string())
            .or_insert_with(|| Value::List(Vec::new()));
        slot.as_list_mut().ok_or_else(|| {
            MapperError::type_mismatch(field.full_name(), "list", "scalar")
        })
    }
}
