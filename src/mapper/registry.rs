// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Registry owning every mapper for one loaded schema.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::core::{MapperError, Result};
use crate::schema::{DescriptorSet, FieldKind};

use super::{Mapper, MapperOptions};

/// Owner of all [`Mapper`]s built from one [`DescriptorSet`].
///
/// Mappers are built lazily on first lookup and cached for the life of the
/// registry. A freshly built mapper is inserted into the cache *before* its
/// message-typed fields are resolved; resolution then looks targets up
/// through the registry again, which is what lets self-referential and
/// mutually-referential type graphs resolve without infinite recursion.
/// Fields hold weak references into the cache, so dropping the registry
/// releases the whole mapper set together, cycles included.
pub struct MapperRegistry {
    schema: DescriptorSet,
    options: MapperOptions,
    mappers: RwLock<HashMap<String, Arc<Mapper>>>,
}

impl MapperRegistry {
    /// Create a registry over `schema` with the given options.
    pub fn new(schema: DescriptorSet, options: MapperOptions) -> Self {
        Self {
            schema,
            options,
            mappers: RwLock::new(HashMap::new()),
        }
    }

    pub fn options(&self) -> MapperOptions {
        self.options
    }

    pub fn schema(&self) -> &DescriptorSet {
        &self.schema
    }

    /// Get or build the mapper for a message type.
    pub fn mapper_for(&self, type_name: &str) -> Result<Arc<Mapper>> {
        if let Some(mapper) = self.cached(type_name)? {
            return Ok(mapper);
        }

        let descriptor = self.schema.message(type_name).ok_or_else(|| {
            MapperError::schema(type_name, "message type not present in schema")
        })?;
        let mapper = Arc::new(Mapper::build(descriptor, &self.schema, self.options)?);

        let mapper = {
            let mut cache = self
                .mappers
                .write()
                .map_err(|_| MapperError::Other("mapper cache lock poisoned".to_string()))?;
            // Another caller may have raced us here; keep whichever landed.
            Arc::clone(
                cache
                    .entry(type_name.to_string())
                    .or_insert(mapper),
            )
        };

        if let Err(err) = self.resolve(&mapper) {
            // An unresolved mapper must not survive in the cache, or a
            // later lookup for the same type would hand it out as built.
            if let Ok(mut cache) = self.mappers.write() {
                cache.remove(type_name);
            }
            return Err(err);
        }
        debug!(type_name, "mapper resolved");
        Ok(mapper)
    }

    /// Link every message-typed field of `mapper` to its target's mapper.
    fn resolve(&self, mapper: &Arc<Mapper>) -> Result<()> {
        for field in mapper.fields() {
            if let FieldKind::Message(target) = field.kind() {
                let sub = self.mapper_for(target)?;
                field.link_sub_mapper(&sub);
            }
        }
        Ok(())
    }

    fn cached(&self, type_name: &str) -> Result<Option<Arc<Mapper>>> {
        let cache = self
            .mappers
            .read()
            .map_err(|_| MapperError::Other("mapper cache lock poisoned".to_string()))?;
        Ok(cache.get(type_name).cloned())
    }
}

impl std::fmt::Debug for MapperRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let built = self.mappers.read().map(|m| m.len()).unwrap_or(0);
        f.debug_struct("MapperRegistry")
            .field("built", &built)
            .finish()
    }
}
