//! Per-content-type mapping dispatch
//!
//! Each source record is routed to a mapper chosen by the value of a
//! discriminator field, `sys.contentTypeId` unless told otherwise. Records
//! whose value has no mapper fall back to the `default` entry; records with
//! neither are skipped.

use crate::error::{MappingError, MappingResult};
use crate::template::Template;
use contensis_import_types::{FieldPath, Record};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Mapping table key used when no other key matches
pub const DEFAULT_MAPPER: &str = "default";

/// What a mapping function can see besides the record it is mapping
#[derive(Debug, Clone, Copy)]
pub struct MapContext<'a> {
    /// Every record passed to the dispatcher, in input order
    pub source: &'a [Record],
    /// Records produced so far, in output order
    pub results: &'a [Record],
}

/// Transform from a source record to zero or one output record
pub type MappingFn =
    Arc<dyn Fn(&Record, &MapContext<'_>) -> anyhow::Result<Option<Record>> + Send + Sync>;

/// A single entry in a mapping table
#[derive(Clone)]
pub enum MapperEntry {
    /// Imperative transform with access to the whole batch
    Function(MappingFn),
    /// Declarative projection, always produces one record
    Template(Template),
}

impl MapperEntry {
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&Record, &MapContext<'_>) -> anyhow::Result<Option<Record>> + Send + Sync + 'static,
    {
        MapperEntry::Function(Arc::new(f))
    }

    pub fn template(template: Template) -> Self {
        MapperEntry::Template(template)
    }

    /// Run this mapper against one record
    pub fn apply(
        &self,
        record: &Record,
        context: &MapContext<'_>,
    ) -> anyhow::Result<Option<Record>> {
        match self {
            MapperEntry::Function(f) => f(record, context),
            MapperEntry::Template(template) => Ok(Some(template.apply(record))),
        }
    }
}

impl std::fmt::Debug for MapperEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapperEntry::Function(_) => f.write_str("Function(..)"),
            MapperEntry::Template(template) => f.debug_tuple("Template").field(template).finish(),
        }
    }
}

impl From<Template> for MapperEntry {
    fn from(template: Template) -> Self {
        MapperEntry::Template(template)
    }
}

/// Mapping table keyed by discriminator value
#[derive(Debug, Clone, Default)]
pub struct Mappers {
    entries: HashMap<String, MapperEntry>,
}

impl Mappers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the mapper for `key`
    pub fn insert(&mut self, key: impl Into<String>, entry: impl Into<MapperEntry>) -> &mut Self {
        self.entries.insert(key.into(), entry.into());
        self
    }

    pub fn with(mut self, key: impl Into<String>, entry: impl Into<MapperEntry>) -> Self {
        self.insert(key, entry);
        self
    }

    /// Add a function mapper for `key`
    pub fn with_function<F>(self, key: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Record, &MapContext<'_>) -> anyhow::Result<Option<Record>> + Send + Sync + 'static,
    {
        self.with(key, MapperEntry::function(f))
    }

    /// Add a template mapper for `key`
    pub fn with_template(self, key: impl Into<String>, template: Template) -> Self {
        self.with(key, MapperEntry::Template(template))
    }

    /// Set the fallback mapper
    pub fn with_default(self, entry: impl Into<MapperEntry>) -> Self {
        self.with(DEFAULT_MAPPER, entry)
    }

    pub fn get(&self, key: &str) -> Option<&MapperEntry> {
        self.entries.get(key)
    }

    pub fn default_entry(&self) -> Option<&MapperEntry> {
        self.entries.get(DEFAULT_MAPPER)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a table of templates from JSON, `{ "<key>": <template>, ... }`
    pub fn from_json(value: &Value) -> MappingResult<Self> {
        let map = value.as_object().ok_or_else(|| {
            MappingError::InvalidMappers("expected an object keyed by discriminator value".into())
        })?;

        let mut mappers = Mappers::new();
        for (key, template) in map {
            let template = Template::from_json_at(template, key)?;
            mappers.insert(key.clone(), template);
        }
        Ok(mappers)
    }
}

/// Lookup key for a discriminator value
///
/// Strings are used as-is, numbers and booleans by their JSON text. Anything
/// else counts as absent.
fn discriminator_key(value: Option<&Value>) -> Option<Cow<'_, str>> {
    match value? {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        _ => None,
    }
}

/// Pick the mapper for `record` by the value at `field`, falling back to `default`
pub fn choose_mapper_by_field_value<'m>(
    record: &Record,
    mappers: &'m Mappers,
    field: &FieldPath,
) -> Option<&'m MapperEntry> {
    discriminator_key(field.resolve(record))
        .and_then(|key| mappers.get(&key))
        .or_else(|| mappers.default_entry())
}

/// Map records by `sys.contentTypeId`
pub fn map_entries(records: &[Record], mappers: &Mappers) -> anyhow::Result<Vec<Record>> {
    map_entries_by_field(records, mappers, &FieldPath::content_type())
}

/// Map records, choosing each record's mapper by the value at `field`
///
/// Output keeps input order. Records without a mapper, and records whose
/// function mapper returns `None` or `null`, produce nothing. The first error returned
/// by a function mapper stops the run and is returned unchanged.
pub fn map_entries_by_field(
    records: &[Record],
    mappers: &Mappers,
    field: &FieldPath,
) -> anyhow::Result<Vec<Record>> {
    let mut results: Vec<Record> = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let Some(mapper) = choose_mapper_by_field_value(record, mappers, field) else {
            debug!(
                "No mapper for record {} ({} = {:?}), skipping",
                index,
                field,
                field.resolve(record)
            );
            continue;
        };

        let context = MapContext {
            source: records,
            results: &results,
        };

        let mapped = mapper.apply(record, &context)?;
        match mapped {
            Some(output) if !output.is_null() => results.push(output),
            _ => debug!("Mapper returned nothing for record {}, skipping", index),
        }
    }

    debug!("Mapped {} of {} records", results.len(), records.len());
    Ok(results)
}
