//! Loaded records and their eagerly attached relations.

use std::fmt;

use indexmap::IndexMap;
use smol_str::SmolStr;
use tandem_schema::{PRIMARY_KEY, SchemaRef};

use crate::error::{QueryError, QueryResult};
use crate::value::Value;

/// Related data attached to a record by eager loading.
#[derive(Debug, Clone)]
pub enum Related {
    /// A single related record, or `None` when there is none.
    One(Option<Box<Record>>),
    /// Related records in load order.
    Many(Vec<Record>),
}

impl Related {
    /// Number of attached records.
    pub fn len(&self) -> usize {
        match self {
            Self::One(Some(_)) => 1,
            Self::One(None) => 0,
            Self::Many(records) => records.len(),
        }
    }

    /// Check if no records are attached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the attached records.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        let (one, many) = match self {
            Self::One(record) => (record.as_deref(), &[][..]),
            Self::Many(records) => (None, records.as_slice()),
        };
        one.into_iter().chain(many.iter())
    }
}

/// One loaded entity.
///
/// A record holds the scalar fields its load request selected and the
/// relation slots that request eagerly loaded. It has no handle to the data
/// store: reading a field or relation that was not loaded is an error, never a
/// follow-up query.
#[derive(Clone)]
pub struct Record {
    model: SmolStr,
    schema: SchemaRef,
    fields: IndexMap<SmolStr, Value>,
    relations: IndexMap<SmolStr, Related>,
}

impl Record {
    /// Create an empty record of `model`.
    pub fn new(model: impl Into<SmolStr>, schema: SchemaRef) -> Self {
        Self {
            model: model.into(),
            schema,
            fields: IndexMap::new(),
            relations: IndexMap::new(),
        }
    }

    /// Set a field value.
    pub fn with_field(mut self, name: impl Into<SmolStr>, value: impl Into<Value>) -> Self {
        self.set_field(name, value);
        self
    }

    /// Set a field value in place.
    pub fn set_field(&mut self, name: impl Into<SmolStr>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Attach related data in place.
    pub fn set_related(&mut self, name: impl Into<SmolStr>, related: Related) {
        self.relations.insert(name.into(), related);
    }

    /// Name of the model this record belongs to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Schema the record was loaded against.
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// The primary key, if loaded.
    pub fn id(&self) -> Option<i64> {
        self.fields.get(PRIMARY_KEY).and_then(Value::as_int)
    }

    /// Read a loaded field.
    pub fn get(&self, field: &str) -> QueryResult<&Value> {
        self.fields
            .get(field)
            .ok_or_else(|| QueryError::field_not_loaded(self.model.as_str(), field))
    }

    /// Read an eagerly loaded relation.
    pub fn related(&self, name: &str) -> QueryResult<&Related> {
        self.relations
            .get(name)
            .ok_or_else(|| QueryError::relation_not_loaded(self.model.as_str(), name))
    }

    /// Human-readable label of an enumerated field's loaded value.
    pub fn display_label(&self, field: &str) -> QueryResult<String> {
        let raw = self.get(field)?.to_string();
        Ok(self.schema.display_label(&self.model, field, &raw)?)
    }

    /// Check if a field was loaded.
    pub fn is_loaded(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Check if a relation was eagerly loaded.
    pub fn has_related(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    /// Loaded fields in load order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("model", &self.model)
            .field("fields", &self.fields)
            .field("relations", &self.relations)
            .finish()
    }
}
