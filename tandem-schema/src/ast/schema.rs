//! Top-level schema definition.

use indexmap::IndexMap;
use serde::Serialize;
use smol_str::SmolStr;

use super::{ModelDef, RelationDescriptor};
use crate::error::SchemaResult;
use crate::validator::Validator;

/// A validated schema: models plus every relation resolved from both ends.
///
/// Built with [`Schema::builder`] or loaded from a TOML schema file; both
/// paths go through the [`Validator`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    /// All models in the schema.
    pub(crate) models: IndexMap<SmolStr, ModelDef>,
    /// Relations per model, forward and reverse, keyed by relation name.
    pub(crate) relations: IndexMap<SmolStr, IndexMap<SmolStr, RelationDescriptor>>,
}

impl Schema {
    /// Start building a schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Get a model by name.
    pub fn get_model(&self, name: &str) -> Option<&ModelDef> {
        self.models.get(name)
    }

    /// Get all model names.
    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(|s| s.as_str())
    }

    /// Get a relation, forward or reverse, by the name it has on `model`.
    pub fn get_relation(&self, model: &str, name: &str) -> Option<&RelationDescriptor> {
        self.relations.get(model).and_then(|r| r.get(name))
    }

    /// Get every relation traversable from `model`.
    pub fn relations_for(&self, model: &str) -> impl Iterator<Item = &RelationDescriptor> {
        self.relations
            .get(model)
            .into_iter()
            .flat_map(|r| r.values())
    }
}

/// Collects model definitions and validates them into a [`Schema`].
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    models: Vec<ModelDef>,
}

impl SchemaBuilder {
    /// Add a model.
    pub fn model(mut self, model: ModelDef) -> Self {
        self.models.push(model);
        self
    }

    /// Add multiple models.
    pub fn models(mut self, models: impl IntoIterator<Item = ModelDef>) -> Self {
        self.models.extend(models);
        self
    }

    /// Validate the collected models and resolve their relations.
    pub fn build(self) -> SchemaResult<Schema> {
        Validator::new().validate(self.models)
    }
}

/// Schema statistics for debugging/info.
#[derive(Debug, Clone, Default)]
pub struct SchemaStats {
    /// Number of models.
    pub model_count: usize,
    /// Total number of scalar fields across all models.
    pub field_count: usize,
    /// Number of traversable relation ends.
    pub relation_count: usize,
}

impl Schema {
    /// Get statistics about the schema.
    pub fn stats(&self) -> SchemaStats {
        SchemaStats {
            model_count: self.models.len(),
            field_count: self.models.values().map(|m| m.fields.len()).sum(),
            relation_count: self.relations.values().map(|r| r.len()).sum(),
        }
    }
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        write!(
            f,
            "Schema({} models, {} fields, {} relations)",
            stats.model_count, stats.field_count, stats.relation_count
        )
    }
}
