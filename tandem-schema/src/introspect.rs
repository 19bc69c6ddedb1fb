//! Schema introspection: the interface relationship dispatch depends on.

use std::fmt;
use std::sync::Arc;

use crate::ast::{RelationDescriptor, Schema};
use crate::error::{SchemaError, SchemaResult};

/// Read-only access to relationship and field metadata.
///
/// Implemented by [`Schema`]; callers backed by another metadata source can
/// provide their own implementation.
pub trait SchemaIntrospector: fmt::Debug + Send + Sync {
    /// Describe the relation called `name` as seen from `model`.
    fn describe_relationship(&self, model: &str, name: &str) -> SchemaResult<RelationDescriptor>;

    /// Human-readable label for a raw value of an enumerated field.
    ///
    /// Values that match no declared choice are returned unchanged.
    fn display_label(&self, model: &str, field: &str, raw: &str) -> SchemaResult<String>;

    /// Check if the model exists.
    fn has_model(&self, model: &str) -> bool;

    /// Check if `field` is a loadable column of `model`.
    fn has_field(&self, model: &str, field: &str) -> bool;
}

/// Shared handle to a schema, carried by load requests and records.
pub type SchemaRef = Arc<dyn SchemaIntrospector>;

impl SchemaIntrospector for Schema {
    fn describe_relationship(&self, model: &str, name: &str) -> SchemaResult<RelationDescriptor> {
        if self.get_model(model).is_none() {
            return Err(SchemaError::unknown_model(model));
        }
        self.get_relation(model, name)
            .cloned()
            .ok_or_else(|| SchemaError::unknown_relation(model, name))
    }

    fn display_label(&self, model: &str, field: &str, raw: &str) -> SchemaResult<String> {
        let def = self
            .get_model(model)
            .ok_or_else(|| SchemaError::unknown_model(model))?
            .get_field(field)
            .ok_or_else(|| SchemaError::unknown_field(model, field))?;

        if !def.has_choices() {
            return Err(SchemaError::NotAChoiceField {
                model: model.to_string(),
                field: field.to_string(),
            });
        }

        Ok(def.label_for(raw).unwrap_or(raw).to_string())
    }

    fn has_model(&self, model: &str) -> bool {
        self.get_model(model).is_some()
    }

    fn has_field(&self, model: &str, field: &str) -> bool {
        self.get_model(model).is_some_and(|m| m.has_column(field))
    }
}
