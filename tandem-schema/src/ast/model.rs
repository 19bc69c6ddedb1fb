//! Model definitions.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::{FieldDef, RelationDef};

/// Name of the primary key column every model carries.
pub const PRIMARY_KEY: &str = "id";

/// A model definition (maps to a collection of records).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDef {
    /// Model name.
    pub name: SmolStr,
    /// Scalar fields, in declaration order.
    pub fields: Vec<FieldDef>,
    /// Relations owned by this model, in declaration order.
    pub relations: Vec<RelationDef>,
}

impl ModelDef {
    /// Create a new model with no fields.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Get the model name as a string.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Add a free-form field.
    pub fn field(mut self, name: impl Into<SmolStr>) -> Self {
        self.fields.push(FieldDef::new(name));
        self
    }

    /// Add an enumerated field.
    pub fn choice_field<V, L>(
        mut self,
        name: impl Into<SmolStr>,
        choices: impl IntoIterator<Item = (V, L)>,
    ) -> Self
    where
        V: Into<SmolStr>,
        L: Into<SmolStr>,
    {
        self.fields.push(FieldDef::with_choices(name, choices));
        self
    }

    /// Add a relation.
    pub fn relation(mut self, relation: RelationDef) -> Self {
        self.relations.push(relation);
        self
    }

    /// Add a foreign key to `target`.
    pub fn foreign_key(self, name: impl Into<SmolStr>, target: impl Into<SmolStr>) -> Self {
        self.relation(RelationDef::foreign_key(name, target))
    }

    /// Add a one-to-one reference to `target`.
    pub fn one_to_one(self, name: impl Into<SmolStr>, target: impl Into<SmolStr>) -> Self {
        self.relation(RelationDef::one_to_one(name, target))
    }

    /// Add a many-to-many relation to `target`.
    pub fn many_to_many(self, name: impl Into<SmolStr>, target: impl Into<SmolStr>) -> Self {
        self.relation(RelationDef::many_to_many(name, target))
    }

    /// Get a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get an owned relation by name.
    pub fn get_relation(&self, name: &str) -> Option<&RelationDef> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Relations stored as a column on this model (foreign keys and one-to-ones).
    pub fn reference_columns(&self) -> impl Iterator<Item = &RelationDef> {
        self.relations.iter().filter(|r| r.kind.has_column())
    }

    /// Check if `name` is a loadable column: the primary key, a scalar field,
    /// or a reference column.
    pub fn has_column(&self, name: &str) -> bool {
        name == PRIMARY_KEY
            || self.get_field(name).is_some()
            || self.reference_columns().any(|r| r.name == name)
    }

    /// All loadable column names, primary key first.
    pub fn columns(&self) -> Vec<SmolStr> {
        std::iter::once(SmolStr::new_static(PRIMARY_KEY))
            .chain(self.fields.iter().map(|f| f.name.clone()))
            .chain(self.reference_columns().map(|r| r.name.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::RelationKind;

    fn widget() -> ModelDef {
        ModelDef::new("widget")
            .field("name")
            .field("other")
            .foreign_key("owner", "owner")
    }

    #[test]
    fn test_model_builder() {
        let model = widget();
        assert_eq!(model.name(), "widget");
        assert_eq!(model.fields.len(), 2);
        assert_eq!(model.relations.len(), 1);
        assert_eq!(
            model.get_relation("owner").map(|r| r.kind),
            Some(RelationKind::ForeignKey)
        );
    }

    #[test]
    fn test_columns_include_primary_key_and_references() {
        let model = widget().many_to_many("tags", "tag");
        assert_eq!(model.columns(), vec!["id", "name", "other", "owner"]);
        assert!(model.has_column("id"));
        assert!(model.has_column("owner"));
        assert!(!model.has_column("tags"));
        assert!(!model.has_column("colour"));
    }

    #[test]
    fn test_choice_field() {
        let model = ModelDef::new("thing").choice_field("size", [("L", "Large")]);
        let field = model.get_field("size").unwrap();
        assert_eq!(field.label_for("L"), Some("Large"));
    }
}
