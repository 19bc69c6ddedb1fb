//! Schema validation and relation resolution.
//!
//! This module validates model definitions for semantic correctness:
//! - No duplicate models, fields, or relations
//! - Relation targets exist
//! - Derived reverse relation names do not collide with anything on the target
//! - Choice fields declare each raw value once
//!
//! Every problem is collected before failing, so a broken schema reports all
//! of its errors at once.

use std::collections::HashSet;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::ast::*;
use crate::error::{SchemaError, SchemaResult};

/// Schema validator for semantic analysis.
#[derive(Debug)]
pub struct Validator {
    /// Collected validation errors.
    errors: Vec<SchemaError>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self { errors: vec![] }
    }

    /// Validate model definitions and return the resolved schema or errors.
    pub fn validate(&mut self, models: Vec<ModelDef>) -> SchemaResult<Schema> {
        self.errors.clear();

        let mut by_name: IndexMap<SmolStr, ModelDef> = IndexMap::new();
        for model in models {
            if by_name.contains_key(&model.name) {
                self.errors
                    .push(SchemaError::duplicate("model", model.name.as_str()));
                continue;
            }
            by_name.insert(model.name.clone(), model);
        }

        for model in by_name.values() {
            self.validate_model(model, &by_name);
        }

        let relations = self.resolve_relations(&by_name);

        if self.errors.is_empty() {
            Ok(Schema {
                models: by_name,
                relations,
            })
        } else {
            Err(SchemaError::ValidationFailed {
                count: self.errors.len(),
                errors: std::mem::take(&mut self.errors),
            })
        }
    }

    /// Validate one model's own declarations.
    fn validate_model(&mut self, model: &ModelDef, models: &IndexMap<SmolStr, ModelDef>) {
        let mut seen = HashSet::new();
        seen.insert(PRIMARY_KEY);

        for field in &model.fields {
            if !seen.insert(field.name()) {
                self.errors.push(SchemaError::duplicate(
                    "field",
                    format!("{}.{}", model.name, field.name),
                ));
            }

            let mut values = HashSet::new();
            for choice in &field.choices {
                if !values.insert(choice.value.as_str()) {
                    self.errors.push(SchemaError::duplicate(
                        "choice",
                        format!("{}.{}={}", model.name, field.name, choice.value),
                    ));
                }
            }
        }

        for relation in &model.relations {
            if !seen.insert(relation.name.as_str()) {
                self.errors.push(SchemaError::duplicate(
                    "relation",
                    format!("{}.{}", model.name, relation.name),
                ));
            }
            if !models.contains_key(&relation.target) {
                self.errors.push(SchemaError::invalid_relation(
                    model.name(),
                    relation.name.as_str(),
                    format!("unknown target model `{}`", relation.target),
                ));
            }
        }
    }

    /// Resolve every declared relation into its forward and reverse descriptors.
    fn resolve_relations(
        &mut self,
        models: &IndexMap<SmolStr, ModelDef>,
    ) -> IndexMap<SmolStr, IndexMap<SmolStr, RelationDescriptor>> {
        let mut resolved: IndexMap<SmolStr, IndexMap<SmolStr, RelationDescriptor>> = models
            .keys()
            .map(|name| (name.clone(), IndexMap::new()))
            .collect();

        for model in models.values() {
            for def in &model.relations {
                let forward = RelationDescriptor::forward(model.name.clone(), def);
                if let Some(slots) = resolved.get_mut(&model.name) {
                    slots.insert(forward.name.clone(), forward);
                }
            }
        }

        for model in models.values() {
            for def in &model.relations {
                let Some(target) = models.get(&def.target) else {
                    // Already reported by validate_model.
                    continue;
                };
                let reverse = RelationDescriptor::reverse(model.name(), def);

                let clashes_with_column = target.get_field(&reverse.name).is_some()
                    || reverse.name == PRIMARY_KEY;
                let clashes_with_relation = resolved
                    .get(&def.target)
                    .is_some_and(|slots| slots.contains_key(&reverse.name));

                if clashes_with_column || clashes_with_relation {
                    self.errors.push(SchemaError::invalid_relation(
                        model.name(),
                        def.name.as_str(),
                        format!(
                            "reverse name `{}` clashes with an existing name on `{}`; set `related_name`",
                            reverse.name, def.target
                        ),
                    ));
                    continue;
                }

                if let Some(slots) = resolved.get_mut(&def.target) {
                    slots.insert(reverse.name.clone(), reverse);
                }
            }
        }

        resolved
    }
}

/// Validate model definitions into a schema.
pub fn validate_models(models: impl IntoIterator<Item = ModelDef>) -> SchemaResult<Schema> {
    Validator::new().validate(models.into_iter().collect())
}
