//! Error types for schema definition and introspection.

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur while defining, validating, or introspecting a schema.
#[derive(Error, Debug, Diagnostic)]
pub enum SchemaError {
    /// Error reading a schema file.
    #[error("failed to read file: {path}")]
    #[diagnostic(code(tandem::schema::io_error))]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML")]
    #[diagnostic(code(tandem::schema::toml_error))]
    TomlError {
        #[source]
        source: toml::de::Error,
    },

    /// The model is not part of the schema.
    #[error("unknown model `{model}`")]
    #[diagnostic(code(tandem::schema::unknown_model))]
    UnknownModel { model: String },

    /// The field is not declared on the model.
    #[error("unknown field `{model}.{field}`")]
    #[diagnostic(code(tandem::schema::unknown_field))]
    UnknownField { model: String, field: String },

    /// No forward or reverse relation with this name exists on the model.
    #[error("unknown relation `{model}.{relation}`")]
    #[diagnostic(
        code(tandem::schema::unknown_relation),
        help("reverse relations are named `<model>_set`, or `<model>` for one-to-one, unless `related_name` is set")
    )]
    UnknownRelation { model: String, relation: String },

    /// A display label was requested for a field that declares no choices.
    #[error("field `{model}.{field}` has no choices")]
    #[diagnostic(code(tandem::schema::not_a_choice_field))]
    NotAChoiceField { model: String, field: String },

    /// Invalid relation definition.
    #[error("invalid relation `{model}.{field}`: {message}")]
    #[diagnostic(code(tandem::schema::invalid_relation))]
    InvalidRelation {
        model: String,
        field: String,
        message: String,
    },

    /// Duplicate definition.
    #[error("duplicate {kind} `{name}`")]
    #[diagnostic(code(tandem::schema::duplicate))]
    Duplicate { kind: String, name: String },

    /// Validation error with multiple issues.
    #[error("schema validation failed with {count} error(s)")]
    #[diagnostic(code(tandem::schema::validation_failed))]
    ValidationFailed {
        count: usize,
        #[related]
        errors: Vec<SchemaError>,
    },
}

impl SchemaError {
    /// Create an unknown model error.
    pub fn unknown_model(model: impl Into<String>) -> Self {
        Self::UnknownModel {
            model: model.into(),
        }
    }

    /// Create an unknown field error.
    pub fn unknown_field(model: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            model: model.into(),
            field: field.into(),
        }
    }

    /// Create an unknown relation error.
    pub fn unknown_relation(model: impl Into<String>, relation: impl Into<String>) -> Self {
        Self::UnknownRelation {
            model: model.into(),
            relation: relation.into(),
        }
    }

    /// Create an invalid relation error.
    pub fn invalid_relation(
        model: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidRelation {
            model: model.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a duplicate definition error.
    pub fn duplicate(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Duplicate {
            kind: kind.into(),
            name: name.into(),
        }
    }
}
