//! Error types for shaping, loading, and projecting, with actionable messages.
//!
//! Every error carries an [`ErrorCode`] for programmatic handling, a message,
//! and an [`ErrorContext`] naming the model, field, or relation involved plus
//! suggestions for fixing the problem.
//!
//! # Error Codes
//!
//! Error codes follow a pattern: T{category}{number}
//! - 1xxx: Load errors (unknown field, invalid selection)
//! - 5xxx: Execution errors raised by a data store
//! - 6xxx: Projection errors (data read that was never loaded)
//! - 7xxx: Configuration errors (unknown relation, wrong back-reference, ...)
//!
//! ```rust
//! use tandem_query::{ErrorCode, QueryError};
//!
//! let err = QueryError::unknown_relation("widget", "gadget_set");
//! assert_eq!(err.code, ErrorCode::UnknownRelation);
//! assert!(err.is_configuration_error());
//! assert_eq!(err.code.code(), "T7002");
//! ```

use std::fmt;
use thiserror::Error;

use tandem_schema::SchemaError;

/// Result type for shaping, loading, and projecting.
pub type QueryResult<T> = Result<T, QueryError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Load errors (1xxx)
    /// A restricted field is not declared on the model (T1001).
    UnknownField = 1001,
    /// A field selection cannot be applied (T1004).
    InvalidSelect = 1004,

    // Execution errors (5xxx)
    /// General data store error (T5005).
    DatabaseError = 5005,

    // Projection errors (6xxx)
    /// Projection read a field that was not loaded (T6001).
    FieldNotLoaded = 6001,
    /// Projection read a relation that was not eagerly loaded (T6002).
    RelationNotLoaded = 6002,

    // Configuration errors (7xxx)
    /// The model is not part of the schema (T7001).
    UnknownModel = 7001,
    /// The relation does not exist on the model (T7002).
    UnknownRelation = 7002,
    /// The back-reference field does not match the relation (T7003).
    BackReferenceMismatch = 7003,
    /// The relation is not of the kind the traversal expects (T7004).
    RelationKindMismatch = 7004,
    /// The relation's direction/cardinality has no traversal (T7005).
    UnsupportedRelation = 7005,
    /// The related request targets a different model than the relation (T7006).
    ModelMismatch = 7006,
    /// A single-key alias was applied to a projection without exactly one key (T7007).
    AliasArity = 7007,
    /// A display label was requested for a field without choices (T7008).
    NotAChoiceField = 7008,
    /// The schema itself is invalid (T7009).
    InvalidSchema = 7009,
    /// Two traversals of one relation load it in incompatible ways (T7010).
    ConflictingPrefetch = 7010,
}

impl ErrorCode {
    /// Get the error code string (e.g., "T7002").
    pub fn code(&self) -> String {
        format!("T{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::UnknownField => "Unknown field",
            Self::InvalidSelect => "Invalid field selection",
            Self::DatabaseError => "Database error",
            Self::FieldNotLoaded => "Field not loaded",
            Self::RelationNotLoaded => "Relation not loaded",
            Self::UnknownModel => "Unknown model",
            Self::UnknownRelation => "Unknown relation",
            Self::BackReferenceMismatch => "Back-reference mismatch",
            Self::RelationKindMismatch => "Relation kind mismatch",
            Self::UnsupportedRelation => "Unsupported relation",
            Self::ModelMismatch => "Model mismatch",
            Self::AliasArity => "Alias arity",
            Self::NotAChoiceField => "Not a choice field",
            Self::InvalidSchema => "Invalid schema",
            Self::ConflictingPrefetch => "Conflicting prefetch",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Suggestion for fixing an error.
#[derive(Debug, Clone)]
pub struct Suggestion {
    /// The suggestion text.
    pub text: String,
    /// Optional code example.
    pub code: Option<String>,
}

impl Suggestion {
    /// Create a new suggestion.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: None,
        }
    }

    /// Add a code example.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation that was being performed.
    pub operation: Option<String>,
    /// The model involved.
    pub model: Option<String>,
    /// The field involved.
    pub field: Option<String>,
    /// The relation involved.
    pub relation: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<Suggestion>,
    /// Help text.
    pub help: Option<String>,
}

/// Errors that can occur while shaping, loading, or projecting.
#[derive(Error, Debug)]
pub struct QueryError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl QueryError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add context about the operation.
    pub fn with_context(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(Suggestion::new(suggestion));
        self
    }

    /// Add a code suggestion.
    pub fn with_code_suggestion(mut self, text: impl Into<String>, code: impl Into<String>) -> Self {
        self.context
            .suggestions
            .push(Suggestion::new(text).with_code(code));
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.context.model = Some(model.into());
        self
    }

    /// Set the field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.context.field = Some(field.into());
        self
    }

    /// Set the relation.
    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.context.relation = Some(relation.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// Create an unknown model error.
    pub fn unknown_model(model: impl Into<String>) -> Self {
        let model = model.into();
        Self::new(
            ErrorCode::UnknownModel,
            format!("Model `{}` is not part of the schema", model),
        )
        .with_model(&model)
        .with_suggestion("Check the model name for typos")
    }

    /// Create an unknown relation error.
    pub fn unknown_relation(model: impl Into<String>, relation: impl Into<String>) -> Self {
        let model = model.into();
        let relation = relation.into();
        Self::new(
            ErrorCode::UnknownRelation,
            format!("Relation `{}` does not exist on `{}`", relation, model),
        )
        .with_model(&model)
        .with_relation(&relation)
        .with_suggestion("Reverse relations are named `<model>_set`, or `<model>` for one-to-one")
        .with_help("A `related_name` on the declaring relation overrides the reverse name")
    }

    /// Create a back-reference mismatch error.
    pub fn back_reference_mismatch(
        model: impl Into<String>,
        relation: impl Into<String>,
        expected: impl Into<String>,
        given: impl Into<String>,
    ) -> Self {
        let model = model.into();
        let relation = relation.into();
        let expected = expected.into();
        Self::new(
            ErrorCode::BackReferenceMismatch,
            format!(
                "Relation `{}.{}` points back through `{}`, not `{}`",
                model,
                relation,
                expected,
                given.into()
            ),
        )
        .with_model(&model)
        .with_relation(&relation)
        .with_field(&expected)
        .with_suggestion(format!("Use `{}` as the back-reference", expected))
    }

    /// Create a relation kind mismatch error.
    pub fn relation_kind_mismatch(
        model: impl Into<String>,
        relation: impl Into<String>,
        actual: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        let model = model.into();
        let relation = relation.into();
        Self::new(
            ErrorCode::RelationKindMismatch,
            format!(
                "Relation `{}.{}` is {}, but was traversed as {}",
                model,
                relation,
                actual.into(),
                expected.into()
            ),
        )
        .with_model(&model)
        .with_relation(&relation)
        .with_suggestion("Use auto_relationship() to pick the traversal from the schema")
    }

    /// Create an unsupported relation error.
    pub fn unsupported_relation(
        model: impl Into<String>,
        relation: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        let model = model.into();
        let relation = relation.into();
        Self::new(
            ErrorCode::UnsupportedRelation,
            format!(
                "Relation `{}.{}` is {}, which has no traversal",
                model,
                relation,
                kind.into()
            ),
        )
        .with_model(&model)
        .with_relation(&relation)
    }

    /// Create a model mismatch error.
    pub fn model_mismatch(
        relation: impl Into<String>,
        expected: impl Into<String>,
        given: impl Into<String>,
    ) -> Self {
        let relation = relation.into();
        let expected = expected.into();
        Self::new(
            ErrorCode::ModelMismatch,
            format!(
                "Relation `{}` loads `{}` records, but the related request is for `{}`",
                relation,
                expected,
                given.into()
            ),
        )
        .with_model(&expected)
        .with_relation(&relation)
    }

    /// Create a conflicting prefetch error.
    pub fn conflicting_prefetch(
        model: impl Into<String>,
        relation: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        let model = model.into();
        let relation = relation.into();
        Self::new(
            ErrorCode::ConflictingPrefetch,
            format!(
                "Relation `{}.{}` is prefetched twice with {}",
                model,
                relation,
                reason.into()
            ),
        )
        .with_model(&model)
        .with_relation(&relation)
        .with_suggestion("Traverse the relation the same way everywhere it is combined")
    }

    /// Create an alias arity error.
    pub fn alias_arity(alias: impl Into<String>, keys: usize) -> Self {
        let alias = alias.into();
        Self::new(
            ErrorCode::AliasArity,
            format!(
                "Cannot alias a projection with {} keys to the single key `{}`",
                keys, alias
            ),
        )
        .with_field(&alias)
        .with_suggestion("Use a key-to-key mapping to rename several keys")
    }

    /// Create an unknown field error.
    pub fn unknown_field(model: impl Into<String>, field: impl Into<String>) -> Self {
        let model = model.into();
        let field = field.into();
        Self::new(
            ErrorCode::UnknownField,
            format!("Field `{}` is not declared on `{}`", field, model),
        )
        .with_model(&model)
        .with_field(&field)
    }

    /// Create an invalid select error.
    pub fn invalid_select(model: impl Into<String>, message: impl Into<String>) -> Self {
        let model = model.into();
        Self::new(ErrorCode::InvalidSelect, message.into()).with_model(&model)
    }

    /// Create a field not loaded error.
    pub fn field_not_loaded(model: impl Into<String>, field: impl Into<String>) -> Self {
        let model = model.into();
        let field = field.into();
        Self::new(
            ErrorCode::FieldNotLoaded,
            format!("Field `{}.{}` was not loaded", model, field),
        )
        .with_model(&model)
        .with_field(&field)
        .with_suggestion("Pair every projection with the shaping that loads its fields")
    }

    /// Create a relation not loaded error.
    pub fn relation_not_loaded(model: impl Into<String>, relation: impl Into<String>) -> Self {
        let model = model.into();
        let relation = relation.into();
        Self::new(
            ErrorCode::RelationNotLoaded,
            format!("Relation `{}.{}` was not eagerly loaded", model, relation),
        )
        .with_model(&model)
        .with_relation(&relation)
        .with_suggestion("Combine the projection with a pair that prefetches or joins the relation")
        .with_help("Projection never loads data; it only reads what shaping arranged")
    }

    /// Create a general database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message.into())
    }


    // ============== Error Checks ==============

    /// Check if this error comes from how pairs or the schema were configured.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::UnknownModel
                | ErrorCode::UnknownRelation
                | ErrorCode::BackReferenceMismatch
                | ErrorCode::RelationKindMismatch
                | ErrorCode::UnsupportedRelation
                | ErrorCode::ModelMismatch
                | ErrorCode::AliasArity
                | ErrorCode::NotAChoiceField
                | ErrorCode::InvalidSchema
                | ErrorCode::ConflictingPrefetch
        )
    }

    /// Check if this error was raised while executing a load.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::UnknownField | ErrorCode::InvalidSelect | ErrorCode::DatabaseError
        )
    }

    /// Check if projection read data that was never loaded.
    pub fn is_projection_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::FieldNotLoaded | ErrorCode::RelationNotLoaded
        )
    }

    // ============== Display Functions ==============

    /// Get the error code.
    pub fn error_code(&self) -> &ErrorCode {
        &self.code
    }

    /// Display the full error with all context and suggestions.
    pub fn display_full(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error [{}]: {}\n", self.code.code(), self.message));

        if let Some(ref op) = self.context.operation {
            output.push_str(&format!("  → While: {}\n", op));
        }
        if let Some(ref model) = self.context.model {
            output.push_str(&format!("  → Model: {}\n", model));
        }
        if let Some(ref field) = self.context.field {
            output.push_str(&format!("  → Field: {}\n", field));
        }
        if let Some(ref relation) = self.context.relation {
            output.push_str(&format!("  → Relation: {}\n", relation));
        }

        if !self.context.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in self.context.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion.text));
                if let Some(ref code) = suggestion.code {
                    output.push_str(&format!(
                        "     ```\n     {}\n     ```\n",
                        code.replace('\n', "\n     ")
                    ));
                }
            }
        }

        if let Some(ref help) = self.context.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }

        output
    }
}

impl From<SchemaError> for QueryError {
    fn from(err: SchemaError) -> Self {
        let mapped = match &err {
            SchemaError::UnknownModel { model } => QueryError::unknown_model(model),
            SchemaError::UnknownRelation { model, relation } => {
                QueryError::unknown_relation(model, relation)
            }
            SchemaError::UnknownField { model, field } => QueryError::unknown_field(model, field),
            SchemaError::NotAChoiceField { model, field } => QueryError::new(
                ErrorCode::NotAChoiceField,
                format!("Field `{}.{}` declares no choices", model, field),
            )
            .with_model(model)
            .with_field(field),
            other => QueryError::new(ErrorCode::InvalidSchema, other.to_string()),
        };
        mapped.with_source(err)
    }
}

/// Helper for creating errors with context.
#[macro_export]
macro_rules! query_error {
    ($code:expr, $msg:expr) => {
        $crate::error::QueryError::new($code, $msg)
    };
    ($code:expr, $msg:expr, $($key:ident = $value:expr),+ $(,)?) => {{
        let mut err = $crate::error::QueryError::new($code, $msg);
        $(
            err = err.$key($value);
        )+
        err
    }};
}
