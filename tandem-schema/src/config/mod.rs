//! Schema file parsing for `tandem.toml`.
//!
//! ```toml
//! [[models]]
//! name = "owner"
//! fields = ["name"]
//!
//! [[models]]
//! name = "thing"
//! fields = ["name", { name = "size", choices = [["L", "Large"], ["S", "Small"]] }]
//! relations = [{ name = "widget", target = "widget", kind = "one_to_one" }]
//! ```
//!
//! `${VAR}` references are expanded from the environment before parsing.

use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::ast::{FieldDef, ModelDef, RelationDef, Schema};
use crate::error::{SchemaError, SchemaResult};
use crate::validator::Validator;

/// Contents of a schema file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaFile {
    /// Model declarations.
    #[serde(default)]
    pub models: Vec<ModelEntry>,
}

/// One `[[models]]` table.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelEntry {
    /// Model name.
    pub name: SmolStr,
    /// Scalar fields.
    #[serde(default)]
    pub fields: Vec<FieldEntry>,
    /// Owned relations.
    #[serde(default)]
    pub relations: Vec<RelationDef>,
}

/// A field given either as a bare name or as a table with choices.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FieldEntry {
    /// `"name"`
    Name(SmolStr),
    /// `{ name = "size", choices = [...] }`
    Detailed(FieldDef),
}

impl From<FieldEntry> for FieldDef {
    fn from(entry: FieldEntry) -> Self {
        match entry {
            FieldEntry::Name(name) => FieldDef::new(name),
            FieldEntry::Detailed(def) => def,
        }
    }
}

impl From<ModelEntry> for ModelDef {
    fn from(entry: ModelEntry) -> Self {
        ModelDef {
            name: entry.name,
            fields: entry.fields.into_iter().map(FieldDef::from).collect(),
            relations: entry.relations,
        }
    }
}

impl SchemaFile {
    /// Load a schema file from a path.
    pub fn from_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&content)
    }

    /// Parse a schema file from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> SchemaResult<Self> {
        let expanded = expand_env_vars(content);

        toml::from_str(&expanded).map_err(|e| SchemaError::TomlError { source: e })
    }

    /// Validate the declared models into a schema.
    pub fn into_schema(self) -> SchemaResult<Schema> {
        Validator::new().validate(self.models.into_iter().map(ModelDef::from).collect())
    }
}

impl Schema {
    /// Parse and validate a schema from a TOML string.
    pub fn from_toml_str(content: &str) -> SchemaResult<Self> {
        SchemaFile::from_str(content)?.into_schema()
    }

    /// Load and validate a schema from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        SchemaFile::from_file(path)?.into_schema()
    }
}

static ENV_VAR: LazyLock<regex_lite::Regex> = LazyLock::new(|| {
    regex_lite::Regex::new(r"\$\{([^}]+)\}").expect("environment variable pattern is valid")
});

/// Expand `${VAR}` references; unknown variables are left as written.
fn expand_env_vars(content: &str) -> String {
    let mut result = content.to_string();

    for cap in ENV_VAR.captures_iter(content) {
        let var_name = &cap[1];
        let full_match = &cap[0];

        if let Ok(value) = std::env::var(var_name) {
            result = result.replace(full_match, &value);
        }
    }

    result
}
