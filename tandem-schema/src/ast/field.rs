//! Scalar field definitions.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// One permitted value of an enumerated field and its human-readable label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(SmolStr, SmolStr)", into = "(SmolStr, SmolStr)")]
pub struct Choice {
    /// Raw value as stored.
    pub value: SmolStr,
    /// Label shown to people.
    pub label: SmolStr,
}

impl Choice {
    /// Create a new choice.
    pub fn new(value: impl Into<SmolStr>, label: impl Into<SmolStr>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

impl From<(SmolStr, SmolStr)> for Choice {
    fn from((value, label): (SmolStr, SmolStr)) -> Self {
        Self { value, label }
    }
}

impl From<Choice> for (SmolStr, SmolStr) {
    fn from(choice: Choice) -> Self {
        (choice.value, choice.label)
    }
}

/// A scalar field on a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDef {
    /// Field name.
    pub name: SmolStr,
    /// Declared choices; empty for free-form fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
}

impl FieldDef {
    /// Create a free-form field.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            choices: Vec::new(),
        }
    }

    /// Create an enumerated field.
    pub fn with_choices<V, L>(name: impl Into<SmolStr>, choices: impl IntoIterator<Item = (V, L)>) -> Self
    where
        V: Into<SmolStr>,
        L: Into<SmolStr>,
    {
        Self {
            name: name.into(),
            choices: choices
                .into_iter()
                .map(|(value, label)| Choice::new(value, label))
                .collect(),
        }
    }

    /// Get the field name as a string.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Check if the field declares choices.
    pub fn has_choices(&self) -> bool {
        !self.choices.is_empty()
    }

    /// Find the label for a raw value.
    pub fn label_for(&self, raw: &str) -> Option<&str> {
        self.choices
            .iter()
            .find(|c| c.value == raw)
            .map(|c| c.label.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_field() {
        let field = FieldDef::new("name");
        assert_eq!(field.name(), "name");
        assert!(!field.has_choices());
        assert_eq!(field.label_for("anything"), None);
    }

    #[test]
    fn test_choice_field_labels() {
        let field = FieldDef::with_choices("size", [("L", "Large"), ("S", "Small")]);
        assert!(field.has_choices());
        assert_eq!(field.label_for("L"), Some("Large"));
        assert_eq!(field.label_for("S"), Some("Small"));
        assert_eq!(field.label_for("M"), None);
    }

    #[test]
    fn test_choice_roundtrips_as_pair() {
        let choice: Choice = serde_json::from_str(r#"["L", "Large"]"#).unwrap();
        assert_eq!(choice, Choice::new("L", "Large"));
    }
}
