//! The projection function space.
//!
//! A [`ProjectFn`] reads a loaded [`Record`] and produces a [`Projection`]:
//! an ordered mapping from output keys to JSON values. Projection only reads
//! what loading attached; data that was never loaded is an error.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use smol_str::SmolStr;
use tandem_schema::Cardinality;

use crate::error::{QueryError, QueryResult};
use crate::record::Record;

/// Output of projecting one record. Keys keep insertion order.
pub type Projection = serde_json::Map<String, JsonValue>;

/// A function from a loaded record to its projection.
pub type ProjectFn = Arc<dyn Fn(&Record) -> QueryResult<Projection> + Send + Sync>;

/// Wrap a closure as a [`ProjectFn`].
pub fn project_fn<F>(f: F) -> ProjectFn
where
    F: Fn(&Record) -> QueryResult<Projection> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A projection that emits nothing.
pub fn empty() -> ProjectFn {
    project_fn(|_| Ok(Projection::new()))
}

/// Emit `{name: value}` for a loaded field.
pub fn field(name: impl Into<SmolStr>) -> ProjectFn {
    let name = name.into();
    project_fn(move |record| {
        let value = record.get(&name)?.to_json();
        Ok(Projection::from_iter([(name.to_string(), value)]))
    })
}

/// Emit `{"<name>_display": label}` for an enumerated field.
pub fn field_display(name: impl Into<SmolStr>) -> ProjectFn {
    let name = name.into();
    let key = format!("{}_display", name);
    project_fn(move |record| {
        let label = record.display_label(&name)?;
        Ok(Projection::from_iter([(key.clone(), JsonValue::String(label))]))
    })
}

/// Emit `{name: nested}` for an eagerly loaded relation.
///
/// A single relation emits the nested projection, or `null` when there is no
/// related record; a multiple relation emits a list of nested projections in
/// load order.
pub fn relationship(
    name: impl Into<SmolStr>,
    nested: ProjectFn,
    cardinality: Cardinality,
) -> ProjectFn {
    let name = name.into();
    project_fn(move |record| {
        let related = record.related(&name)?;
        let value = match cardinality {
            Cardinality::Single => match related.iter().next() {
                Some(child) => JsonValue::Object(nested(child)?),
                None => JsonValue::Null,
            },
            Cardinality::Multiple => JsonValue::Array(
                related
                    .iter()
                    .map(|child| nested(child).map(JsonValue::Object))
                    .collect::<QueryResult<_>>()?,
            ),
        };
        Ok(Projection::from_iter([(name.to_string(), value)]))
    })
}

/// Shallow-merge projections in order.
///
/// When two projections emit the same key, the later one wins; the key keeps
/// the position where it first appeared.
pub fn compose(fns: impl IntoIterator<Item = ProjectFn>) -> ProjectFn {
    let mut fns: Vec<ProjectFn> = fns.into_iter().collect();
    match fns.len() {
        0 => empty(),
        1 => fns.pop().unwrap_or_else(empty),
        _ => project_fn(move |record| {
            let mut merged = Projection::new();
            for project in &fns {
                merged.extend(project(record)?);
            }
            Ok(merged)
        }),
    }
}

/// How [`rename`] maps output keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasSpec {
    /// Rename the only key of the projection.
    Single(String),
    /// Rename each matching key; other keys pass through.
    Map(IndexMap<String, String>),
}

impl AliasSpec {
    /// Apply the renaming to a projection.
    pub fn apply(&self, projection: Projection) -> QueryResult<Projection> {
        match self {
            Self::Single(alias) => {
                if projection.len() != 1 {
                    return Err(QueryError::alias_arity(alias.as_str(), projection.len()));
                }
                Ok(projection
                    .into_iter()
                    .map(|(_, value)| (alias.clone(), value))
                    .collect())
            }
            Self::Map(mapping) if mapping.is_empty() => Ok(projection),
            Self::Map(mapping) => Ok(projection
                .into_iter()
                .map(|(key, value)| match mapping.get(&key) {
                    Some(renamed) => (renamed.clone(), value),
                    None => (key, value),
                })
                .collect()),
        }
    }
}

impl From<&str> for AliasSpec {
    fn from(alias: &str) -> Self {
        Self::Single(alias.to_string())
    }
}

impl From<String> for AliasSpec {
    fn from(alias: String) -> Self {
        Self::Single(alias)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for AliasSpec {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self::Map(
            pairs
                .into_iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        )
    }
}

impl From<Vec<(&str, &str)>> for AliasSpec {
    fn from(pairs: Vec<(&str, &str)>) -> Self {
        Self::Map(
            pairs
                .into_iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        )
    }
}

impl From<IndexMap<String, String>> for AliasSpec {
    fn from(mapping: IndexMap<String, String>) -> Self {
        Self::Map(mapping)
    }
}

impl From<HashMap<String, String>> for AliasSpec {
    fn from(mapping: HashMap<String, String>) -> Self {
        Self::Map(mapping.into_iter().collect())
    }
}

/// Rename the keys `inner` emits.
pub fn rename(spec: impl Into<AliasSpec>, inner: ProjectFn) -> ProjectFn {
    let spec = spec.into();
    project_fn(move |record| spec.apply(inner(record)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::record::Related;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tandem_schema::{ModelDef, Schema, SchemaRef};

    fn schema() -> SchemaRef {
        Arc::new(
            Schema::builder()
                .model(
                    ModelDef::new("thing")
                        .field("name")
                        .choice_field("size", [("L", "Large"), ("S", "Small")]),
                )
                .build()
                .unwrap(),
        )
    }

    fn thing(name: &str, size: &str) -> Record {
        Record::new("thing", schema())
            .with_field("id", 1)
            .with_field("name", name)
            .with_field("size", size)
    }

    fn json(projection: Projection) -> JsonValue {
        JsonValue::Object(projection)
    }

    #[test]
    fn test_field() {
        let out = field("name")(&thing("first", "L")).unwrap();
        assert_eq!(json(out), json!({"name": "first"}));
    }

    #[test]
    fn test_field_display() {
        let out = field_display("size")(&thing("first", "S")).unwrap();
        assert_eq!(json(out), json!({"size_display": "Small"}));
    }

    #[test]
    fn test_field_not_loaded() {
        let record = Record::new("thing", schema()).with_field("id", 1);
        let err = field("name")(&record).unwrap_err();
        assert_eq!(err.code, ErrorCode::FieldNotLoaded);
    }

    #[test]
    fn test_compose_last_write_wins() {
        let project = compose([
            field("name"),
            field("size"),
            rename([("size", "name")], field("size")),
        ]);
        let out = project(&thing("first", "L")).unwrap();
        assert_eq!(json(out.clone()), json!({"name": "L", "size": "L"}));
        assert_eq!(out.keys().collect::<Vec<_>>(), ["name", "size"]);
    }

    #[test]
    fn test_compose_of_nothing_is_empty() {
        let out = compose([])(&thing("first", "L")).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_relationship_single_and_multiple() {
        let mut parent = thing("parent", "L");
        parent.set_related("child", Related::One(Some(Box::new(thing("kid", "S")))));
        parent.set_related("empty", Related::One(None));
        parent.set_related(
            "children",
            Related::Many(vec![thing("a", "L"), thing("b", "S")]),
        );

        let project = compose([
            relationship("child", field("name"), Cardinality::Single),
            relationship("empty", field("name"), Cardinality::Single),
            relationship("children", field("name"), Cardinality::Multiple),
        ]);
        assert_eq!(
            json(project(&parent).unwrap()),
            json!({
                "child": {"name": "kid"},
                "empty": null,
                "children": [{"name": "a"}, {"name": "b"}],
            })
        );
    }

    #[test]
    fn test_relationship_not_loaded() {
        let err = relationship("child", field("name"), Cardinality::Single)(&thing("p", "L"))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RelationNotLoaded);
    }

    #[test]
    fn test_rename_single_key() {
        let out = rename("title", field("name"))(&thing("first", "L")).unwrap();
        assert_eq!(json(out), json!({"title": "first"}));
    }

    #[test]
    fn test_rename_single_key_arity() {
        let project = rename("title", compose([field("name"), field("size")]));
        let err = project(&thing("first", "L")).unwrap_err();
        assert_eq!(err.code, ErrorCode::AliasArity);
    }

    #[test]
    fn test_rename_map_keeps_positions() {
        let project = rename(
            [("name", "title")],
            compose([field("name"), field("size")]),
        );
        let out = project(&thing("first", "L")).unwrap();
        assert_eq!(out.keys().collect::<Vec<_>>(), ["title", "size"]);
    }

    #[test]
    fn test_empty_map_is_passthrough() {
        let spec = AliasSpec::from(IndexMap::new());
        let out = spec.apply(field("name")(&thing("first", "L")).unwrap()).unwrap();
        assert_eq!(json(out), json!({"name": "first"}));
    }
}
