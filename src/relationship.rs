//! Pairs that traverse relationships.
//!
//! Every relationship is loaded with a prefetch: one extra batch query per
//! relationship, however many records are loaded. That keeps traversal
//! recursive, since the nested pair shapes the related request the same way
//! the outer pair shapes the root request.
//!
//! From one model's point of view there are six relationship kinds, which
//! collapse to four traversals:
//!
//! | relationship | traversal | emits |
//! |---|---|---|
//! | forward one-to-one, forward many-to-one | [`forward_relationship`] | mapping or `null` |
//! | reverse one-to-one | [`reverse_one_to_one_relationship`] | mapping or `null` |
//! | reverse many-to-one | [`reverse_relationship`] | list |
//! | many-to-many, either side | [`many_to_many_relationship`] | list |
//!
//! [`auto_relationship`] picks the traversal from the schema.

use smol_str::SmolStr;
use tandem_query::project::{self, ProjectFn};
use tandem_query::shape::{self, ShapeFn};
use tandem_query::{LoadRequest, QueryError, QueryResult};
use tandem_schema::{Cardinality, Direction, RelationDescriptor};
use tracing::trace;

use crate::pair::Pair;

/// Traverse a forward one-to-one or many-to-one relationship.
///
/// `nested` shapes `related_base` and projects the related record, which is
/// emitted under `name` (or `null` when the reference is unset).
pub fn forward_relationship(
    name: impl Into<SmolStr>,
    related_base: LoadRequest,
    nested: Pair,
) -> Pair {
    let name = name.into();
    let (nested_shape, nested_project) = nested.into_parts();
    let relation = name.clone();
    let shape = shape::shape_fn(move |request| {
        let related = nested_shape(related_base.clone())?;
        shape::prefetch_forward(relation.clone(), related)(request)
    });
    Pair::new(
        shape,
        project::relationship(name, nested_project, Cardinality::Single),
    )
}

/// Traverse a forward one-to-one relationship.
pub fn forward_one_to_one_relationship(
    name: impl Into<SmolStr>,
    related_base: LoadRequest,
    nested: Pair,
) -> Pair {
    forward_relationship(name, related_base, nested)
}

/// Traverse a forward many-to-one relationship.
pub fn forward_many_to_one_relationship(
    name: impl Into<SmolStr>,
    related_base: LoadRequest,
    nested: Pair,
) -> Pair {
    forward_relationship(name, related_base, nested)
}

/// Traverse a reverse many-to-one relationship, emitting a list.
///
/// `back_reference` is the relation on the related model that points back at
/// this one; it must match the schema.
pub fn reverse_relationship(
    name: impl Into<SmolStr>,
    back_reference: impl Into<SmolStr>,
    related_base: LoadRequest,
    nested: Pair,
) -> Pair {
    reverse(
        name.into(),
        back_reference.into(),
        related_base,
        nested,
        Cardinality::Multiple,
    )
}

/// Traverse a reverse many-to-one relationship, emitting a list.
pub fn reverse_many_to_one_relationship(
    name: impl Into<SmolStr>,
    back_reference: impl Into<SmolStr>,
    related_base: LoadRequest,
    nested: Pair,
) -> Pair {
    reverse_relationship(name, back_reference, related_base, nested)
}

/// Traverse a reverse one-to-one relationship, emitting a mapping or `null`.
pub fn reverse_one_to_one_relationship(
    name: impl Into<SmolStr>,
    back_reference: impl Into<SmolStr>,
    related_base: LoadRequest,
    nested: Pair,
) -> Pair {
    reverse(
        name.into(),
        back_reference.into(),
        related_base,
        nested,
        Cardinality::Single,
    )
}

fn reverse(
    name: SmolStr,
    back_reference: SmolStr,
    related_base: LoadRequest,
    nested: Pair,
    cardinality: Cardinality,
) -> Pair {
    let (nested_shape, nested_project) = nested.into_parts();
    let relation = name.clone();
    let shape = shape::shape_fn(move |request| {
        let related = nested_shape(related_base.clone())?;
        shape::prefetch_reverse(relation.clone(), back_reference.clone(), related, cardinality)(
            request,
        )
    });
    Pair::new(shape, project::relationship(name, nested_project, cardinality))
}

/// Traverse a many-to-many relationship from either side, emitting a list.
pub fn many_to_many_relationship(
    name: impl Into<SmolStr>,
    related_base: LoadRequest,
    nested: Pair,
) -> Pair {
    let name = name.into();
    let (nested_shape, nested_project) = nested.into_parts();
    let relation = name.clone();
    let shape = shape::shape_fn(move |request| {
        let related = nested_shape(related_base.clone())?;
        shape::prefetch_many_to_many(relation.clone(), related)(request)
    });
    Pair::new(
        shape,
        project::relationship(name, nested_project, Cardinality::Multiple),
    )
}

/// Traverse a relationship of any kind, chosen from the schema.
///
/// The related request starts from every record of the related model, and
/// the back-reference comes from the schema. Output is identical to the
/// traversal picked by hand.
///
/// ```rust
/// use tandem::prelude::*;
/// use tandem::schema::{ModelDef, Schema};
///
/// let schema = Schema::builder()
///     .model(ModelDef::new("owner").field("name"))
///     .model(ModelDef::new("widget").field("name").foreign_key("owner", "owner"))
///     .build()
///     .unwrap();
/// let store = MemoryStore::new(schema);
/// let owner = store.insert("owner", [("name", "first")]).unwrap();
/// store.insert("widget", [("name", Value::from("a")), ("owner", owner.into())]).unwrap();
///
/// let pair = combine([
///     field("name"),
///     auto_relationship("widget_set", field("name")),
/// ]);
/// let out = pair.load(&store, store.collection("owner").unwrap()).unwrap();
/// assert_eq!(out[0]["widget_set"][0]["name"], "a");
/// ```
pub fn auto_relationship(name: impl Into<SmolStr>, nested: Pair) -> Pair {
    let name = name.into();
    let (nested_shape, nested_project) = nested.into_parts();
    Pair::new(
        auto_shape(name.clone(), nested_shape),
        auto_project(name, nested_project),
    )
}

/// The traversal a relation descriptor calls for.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Traversal {
    Forward,
    Reverse {
        back_reference: SmolStr,
        cardinality: Cardinality,
    },
    ManyToMany,
}

impl Traversal {
    fn of(descriptor: &RelationDescriptor) -> QueryResult<Self> {
        if descriptor.symmetrical {
            return Ok(Self::ManyToMany);
        }
        match (
            descriptor.direction,
            descriptor.cardinality,
            &descriptor.back_reference,
        ) {
            (Direction::Forward, Cardinality::Single, _) => Ok(Self::Forward),
            (Direction::Reverse, cardinality, Some(back_reference)) => Ok(Self::Reverse {
                back_reference: back_reference.clone(),
                cardinality,
            }),
            _ => Err(QueryError::unsupported_relation(
                descriptor.model.as_str(),
                descriptor.name.as_str(),
                descriptor.kind_label(),
            )),
        }
    }

    fn cardinality(&self) -> Cardinality {
        match self {
            Self::Forward => Cardinality::Single,
            Self::Reverse { cardinality, .. } => *cardinality,
            Self::ManyToMany => Cardinality::Multiple,
        }
    }
}

fn auto_shape(name: SmolStr, nested_shape: ShapeFn) -> ShapeFn {
    shape::shape_fn(move |request| {
        let descriptor = request.describe(&name)?;
        let traversal = Traversal::of(&descriptor)?;
        trace!(
            model = request.model(),
            relation = name.as_str(),
            traversal = ?traversal,
            "resolved relationship"
        );

        let related = nested_shape(request.related_base(&descriptor.related_model)?)?;
        let prefetch = match traversal {
            Traversal::Forward => shape::prefetch_forward(name.clone(), related),
            Traversal::Reverse {
                back_reference,
                cardinality,
            } => shape::prefetch_reverse(name.clone(), back_reference, related, cardinality),
            Traversal::ManyToMany => shape::prefetch_many_to_many(name.clone(), related),
        };
        prefetch(request)
    })
}

fn auto_project(name: SmolStr, nested_project: ProjectFn) -> ProjectFn {
    project::project_fn(move |record| {
        let descriptor = record
            .schema()
            .describe_relationship(record.model(), &name)?;
        let cardinality = Traversal::of(&descriptor)?.cardinality();
        project::relationship(name.clone(), nested_project.clone(), cardinality)(record)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pair::{combine, field};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tandem_query::ErrorCode;
    use tandem_schema::{ModelDef, Schema, SchemaIntrospector, SchemaRef, SchemaResult};

    fn schema() -> SchemaRef {
        Arc::new(
            Schema::builder()
                .model(ModelDef::new("owner").field("name"))
                .model(
                    ModelDef::new("widget")
                        .field("name")
                        .foreign_key("owner", "owner"),
                )
                .model(
                    ModelDef::new("thing")
                        .field("name")
                        .one_to_one("widget", "widget"),
                )
                .model(ModelDef::new("category").many_to_many("widget_set", "widget"))
                .build()
                .unwrap(),
        )
    }

    fn base(model: &str) -> LoadRequest {
        LoadRequest::new(model, schema()).unwrap()
    }

    fn describe(model: &str, name: &str) -> RelationDescriptor {
        schema().describe_relationship(model, name).unwrap()
    }

    #[test]
    fn test_traversal_of_each_kind() {
        assert_eq!(Traversal::of(&describe("widget", "owner")).unwrap(), Traversal::Forward);
        assert_eq!(Traversal::of(&describe("thing", "widget")).unwrap(), Traversal::Forward);
        assert_eq!(
            Traversal::of(&describe("owner", "widget_set")).unwrap(),
            Traversal::Reverse {
                back_reference: "owner".into(),
                cardinality: Cardinality::Multiple,
            }
        );
        assert_eq!(
            Traversal::of(&describe("widget", "thing")).unwrap(),
            Traversal::Reverse {
                back_reference: "widget".into(),
                cardinality: Cardinality::Single,
            }
        );
        assert_eq!(
            Traversal::of(&describe("category", "widget_set")).unwrap(),
            Traversal::ManyToMany
        );
        assert_eq!(
            Traversal::of(&describe("widget", "category_set")).unwrap(),
            Traversal::ManyToMany
        );
    }

    /// Describes every relation as forward and multiple without being
    /// many-to-many, which no traversal handles.
    #[derive(Debug)]
    struct ForwardMultiple;

    impl SchemaIntrospector for ForwardMultiple {
        fn describe_relationship(&self, model: &str, name: &str) -> SchemaResult<RelationDescriptor> {
            Ok(RelationDescriptor {
                name: name.into(),
                model: model.into(),
                related_model: "widget".into(),
                direction: Direction::Forward,
                cardinality: Cardinality::Multiple,
                symmetrical: false,
                back_reference: None,
            })
        }

        fn display_label(&self, _: &str, _: &str, raw: &str) -> SchemaResult<String> {
            Ok(raw.to_string())
        }

        fn has_model(&self, _: &str) -> bool {
            true
        }

        fn has_field(&self, _: &str, _: &str) -> bool {
            true
        }
    }

    #[test]
    fn test_auto_rejects_unsupported_kind() {
        let request = LoadRequest::new("owner", Arc::new(ForwardMultiple)).unwrap();
        let err = auto_relationship("widgets", field("name"))
            .prepare(request)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedRelation);
        assert!(err.message.contains("forward multiple"));
    }

    #[test]
    fn test_auto_unknown_relation() {
        let err = auto_relationship("gadget_set", field("name"))
            .prepare(base("owner"))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownRelation);
    }

    #[test]
    fn test_auto_shapes_like_manual() {
        let auto = auto_relationship("widget_set", field("name"))
            .prepare(base("owner"))
            .unwrap();
        let manual = reverse_relationship("widget_set", "owner", base("widget"), field("name"))
            .prepare(base("owner"))
            .unwrap();
        assert_eq!(format!("{:?}", auto), format!("{:?}", manual));
    }

    #[test]
    fn test_nested_errors_surface_at_shaping() {
        let pair = forward_relationship(
            "owner",
            base("owner"),
            combine([field("name"), auto_relationship("gadget", field("name"))]),
        );
        let err = pair.prepare(base("widget")).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownRelation);
        assert_eq!(err.context.model.as_deref(), Some("owner"));
    }

    #[test]
    fn test_wrong_traversal_is_a_configuration_error() {
        let err = forward_relationship("widget_set", base("widget"), field("name"))
            .prepare(base("owner"))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RelationKindMismatch);

        let err = reverse_one_to_one_relationship("widget_set", "owner", base("widget"), field("name"))
            .prepare(base("owner"))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RelationKindMismatch);

        let err = reverse_relationship("widget_set", "group", base("widget"), field("name"))
            .prepare(base("owner"))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BackReferenceMismatch);
    }
}
