//! The shaping function space.
//!
//! A [`ShapeFn`] takes a [`LoadRequest`] and returns a new one with extra
//! loading instructions attached. Shaping never touches the data store;
//! relation-level checks against the schema run here so that a misconfigured
//! pair fails before anything is loaded.
//!
//! ```rust
//! use std::sync::Arc;
//! use tandem_query::shape;
//! use tandem_query::LoadRequest;
//! use tandem_schema::{ModelDef, Schema};
//!
//! let schema = Schema::builder()
//!     .model(ModelDef::new("owner").field("name"))
//!     .model(ModelDef::new("widget").field("name").foreign_key("owner", "owner"))
//!     .build()
//!     .unwrap();
//! let base = LoadRequest::new("widget", Arc::new(schema)).unwrap();
//!
//! let shaped = shape::pipe([
//!     shape::include_fields(["name"]),
//!     shape::select_related("owner"),
//! ])(base)
//! .unwrap();
//! assert!(shaped.joins().any(|j| j == "owner"));
//! ```

use std::sync::Arc;

use smol_str::SmolStr;
use tandem_schema::{Cardinality, Direction, RelationDescriptor};
use tracing::trace;

use crate::error::{QueryError, QueryResult};
use crate::request::{LoadRequest, OrderByField, Prefetch, PrefetchKind};

/// A function that adds loading instructions to a request.
pub type ShapeFn = Arc<dyn Fn(LoadRequest) -> QueryResult<LoadRequest> + Send + Sync>;

/// Wrap a closure as a [`ShapeFn`].
pub fn shape_fn<F>(f: F) -> ShapeFn
where
    F: Fn(LoadRequest) -> QueryResult<LoadRequest> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A shaping function that returns its request unchanged.
pub fn identity() -> ShapeFn {
    shape_fn(Ok)
}

/// Restrict the loaded fields to (at least) `fields`.
///
/// Restrictions accumulate: applying `include_fields(["a"])` and
/// `include_fields(["b"])` selects both. Field names are checked when the
/// request is executed, not here.
pub fn include_fields<I, S>(fields: I) -> ShapeFn
where
    I: IntoIterator<Item = S>,
    S: Into<SmolStr>,
{
    let fields: Vec<SmolStr> = fields.into_iter().map(Into::into).collect();
    shape_fn(move |request| Ok(request.with_fields(fields.iter().cloned())))
}

/// Load a forward single relation within the same query.
pub fn select_related(name: impl Into<SmolStr>) -> ShapeFn {
    let name = name.into();
    shape_fn(move |request| {
        let descriptor = request.describe(&name)?;
        expect_forward_single(&descriptor)?;
        Ok(request.with_join(name.clone()))
    })
}

/// Replace the ordering of the loaded records.
///
/// `"name"` sorts ascending, `"-name"` descending.
pub fn order_by<I, O>(fields: I) -> ShapeFn
where
    I: IntoIterator<Item = O>,
    O: Into<OrderByField>,
{
    let ordering: Vec<OrderByField> = fields.into_iter().map(Into::into).collect();
    shape_fn(move |request| Ok(request.with_ordering(ordering.iter().cloned())))
}

/// Load at most `n` records.
pub fn limit(n: usize) -> ShapeFn {
    shape_fn(move |request| Ok(request.with_limit(n)))
}

/// Apply shaping functions in order.
pub fn pipe(fns: impl IntoIterator<Item = ShapeFn>) -> ShapeFn {
    let mut fns: Vec<ShapeFn> = fns.into_iter().collect();
    if fns.len() <= 1 {
        return fns.pop().unwrap_or_else(identity);
    }
    shape_fn(move |request| fns.iter().try_fold(request, |request, shape| shape(request)))
}

/// Eagerly load a forward single relation (many-to-one or one-to-one) with
/// one batch query, using `related` to load the related records.
pub fn prefetch_forward(name: impl Into<SmolStr>, related: LoadRequest) -> ShapeFn {
    let name = name.into();
    shape_fn(move |request| {
        let descriptor = request.describe(&name)?;
        expect_forward_single(&descriptor)?;
        attach(request, descriptor, PrefetchKind::Forward, related.clone())
    })
}

/// Eagerly load a reverse relation with one batch query.
///
/// `back_reference` names the relation on the related model that points at
/// this one; `cardinality` is `Single` for reverse one-to-one and `Multiple`
/// for reverse many-to-one.
pub fn prefetch_reverse(
    name: impl Into<SmolStr>,
    back_reference: impl Into<SmolStr>,
    related: LoadRequest,
    cardinality: Cardinality,
) -> ShapeFn {
    let name = name.into();
    let back_reference = back_reference.into();
    shape_fn(move |request| {
        let descriptor = request.describe(&name)?;

        if descriptor.direction != Direction::Reverse
            || descriptor.symmetrical
            || descriptor.cardinality != cardinality
        {
            return Err(QueryError::relation_kind_mismatch(
                request.model(),
                name.as_str(),
                descriptor.kind_label(),
                format!("reverse {}", cardinality),
            ));
        }
        if descriptor.back_reference.as_ref() != Some(&back_reference) {
            return Err(QueryError::back_reference_mismatch(
                request.model(),
                name.as_str(),
                descriptor.back_reference.as_deref().unwrap_or_default(),
                back_reference.as_str(),
            ));
        }

        let kind = PrefetchKind::Reverse {
            back_reference: back_reference.clone(),
            cardinality,
        };
        attach(request, descriptor, kind, related.clone())
    })
}

/// Eagerly load a many-to-many relation, from either side, with one batch
/// query.
pub fn prefetch_many_to_many(name: impl Into<SmolStr>, related: LoadRequest) -> ShapeFn {
    let name = name.into();
    shape_fn(move |request| {
        let descriptor = request.describe(&name)?;
        if !descriptor.symmetrical {
            return Err(QueryError::relation_kind_mismatch(
                request.model(),
                name.as_str(),
                descriptor.kind_label(),
                "many-to-many",
            ));
        }
        attach(request, descriptor, PrefetchKind::ManyToMany, related.clone())
    })
}

fn expect_forward_single(descriptor: &RelationDescriptor) -> QueryResult<()> {
    if descriptor.direction == Direction::Forward
        && descriptor.cardinality == Cardinality::Single
        && !descriptor.symmetrical
    {
        Ok(())
    } else {
        Err(QueryError::relation_kind_mismatch(
            descriptor.model.as_str(),
            descriptor.name.as_str(),
            descriptor.kind_label(),
            "forward single",
        ))
    }
}

fn attach(
    request: LoadRequest,
    descriptor: RelationDescriptor,
    kind: PrefetchKind,
    related: LoadRequest,
) -> QueryResult<LoadRequest> {
    if related.model() != descriptor.related_model.as_str() {
        return Err(QueryError::model_mismatch(
            descriptor.name.as_str(),
            descriptor.related_model.as_str(),
            related.model(),
        ));
    }

    trace!(
        model = request.model(),
        relation = descriptor.name.as_str(),
        kind = ?kind,
        "attaching prefetch"
    );
    request.with_prefetch(Prefetch::new(descriptor.name, kind, related))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use tandem_schema::{ModelDef, Schema, SchemaRef};

    fn schema() -> SchemaRef {
        Arc::new(
            Schema::builder()
                .model(ModelDef::new("group").field("name"))
                .model(
                    ModelDef::new("owner")
                        .field("name")
                        .foreign_key("group", "group"),
                )
                .model(
                    ModelDef::new("widget")
                        .field("name")
                        .foreign_key("owner", "owner"),
                )
                .model(ModelDef::new("category").many_to_many("widget_set", "widget"))
                .build()
                .unwrap(),
        )
    }

    fn base(model: &str) -> LoadRequest {
        LoadRequest::new(model, schema()).unwrap()
    }

    #[test]
    fn test_include_fields_accumulates() {
        let shaped = pipe([include_fields(["name"]), include_fields(["owner"])])(base("widget"))
            .unwrap();
        let selection = shaped.selection();
        assert!(selection.includes("name"));
        assert!(selection.includes("owner"));
        assert!(!selection.includes("group"));
    }

    #[test]
    fn test_pipe_of_nothing_is_identity() {
        let shaped = pipe([])(base("widget")).unwrap();
        assert!(shaped.selection().is_all());
        assert_eq!(shaped.prefetches().count(), 0);
    }

    #[test]
    fn test_prefetch_forward() {
        let shaped = prefetch_forward("owner", base("owner"))(base("widget")).unwrap();
        let prefetch = shaped.prefetch("owner").unwrap();
        assert_eq!(prefetch.kind, PrefetchKind::Forward);
        assert_eq!(prefetch.request.model(), "owner");
    }

    #[test]
    fn test_prefetch_reverse_checks_back_reference() {
        let ok = prefetch_reverse("widget_set", "owner", base("widget"), Cardinality::Multiple)(
            base("owner"),
        );
        assert!(ok.is_ok());

        let err = prefetch_reverse("widget_set", "owned_by", base("widget"), Cardinality::Multiple)(
            base("owner"),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::BackReferenceMismatch);
    }

    #[test]
    fn test_prefetch_reverse_checks_cardinality() {
        let err = prefetch_reverse("widget_set", "owner", base("widget"), Cardinality::Single)(
            base("owner"),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::RelationKindMismatch);
    }

    #[test]
    fn test_forward_traversal_of_reverse_relation_fails() {
        let err = prefetch_forward("widget_set", base("widget"))(base("owner")).unwrap_err();
        assert_eq!(err.code, ErrorCode::RelationKindMismatch);
        assert!(err.message.contains("reverse multiple"));
    }

    #[test]
    fn test_unknown_relation_fails_at_shaping() {
        let err = prefetch_forward("gadget", base("owner"))(base("widget")).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownRelation);
    }

    #[test]
    fn test_related_request_must_match_model() {
        let err = prefetch_forward("owner", base("group"))(base("widget")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ModelMismatch);
    }

    #[test]
    fn test_repeated_prefetch_merges_or_conflicts() {
        let shaped = pipe([
            prefetch_forward("owner", include_fields(["name"])(base("owner")).unwrap()),
            prefetch_forward("owner", include_fields(["group"])(base("owner")).unwrap()),
        ])(base("widget"))
        .unwrap();
        let owner = &shaped.prefetch("owner").unwrap().request;
        assert!(owner.selection().includes("name"));
        assert!(owner.selection().includes("group"));

        let err = pipe([
            prefetch_forward("owner", limit(1)(base("owner")).unwrap()),
            prefetch_forward("owner", limit(2)(base("owner")).unwrap()),
        ])(base("widget"))
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConflictingPrefetch);
    }

    #[test]
    fn test_many_to_many_from_both_sides() {
        assert!(prefetch_many_to_many("widget_set", base("widget"))(base("category")).is_ok());
        assert!(prefetch_many_to_many("category_set", base("category"))(base("widget")).is_ok());

        let err = prefetch_many_to_many("owner", base("owner"))(base("widget")).unwrap_err();
        assert_eq!(err.code, ErrorCode::RelationKindMismatch);
    }

    #[test]
    fn test_select_related_requires_forward_single() {
        assert!(select_related("owner")(base("widget")).is_ok());
        let err = select_related("widget_set")(base("owner")).unwrap_err();
        assert_eq!(err.code, ErrorCode::RelationKindMismatch);
    }

    #[test]
    fn test_order_and_limit() {
        let shaped = pipe([order_by(["-name"]), limit(2)])(base("widget")).unwrap();
        assert_eq!(shaped.ordering(), &[OrderByField::desc("name")]);
        assert_eq!(shaped.limit(), Some(2));
    }
}
