//! Load requests: what to load, and what to eagerly attach to it.
//!
//! A [`LoadRequest`] is an immutable description. It is only ever changed by
//! shaping functions (see [`crate::shape`]), each of which consumes a request
//! and returns a new one; a [`DataStore`](crate::store::DataStore) executes it.
//!
//! - [`FieldSelection`] restricts which columns are returned
//! - joins attach forward relations within the same query
//! - [`Prefetch`]es attach relations with one extra batch query each

mod include;
mod order;
mod select;

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use smol_str::SmolStr;
use tandem_schema::{RelationDescriptor, SchemaRef};

use crate::error::{QueryError, QueryResult};

pub use include::{Prefetch, PrefetchKind};
pub use order::{OrderByField, SortOrder};
pub use select::FieldSelection;

/// A request for a collection of records, plus instructions for what related
/// data to eagerly attach and which fields to restrict to.
#[derive(Clone)]
pub struct LoadRequest {
    model: SmolStr,
    schema: SchemaRef,
    selection: FieldSelection,
    join_selections: IndexMap<SmolStr, FieldSelection>,
    joins: IndexSet<SmolStr>,
    prefetches: IndexMap<SmolStr, Prefetch>,
    ordering: Vec<OrderByField>,
    limit: Option<usize>,
}

impl LoadRequest {
    /// Create a request for every record of `model`.
    pub fn new(model: impl Into<SmolStr>, schema: SchemaRef) -> QueryResult<Self> {
        let model = model.into();
        if !schema.has_model(&model) {
            return Err(QueryError::unknown_model(model.as_str()));
        }
        Ok(Self {
            model,
            schema,
            selection: FieldSelection::All,
            join_selections: IndexMap::new(),
            joins: IndexSet::new(),
            prefetches: IndexMap::new(),
            ordering: Vec::new(),
            limit: None,
        })
    }

    /// A fresh request for another model of the same schema.
    pub fn related_base(&self, model: &str) -> QueryResult<Self> {
        Self::new(model, self.schema.clone())
    }

    /// Describe a relation of this request's model.
    pub fn describe(&self, relation: &str) -> QueryResult<RelationDescriptor> {
        Ok(self.schema.describe_relationship(&self.model, relation)?)
    }

    /// Name of the model being loaded.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Schema the request is resolved against.
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Fields selected on this model.
    pub fn selection(&self) -> &FieldSelection {
        &self.selection
    }

    /// Fields selected on a joined relation.
    pub fn join_selection(&self, relation: &str) -> Option<&FieldSelection> {
        self.join_selections.get(relation)
    }

    /// Relations restricted through a dotted path (`owner.name`).
    pub fn join_selections(&self) -> impl Iterator<Item = (&str, &FieldSelection)> {
        self.join_selections.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Forward relations loaded within the same query.
    pub fn joins(&self) -> impl Iterator<Item = &str> {
        self.joins.iter().map(SmolStr::as_str)
    }

    /// Relations loaded with a batch query each.
    pub fn prefetches(&self) -> impl Iterator<Item = &Prefetch> {
        self.prefetches.values()
    }

    /// Get a prefetch by relation name.
    pub fn prefetch(&self, relation: &str) -> Option<&Prefetch> {
        self.prefetches.get(relation)
    }

    /// Ordering applied to the loaded records.
    pub fn ordering(&self) -> &[OrderByField] {
        &self.ordering
    }

    /// Maximum number of records to load.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Restrict the loaded fields.
    ///
    /// A dotted name (`owner.name`) restricts the fields of the joined
    /// relation `owner` instead.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = impl Into<SmolStr>>) -> Self {
        for field in fields {
            let field: SmolStr = field.into();
            match field.split_once('.') {
                Some((relation, rest)) => {
                    let selection = self
                        .join_selections
                        .shift_remove(relation)
                        .unwrap_or_default()
                        .include([rest]);
                    self.join_selections.insert(relation.into(), selection);
                }
                None => {
                    self.selection = std::mem::take(&mut self.selection).include([field.as_str()]);
                }
            }
        }
        self
    }

    /// Load a forward relation within the same query.
    pub fn with_join(mut self, relation: impl Into<SmolStr>) -> Self {
        self.joins.insert(relation.into());
        self
    }

    /// Attach a prefetch.
    ///
    /// A second prefetch of the same relation merges into the first, so the
    /// result does not depend on which was attached first. Prefetches that
    /// match related records differently cannot be merged.
    pub fn with_prefetch(mut self, prefetch: Prefetch) -> QueryResult<Self> {
        let Some(existing) = self.prefetches.get_mut(&prefetch.name) else {
            self.prefetches.insert(prefetch.name.clone(), prefetch);
            return Ok(self);
        };

        if existing.kind != prefetch.kind {
            return Err(QueryError::conflicting_prefetch(
                self.model.as_str(),
                prefetch.name.as_str(),
                format!("{:?} and {:?} matching", existing.kind, prefetch.kind),
            ));
        }
        existing.request = existing
            .request
            .clone()
            .merge(prefetch.request, &self.model, &prefetch.name)?;
        Ok(self)
    }

    /// Union of two requests for the related records of `parent.relation`.
    ///
    /// Selections, joins and prefetches are unioned, nested prefetches
    /// merging recursively. Orderings and limits must agree when both set one.
    fn merge(mut self, other: Self, parent: &str, relation: &str) -> QueryResult<Self> {
        if self.model != other.model {
            return Err(QueryError::model_mismatch(
                relation,
                self.model.as_str(),
                other.model.as_str(),
            ));
        }
        let conflict = |what: &str| {
            QueryError::conflicting_prefetch(parent, relation, format!("different {}", what))
        };

        if self.ordering.is_empty() {
            self.ordering = other.ordering;
        } else if !other.ordering.is_empty() && self.ordering != other.ordering {
            return Err(conflict("orderings"));
        }
        match (self.limit, other.limit) {
            (Some(a), Some(b)) if a != b => return Err(conflict("limits")),
            (None, limit) => self.limit = limit,
            _ => {}
        }

        self.selection = std::mem::take(&mut self.selection).union(other.selection);

        // An unrestricted join on either side loads every field of the relation.
        let mut join_selections = IndexMap::new();
        for name in self.join_selections.keys().chain(other.join_selections.keys()) {
            if join_selections.contains_key(name) {
                continue;
            }
            let selection = match (self.join_selections.get(name), other.join_selections.get(name)) {
                (Some(a), Some(b)) => a.clone().union(b.clone()),
                (Some(_), None) if other.joins.contains(name) => FieldSelection::All,
                (None, Some(_)) if self.joins.contains(name) => FieldSelection::All,
                (Some(only), None) | (None, Some(only)) => only.clone(),
                (None, None) => continue,
            };
            if !selection.is_all() {
                join_selections.insert(name.clone(), selection);
            }
        }
        self.join_selections = join_selections;
        self.joins.extend(other.joins);

        other
            .prefetches
            .into_values()
            .try_fold(self, LoadRequest::with_prefetch)
    }

    /// Replace the ordering.
    pub fn with_ordering(mut self, ordering: impl IntoIterator<Item = OrderByField>) -> Self {
        self.ordering = ordering.into_iter().collect();
        self
    }

    /// Limit the number of loaded records.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl fmt::Debug for LoadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadRequest")
            .field("model", &self.model)
            .field("selection", &self.selection)
            .field("join_selections", &self.join_selections)
            .field("joins", &self.joins)
            .field("prefetches", &self.prefetches)
            .field("ordering", &self.ordering)
            .field("limit", &self.limit)
            .finish()
    }
}
