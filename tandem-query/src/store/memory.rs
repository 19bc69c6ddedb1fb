//! In-memory data store.
//!
//! Rows live in per-model tables behind a `parking_lot::RwLock`. Loading
//! follows the batch strategy of a relational store with prefetch support:
//! one scan for the root request, then one scan per prefetch level covering
//! the related ids of every parent at once. Joined relations are resolved
//! during the root scan and cost nothing extra.
//!
//! ```rust
//! use tandem_query::{DataStore, MemoryStore, Value, shape};
//! use tandem_schema::{ModelDef, Schema};
//!
//! let schema = Schema::builder()
//!     .model(ModelDef::new("owner").field("name"))
//!     .model(ModelDef::new("widget").field("name").foreign_key("owner", "owner"))
//!     .build()
//!     .unwrap();
//! let store = MemoryStore::new(schema);
//! let owner = store.insert("owner", [("name", "first")]).unwrap();
//! store.insert("widget", [("name", Value::from("a")), ("owner", owner.into())]).unwrap();
//!
//! let request = shape::prefetch_forward("owner", store.collection("owner").unwrap())(
//!     store.collection("widget").unwrap(),
//! )
//! .unwrap();
//! let widgets = store.execute(&request).unwrap();
//! assert_eq!(widgets.len(), 1);
//! assert_eq!(store.stats().queries, 2);
//! ```

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{self, AtomicU64};

use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use smol_str::SmolStr;
use tandem_schema::{
    Cardinality, Direction, ModelDef, PRIMARY_KEY, RelationKind, Schema, SchemaIntrospector,
    SchemaRef,
};
use tracing::debug;

use super::{DataStore, LoadStats};
use crate::error::{QueryError, QueryResult};
use crate::record::{Record, Related};
use crate::request::{FieldSelection, LoadRequest, OrderByField, Prefetch, PrefetchKind, SortOrder};
use crate::value::Value;

type Row = IndexMap<SmolStr, Value>;

static NULL: Value = Value::Null;

#[derive(Debug, Default)]
struct Tables {
    rows: IndexMap<SmolStr, IndexMap<i64, Row>>,
    /// Many-to-many links keyed by (owning model, relation name), stored as
    /// (owner id, target id).
    links: IndexMap<(SmolStr, SmolStr), IndexSet<(i64, i64)>>,
}

/// A [`DataStore`] holding its rows in memory.
#[derive(Debug)]
pub struct MemoryStore {
    schema: Arc<Schema>,
    tables: RwLock<Tables>,
    loads: AtomicU64,
    queries: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store for a schema.
    pub fn new(schema: impl Into<Arc<Schema>>) -> Self {
        Self {
            schema: schema.into(),
            tables: RwLock::new(Tables::default()),
            loads: AtomicU64::new(0),
            queries: AtomicU64::new(0),
        }
    }

    /// The schema this store holds rows for.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// A shared handle to the schema, as carried by requests and records.
    pub fn schema_ref(&self) -> SchemaRef {
        self.schema.clone()
    }

    /// A request for every record of `model`.
    pub fn collection(&self, model: &str) -> QueryResult<LoadRequest> {
        LoadRequest::new(model, self.schema_ref())
    }

    /// Insert a row and return its id.
    ///
    /// Ids are assigned in sequence per model. Reference columns take the
    /// related record's id (or `Value::Null`); columns left out are null.
    /// A one-to-one reference is unique: two rows cannot point at the same
    /// related record.
    pub fn insert<I, K, V>(&self, model: &str, fields: I) -> QueryResult<i64>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<SmolStr>,
        V: Into<Value>,
    {
        let def = self.model_def(model)?;
        let mut row: Row = def
            .columns()
            .into_iter()
            .map(|column| (column, Value::Null))
            .collect();

        let mut tables = self.tables.write();
        for (column, value) in fields {
            let column = column.into();
            let value = value.into();

            if column.as_str() == PRIMARY_KEY {
                return Err(QueryError::database(format!(
                    "`{}` ids are assigned by the store",
                    model
                ))
                .with_model(model)
                .with_field(PRIMARY_KEY));
            }
            if !def.has_column(&column) {
                return Err(QueryError::unknown_field(model, column.as_str()));
            }
            if let Some(relation) = def.get_relation(&column) {
                match value.as_int() {
                    Some(id) if !tables.contains(&relation.target, id) => {
                        return Err(missing_row(&relation.target, id).with_relation(column.as_str()));
                    }
                    Some(id)
                        if relation.kind == RelationKind::OneToOne
                            && tables.references(model, &column, id) =>
                    {
                        return Err(QueryError::database(format!(
                            "`{}` {} is already referenced by another `{}` through one-to-one `{}`",
                            relation.target, id, model, column
                        ))
                        .with_model(model)
                        .with_relation(column.as_str()));
                    }
                    None if !value.is_null() => {
                        return Err(QueryError::database(format!(
                            "Reference `{}.{}` takes an id, got `{}`",
                            model, column, value
                        ))
                        .with_model(model)
                        .with_relation(column.as_str()));
                    }
                    _ => {}
                }
            }
            row.insert(column, value);
        }

        let table = tables.rows.entry(SmolStr::new(model)).or_default();
        let id = table.keys().next_back().map_or(1, |last| last + 1);
        row.insert(SmolStr::new_static(PRIMARY_KEY), Value::Int(id));
        table.insert(id, row);

        debug!(model, id, "inserted record");
        Ok(id)
    }

    /// Link two records through a many-to-many relation.
    ///
    /// The relation may be named from either side; linking twice is a no-op.
    pub fn link(&self, model: &str, relation: &str, from: i64, to: i64) -> QueryResult<()> {
        let descriptor = self.schema.describe_relationship(model, relation)?;
        if !descriptor.symmetrical {
            return Err(QueryError::relation_kind_mismatch(
                model,
                relation,
                descriptor.kind_label(),
                "many-to-many",
            ));
        }

        let mut tables = self.tables.write();
        if !tables.contains(model, from) {
            return Err(missing_row(model, from));
        }
        if !tables.contains(&descriptor.related_model, to) {
            return Err(missing_row(&descriptor.related_model, to));
        }

        let (key, pair) = match descriptor.back_reference {
            None => ((SmolStr::new(model), descriptor.name), (from, to)),
            Some(back) => ((descriptor.related_model, back), (to, from)),
        };
        tables.links.entry(key).or_default().insert(pair);
        Ok(())
    }

    /// Number of rows of `model`.
    pub fn count(&self, model: &str) -> usize {
        self.tables.read().rows.get(model).map_or(0, IndexMap::len)
    }

    /// Work done since creation or the last [`reset_stats`](Self::reset_stats).
    pub fn stats(&self) -> LoadStats {
        LoadStats {
            loads: self.loads.load(atomic::Ordering::Relaxed),
            queries: self.queries.load(atomic::Ordering::Relaxed),
        }
    }

    /// Zero the load counters.
    pub fn reset_stats(&self) {
        self.loads.store(0, atomic::Ordering::Relaxed);
        self.queries.store(0, atomic::Ordering::Relaxed);
    }

    fn model_def(&self, model: &str) -> QueryResult<&ModelDef> {
        self.schema
            .get_model(model)
            .ok_or_else(|| QueryError::unknown_model(model))
    }

    /// One table scan: filter, order, limit, then attach joins and prefetches.
    fn scan<'t, F>(
        &self,
        tables: &'t Tables,
        request: &LoadRequest,
        filter: F,
    ) -> QueryResult<Vec<(Record, &'t Row)>>
    where
        F: Fn(&Row) -> bool,
    {
        self.queries.fetch_add(1, atomic::Ordering::Relaxed);

        let model = request.model();
        let def = self.model_def(model)?;
        self.check_selection(def, request)?;
        let joins = request
            .joins()
            .map(|name| -> QueryResult<(SmolStr, SmolStr)> {
                Ok((SmolStr::new(name), self.join_target(model, name)?))
            })
            .collect::<QueryResult<Vec<_>>>()?;
        if let Some(unknown) = request
            .ordering()
            .iter()
            .find(|order| !def.has_column(&order.field))
        {
            return Err(QueryError::unknown_field(model, unknown.field.as_str())
                .with_context("Ordering loaded records"));
        }

        let mut rows: Vec<&Row> = tables
            .rows
            .get(model)
            .into_iter()
            .flat_map(IndexMap::values)
            .filter(|&row| filter(row))
            .collect();
        if !request.ordering().is_empty() {
            rows.sort_by(|a, b| compare_rows(a, b, request.ordering()));
        }
        if let Some(limit) = request.limit() {
            rows.truncate(limit);
        }

        let mut loaded: Vec<(Record, &'t Row)> = rows
            .into_iter()
            .map(|row| (build_record(request.schema(), model, row, request.selection()), row))
            .collect();

        for (name, target) in &joins {
            let selection = request.join_selection(name).cloned().unwrap_or_default();
            for (record, row) in &mut loaded {
                let joined = row
                    .get(name)
                    .and_then(Value::as_int)
                    .and_then(|id| tables.get(target, id))
                    .map(|related| Box::new(build_record(request.schema(), target, related, &selection)));
                record.set_related(name.clone(), Related::One(joined));
            }
        }

        for prefetch in request.prefetches() {
            self.attach(tables, &mut loaded, model, prefetch)?;
        }

        Ok(loaded)
    }

    /// Load one prefetch level for all parents with a single scan.
    fn attach<'t>(
        &self,
        tables: &'t Tables,
        parents: &mut [(Record, &'t Row)],
        model: &str,
        prefetch: &Prefetch,
    ) -> QueryResult<()> {
        let name = prefetch.name.as_str();
        crate::tandem_trace!(
            model,
            relation = name,
            kind = ?prefetch.kind,
            parents = parents.len(),
            "loading prefetch level"
        );

        match &prefetch.kind {
            PrefetchKind::Forward => {
                let wanted: HashSet<i64> = parents
                    .iter()
                    .filter_map(|(_, row)| reference(row, name))
                    .collect();
                let related = self.scan(tables, &prefetch.request, |row| {
                    row_id(row).is_some_and(|id| wanted.contains(&id))
                })?;
                let by_id: HashMap<i64, &Record> = related
                    .iter()
                    .filter_map(|(record, row)| Some((row_id(row)?, record)))
                    .collect();

                for (record, row) in parents.iter_mut() {
                    let child = reference(row, name)
                        .and_then(|id| by_id.get(&id))
                        .map(|child| Box::new((*child).clone()));
                    record.set_related(prefetch.name.clone(), Related::One(child));
                }
            }
            PrefetchKind::Reverse {
                back_reference,
                cardinality,
            } => {
                let parent_ids: HashSet<i64> = parents.iter().filter_map(|(_, row)| row_id(row)).collect();
                let related = self.scan(tables, &prefetch.request, |row| {
                    reference(row, back_reference).is_some_and(|id| parent_ids.contains(&id))
                })?;

                let mut groups: HashMap<i64, Vec<Record>> = HashMap::new();
                for (child, row) in related {
                    if let Some(parent) = reference(row, back_reference) {
                        groups.entry(parent).or_default().push(child);
                    }
                }

                for (record, row) in parents.iter_mut() {
                    let children = row_id(row)
                        .and_then(|id| groups.remove(&id))
                        .unwrap_or_default();
                    let slot = match cardinality {
                        Cardinality::Single => Related::One(children.into_iter().next().map(Box::new)),
                        Cardinality::Multiple => Related::Many(children),
                    };
                    record.set_related(prefetch.name.clone(), slot);
                }
            }
            PrefetchKind::ManyToMany => {
                let descriptor = self.schema.describe_relationship(model, name)?;
                let (key, owning) = match descriptor.back_reference {
                    None => ((SmolStr::new(model), descriptor.name), true),
                    Some(back) => ((descriptor.related_model, back), false),
                };

                let parent_ids: HashSet<i64> = parents.iter().filter_map(|(_, row)| row_id(row)).collect();
                let mut linked: HashMap<i64, HashSet<i64>> = HashMap::new();
                for &(owner, target) in tables.links.get(&key).into_iter().flatten() {
                    let (parent, child) = if owning { (owner, target) } else { (target, owner) };
                    if parent_ids.contains(&parent) {
                        linked.entry(parent).or_default().insert(child);
                    }
                }

                let wanted: HashSet<i64> = linked.values().flatten().copied().collect();
                let related = self.scan(tables, &prefetch.request, |row| {
                    row_id(row).is_some_and(|id| wanted.contains(&id))
                })?;

                for (record, row) in parents.iter_mut() {
                    let links = row_id(row).and_then(|id| linked.get(&id));
                    let children = related
                        .iter()
                        .filter(|(_, child)| {
                            links.is_some_and(|links| row_id(child).is_some_and(|id| links.contains(&id)))
                        })
                        .map(|(child, _)| child.clone())
                        .collect();
                    record.set_related(prefetch.name.clone(), Related::Many(children));
                }
            }
        }

        Ok(())
    }

    fn check_selection(&self, def: &ModelDef, request: &LoadRequest) -> QueryResult<()> {
        let model = def.name();
        if let Some(fields) = request.selection().selected_fields() {
            if let Some(unknown) = fields.iter().find(|field| !def.has_column(field)) {
                return Err(QueryError::unknown_field(model, unknown.as_str()));
            }
        }

        for (relation, selection) in request.join_selections() {
            if !request.joins().any(|joined| joined == relation) {
                return Err(QueryError::invalid_select(
                    model,
                    format!(
                        "Cannot restrict fields of `{}.{}`: the relation is not joined",
                        model, relation
                    ),
                )
                .with_relation(relation)
                .with_code_suggestion(
                    "Join the relation in the same shaping",
                    format!("shape::select_related(\"{}\")", relation),
                ));
            }

            let target = self.join_target(model, relation)?;
            let target_def = self.model_def(&target)?;
            for field in selection.selected_fields().into_iter().flatten() {
                if field.contains('.') {
                    return Err(QueryError::invalid_select(
                        model,
                        format!(
                            "Cannot restrict `{}.{}`: only one level of joined fields is supported",
                            relation, field
                        ),
                    )
                    .with_relation(relation));
                }
                if !target_def.has_column(field) {
                    return Err(QueryError::unknown_field(target.as_str(), field.as_str()));
                }
            }
        }

        Ok(())
    }

    fn join_target(&self, model: &str, relation: &str) -> QueryResult<SmolStr> {
        let descriptor = self.schema.describe_relationship(model, relation)?;
        if descriptor.direction != Direction::Forward
            || descriptor.cardinality != Cardinality::Single
            || descriptor.symmetrical
        {
            return Err(QueryError::relation_kind_mismatch(
                model,
                relation,
                descriptor.kind_label(),
                "forward single",
            ));
        }
        Ok(descriptor.related_model)
    }
}

impl DataStore for MemoryStore {
    fn execute(&self, request: &LoadRequest) -> QueryResult<Vec<Record>> {
        self.loads.fetch_add(1, atomic::Ordering::Relaxed);

        let tables = self.tables.read();
        let loaded = self.scan(&tables, request, |_| true)?;

        debug!(
            model = request.model(),
            prefetches = request.prefetches().count(),
            joins = request.joins().count(),
            records = loaded.len(),
            "executed load"
        );
        Ok(loaded.into_iter().map(|(record, _)| record).collect())
    }
}

impl Tables {
    fn get(&self, model: &str, id: i64) -> Option<&Row> {
        self.rows.get(model)?.get(&id)
    }

    fn contains(&self, model: &str, id: i64) -> bool {
        self.get(model, id).is_some()
    }

    /// Whether any `model` row points at `id` through `column`.
    fn references(&self, model: &str, column: &str, id: i64) -> bool {
        self.rows
            .get(model)
            .is_some_and(|table| table.values().any(|row| reference(row, column) == Some(id)))
    }
}

fn row_id(row: &Row) -> Option<i64> {
    row.get(PRIMARY_KEY).and_then(Value::as_int)
}

fn reference(row: &Row, column: &str) -> Option<i64> {
    row.get(column).and_then(Value::as_int)
}

fn missing_row(model: &str, id: i64) -> QueryError {
    QueryError::database(format!("No `{}` record with id {}", model, id)).with_model(model)
}

fn build_record(schema: &SchemaRef, model: &str, row: &Row, selection: &FieldSelection) -> Record {
    let mut record = Record::new(model, schema.clone());
    for (column, value) in row {
        if column.as_str() == PRIMARY_KEY || selection.includes(column) {
            record.set_field(column.clone(), value.clone());
        }
    }
    record
}

fn compare_rows(a: &Row, b: &Row, ordering: &[OrderByField]) -> Ordering {
    ordering
        .iter()
        .map(|order| {
            let left = a.get(order.field.as_str()).unwrap_or(&NULL);
            let right = b.get(order.field.as_str()).unwrap_or(&NULL);
            match order.order {
                SortOrder::Asc => left.sort_cmp(right),
                SortOrder::Desc => left.sort_cmp(right).reverse(),
            }
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::shape;
    use pretty_assertions::assert_eq;

    fn store() -> MemoryStore {
        let schema = Schema::builder()
            .model(ModelDef::new("owner").field("name"))
            .model(
                ModelDef::new("widget")
                    .field("name")
                    .foreign_key("owner", "owner"),
            )
            .model(
                ModelDef::new("category")
                    .field("name")
                    .many_to_many("widget_set", "widget"),
            )
            .model(
                ModelDef::new("thing")
                    .field("name")
                    .one_to_one("widget", "widget"),
            )
            .build()
            .unwrap();
        let store = MemoryStore::new(schema);

        let first = store.insert("owner", [("name", "first")]).unwrap();
        let second = store.insert("owner", [("name", "second")]).unwrap();
        for (name, owner) in [("a", first), ("b", first), ("c", second)] {
            store
                .insert("widget", [("name", Value::from(name)), ("owner", owner.into())])
                .unwrap();
        }
        store.insert("widget", [("name", "orphan")]).unwrap();

        let tools = store.insert("category", [("name", "tools")]).unwrap();
        store.link("category", "widget_set", tools, 1).unwrap();
        store.link("widget", "category_set", 3, tools).unwrap();
        store
    }

    fn names(records: &[Record]) -> Vec<String> {
        records
            .iter()
            .map(|r| r.get("name").unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let store = store();
        assert_eq!(store.count("owner"), 2);
        assert_eq!(store.count("widget"), 4);
        assert_eq!(store.insert("owner", [("name", "third")]).unwrap(), 3);
    }

    #[test]
    fn test_insert_rejects_bad_input() {
        let store = store();
        let err = store.insert("owner", [("colour", "red")]).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownField);

        let err = store.insert("widget", [("owner", 99)]).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);

        let err = store.insert("owner", [("id", 7)]).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);

        store
            .insert("thing", [("name", Value::from("t1")), ("widget", Value::from(1))])
            .unwrap();
        let err = store
            .insert("thing", [("name", Value::from("t2")), ("widget", Value::from(1))])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(err.message.contains("one-to-one `widget`"));
        assert_eq!(store.count("thing"), 1);

        store
            .insert("thing", [("name", Value::from("t3")), ("widget", Value::from(2))])
            .unwrap();
        store.insert("thing", [("name", Value::from("t4")), ("widget", Value::Null)]).unwrap();
        store.insert("thing", [("name", "t5")]).unwrap();
    }

    #[test]
    fn test_execute_counts_one_load() {
        let store = store();
        let records = store.execute(&store.collection("widget").unwrap()).unwrap();
        assert_eq!(names(&records), ["a", "b", "c", "orphan"]);
        assert_eq!(store.stats(), LoadStats { loads: 1, queries: 1 });

        store.reset_stats();
        assert_eq!(store.stats(), LoadStats::default());
    }

    #[test]
    fn test_field_restriction_keeps_id() {
        let store = store();
        let request = shape::include_fields(["name"])(store.collection("widget").unwrap()).unwrap();
        let records = store.execute(&request).unwrap();
        assert!(records[0].is_loaded("id"));
        assert!(records[0].is_loaded("name"));
        assert!(!records[0].is_loaded("owner"));
    }

    #[test]
    fn test_unknown_field_fails_at_load() {
        let store = store();
        let request = shape::include_fields(["colour"])(store.collection("widget").unwrap()).unwrap();
        let err = store.execute(&request).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownField);
        assert!(err.is_load_error());
    }

    #[test]
    fn test_forward_prefetch_batches() {
        let store = store();
        let request = shape::prefetch_forward("owner", store.collection("owner").unwrap())(
            store.collection("widget").unwrap(),
        )
        .unwrap();
        let records = store.execute(&request).unwrap();

        let owner = |i: usize| match records[i].related("owner").unwrap() {
            Related::One(owner) => owner.as_ref().map(|o| o.get("name").unwrap().to_string()),
            Related::Many(_) => panic!("forward relation loaded as many"),
        };
        assert_eq!(owner(0).as_deref(), Some("first"));
        assert_eq!(owner(2).as_deref(), Some("second"));
        assert_eq!(owner(3), None);
        assert_eq!(store.stats().queries, 2);
    }

    #[test]
    fn test_reverse_prefetch_groups_children() {
        let store = store();
        let request = shape::prefetch_reverse(
            "widget_set",
            "owner",
            store.collection("widget").unwrap(),
            Cardinality::Multiple,
        )(store.collection("owner").unwrap())
        .unwrap();
        let records = store.execute(&request).unwrap();

        let children = |i: usize| {
            records[i]
                .related("widget_set")
                .unwrap()
                .iter()
                .map(|w| w.get("name").unwrap().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(children(0), ["a", "b"]);
        assert_eq!(children(1), ["c"]);
    }

    #[test]
    fn test_many_to_many_from_both_sides() {
        let store = store();
        let request = shape::prefetch_many_to_many("widget_set", store.collection("widget").unwrap())(
            store.collection("category").unwrap(),
        )
        .unwrap();
        let records = store.execute(&request).unwrap();
        let widgets: Vec<_> = records[0]
            .related("widget_set")
            .unwrap()
            .iter()
            .map(|w| w.id())
            .collect();
        assert_eq!(widgets, [Some(1), Some(3)]);

        let request = shape::prefetch_many_to_many("category_set", store.collection("category").unwrap())(
            store.collection("widget").unwrap(),
        )
        .unwrap();
        let records = store.execute(&request).unwrap();
        assert_eq!(records[0].related("category_set").unwrap().len(), 1);
        assert!(records[1].related("category_set").unwrap().is_empty());
    }

    #[test]
    fn test_link_rejects_non_many_to_many() {
        let store = store();
        let err = store.link("widget", "owner", 1, 1).unwrap_err();
        assert_eq!(err.code, ErrorCode::RelationKindMismatch);
    }

    #[test]
    fn test_select_related_costs_no_query() {
        let store = store();
        let request = shape::pipe([
            shape::select_related("owner"),
            shape::include_fields(["name", "owner.name"]),
        ])(store.collection("widget").unwrap())
        .unwrap();
        let records = store.execute(&request).unwrap();

        let owner = records[0].related("owner").unwrap().iter().next().unwrap();
        assert_eq!(owner.get("name").unwrap(), &Value::from("first"));
        assert!(!records[0].is_loaded("owner"));
        assert_eq!(store.stats().queries, 1);
    }

    #[test]
    fn test_restricting_unjoined_relation_fails() {
        let store = store();
        let request =
            shape::include_fields(["owner.name"])(store.collection("widget").unwrap()).unwrap();
        let err = store.execute(&request).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSelect);
    }

    #[test]
    fn test_order_and_limit() {
        let store = store();
        let request = shape::pipe([shape::order_by(["-name"]), shape::limit(2)])(
            store.collection("widget").unwrap(),
        )
        .unwrap();
        let records = store.execute(&request).unwrap();
        assert_eq!(names(&records), ["orphan", "c"]);
    }

    #[test]
    fn test_first() {
        let store = store();
        let first = store.first(&store.collection("owner").unwrap()).unwrap();
        assert_eq!(first.and_then(|r| r.id()), Some(1));
    }
}
