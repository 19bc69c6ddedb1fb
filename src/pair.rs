//! Pairs and the combinators that build them from fields and other pairs.

use std::fmt;

use smol_str::SmolStr;
use tandem_query::project::{self, AliasSpec, ProjectFn, Projection};
use tandem_query::shape::{self, ShapeFn};
use tandem_query::{DataStore, LoadRequest, QueryResult, Record};
use tracing::debug;

/// A shaping function and the projection function that reads what it loads.
///
/// The projection only ever reads data the shaping arranged to load, so a
/// pair can be combined with others and nested inside relationships without
/// the two halves drifting apart.
#[derive(Clone)]
pub struct Pair {
    shape: ShapeFn,
    project: ProjectFn,
}

impl Pair {
    /// Create a pair from its two halves.
    pub fn new(shape: ShapeFn, project: ProjectFn) -> Self {
        Self { shape, project }
    }

    /// The shaping half.
    pub fn shape(&self) -> &ShapeFn {
        &self.shape
    }

    /// The projection half.
    pub fn project(&self) -> &ProjectFn {
        &self.project
    }

    /// Split into `(shape, project)`.
    pub fn into_parts(self) -> (ShapeFn, ProjectFn) {
        (self.shape, self.project)
    }

    /// Apply the shaping half to a request.
    pub fn prepare(&self, request: LoadRequest) -> QueryResult<LoadRequest> {
        (self.shape)(request)
    }

    /// Apply the projection half to a loaded record.
    pub fn project_record(&self, record: &Record) -> QueryResult<Projection> {
        (self.project)(record)
    }

    /// Shape `base`, load it with one call to the store, and project every
    /// loaded record.
    pub fn load<S>(&self, store: &S, base: LoadRequest) -> QueryResult<Vec<Projection>>
    where
        S: DataStore + ?Sized,
    {
        let request = self.prepare(base)?;
        let records = store.execute(&request)?;
        debug!(model = request.model(), records = records.len(), "projecting records");
        records.iter().map(|record| self.project_record(record)).collect()
    }
}

impl fmt::Debug for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pair").finish_non_exhaustive()
    }
}

impl From<(ShapeFn, ProjectFn)> for Pair {
    fn from((shape, project): (ShapeFn, ProjectFn)) -> Self {
        Self::new(shape, project)
    }
}

/// Load a field and emit it under its own name.
///
/// ```rust
/// # use std::sync::Arc;
/// # use tandem::{Record, field};
/// # use tandem::schema::{ModelDef, Schema};
/// # let schema = Schema::builder().model(ModelDef::new("widget").field("name")).build().unwrap();
/// let widget = Record::new("widget", Arc::new(schema)).with_field("name", "first");
/// let out = field("name").project_record(&widget).unwrap();
/// assert_eq!(out["name"], "first");
/// ```
pub fn field(name: impl Into<SmolStr>) -> Pair {
    let name = name.into();
    Pair::new(shape::include_fields([name.clone()]), project::field(name))
}

/// Load an enumerated field and emit its label as `<name>_display`.
///
/// The raw value itself is not emitted; combine with [`field`] for both.
pub fn field_display(name: impl Into<SmolStr>) -> Pair {
    let name = name.into();
    Pair::new(
        shape::include_fields([name.clone()]),
        project::field_display(name),
    )
}

/// Compose pairs into their shaping and projection halves.
///
/// Shaping functions run in order; projections are shallow-merged in order,
/// and the last pair to emit a key wins.
pub fn unzip(pairs: impl IntoIterator<Item = Pair>) -> (ShapeFn, ProjectFn) {
    let (shapes, projects): (Vec<ShapeFn>, Vec<ProjectFn>) =
        pairs.into_iter().map(Pair::into_parts).unzip();
    (shape::pipe(shapes), project::compose(projects))
}

/// Compose pairs into one pair. `combine([])` loads nothing extra and emits
/// an empty mapping.
pub fn combine(pairs: impl IntoIterator<Item = Pair>) -> Pair {
    unzip(pairs).into()
}

/// Rename the keys a pair emits. Shaping is unchanged.
///
/// A single name renames the only key (the wrapped projection must emit
/// exactly one); a mapping renames matching keys and passes the rest
/// through.
pub fn alias(spec: impl Into<AliasSpec>, pair: Pair) -> Pair {
    let (shape, project) = pair.into_parts();
    Pair::new(shape, project::rename(spec, project))
}

/// A pair that only shapes, and emits nothing.
pub fn prepare_only(shape: ShapeFn) -> Pair {
    Pair::new(shape, project::empty())
}

/// A pair that only projects, and leaves the request unchanged.
pub fn project_only(project: ProjectFn) -> Pair {
    Pair::new(shape::identity(), project)
}
