//! # tandem-query
//!
//! Loading and projecting records for tandem.
//!
//! This crate provides the two function spaces pairs are built from, and the
//! store they run against:
//! - [`LoadRequest`]: an immutable description of what to load
//! - [`shape`]: functions that add loading instructions to a request
//!   (field restriction, joins, prefetches, ordering)
//! - [`project`]: functions that turn a loaded [`Record`] into a JSON mapping
//! - [`DataStore`]: executes a request in one batch load; [`MemoryStore`] is
//!   an in-memory implementation that counts its queries
//!
//! ## Shaping and loading
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
//! for name in ["a", "b"] {
//!     store.insert("widget", [("name", Value::from(name)), ("owner", owner.into())]).unwrap();
//! }
//!
//! let with_widgets = shape::prefetch_reverse(
//!     "widget_set",
//!     "owner",
//!     store.collection("widget").unwrap(),
//!     tandem_schema::Cardinality::Multiple,
//! );
//! let owners = store.execute(&with_widgets(store.collection("owner").unwrap()).unwrap()).unwrap();
//! assert_eq!(owners[0].related("widget_set").unwrap().len(), 2);
//! assert_eq!(store.stats().queries, 2);
//! ```
//!
//! ## Projecting
//!
//! ```rust
//! use std::sync::Arc;
//! use tandem_query::{Record, project};
//! use tandem_schema::{ModelDef, Schema};
//!
//! let schema = Schema::builder()
//!     .model(ModelDef::new("thing").choice_field("size", [("L", "Large")]))
//!     .build()
//!     .unwrap();
//! let thing = Record::new("thing", Arc::new(schema)).with_field("size", "L");
//!
//! let out = project::compose([project::field("size"), project::field_display("size")])(&thing)
//!     .unwrap();
//! assert_eq!(out["size"], "L");
//! assert_eq!(out["size_display"], "Large");
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use tandem_query::{ErrorCode, QueryError};
//!
//! let err = QueryError::relation_not_loaded("widget", "owner");
//! assert_eq!(err.code, ErrorCode::RelationNotLoaded);
//! assert!(err.is_projection_error());
//! ```

pub mod error;
pub mod logging;
pub mod project;
pub mod record;
pub mod request;
pub mod shape;
pub mod store;
pub mod value;

pub use error::{ErrorCode, ErrorContext, QueryError, QueryResult, Suggestion};
pub use project::{AliasSpec, ProjectFn, Projection};
pub use record::{Record, Related};
pub use request::{
    FieldSelection, LoadRequest, OrderByField, Prefetch, PrefetchKind, SortOrder,
};
pub use shape::ShapeFn;
pub use store::{DataStore, LoadStats, MemoryStore};
pub use value::Value;

// Re-export logging utilities
pub use logging::{get_log_format, get_log_level, init as init_logging, init_with_level, is_debug_enabled};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{ErrorCode, QueryError, QueryResult};
    pub use crate::project::{self, ProjectFn, Projection};
    pub use crate::record::{Record, Related};
    pub use crate::request::LoadRequest;
    pub use crate::shape::{self, ShapeFn};
    pub use crate::store::{DataStore, MemoryStore};
    pub use crate::value::Value;
}
