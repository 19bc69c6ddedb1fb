//! # tandem
//!
//! Describe, once, how to load a tree of related records and how to project
//! it into plain nested data.
//!
//! A [`Pair`] couples a shaping function (what to load) with a projection
//! function (what to emit). Pairs combine, nest inside relationships, and
//! are applied in two steps: shaping runs once on the root request, the
//! store loads everything in one call with one batch query per relationship,
//! and projection reads only what was loaded. Projecting never queries.
//!
//! - [`field`], [`field_display`]: load and emit one field
//! - [`combine`], [`unzip`]: compose pairs
//! - [`forward_relationship`], [`reverse_relationship`],
//!   [`reverse_one_to_one_relationship`], [`many_to_many_relationship`]:
//!   traverse relationships
//! - [`auto_relationship`]: pick the traversal from the schema
//! - [`alias`]: rename output keys
//! - [`prepare_only`], [`project_only`]: use one half on its own
//!
//! ## Example
//!
//! ```rust
//! use tandem::prelude::*;
//! use tandem::schema::{ModelDef, Schema};
//!
//! let schema = Schema::builder()
//!     .model(ModelDef::new("group").field("name"))
//!     .model(ModelDef::new("owner").field("name").foreign_key("group", "group"))
//!     .model(ModelDef::new("widget").field("name").foreign_key("owner", "owner"))
//!     .build()
//!     .unwrap();
//! let store = MemoryStore::new(schema);
//! let group = store.insert("group", [("name", "test group")]).unwrap();
//! let owner = store
//!     .insert("owner", [("name", Value::from("test owner")), ("group", group.into())])
//!     .unwrap();
//! store
//!     .insert("widget", [("name", Value::from("test widget")), ("owner", owner.into())])
//!     .unwrap();
//!
//! let pair = combine([
//!     field("name"),
//!     forward_relationship(
//!         "owner",
//!         store.collection("owner").unwrap(),
//!         combine([
//!             field("name"),
//!             forward_relationship("group", store.collection("group").unwrap(), field("name")),
//!         ]),
//!     ),
//! ]);
//!
//! let out = pair.load(&store, store.collection("widget").unwrap()).unwrap();
//! assert_eq!(out[0]["owner"]["group"]["name"], "test group");
//! assert_eq!(store.stats().queries, 3);
//! ```
//!
//! ## Errors
//!
//! Misconfigured pairs (an unknown relation, the wrong traversal for a
//! relation, a back-reference that does not match the schema) fail when the
//! shaping runs, before anything is loaded. Unknown fields fail at load
//! time; reading data that was never loaded fails at projection time. See
//! [`QueryError`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod pair;
mod relationship;

pub use pair::{
    Pair, alias, combine, field, field_display, prepare_only, project_only, unzip,
};
pub use relationship::{
    auto_relationship, forward_many_to_one_relationship, forward_one_to_one_relationship,
    forward_relationship, many_to_many_relationship, reverse_many_to_one_relationship,
    reverse_one_to_one_relationship, reverse_relationship,
};

/// Schema definitions and introspection.
pub mod schema {
    pub use tandem_schema::*;
}

/// Load requests, shaping and projection functions, and data stores.
pub mod query {
    pub use tandem_query::*;
}

// Re-export key types at the crate root
pub use tandem_query::{
    AliasSpec, DataStore, ErrorCode, LoadRequest, MemoryStore, ProjectFn, Projection, QueryError,
    QueryResult, Record, ShapeFn, Value, project, shape,
};
pub use tandem_schema::{Schema, SchemaError, SchemaIntrospector, SchemaRef};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        Pair, alias, auto_relationship, combine, field, field_display, forward_relationship,
        many_to_many_relationship, prepare_only, project_only, reverse_one_to_one_relationship,
        reverse_relationship, unzip,
    };
    pub use tandem_query::prelude::*;
    pub use tandem_schema::{Cardinality, Schema};
}
