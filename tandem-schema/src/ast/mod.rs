//! Definition types for tandem schemas.
//!
//! Models own scalar fields and the relations they declare; the schema
//! derives the reverse end of every relation.

mod field;
mod model;
mod relation;
mod schema;

pub use field::*;
pub use model::*;
pub use relation::*;
pub use schema::*;
