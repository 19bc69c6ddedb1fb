//! # tandem-schema
//!
//! Schema definitions and introspection for tandem.
//!
//! This crate provides:
//! - Model, field, and relation definitions
//! - Relation resolution from both ends (forward and reverse descriptors)
//! - The [`SchemaIntrospector`] trait consumed by relationship dispatch
//! - Schema validation
//! - TOML schema files
//!
//! ## Example
//!
//! ```rust
//! use tandem_schema::{Cardinality, Direction, ModelDef, Schema, SchemaIntrospector};
//!
//! let schema = Schema::builder()
//!     .model(ModelDef::new("owner").field("name"))
//!     .model(ModelDef::new("widget").field("name").foreign_key("owner", "owner"))
//!     .build()?;
//!
//! let reverse = schema.describe_relationship("owner", "widget_set")?;
//! assert_eq!(reverse.direction, Direction::Reverse);
//! assert_eq!(reverse.cardinality, Cardinality::Multiple);
//! assert_eq!(reverse.back_reference.as_deref(), Some("owner"));
//! # Ok::<(), tandem_schema::SchemaError>(())
//! ```

pub mod ast;
pub mod config;
pub mod error;
pub mod introspect;
pub mod validator;

pub use ast::*;
pub use config::SchemaFile;
pub use error::{SchemaError, SchemaResult};
pub use introspect::{SchemaIntrospector, SchemaRef};
pub use validator::{Validator, validate_models};
