//! Core contracts for ermgen.
//!
//! This crate defines the entity model consumed by the generator, the
//! generation configuration, the naming and type-mapping policies, and the
//! schema builder that turns a model into the table graph shared by the DDL
//! and mapping emitters.

pub mod builder;
pub mod config;
pub mod error;
pub mod graph;
pub mod model;
pub mod naming;
pub mod types;
pub mod validation;

pub use builder::build_table_graph;
pub use config::{Dialect, GeneratorConfig, IdGenerator, NamingMode};
pub use error::{Error, Result};
pub use graph::{Column, ForeignKeyRef, PrimaryKey, Table, TableGraph, TableId, TableState};
pub use model::{Attribute, Class, EntityModel, ModelIndex};
pub use naming::{IdentifierKind, NamingPolicy};
pub use types::{ColumnType, TypeKind, map_scalar};
pub use validation::{
    IssueSeverity, ValidationIssue, ValidationReport, model_json_schema, validate_model,
    validate_model_json,
};

/// Version string recorded in generated artifacts.
pub const GENERATOR_VERSION: &str = concat!("ermgen ", env!("CARGO_PKG_VERSION"));
