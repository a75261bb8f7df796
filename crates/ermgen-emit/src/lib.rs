//! Artifact emitters for ermgen.
//!
//! This crate renders a finished table graph into schema definition text for
//! a chosen SQL dialect and into an NHibernate-style mapping document, and
//! runs both as one all-or-nothing generation.

pub mod ddl;
pub mod dialect;
pub mod mapping;
pub mod run;
mod xml;

pub use ddl::emit_ddl;
pub use dialect::SqlSyntax;
pub use mapping::{MAPPING_NAMESPACE, emit_mapping};
pub use run::{
    Artifact, ArtifactKind, ArtifactSink, Artifacts, DDL_FILE_NAME, GenerateError,
    MAPPING_FILE_NAME, MemorySink, generate, generate_into,
};
