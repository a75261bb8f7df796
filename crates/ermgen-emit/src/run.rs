use std::time::Instant;

use ermgen_core::{EntityModel, GeneratorConfig, build_table_graph};
use thiserror::Error;
use tracing::info;

use crate::ddl::emit_ddl;
use crate::mapping::emit_mapping;

/// File name of the schema definition artifact.
pub const DDL_FILE_NAME: &str = "schema.sql";
/// File name of the mapping artifact.
pub const MAPPING_FILE_NAME: &str = "mapping.hbm.xml";

/// Errors emitted by a generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Model(#[from] ermgen_core::Error),
    #[error("sink error: {0}")]
    Sink(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Kind of generated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Ddl,
    Mapping,
}

/// A finished text artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub file_name: String,
    pub contents: String,
}

/// Both artifacts of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub ddl: Artifact,
    pub mapping: Artifact,
}

impl Artifacts {
    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        [&self.ddl, &self.mapping].into_iter()
    }

    /// Hand both artifacts to a sink, stopping at the first failure, then
    /// let the sink commit them.
    pub fn deliver<S: ArtifactSink>(&self, sink: &mut S) -> Result<(), S::Error> {
        for artifact in self.iter() {
            sink.accept(artifact)?;
        }
        sink.finish()
    }
}

/// Receiver of finished artifacts.
pub trait ArtifactSink {
    type Error: std::error::Error + Send + Sync + 'static;

    fn accept(&mut self, artifact: &Artifact) -> Result<(), Self::Error>;

    /// Called once every artifact of a run has been accepted.
    fn finish(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Sink collecting artifacts in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub artifacts: Vec<Artifact>,
}

impl ArtifactSink for MemorySink {
    type Error = std::convert::Infallible;

    fn accept(&mut self, artifact: &Artifact) -> Result<(), Self::Error> {
        self.artifacts.push(artifact.clone());
        Ok(())
    }
}

/// Build the table graph and render both artifacts.
///
/// Either both artifacts are returned or an error is; the graph is dropped
/// once rendering finishes.
pub fn generate(model: &EntityModel, config: &GeneratorConfig) -> Result<Artifacts, GenerateError> {
    let timer = Instant::now();
    info!(
        event = "generation_started",
        classes = model.classes.len(),
        dialect = config.dialect.as_str()
    );

    let graph = build_table_graph(model, config)?;
    let ddl = emit_ddl(&graph, config.dialect);
    let mapping = emit_mapping(model, &graph, config)?;

    info!(
        event = "generation_finished",
        tables = graph.len(),
        ddl_bytes = ddl.len(),
        mapping_bytes = mapping.len(),
        duration_ms = timer.elapsed().as_millis() as u64
    );

    Ok(Artifacts {
        ddl: Artifact {
            kind: ArtifactKind::Ddl,
            file_name: DDL_FILE_NAME.to_string(),
            contents: ddl,
        },
        mapping: Artifact {
            kind: ArtifactKind::Mapping,
            file_name: MAPPING_FILE_NAME.to_string(),
            contents: mapping,
        },
    })
}

/// Generate and deliver both artifacts; nothing reaches the sink on failure.
pub fn generate_into<S: ArtifactSink>(
    model: &EntityModel,
    config: &GeneratorConfig,
    sink: &mut S,
) -> Result<Artifacts, GenerateError> {
    let artifacts = generate(model, config)?;
    artifacts
        .deliver(sink)
        .map_err(|err| GenerateError::Sink(Box::new(err)))?;
    info!(event = "artifacts_delivered", count = 2);
    Ok(artifacts)
}
