//! JSON manifest generator.
//!
//! Writes one JSON document per artifact describing the modules it covers
//! and the artifacts it depends on. Build-script syntax is left to other
//! generators; this one exists so the pipeline can run end to end.

use chunkgen_core::plan::{ArtifactKind, PlannedChunk};
use chunkgen_core::{ArtifactDescriptor, ArtifactGenerator, BoxError};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    artifact: &'a str,
    kind: ArtifactKind,
    graph_hash: &'a str,
    chunks: &'a [PlannedChunk],
    depends_on: Vec<&'a str>,
}

/// Produces pretty-printed JSON manifests.
#[derive(Debug, Clone)]
pub struct ManifestGenerator {
    graph_hash: String,
}

impl ManifestGenerator {
    pub fn new(graph_hash: impl Into<String>) -> Self {
        Self {
            graph_hash: graph_hash.into(),
        }
    }
}

impl ArtifactGenerator for ManifestGenerator {
    fn generate(&mut self, descriptor: &ArtifactDescriptor) -> Result<Vec<u8>, BoxError> {
        let manifest = Manifest {
            artifact: &descriptor.name,
            kind: descriptor.kind,
            graph_hash: &self.graph_hash,
            chunks: &descriptor.chunks,
            depends_on: descriptor.depends_on.iter().map(|r| r.name.as_str()).collect(),
        };
        let mut bytes = serde_json::to_vec_pretty(&manifest)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkgen_core::{GenerationOptions, Module, prepare};

    #[test]
    fn manifest_lists_modules_and_dependencies() {
        let prepared = prepare(
            &[
                Module {
                    name: Some("Application".to_string()),
                    ..Module::new("app").depends_on("lib")
                },
                Module::new("lib"),
            ],
            &GenerationOptions::default(),
        )
        .expect("prepare");
        let mut generator = ManifestGenerator::new("blake3:abc");

        let app = &prepared.plan.descriptors[1];
        let bytes = generator.generate(app).expect("generate");
        let value: serde_json::Value = serde_json::from_slice(&bytes).expect("json");

        assert_eq!(value["artifact"], "app");
        assert_eq!(value["kind"], "chunk");
        assert_eq!(value["graph_hash"], "blake3:abc");
        assert_eq!(value["depends_on"], serde_json::json!(["lib"]));
        assert_eq!(value["chunks"][0]["members"], serde_json::json!(["app"]));
        assert_eq!(value["chunks"][0]["member_names"], serde_json::json!(["Application"]));
        assert_eq!(value["chunks"][0]["visible_dependencies"], serde_json::json!(["lib"]));
    }
}
