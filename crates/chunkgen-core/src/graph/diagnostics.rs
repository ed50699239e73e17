//! Consistency checks over cyclic chunks.
//!
//! Members of one cycle are compiled together, so they have to agree on a
//! toolchain. Disagreements are reported, never fatal.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::graph::build::DependencyGraph;
use crate::graph::chunks::{ChunkGraph, ChunkId};

/// Report for one cyclic chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkDiagnostic {
    pub chunk: ChunkId,
    /// Member ids in declaration order.
    pub members: Vec<String>,
    /// Distinct toolchain labels declared by members, sorted.
    pub toolchains: Vec<String>,
    /// Members that declare no toolchain.
    pub unlabelled: Vec<String>,
}

impl ChunkDiagnostic {
    /// Return `true` if members declare more than one toolchain.
    #[must_use]
    pub fn has_toolchain_conflict(&self) -> bool {
        self.toolchains.len() > 1
    }
}

/// Describe every cyclic chunk in `chunks`, in chunk id order.
#[must_use]
pub fn chunk_diagnostics(chunks: &ChunkGraph, graph: &DependencyGraph) -> Vec<ChunkDiagnostic> {
    chunks
        .cyclic_chunks()
        .map(|chunk| {
            let mut toolchains = BTreeSet::new();
            let mut unlabelled = Vec::new();
            for &member in &chunk.members {
                let module = &graph.graph[member];
                match &module.toolchain {
                    Some(label) => {
                        toolchains.insert(label.clone());
                    }
                    None => unlabelled.push(module.id.to_string()),
                }
            }
            ChunkDiagnostic {
                chunk: chunk.id,
                members: chunk.member_ids.iter().map(ToString::to_string).collect(),
                toolchains: toolchains.into_iter().collect(),
                unlabelled,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::chunks::compute_chunks;
    use crate::model::Module;

    fn diagnose(modules: &[Module]) -> Vec<ChunkDiagnostic> {
        let graph = DependencyGraph::from_modules(modules).expect("build graph");
        let chunks = compute_chunks(&graph);
        chunk_diagnostics(&chunks, &graph)
    }

    #[test]
    fn acyclic_graph_has_no_diagnostics() {
        let report = diagnose(&[Module::new("a").depends_on("b"), Module::new("b")]);
        assert!(report.is_empty());
    }

    #[test]
    fn matching_toolchains_are_not_a_conflict() {
        let report = diagnose(&[
            Module::new("a").depends_on("b").with_toolchain("jdk-17"),
            Module::new("b").depends_on("a").with_toolchain("jdk-17"),
        ]);

        assert_eq!(report.len(), 1);
        assert_eq!(report[0].members, vec!["a", "b"]);
        assert!(!report[0].has_toolchain_conflict());
        assert!(report[0].unlabelled.is_empty());
    }

    #[test]
    fn differing_toolchains_are_flagged() {
        let report = diagnose(&[
            Module::new("a").depends_on("b").with_toolchain("jdk-17"),
            Module::new("b").depends_on("c").with_toolchain("jdk-11"),
            Module::new("c").depends_on("a"),
        ]);

        assert_eq!(report.len(), 1);
        assert!(report[0].has_toolchain_conflict());
        assert_eq!(report[0].toolchains, vec!["jdk-11", "jdk-17"]);
        assert_eq!(report[0].unlabelled, vec!["c"]);
    }
}
