//! Turning ordered chunks into artifact descriptors.
//!
//! A descriptor says what to write and where: its name, target path, the
//! chunks it covers, and which other descriptors it depends on. Planning is
//! pure; the same graph, order and options always give the same plan.

#![allow(clippy::module_name_repetitions)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::GenerationOptions;
use crate::error::GenerationError;
use crate::graph::build::DependencyGraph;
use crate::graph::chunks::{Chunk, ChunkGraph, ChunkId};
use crate::model::ModuleId;

/// What a descriptor stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// One chunk.
    Chunk,
    /// Every chunk of the project in one file.
    Combined,
    /// Project-level file that depends on every chunk artifact.
    Aggregate,
}

/// One chunk as covered by a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedChunk {
    pub id: ChunkId,
    pub name: String,
    /// Member module ids in declaration order.
    pub members: Vec<ModuleId>,
    /// Display names of the members, parallel to `members`.
    pub member_names: Vec<String>,
    /// Modules outside the chunk visible to its members when compiling.
    pub visible_dependencies: Vec<ModuleId>,
}

/// Reference to another descriptor of the same plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactRef {
    pub index: usize,
    pub name: String,
    pub target_path: PathBuf,
}

/// A single artifact to be generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactDescriptor {
    /// Position in the plan, starting at 0.
    pub index: usize,
    pub name: String,
    pub target_path: PathBuf,
    pub kind: ArtifactKind,
    pub chunks: Vec<PlannedChunk>,
    /// Descriptors this one depends on, in plan order.
    pub depends_on: Vec<ArtifactRef>,
}

impl ArtifactDescriptor {
    fn reference(&self) -> ArtifactRef {
        ArtifactRef {
            index: self.index,
            name: self.name.clone(),
            target_path: self.target_path.clone(),
        }
    }
}

/// Descriptors in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub descriptors: Vec<ArtifactDescriptor>,
}

impl Plan {
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArtifactDescriptor> {
        self.descriptors.iter()
    }

    /// Target paths in emission order.
    #[must_use]
    pub fn target_paths(&self) -> Vec<&Path> {
        self.descriptors.iter().map(|d| d.target_path.as_path()).collect()
    }
}

/// Build the artifact plan for `order`.
///
/// # Errors
///
/// - [`GenerationError::MissingRepresentativeName`] if, in per-chunk mode,
///   a cyclic chunk has no name in `options.representative_names`.
/// - [`GenerationError::ConflictingRepresentativeNames`] if members of one
///   cyclic chunk map to different names.
/// - [`GenerationError::DuplicateTarget`] if two descriptors resolve to the
///   same file.
#[instrument(skip_all, fields(chunks = order.len(), single = options.single_artifact))]
pub fn plan(
    chunks: &ChunkGraph,
    order: &[ChunkId],
    options: &GenerationOptions,
    graph: &DependencyGraph,
) -> Result<Plan, GenerationError> {
    let mut descriptors = Vec::new();

    if options.single_artifact {
        let covered = order
            .iter()
            .filter_map(|&id| chunks.chunk(id))
            .map(|chunk| {
                let name = chunk_name(chunk, options).unwrap_or_else(|_| chunk.label());
                planned_chunk(chunk, name, graph)
            })
            .collect();
        descriptors.push(ArtifactDescriptor {
            index: 0,
            name: options.project_name.clone(),
            target_path: target_path(&options.output_dir, &options.project_name, options),
            kind: ArtifactKind::Combined,
            chunks: covered,
            depends_on: Vec::new(),
        });
    } else {
        let position: HashMap<ChunkId, usize> =
            order.iter().enumerate().map(|(i, &id)| (id, i)).collect();

        for &id in order {
            let Some(chunk) = chunks.chunk(id) else {
                continue;
            };
            let name = chunk_name(chunk, options)?;
            let dir = chunk_dir(chunk, options, graph);
            let path = target_path(dir, &name, options);

            let mut dep_positions: Vec<usize> = chunks
                .dependencies(id)
                .into_iter()
                .filter_map(|dep| position.get(&dep).copied())
                .collect();
            dep_positions.sort_unstable();
            let depends_on = dep_positions
                .into_iter()
                .filter_map(|pos| descriptors.get(pos).map(ArtifactDescriptor::reference))
                .collect();

            descriptors.push(ArtifactDescriptor {
                index: descriptors.len(),
                name: name.clone(),
                target_path: path,
                kind: ArtifactKind::Chunk,
                chunks: vec![planned_chunk(chunk, name, graph)],
                depends_on,
            });
        }

        if options.aggregate_artifact {
            let depends_on = descriptors.iter().map(ArtifactDescriptor::reference).collect();
            descriptors.push(ArtifactDescriptor {
                index: descriptors.len(),
                name: options.project_name.clone(),
                target_path: target_path(&options.output_dir, &options.project_name, options),
                kind: ArtifactKind::Aggregate,
                chunks: Vec::new(),
                depends_on,
            });
        }
    }

    check_unique_targets(&descriptors)?;
    debug!(descriptors = descriptors.len(), "plan built");
    Ok(Plan { descriptors })
}

/// Resolve the display name of `chunk`.
fn chunk_name(chunk: &Chunk, options: &GenerationOptions) -> Result<String, GenerationError> {
    if !chunk.is_cycle() {
        return Ok(chunk.first_member().to_string());
    }

    let named: Vec<(u32, &String)> = chunk
        .member_ids
        .iter()
        .filter_map(|member| {
            options
                .representative_names
                .get(member)
                .map(|name| (options.name_layer(member), name))
        })
        .collect();

    // Only the highest configuration layer that names this chunk counts.
    let Some(top) = named.iter().map(|&(rank, _)| rank).max() else {
        return Err(GenerationError::MissingRepresentativeName {
            members: chunk.member_ids.iter().map(ToString::to_string).collect(),
        });
    };
    let mut names: Vec<&String> = named
        .into_iter()
        .filter(|&(rank, _)| rank == top)
        .map(|(_, name)| name)
        .collect();
    names.sort_unstable();
    names.dedup();

    match names.as_slice() {
        [name] => Ok((*name).clone()),
        _ => Err(GenerationError::ConflictingRepresentativeNames {
            members: chunk.member_ids.iter().map(ToString::to_string).collect(),
            names: names.into_iter().cloned().collect(),
        }),
    }
}

fn chunk_dir<'a>(chunk: &Chunk, options: &'a GenerationOptions, graph: &'a DependencyGraph) -> &'a Path {
    if !options.chunk_dirs {
        return &options.output_dir;
    }
    graph.graph[chunk.members[0]]
        .base_dir
        .as_deref()
        .unwrap_or(&options.output_dir)
}

fn target_path(dir: &Path, name: &str, options: &GenerationOptions) -> PathBuf {
    let file_name = format!(
        "{}{}.{}",
        options.file_prefix,
        sanitize_file_name(name),
        options.extension
    );
    dir.join(file_name)
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn planned_chunk(chunk: &Chunk, name: String, graph: &DependencyGraph) -> PlannedChunk {
    let members: HashSet<_> = chunk.members.iter().copied().collect();
    let mut seen = HashSet::new();
    let mut visible_dependencies = Vec::new();
    for &member in &chunk.members {
        for dep in graph.visible_dependencies(member) {
            if !members.contains(&dep) && seen.insert(dep) {
                visible_dependencies.push(graph.graph[dep].id.clone());
            }
        }
    }

    PlannedChunk {
        id: chunk.id,
        name,
        members: chunk.member_ids.clone(),
        member_names: chunk
            .members
            .iter()
            .map(|&member| graph.graph[member].display_name().to_string())
            .collect(),
        visible_dependencies,
    }
}

fn check_unique_targets(descriptors: &[ArtifactDescriptor]) -> Result<(), GenerationError> {
    let mut claimed: HashMap<&Path, &str> = HashMap::with_capacity(descriptors.len());
    for descriptor in descriptors {
        if let Some(first) = claimed.insert(&descriptor.target_path, &descriptor.name) {
            return Err(GenerationError::DuplicateTarget {
                path: descriptor.target_path.clone(),
                first: first.to_string(),
                second: descriptor.name.clone(),
            });
        }
    }
    Ok(())
}
