//! SCC collapsing of the dependency graph into chunks.
//!
//! # Overview
//!
//! Modules that depend on each other, directly or through other modules,
//! have to be compiled together. Each strongly connected component of the
//! [`DependencyGraph`] becomes one [`Chunk`]; acyclic modules end up in a
//! chunk of their own.
//!
//! The chunk graph keeps the `depends on` direction: an edge `A → B` means
//! some module of chunk A depends on some module of chunk B. Intra-chunk
//! edges, self-dependencies included, are dropped, so the chunk graph is a
//! DAG by construction.
//!
//! # Determinism
//!
//! Members are sorted by declaration index and chunks are numbered by their
//! first member's declaration index. petgraph's Tarjan output order never
//! leaks into the result.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;
use std::fmt;

use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::graph::build::DependencyGraph;
use crate::model::ModuleId;

/// Stable index of a chunk inside one [`ChunkGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ChunkId(pub usize);

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A group of mutually dependent modules compiled as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub id: ChunkId,
    /// Member nodes in declaration order; never empty.
    pub members: Vec<NodeIndex>,
    /// Member ids, parallel to `members`.
    pub member_ids: Vec<ModuleId>,
}

impl Chunk {
    /// Return `true` if this chunk contains more than one module.
    #[must_use]
    pub fn is_cycle(&self) -> bool {
        self.members.len() > 1
    }

    /// The member declared first; used as the ordering tie key.
    #[must_use]
    pub fn first_member(&self) -> &ModuleId {
        &self.member_ids[0]
    }

    /// Member ids joined with `+`, for logs and diagnostics.
    #[must_use]
    pub fn label(&self) -> String {
        self.member_ids
            .iter()
            .map(ModuleId::as_str)
            .collect::<Vec<_>>()
            .join("+")
    }
}

/// DAG of chunks derived from a [`DependencyGraph`].
#[derive(Debug, Clone)]
pub struct ChunkGraph {
    /// Node `i` holds the chunk with `ChunkId(i)`.
    pub graph: DiGraph<Chunk, ()>,
    /// Mapping from module node to the chunk containing it.
    pub module_to_chunk: HashMap<NodeIndex, ChunkId>,
}

impl ChunkGraph {
    /// Return the number of chunks.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of inter-chunk edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterate over chunks in id order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.graph.node_weights()
    }

    /// Return the chunk with `id`.
    #[must_use]
    pub fn chunk(&self, id: ChunkId) -> Option<&Chunk> {
        self.graph.node_weight(NodeIndex::new(id.0))
    }

    /// Return the chunk containing `module`.
    #[must_use]
    pub fn chunk_of(&self, module: NodeIndex) -> Option<ChunkId> {
        self.module_to_chunk.get(&module).copied()
    }

    /// Chunks that `id` depends on directly, in ascending id order.
    #[must_use]
    pub fn dependencies(&self, id: ChunkId) -> Vec<ChunkId> {
        let mut deps: Vec<ChunkId> = self
            .graph
            .neighbors_directed(NodeIndex::new(id.0), Direction::Outgoing)
            .map(|n| ChunkId(n.index()))
            .collect();
        deps.sort_unstable();
        deps
    }

    /// Chunks that depend on `id` directly, in ascending id order.
    #[must_use]
    pub fn dependents(&self, id: ChunkId) -> Vec<ChunkId> {
        let mut deps: Vec<ChunkId> = self
            .graph
            .neighbors_directed(NodeIndex::new(id.0), Direction::Incoming)
            .map(|n| ChunkId(n.index()))
            .collect();
        deps.sort_unstable();
        deps
    }

    /// Chunks with more than one member.
    pub fn cyclic_chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks().filter(|chunk| chunk.is_cycle())
    }
}

/// Collapse every strongly connected component of `graph` into a chunk.
///
/// Never fails: any finite graph has an SCC decomposition.
#[must_use]
#[instrument(skip(graph), fields(modules = graph.module_count()))]
pub fn compute_chunks(graph: &DependencyGraph) -> ChunkGraph {
    let mut components: Vec<Vec<NodeIndex>> = tarjan_scc(&graph.graph)
        .into_iter()
        .map(|mut component| {
            component.sort_unstable();
            component
        })
        .collect();
    components.sort_unstable_by_key(|component| component[0]);

    let mut chunk_graph = DiGraph::<Chunk, ()>::with_capacity(components.len(), 0);
    let mut module_to_chunk: HashMap<NodeIndex, ChunkId> =
        HashMap::with_capacity(graph.module_count());

    for (i, members) in components.into_iter().enumerate() {
        let id = ChunkId(i);
        for &member in &members {
            module_to_chunk.insert(member, id);
        }
        let member_ids = members
            .iter()
            .map(|&member| graph.graph[member].id.clone())
            .collect();
        chunk_graph.add_node(Chunk {
            id,
            members,
            member_ids,
        });
    }

    for edge in graph.graph.edge_references() {
        let from = module_to_chunk[&edge.source()];
        let to = module_to_chunk[&edge.target()];
        if from == to {
            continue;
        }
        let (from, to) = (NodeIndex::new(from.0), NodeIndex::new(to.0));
        if !chunk_graph.contains_edge(from, to) {
            chunk_graph.add_edge(from, to, ());
        }
    }

    let result = ChunkGraph {
        graph: chunk_graph,
        module_to_chunk,
    };
    debug!(
        chunks = result.chunk_count(),
        cycles = result.cyclic_chunks().count(),
        edges = result.edge_count(),
        "chunks computed"
    );
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
