//! Dependency-first ordering of chunks.
//!
//! Kahn's algorithm over the chunk graph, counting each chunk's unemitted
//! dependencies. A chunk becomes ready once everything it depends on has
//! been emitted; among ready chunks the one whose first member has the
//! smallest module id goes first (declaration index breaks exact ties).
//!
//! For every chunk edge `A → B` (A depends on B), B precedes A.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use petgraph::Direction;
use petgraph::graph::NodeIndex;
use tracing::{debug, instrument};

use crate::error::GenerationError;
use crate::graph::chunks::{ChunkGraph, ChunkId};

/// Ready-queue key: first member id, then first member declaration index.
type TieKey<'a> = (&'a str, NodeIndex, ChunkId);

fn tie_key(chunks: &ChunkGraph, id: ChunkId) -> TieKey<'_> {
    let chunk = &chunks.graph[NodeIndex::new(id.0)];
    (chunk.first_member().as_str(), chunk.members[0], id)
}

/// Order `chunks` so that every chunk comes after all chunks it depends on.
///
/// # Errors
///
/// Returns [`GenerationError::CyclicChunkGraph`] if some chunks can never
/// become ready. That only happens when the input was not produced by
/// [`compute_chunks`](crate::graph::chunks::compute_chunks).
#[instrument(skip(chunks), fields(chunks = chunks.chunk_count()))]
pub fn sort_chunks(chunks: &ChunkGraph) -> Result<Vec<ChunkId>, GenerationError> {
    let graph = &chunks.graph;

    let mut pending: Vec<usize> = graph
        .node_indices()
        .map(|idx| graph.neighbors_directed(idx, Direction::Outgoing).count())
        .collect();

    let mut ready: BinaryHeap<Reverse<TieKey<'_>>> = graph
        .node_indices()
        .filter(|idx| pending[idx.index()] == 0)
        .map(|idx| Reverse(tie_key(chunks, ChunkId(idx.index()))))
        .collect();

    let mut order = Vec::with_capacity(graph.node_count());
    while let Some(Reverse((_, _, id))) = ready.pop() {
        order.push(id);
        for dependent in graph.neighbors_directed(NodeIndex::new(id.0), Direction::Incoming) {
            let count = &mut pending[dependent.index()];
            *count -= 1;
            if *count == 0 {
                ready.push(Reverse(tie_key(chunks, ChunkId(dependent.index()))));
            }
        }
    }

    if order.len() < graph.node_count() {
        let stuck = graph
            .node_indices()
            .filter(|idx| pending[idx.index()] > 0)
            .map(|idx| graph[idx].label())
            .collect();
        return Err(GenerationError::CyclicChunkGraph { chunks: stuck });
    }

    debug!(order = ?order, "chunks sorted");
    Ok(order)
}
