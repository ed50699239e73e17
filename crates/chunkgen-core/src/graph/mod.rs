//! Module dependency graph, cycle collapsing and ordering.
//!
//! # Overview
//!
//! ```text
//! &[Module]
//!        ↓  build::DependencyGraph::from_modules()
//! DependencyGraph (DiGraph with possible cycles)
//!        ↓  chunks::compute_chunks()
//! ChunkGraph (SCCs collapsed to chunks, a DAG)
//!        ↓  order::sort_chunks()
//! Vec<ChunkId> (dependencies first)
//! ```
//!
//! ## Change Detection
//!
//! [`DependencyGraph::content_hash`] is a BLAKE3 hash of modules and edges.
//! Compare it against a stored value to decide whether artifacts need to be
//! regenerated.
//!
//! ## Typical Usage
//!
//! ```rust
//! use chunkgen_core::graph::{DependencyGraph, compute_chunks, sort_chunks};
//! use chunkgen_core::model::Module;
//!
//! let graph = DependencyGraph::from_modules(&[
//!     Module::new("app").depends_on("lib"),
//!     Module::new("lib"),
//! ])?;
//! let chunks = compute_chunks(&graph);
//! let order = sort_chunks(&chunks)?;
//! assert_eq!(chunks.chunk(order[0]).map(|c| c.label()), Some("lib".to_string()));
//! # Ok::<(), chunkgen_core::error::GenerationError>(())
//! ```

pub mod build;
pub mod chunks;
pub mod diagnostics;
pub mod order;

pub use build::{DependencyGraph, EdgeInfo};
pub use chunks::{Chunk, ChunkGraph, ChunkId, compute_chunks};
pub use diagnostics::{ChunkDiagnostic, chunk_diagnostics};
pub use order::sort_chunks;
