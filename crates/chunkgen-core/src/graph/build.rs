//! Dependency graph construction from caller-supplied modules.
//!
//! # Edge Direction
//!
//! An edge `A → B` means "A **depends on** B". This is the opposite of a
//! blocker graph: B has to be emitted before A.
//!
//! ## Node Order
//!
//! Nodes are added in module declaration order, so a `NodeIndex` doubles as
//! the declaration index. Everything downstream that needs a stable order
//! (chunk membership, tie-breaking) leans on this.
//!
//! ## External References
//!
//! Dependencies naming a module that is not part of the supplied set are
//! dropped. They usually point at libraries or modules of another project
//! and have no artifact to order against.

#![allow(clippy::module_name_repetitions)]

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::{debug, instrument};

use crate::error::GenerationError;
use crate::model::{Module, ModuleId};

/// Weight of a depends-on edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeInfo {
    /// The dependency is re-exported to the dependents of the source module.
    pub exported: bool,
}

/// Directed depends-on graph over the modules of one generation run.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// Nodes are modules in declaration order; edges are depends-on relations.
    pub graph: DiGraph<Module, EdgeInfo>,
    /// Mapping from module id to its `NodeIndex`.
    pub node_map: HashMap<ModuleId, NodeIndex>,
    /// BLAKE3 content hash of modules and resolved edges.
    pub content_hash: String,
}

impl DependencyGraph {
    /// Build a [`DependencyGraph`] from `modules`.
    ///
    /// Edges are resolved in declaration order. Repeated edges between the
    /// same pair keep their first position; the edge is exported if any of
    /// the repeats is.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::DuplicateModule`] if two modules share an id.
    #[instrument(skip(modules), fields(modules = modules.len()))]
    pub fn from_modules(modules: &[Module]) -> Result<Self, GenerationError> {
        let mut graph = DiGraph::<Module, EdgeInfo>::with_capacity(modules.len(), 0);
        let mut node_map: HashMap<ModuleId, NodeIndex> = HashMap::with_capacity(modules.len());

        for module in modules {
            if node_map.contains_key(&module.id) {
                return Err(GenerationError::DuplicateModule(module.id.to_string()));
            }
            let idx = graph.add_node(module.clone());
            node_map.insert(module.id.clone(), idx);
        }

        let mut ignored = 0usize;
        for module in modules {
            let from = node_map[&module.id];
            for dep in &module.dependencies {
                let Some(&to) = node_map.get(&dep.module) else {
                    debug!(module = %module.id, dependency = %dep.module, "ignoring dependency outside the graph");
                    ignored += 1;
                    continue;
                };

                if let Some(existing) = graph.find_edge(from, to) {
                    if dep.exported {
                        graph[existing].exported = true;
                    }
                    continue;
                }
                graph.add_edge(from, to, EdgeInfo { exported: dep.exported });
            }
        }

        let content_hash = compute_content_hash(&graph);
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            ignored,
            "dependency graph built"
        );

        Ok(Self {
            graph,
            node_map,
            content_hash,
        })
    }

    /// Return the number of modules in the graph.
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of depends-on edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up the `NodeIndex` for a module id.
    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    /// Return the module stored at `idx`.
    #[must_use]
    pub fn module(&self, idx: NodeIndex) -> Option<&Module> {
        self.graph.node_weight(idx)
    }

    /// Direct dependencies of `idx` in declaration order.
    #[must_use]
    pub fn dependencies(&self, idx: NodeIndex) -> Vec<(NodeIndex, EdgeInfo)> {
        // petgraph walks outgoing edges newest first.
        let mut deps: Vec<(NodeIndex, EdgeInfo)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|edge| (edge.target(), *edge.weight()))
            .collect();
        deps.reverse();
        deps
    }

    /// Modules visible to `idx` when it is compiled.
    ///
    /// That is every direct dependency plus, transitively, every exported
    /// dependency reached through them, in first-reached (breadth-first)
    /// order. `idx` itself is never included, even inside a cycle.
    #[must_use]
    pub fn visible_dependencies(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut seen: HashSet<NodeIndex> = HashSet::from([idx]);
        let mut visible = Vec::new();
        let mut queue: VecDeque<NodeIndex> = VecDeque::new();

        for (dep, _) in self.dependencies(idx) {
            if seen.insert(dep) {
                visible.push(dep);
                queue.push_back(dep);
            }
        }

        while let Some(current) = queue.pop_front() {
            for (dep, info) in self.dependencies(current) {
                if info.exported && seen.insert(dep) {
                    visible.push(dep);
                    queue.push_back(dep);
                }
            }
        }

        visible
    }
}

/// Compute a BLAKE3 hash over module ids and edges in declaration order.
fn compute_content_hash(graph: &DiGraph<Module, EdgeInfo>) -> String {
    let mut hasher = blake3::Hasher::new();
    for idx in graph.node_indices() {
        hasher.update(graph[idx].id.as_str().as_bytes());
        hasher.update(b"\x00");
    }
    hasher.update(b"\x01");

    let mut edges: Vec<(usize, usize, bool)> = graph
        .edge_references()
        .map(|e| (e.source().index(), e.target().index(), e.weight().exported))
        .collect();
    edges.sort_unstable();
    for (from, to, exported) in edges {
        hasher.update(graph[NodeIndex::new(from)].id.as_str().as_bytes());
        hasher.update(b"\x00");
        hasher.update(graph[NodeIndex::new(to)].id.as_str().as_bytes());
        hasher.update(if exported { b"\x02" } else { b"\x00" });
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
