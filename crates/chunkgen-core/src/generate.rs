//! End-to-end generation runs.
//!
//! ```text
//! &[Module]
//!    ↓  DependencyGraph::from_modules
//! DependencyGraph
//!    ↓  compute_chunks
//! ChunkGraph
//!    ↓  sort_chunks
//! Vec<ChunkId>
//!    ↓  plan
//! Plan
//!    ↓  ArtifactWriter::write
//! GenerationResult
//! ```
//!
//! Every stage consumes only the previous stage's output. The first error
//! ends the run; nothing is retried.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tracing::{info, info_span, warn};

use crate::config::GenerationOptions;
use crate::error::GenerationError;
use crate::graph::build::DependencyGraph;
use crate::graph::chunks::{ChunkGraph, ChunkId, compute_chunks};
use crate::graph::diagnostics::{ChunkDiagnostic, chunk_diagnostics};
use crate::graph::order::sort_chunks;
use crate::model::Module;
use crate::plan::{Plan, plan};
use crate::write::{ArtifactGenerator, ArtifactWriter, FileSystem, GenerationResult};

/// Graph, chunks and emission order of one module set.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub graph: DependencyGraph,
    pub chunks: ChunkGraph,
    pub order: Vec<ChunkId>,
    pub diagnostics: Vec<ChunkDiagnostic>,
}

/// Everything computed before the first file is touched.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub analysis: Analysis,
    /// Options with paths resolved against the run's root.
    pub options: GenerationOptions,
    pub plan: Plan,
}

/// Configurable generation run.
#[derive(Debug, Clone)]
pub struct Generation<'a> {
    options: &'a GenerationOptions,
    root: Option<PathBuf>,
    cancel: Option<Arc<AtomicBool>>,
    backup_stamp: Option<String>,
}

impl<'a> Generation<'a> {
    #[must_use]
    pub const fn new(options: &'a GenerationOptions) -> Self {
        Self {
            options,
            root: None,
            cancel: None,
            backup_stamp: None,
        }
    }

    /// Resolve relative `output_dir` and module `base_dir`s against `root`.
    #[must_use]
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    #[must_use]
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Fixed timestamp for backup names.
    #[must_use]
    pub fn backup_stamp(mut self, stamp: impl Into<String>) -> Self {
        self.backup_stamp = Some(stamp.into());
        self
    }

    /// Build the graph, chunks and order of `modules`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::DuplicateModule`] or
    /// [`GenerationError::CyclicChunkGraph`].
    pub fn analyze(&self, modules: &[Module]) -> Result<Analysis, GenerationError> {
        let modules = self.resolve_modules(modules);

        let graph = {
            let _span = info_span!("graph").entered();
            DependencyGraph::from_modules(&modules)?
        };
        let chunks = {
            let _span = info_span!("chunks").entered();
            compute_chunks(&graph)
        };
        let order = {
            let _span = info_span!("order").entered();
            sort_chunks(&chunks)?
        };

        let diagnostics = chunk_diagnostics(&chunks, &graph);
        for diagnostic in diagnostics.iter().filter(|d| d.has_toolchain_conflict()) {
            warn!(
                members = %diagnostic.members.join(", "),
                toolchains = %diagnostic.toolchains.join(", "),
                "modules in one cycle use different toolchains"
            );
        }

        info!(
            modules = graph.module_count(),
            edges = graph.edge_count(),
            chunks = chunks.chunk_count(),
            cycles = diagnostics.len(),
            hash = %graph.content_hash,
            "dependency graph analysed"
        );

        Ok(Analysis {
            graph,
            chunks,
            order,
            diagnostics,
        })
    }

    /// Run every stage up to and including planning.
    ///
    /// # Errors
    ///
    /// Returns the first error from graph construction, ordering or
    /// planning.
    pub fn prepare(&self, modules: &[Module]) -> Result<Prepared, GenerationError> {
        let analysis = self.analyze(modules)?;
        let options = self.resolve_options();

        let plan = {
            let _span = info_span!("plan").entered();
            plan(&analysis.chunks, &analysis.order, &options, &analysis.graph)?
        };
        info!(descriptors = plan.len(), "artifacts planned");

        Ok(Prepared {
            analysis,
            options,
            plan,
        })
    }

    /// Run the whole pipeline, writing through `fs`.
    pub fn run<F, G>(&self, modules: &[Module], fs: F, generator: &mut G) -> GenerationResult
    where
        F: FileSystem,
        G: ArtifactGenerator + ?Sized,
    {
        match self.prepare(modules) {
            Ok(prepared) => self.write(&prepared, fs, generator),
            Err(err) => {
                warn!(code = %err.code(), "generation aborted before writing: {err}");
                GenerationResult::from_error(err)
            }
        }
    }

    /// Write an already prepared plan.
    pub fn write<F, G>(&self, prepared: &Prepared, fs: F, generator: &mut G) -> GenerationResult
    where
        F: FileSystem,
        G: ArtifactGenerator + ?Sized,
    {
        let mut writer = ArtifactWriter::new(fs, &prepared.options);
        if let Some(flag) = &self.cancel {
            writer = writer.with_cancel_flag(Arc::clone(flag));
        }
        if let Some(stamp) = &self.backup_stamp {
            writer = writer.with_backup_stamp(stamp.clone());
        }

        let _span = info_span!("write").entered();
        writer.write(&prepared.plan, generator)
    }

    fn resolve_options(&self) -> GenerationOptions {
        let mut options = self.options.clone();
        if let Some(root) = &self.root {
            options.output_dir = resolve(root, &options.output_dir);
        }
        options
    }

    fn resolve_modules(&self, modules: &[Module]) -> Vec<Module> {
        let Some(root) = &self.root else {
            return modules.to_vec();
        };
        modules
            .iter()
            .map(|module| Module {
                base_dir: module.base_dir.as_deref().map(|dir| resolve(root, dir)),
                ..module.clone()
            })
            .collect()
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Run all stages with default settings.
///
/// The result always carries whatever was written before a failure.
pub fn generate<F, G>(
    modules: &[Module],
    options: &GenerationOptions,
    fs: F,
    generator: &mut G,
) -> GenerationResult
where
    F: FileSystem,
    G: ArtifactGenerator + ?Sized,
{
    Generation::new(options).run(modules, fs, generator)
}

/// Run every stage except writing.
///
/// # Errors
///
/// Returns the first error from graph construction, ordering or planning.
pub fn prepare(modules: &[Module], options: &GenerationOptions) -> Result<Prepared, GenerationError> {
    Generation::new(options).prepare(modules)
}
