//! `chunkgen chunks`: show chunks in emission order.

use std::io::Write;

use chunkgen_core::Generation;
use chunkgen_core::generate::Analysis;
use chunkgen_core::graph::ChunkDiagnostic;
use clap::Args;
use serde::Serialize;

use super::{Global, load};
use crate::output::{CliError, pretty_kv, pretty_section, render, render_error};

/// Arguments for `chunkgen chunks`.
#[derive(Args, Debug, Default)]
pub struct ChunksArgs {
    /// Only list chunks that contain a cycle.
    #[arg(long)]
    pub cycles_only: bool,
}

#[derive(Debug, Serialize)]
struct ChunkRow {
    position: usize,
    label: String,
    members: Vec<String>,
    cyclic: bool,
    depends_on: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ChunksOutput {
    graph_hash: String,
    modules: usize,
    chunks: Vec<ChunkRow>,
    diagnostics: Vec<ChunkDiagnostic>,
}

/// Execute `chunkgen chunks`.
pub fn run_chunks(args: &ChunksArgs, global: Global<'_>) -> anyhow::Result<()> {
    let (config, output) = load(global, Default::default())?;

    let analysis = match Generation::new(&config.options)
        .root(&config.root)
        .analyze(&config.modules)
    {
        Ok(analysis) => analysis,
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            anyhow::bail!(err);
        }
    };

    let payload = build_output(&analysis, args.cycles_only);
    render(output, &payload, render_chunks_text, render_chunks_pretty)
}

fn build_output(analysis: &Analysis, cycles_only: bool) -> ChunksOutput {
    let chunks = &analysis.chunks;
    let rows = analysis
        .order
        .iter()
        .enumerate()
        .filter_map(|(position, &id)| chunks.chunk(id).map(|chunk| (position, chunk)))
        .filter(|(_, chunk)| !cycles_only || chunk.is_cycle())
        .map(|(position, chunk)| ChunkRow {
            position,
            label: chunk.label(),
            members: chunk.member_ids.iter().map(ToString::to_string).collect(),
            cyclic: chunk.is_cycle(),
            depends_on: chunks
                .dependencies(chunk.id)
                .into_iter()
                .filter_map(|dep| chunks.chunk(dep).map(|c| c.label()))
                .collect(),
        })
        .collect();

    ChunksOutput {
        graph_hash: analysis.graph.content_hash.clone(),
        modules: analysis.graph.module_count(),
        chunks: rows,
        diagnostics: analysis.diagnostics.clone(),
    }
}

fn render_chunks_text(payload: &ChunksOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "position  chunk  depends_on")?;
    for row in &payload.chunks {
        writeln!(w, "{}  {}  {}", row.position, row.label, row.depends_on.join(","))?;
    }
    Ok(())
}

fn render_chunks_pretty(payload: &ChunksOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Chunks ({})", payload.chunks.len()))?;
    pretty_kv(w, "Modules", payload.modules.to_string())?;
    pretty_kv(w, "Graph hash", &payload.graph_hash)?;

    for row in &payload.chunks {
        let marker = if row.cyclic { " (cycle)" } else { "" };
        writeln!(w, "\n{:>3}. {}{marker}", row.position + 1, row.label)?;
        if row.cyclic {
            writeln!(w, "     members:    {}", row.members.join(", "))?;
        }
        if !row.depends_on.is_empty() {
            writeln!(w, "     depends on: {}", row.depends_on.join(", "))?;
        }
    }

    let conflicts: Vec<&ChunkDiagnostic> = payload
        .diagnostics
        .iter()
        .filter(|d| d.has_toolchain_conflict())
        .collect();
    if !conflicts.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Toolchain conflicts")?;
        for diagnostic in conflicts {
            writeln!(
                w,
                "  {}: {}",
                diagnostic.members.join("+"),
                diagnostic.toolchains.join(" vs ")
            )?;
        }
    }

    Ok(())
}
