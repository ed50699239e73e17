//! `chunkgen generate`: write one manifest per planned artifact.

use std::io::Write;
use std::path::PathBuf;

use chunkgen_core::write::Backup;
use chunkgen_core::{Generation, GenerationResult, LocalFileSystem};
use clap::Args;
use serde::Serialize;
use tracing::info;

use super::options::OptionArgs;
use super::{Global, load};
use crate::manifest::ManifestGenerator;
use crate::output::{CliError, pretty_kv, pretty_section, render, render_error};

/// Arguments for `chunkgen generate`.
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub options: OptionArgs,

    /// Fixed timestamp for backup file names instead of the current time.
    #[arg(long, value_name = "STAMP", hide = true)]
    pub backup_stamp: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerateOutput {
    ok: bool,
    graph_hash: String,
    planned: usize,
    written: Vec<PathBuf>,
    backups: Vec<Backup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<CliError>,
}

impl GenerateOutput {
    fn from_result(result: &GenerationResult, graph_hash: String, planned: usize) -> Self {
        Self {
            ok: result.is_success(),
            graph_hash,
            planned,
            written: result.written.clone(),
            backups: result.backups.clone(),
            error: result.error.as_ref().map(CliError::from),
        }
    }
}

/// Execute `chunkgen generate`.
///
/// A failed run still reports what was written before the failure, then
/// exits non-zero.
pub fn run_generate(args: &GenerateArgs, global: Global<'_>) -> anyhow::Result<()> {
    let (config, output) = load(global, args.options.to_layer())?;

    let mut generation = Generation::new(&config.options).root(&config.root);
    if let Some(stamp) = &args.backup_stamp {
        generation = generation.backup_stamp(stamp.clone());
    }

    let prepared = match generation.prepare(&config.modules) {
        Ok(prepared) => prepared,
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            anyhow::bail!(err);
        }
    };

    let graph_hash = prepared.analysis.graph.content_hash.clone();
    let mut generator = ManifestGenerator::new(graph_hash.clone());
    let result = generation.write(&prepared, LocalFileSystem, &mut generator);
    info!(
        written = result.written.len(),
        backups = result.backups.len(),
        "generation finished"
    );

    let payload = GenerateOutput::from_result(&result, graph_hash, prepared.plan.len());
    render(output, &payload, render_generate_text, render_generate_pretty)?;

    match result.error {
        Some(err) => {
            // JSON output already embeds the error.
            if let Some(error) = payload.error.as_ref().filter(|_| !output.is_json()) {
                render_error(output, error)?;
            }
            Err(err.into())
        }
        None => Ok(()),
    }
}

fn render_generate_text(payload: &GenerateOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for path in &payload.written {
        writeln!(w, "wrote {}", path.display())?;
    }
    for backup in &payload.backups {
        writeln!(
            w,
            "backup {} -> {}",
            backup.original.display(),
            backup.backup.display()
        )?;
    }
    Ok(())
}

fn render_generate_pretty(payload: &GenerateOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let heading = if payload.ok {
        "Generation complete"
    } else {
        "Generation stopped"
    };
    pretty_section(w, heading)?;
    pretty_kv(
        w,
        "Written",
        format!("{} of {}", payload.written.len(), payload.planned),
    )?;
    pretty_kv(w, "Graph hash", &payload.graph_hash)?;

    if !payload.written.is_empty() {
        writeln!(w)?;
        for path in &payload.written {
            writeln!(w, "  + {}", path.display())?;
        }
    }
    if !payload.backups.is_empty() {
        writeln!(w)?;
        writeln!(w, "Backups:")?;
        for backup in &payload.backups {
            writeln!(
                w,
                "  {} -> {}",
                backup.original.display(),
                backup.backup.display()
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkgen_core::GenerationError;

    #[test]
    fn failed_result_carries_error_code() {
        let result = GenerationResult {
            written: vec![PathBuf::from("out/lib.json")],
            backups: Vec::new(),
            error: Some(GenerationError::ReadOnlyTarget {
                path: PathBuf::from("out/app.json"),
            }),
        };

        let payload = GenerateOutput::from_result(&result, "abc".to_string(), 2);
        assert!(!payload.ok);
        assert_eq!(payload.written.len(), 1);
        let error = payload.error.expect("error");
        assert_eq!(error.error_code.as_deref(), Some("E5001"));
    }

    #[test]
    fn pretty_output_counts_written_artifacts() {
        let payload = GenerateOutput {
            ok: true,
            graph_hash: "abc".to_string(),
            planned: 2,
            written: vec![PathBuf::from("lib.json"), PathBuf::from("app.json")],
            backups: vec![Backup {
                original: PathBuf::from("app.json"),
                backup: PathBuf::from("app.json.20260101-000000.bak"),
            }],
            error: None,
        };

        let mut out = Vec::new();
        render_generate_pretty(&payload, &mut out).expect("render");
        let rendered = String::from_utf8(out).expect("utf8");
        assert!(rendered.contains("Generation complete"));
        assert!(rendered.contains("2 of 2"));
        assert!(rendered.contains("app.json -> app.json.20260101-000000.bak"));
    }
}
