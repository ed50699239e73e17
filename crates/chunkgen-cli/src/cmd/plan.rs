//! `chunkgen plan`: list the artifacts a run would write, without writing.

use std::io::Write;

use chunkgen_core::{ArtifactKind, Generation, Plan};
use clap::Args;

use super::options::OptionArgs;
use super::{Global, load};
use crate::output::{CliError, pretty_kv, pretty_section, render, render_error};

/// Arguments for `chunkgen plan`.
#[derive(Args, Debug, Default)]
pub struct PlanArgs {
    #[command(flatten)]
    pub options: OptionArgs,
}

/// Execute `chunkgen plan`.
pub fn run_plan(args: &PlanArgs, global: Global<'_>) -> anyhow::Result<()> {
    let (config, output) = load(global, args.options.to_layer())?;

    let prepared = match Generation::new(&config.options)
        .root(&config.root)
        .prepare(&config.modules)
    {
        Ok(prepared) => prepared,
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            anyhow::bail!(err);
        }
    };

    render(output, &prepared.plan, render_plan_text, render_plan_pretty)
}

const fn kind_label(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::Chunk => "chunk",
        ArtifactKind::Combined => "combined",
        ArtifactKind::Aggregate => "aggregate",
    }
}

fn render_plan_text(plan: &Plan, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "index  name  kind  target  depends_on")?;
    for descriptor in plan.iter() {
        let deps: Vec<String> = descriptor.depends_on.iter().map(|r| r.index.to_string()).collect();
        writeln!(
            w,
            "{}  {}  {}  {}  {}",
            descriptor.index,
            descriptor.name,
            kind_label(descriptor.kind),
            descriptor.target_path.display(),
            deps.join(",")
        )?;
    }
    Ok(())
}

fn render_plan_pretty(plan: &Plan, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Plan ({} artifacts)", plan.len()))?;
    if plan.is_empty() {
        writeln!(w, "Nothing to generate.")?;
        return Ok(());
    }

    for descriptor in plan.iter() {
        writeln!(w)?;
        writeln!(
            w,
            "{:>3}. {} [{}]",
            descriptor.index + 1,
            descriptor.name,
            kind_label(descriptor.kind)
        )?;
        pretty_kv(w, "  target", descriptor.target_path.display().to_string())?;
        if descriptor.kind != ArtifactKind::Aggregate {
            let members: Vec<String> = descriptor
                .chunks
                .iter()
                .flat_map(|chunk| chunk.members.iter().map(ToString::to_string))
                .collect();
            pretty_kv(w, "  modules", members.join(", "))?;
        }
        if !descriptor.depends_on.is_empty() {
            let deps: Vec<&str> = descriptor.depends_on.iter().map(|r| r.name.as_str()).collect();
            pretty_kv(w, "  needs", deps.join(", "))?;
        }
    }
    Ok(())
}
