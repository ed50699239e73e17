//! Option flags shared by `plan` and `generate`.

use std::path::PathBuf;

use chunkgen_core::ModuleId;
use chunkgen_core::config::OptionsLayer;
use clap::Args;

/// Generation options that override the configuration files.
#[derive(Args, Debug, Default, Clone)]
pub struct OptionArgs {
    /// Write one combined artifact for the whole project.
    #[arg(long)]
    pub single: bool,

    /// Rename existing targets to timestamped backups before writing.
    #[arg(long)]
    pub backup: bool,

    /// Skip the read-only check on existing targets.
    #[arg(long)]
    pub no_writable_check: bool,

    /// Add a project-level artifact depending on every chunk artifact.
    #[arg(long)]
    pub aggregate: bool,

    /// Write each chunk's artifact into its first member's base directory.
    #[arg(long)]
    pub chunk_dirs: bool,

    /// Directory for artifacts (relative to the project file).
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Name of the combined or aggregate artifact.
    #[arg(long, value_name = "NAME")]
    pub project_name: Option<String>,

    /// Prefix for every artifact file name.
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Artifact file extension, without the dot.
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,

    /// Representative name for the cycle containing MEMBER (repeatable).
    #[arg(long = "name", value_name = "MEMBER=NAME", value_parser = parse_name)]
    pub names: Vec<(String, String)>,
}

impl OptionArgs {
    /// Convert the flags that were given into an options layer.
    pub fn to_layer(&self) -> OptionsLayer {
        OptionsLayer {
            single_artifact: self.single.then_some(true),
            backup_existing: self.backup.then_some(true),
            force_writable_check: self.no_writable_check.then_some(false),
            aggregate_artifact: self.aggregate.then_some(true),
            chunk_dirs: self.chunk_dirs.then_some(true),
            output_dir: self.output_dir.clone(),
            project_name: self.project_name.clone(),
            file_prefix: self.prefix.clone(),
            extension: self.extension.clone(),
            representative_names: self
                .names
                .iter()
                .map(|(member, name)| (ModuleId::new(member.as_str()), name.clone()))
                .collect(),
        }
    }
}

fn parse_name(raw: &str) -> Result<(String, String), String> {
    let (member, name) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected MEMBER=NAME, got '{raw}'"))?;
    let (member, name) = (member.trim(), name.trim());
    if member.is_empty() || name.is_empty() {
        return Err(format!("expected MEMBER=NAME, got '{raw}'"));
    }
    Ok((member.to_string(), name.to_string()))
}
