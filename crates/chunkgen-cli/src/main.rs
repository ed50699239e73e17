#![forbid(unsafe_code)]

mod cmd;
mod manifest;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "chunkgen",
    author,
    version,
    about = "chunkgen: build artifacts for cyclic module graphs",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format: pretty, text or json.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Project file describing the modules.
    #[arg(long, global = true, value_name = "FILE", default_value = "chunkgen.toml")]
    project: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn global(&self) -> cmd::Global<'_> {
        cmd::Global {
            project: self.project.as_path(),
            format: self.format,
            json: self.json,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Inspect",
        about = "Show chunks in emission order",
        long_about = "Group mutually dependent modules into chunks and list them \
                      dependencies first, with toolchain conflicts inside cycles.",
        after_help = "EXAMPLES:\n    # List every chunk\n    chunkgen chunks\n\n    # Only cycles\n    chunkgen chunks --cycles-only\n\n    # Emit machine-readable output\n    chunkgen chunks --format json"
    )]
    Chunks(cmd::chunks::ChunksArgs),

    #[command(
        next_help_heading = "Inspect",
        about = "List the artifacts a run would write",
        long_about = "Plan artifacts and their target paths without touching the filesystem.",
        after_help = "EXAMPLES:\n    # Plan one artifact per chunk\n    chunkgen plan\n\n    # Plan a single combined artifact\n    chunkgen plan --single --project-name shop\n\n    # Name a cycle\n    chunkgen plan --name api=api-core"
    )]
    Plan(cmd::plan::PlanArgs),

    #[command(
        next_help_heading = "Write",
        about = "Write artifacts for every chunk",
        long_about = "Write one artifact per planned descriptor, dependencies first. \
                      The first failure stops the run; earlier artifacts stay written.",
        after_help = "EXAMPLES:\n    # Generate into the project directory\n    chunkgen generate\n\n    # Keep existing files as timestamped backups\n    chunkgen generate --backup\n\n    # Use another project file\n    chunkgen --project build/modules.toml generate --output-dir out"
    )]
    Generate(cmd::generate::GenerateArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Bash\n    chunkgen completions bash > ~/.local/share/bash-completion/completions/chunkgen\n\n    # Zsh\n    chunkgen completions zsh > ~/.zfunc/_chunkgen"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("CHUNKGEN_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "chunkgen=debug,chunkgen_core=debug,info"
        } else {
            "chunkgen=info,chunkgen_core=info,warn"
        })
    });

    let format = env::var("CHUNKGEN_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    debug!(project = %cli.project.display(), "starting");

    let global = cli.global();
    match &cli.command {
        Commands::Chunks(args) => cmd::chunks::run_chunks(args, global),
        Commands::Plan(args) => cmd::plan::run_plan(args, global),
        Commands::Generate(args) => cmd::generate::run_generate(args, global),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args, &mut command)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn project_defaults_to_chunkgen_toml() {
        let cli = Cli::parse_from(["chunkgen", "chunks"]);
        assert_eq!(cli.project, PathBuf::from("chunkgen.toml"));
        assert!(cli.format.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::parse_from([
            "chunkgen",
            "plan",
            "--project",
            "mods.toml",
            "--format",
            "json",
            "-v",
        ]);
        assert_eq!(cli.project, PathBuf::from("mods.toml"));
        assert_eq!(cli.format, Some(OutputMode::Json));
        assert!(cli.verbose);
    }

    #[test]
    fn json_flag_is_accepted() {
        let cli = Cli::parse_from(["chunkgen", "--json", "chunks"]);
        assert!(cli.json);
        assert!(cli.global().json);
    }

    #[test]
    fn generate_accepts_option_flags() {
        let cli = Cli::parse_from([
            "chunkgen",
            "generate",
            "--single",
            "--backup",
            "--name",
            "api=api-core",
            "--output-dir",
            "out",
        ]);
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        let layer = args.options.to_layer();
        assert_eq!(layer.single_artifact, Some(true));
        assert_eq!(layer.backup_existing, Some(true));
        assert_eq!(layer.output_dir, Some(PathBuf::from("out")));
        assert_eq!(layer.representative_names.len(), 1);
    }

    #[test]
    fn completions_subcommand_parses() {
        let cli = Cli::parse_from(["chunkgen", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Commands::Completions(cmd::completions::CompletionsArgs {
                shell: clap_complete::Shell::Bash,
            })
        ));
    }

    #[test]
    fn all_subcommands_listed() {
        let subcommands = [
            vec!["chunkgen", "chunks"],
            vec!["chunkgen", "chunks", "--cycles-only"],
            vec!["chunkgen", "plan", "--aggregate"],
            vec!["chunkgen", "generate", "--chunk-dirs"],
            vec!["chunkgen", "completions", "zsh"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(result.is_ok(), "failed to parse {args:?}: {:?}", result.err());
        }
    }

    #[test]
    fn malformed_name_is_rejected() {
        assert!(Cli::try_parse_from(["chunkgen", "plan", "--name", "api"]).is_err());
    }
}
