pub mod chunks;
pub mod completions;
pub mod generate;
pub mod options;
pub mod plan;

use std::path::Path;

use chunkgen_core::ErrorCode;
use chunkgen_core::config::{EffectiveConfig, OptionsLayer, resolve_config};

use crate::output::{CliError, OutputMode, render_error, resolve_output_mode};

/// Flags every command shares.
#[derive(Debug, Clone, Copy)]
pub struct Global<'a> {
    pub project: &'a Path,
    pub format: Option<OutputMode>,
    pub json: bool,
}

/// Load the project file and resolve options and output mode.
///
/// Errors are rendered before being returned.
pub fn load(global: Global<'_>, overrides: OptionsLayer) -> anyhow::Result<(EffectiveConfig, OutputMode)> {
    match resolve_config(global.project, overrides) {
        Ok(config) => {
            let mode = resolve_output_mode(global.format, global.json, config.user_output.as_deref());
            Ok((config, mode))
        }
        Err(err) => {
            let mode = resolve_output_mode(global.format, global.json, None);
            let code = ErrorCode::ConfigParseError;
            render_error(
                mode,
                &CliError::with_details(
                    format!("{err:#}"),
                    code.hint().unwrap_or_else(|| code.message()),
                    code.code(),
                ),
            )?;
            Err(err)
        }
    }
}
