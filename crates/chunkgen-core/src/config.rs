use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::model::{Module, ModuleId};

/// Knobs for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Emit one combined artifact instead of one per chunk.
    #[serde(default)]
    pub single_artifact: bool,
    /// Rename pre-existing targets out of the way before writing.
    #[serde(default)]
    pub backup_existing: bool,
    /// Display names for cyclic chunks, keyed by member module id.
    #[serde(default)]
    pub representative_names: BTreeMap<ModuleId, String>,
    /// Configuration layer that set each representative name. Within one
    /// chunk only names from the highest layer count.
    #[serde(skip)]
    pub name_layers: BTreeMap<ModuleId, u32>,
    #[serde(default = "default_true")]
    pub force_writable_check: bool,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_project_name")]
    pub project_name: String,
    #[serde(default)]
    pub file_prefix: String,
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Place chunk artifacts in the first member's `base_dir`.
    #[serde(default)]
    pub chunk_dirs: bool,
    /// Append a project-level artifact depending on every chunk artifact.
    #[serde(default)]
    pub aggregate_artifact: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            single_artifact: false,
            backup_existing: false,
            representative_names: BTreeMap::new(),
            name_layers: BTreeMap::new(),
            force_writable_check: default_true(),
            output_dir: default_output_dir(),
            project_name: default_project_name(),
            file_prefix: String::new(),
            extension: default_extension(),
            chunk_dirs: false,
            aggregate_artifact: false,
        }
    }
}

impl GenerationOptions {
    /// Register `name` as the representative name of the cycle containing `member`.
    ///
    /// The name joins the most recently applied layer.
    #[must_use]
    pub fn with_representative_name(
        mut self,
        member: impl Into<ModuleId>,
        name: impl Into<String>,
    ) -> Self {
        let member = member.into();
        let rank = self.top_name_layer();
        if rank > 0 {
            self.name_layers.insert(member.clone(), rank);
        }
        self.representative_names.insert(member, name.into());
        self
    }

    /// Layer rank of the name registered for `member`; 0 when it was set
    /// directly rather than through [`apply`](Self::apply).
    #[must_use]
    pub fn name_layer(&self, member: &ModuleId) -> u32 {
        self.name_layers.get(member).copied().unwrap_or(0)
    }

    fn top_name_layer(&self) -> u32 {
        self.name_layers.values().copied().max().unwrap_or(0)
    }

    /// Overlay every field that `layer` sets.
    ///
    /// Representative names merge key by key and remember the layer that
    /// set them, so a later layer naming any member of a cycle renames the
    /// whole cycle.
    pub fn apply(&mut self, layer: OptionsLayer) {
        if let Some(value) = layer.single_artifact {
            self.single_artifact = value;
        }
        if let Some(value) = layer.backup_existing {
            self.backup_existing = value;
        }
        if let Some(value) = layer.force_writable_check {
            self.force_writable_check = value;
        }
        if let Some(value) = layer.output_dir {
            self.output_dir = value;
        }
        if let Some(value) = layer.project_name {
            self.project_name = value;
        }
        if let Some(value) = layer.file_prefix {
            self.file_prefix = value;
        }
        if let Some(value) = layer.extension {
            self.extension = value;
        }
        if let Some(value) = layer.chunk_dirs {
            self.chunk_dirs = value;
        }
        if let Some(value) = layer.aggregate_artifact {
            self.aggregate_artifact = value;
        }
        if !layer.representative_names.is_empty() {
            let rank = self.top_name_layer() + 1;
            for (member, name) in layer.representative_names {
                self.name_layers.insert(member.clone(), rank);
                self.representative_names.insert(member, name);
            }
        }
    }
}

/// A partial set of options as found in one configuration source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_artifact: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_existing: Option<bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub representative_names: BTreeMap<ModuleId, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_writable_check: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_dirs: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_artifact: Option<bool>,
}

/// The project file: modules plus project-wide options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectFile {
    #[serde(default)]
    pub options: OptionsLayer,
    #[serde(default)]
    pub module: Vec<Module>,
}

/// Project-local overrides in `.chunkgen/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub options: OptionsLayer,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub options: OptionsLayer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    /// Directory containing the project file.
    pub root: PathBuf,
    pub modules: Vec<Module>,
    pub options: GenerationOptions,
    /// Output mode preferred in the user config, if any.
    pub user_output: Option<String>,
}

pub fn load_project_file(path: &Path) -> Result<ProjectFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectFile>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(".chunkgen/config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("chunkgen/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Resolve modules and options for the project file at `project_file`.
///
/// Layers, lowest first: defaults, user config, the project file's
/// `[options]`, `.chunkgen/config.toml` next to the project file, then
/// `overrides` from the command line.
pub fn resolve_config(project_file: &Path, overrides: OptionsLayer) -> Result<EffectiveConfig> {
    let user = load_user_config()?;
    resolve_with_user(project_file, user, overrides)
}

fn resolve_with_user(
    project_file: &Path,
    user: UserConfig,
    overrides: OptionsLayer,
) -> Result<EffectiveConfig> {
    let project = load_project_file(project_file)?;
    let root = project_file
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let local = load_project_config(&root)?;

    let mut options = GenerationOptions::default();
    options.apply(user.options);
    options.apply(project.options);
    options.apply(local.options);
    options.apply(overrides);

    Ok(EffectiveConfig {
        root,
        modules: project.module,
        options,
        user_output: user.output,
    })
}

const fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_project_name() -> String {
    "build".to_string()
}

fn default_extension() -> String {
    "xml".to_string()
}
