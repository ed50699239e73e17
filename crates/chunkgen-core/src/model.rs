//! Module model supplied by the caller.
//!
//! A [`Module`] is one buildable unit. Its dependencies are listed in
//! declaration order and each edge carries an `exported` flag: an exported
//! dependency is visible to the dependents of the module that declares it.
//!
//! The CLI reads modules from a TOML project file:
//!
//! ```toml
//! [[module]]
//! id = "app"
//! base_dir = "app"
//! dependencies = ["util", { module = "core", exported = true }]
//!
//! [[module]]
//! id = "core"
//! toolchain = "jdk-17"
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Opaque, caller-chosen module identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(pub String);

impl ModuleId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ModuleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ModuleId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ModuleId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A single depends-on edge as declared by a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DependencySpec")]
pub struct Dependency {
    /// The module depended upon.
    pub module: ModuleId,
    /// Whether the dependency is re-exported to this module's dependents.
    pub exported: bool,
}

impl Dependency {
    #[must_use]
    pub fn new(module: impl Into<ModuleId>) -> Self {
        Self {
            module: module.into(),
            exported: false,
        }
    }

    #[must_use]
    pub fn exported(module: impl Into<ModuleId>) -> Self {
        Self {
            module: module.into(),
            exported: true,
        }
    }
}

/// On-disk shape of a dependency: either a bare id or a table.
#[derive(Deserialize)]
#[serde(untagged)]
enum DependencySpec {
    Id(ModuleId),
    Full {
        module: ModuleId,
        #[serde(default)]
        exported: bool,
    },
}

impl From<DependencySpec> for Dependency {
    fn from(spec: DependencySpec) -> Self {
        match spec {
            DependencySpec::Id(module) => Self {
                module,
                exported: false,
            },
            DependencySpec::Full { module, exported } => Self { module, exported },
        }
    }
}

/// One buildable unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    /// Display name; falls back to the id when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    /// Directory that owns the module's artifact when chunk directories are enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,
    /// Toolchain label; members of one cycle are expected to agree on it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toolchain: Option<String>,
}

impl Module {
    #[must_use]
    pub fn new(id: impl Into<ModuleId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            dependencies: Vec::new(),
            base_dir: None,
            toolchain: None,
        }
    }

    /// Builder-style helper adding a non-exported dependency.
    #[must_use]
    pub fn depends_on(mut self, module: impl Into<ModuleId>) -> Self {
        self.dependencies.push(Dependency::new(module));
        self
    }

    /// Builder-style helper adding an exported dependency.
    #[must_use]
    pub fn exports(mut self, module: impl Into<ModuleId>) -> Self {
        self.dependencies.push(Dependency::exported(module));
        self
    }

    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_toolchain(mut self, toolchain: impl Into<String>) -> Self {
        self.toolchain = Some(toolchain.into());
        self
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }
}
