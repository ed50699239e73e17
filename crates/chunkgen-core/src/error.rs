use std::fmt;
use std::io;
use std::path::PathBuf;

/// Boxed error returned by artifact generators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    DuplicateModule,
    MissingRepresentativeName,
    ConflictingRepresentativeNames,
    DuplicateTarget,
    CyclicChunkGraph,
    ReadOnlyTarget,
    BackupFailed,
    ArtifactWriteFailed,
    GeneratorFailed,
    Cancelled,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::MissingRepresentativeName => "E1002",
            Self::ConflictingRepresentativeNames => "E1003",
            Self::DuplicateTarget => "E1004",
            Self::DuplicateModule => "E2001",
            Self::ReadOnlyTarget => "E5001",
            Self::BackupFailed => "E5002",
            Self::ArtifactWriteFailed => "E5003",
            Self::GeneratorFailed => "E6001",
            Self::Cancelled => "E7001",
            Self::CyclicChunkGraph => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::DuplicateModule => "Duplicate module id",
            Self::MissingRepresentativeName => "Cyclic chunk has no representative name",
            Self::ConflictingRepresentativeNames => "Cyclic chunk has conflicting names",
            Self::DuplicateTarget => "Two artifacts share a target path",
            Self::CyclicChunkGraph => "Chunk graph contains a cycle",
            Self::ReadOnlyTarget => "Target file is read-only",
            Self::BackupFailed => "Backup of existing file failed",
            Self::ArtifactWriteFailed => "Artifact write failed",
            Self::GeneratorFailed => "Artifact generator failed",
            Self::Cancelled => "Generation cancelled",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in the project or config file and retry."),
            Self::DuplicateModule => Some("Give every module a unique id."),
            Self::MissingRepresentativeName => {
                Some("Add a representative name for one member of the cycle.")
            }
            Self::ConflictingRepresentativeNames => {
                Some("Keep a single representative name per cycle.")
            }
            Self::DuplicateTarget => {
                Some("Rename a module or cycle so artifact file names are unique.")
            }
            Self::CyclicChunkGraph => Some("This is a bug. Report it with the project file."),
            Self::ReadOnlyTarget => Some("Make the file writable or disable the writable check."),
            Self::BackupFailed | Self::ArtifactWriteFailed => {
                Some("Check disk space and write permissions.")
            }
            Self::GeneratorFailed => None,
            Self::Cancelled => Some("Re-run to finish the remaining artifacts."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised by the chunking and generation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Two modules were supplied with the same id.
    #[error("duplicate module id: {0}")]
    DuplicateModule(String),

    /// The collapsed chunk graph still contains a cycle.
    #[error("chunk graph is cyclic; unordered chunks: {}", .chunks.join(", "))]
    CyclicChunkGraph { chunks: Vec<String> },

    /// A multi-module chunk has no caller-supplied display name.
    #[error("no representative name for cycle [{}]", .members.join(", "))]
    MissingRepresentativeName { members: Vec<String> },

    /// Members of one chunk were given different display names.
    #[error("conflicting representative names for cycle [{}]: {}", .members.join(", "), .names.join(", "))]
    ConflictingRepresentativeNames {
        members: Vec<String>,
        names: Vec<String>,
    },

    /// Two descriptors resolve to the same file.
    #[error("artifacts '{first}' and '{second}' both target {}", .path.display())]
    DuplicateTarget {
        path: PathBuf,
        first: String,
        second: String,
    },

    /// The target exists and is not writable.
    #[error("target is read-only: {}", .path.display())]
    ReadOnlyTarget { path: PathBuf },

    /// Renaming an existing target out of the way failed.
    #[error("failed to back up {}: {source}", .path.display())]
    BackupFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The external content generator failed.
    #[error("generator failed for artifact '{artifact}': {source}")]
    Generator {
        artifact: String,
        #[source]
        source: BoxError,
    },

    /// Writing the generated content failed.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The caller asked the run to stop between descriptors.
    #[error("generation cancelled before artifact '{artifact}'")]
    Cancelled { artifact: String },
}

impl GenerationError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::DuplicateModule(_) => ErrorCode::DuplicateModule,
            Self::CyclicChunkGraph { .. } => ErrorCode::CyclicChunkGraph,
            Self::MissingRepresentativeName { .. } => ErrorCode::MissingRepresentativeName,
            Self::ConflictingRepresentativeNames { .. } => {
                ErrorCode::ConflictingRepresentativeNames
            }
            Self::DuplicateTarget { .. } => ErrorCode::DuplicateTarget,
            Self::ReadOnlyTarget { .. } => ErrorCode::ReadOnlyTarget,
            Self::BackupFailed { .. } => ErrorCode::BackupFailed,
            Self::Generator { .. } => ErrorCode::GeneratorFailed,
            Self::Io { .. } => ErrorCode::ArtifactWriteFailed,
            Self::Cancelled { .. } => ErrorCode::Cancelled,
        }
    }

    /// Optional remediation hint for operators and agents.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}
