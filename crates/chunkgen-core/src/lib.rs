//! chunkgen-core library.
//!
//! Collapses module dependency cycles into chunks, orders the chunks so that
//! dependencies come first, plans one artifact per chunk (or one for the
//! whole project) and writes them through a caller-supplied generator.
//!
//! # Conventions
//!
//! - **Errors**: library stages return [`error::GenerationError`];
//!   configuration loading uses `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`).

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod generate;
pub mod graph;
pub mod model;
pub mod plan;
pub mod write;

pub use config::GenerationOptions;
pub use error::{BoxError, ErrorCode, GenerationError};
pub use generate::{Analysis, Generation, Prepared, generate, prepare};
pub use model::{Dependency, Module, ModuleId};
pub use plan::{ArtifactDescriptor, ArtifactKind, ArtifactRef, Plan};
pub use write::{ArtifactGenerator, ArtifactWriter, FileSystem, GenerationResult, LocalFileSystem};
