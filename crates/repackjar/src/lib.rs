//! Post-build repackaging of an application jar so that the jar and every
//! nested dependency jar in its library directory store their entries
//! uncompressed.
//!
//! # Architecture
//!
//! - `config.rs` - Run configuration and derived names
//! - `pipeline.rs` - Stage sequence for one outer archive
//! - `dispatcher.rs` - Discovery and parallel fan-out over nested jars
//! - `repackager.rs` - The per-dependency step sequence
//! - `error.rs` - Failure taxonomy

pub use config::{Backend, ConfigError, RepackConfig, default_jobs};
pub use dispatcher::{DispatchReport, Dispatcher, discover};
pub use error::{PipelineError, RepackError};
pub use pipeline::{Pipeline, RepackSummary, Stage, build_tool};
pub use repackager::{DependencyArchive, DependencyError, DependencyRepackager, Step, TaskOutcome};

pub mod config;
pub mod dispatcher;
mod error;
pub mod pipeline;
pub mod repackager;
