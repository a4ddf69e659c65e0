//! Process execution for external archiving tools.
//!
//! - `command.rs` - Invocation builder
//! - `executor.rs` - `ProcessExecutor` seam and the OS-backed implementation

pub use command::{Command, Invocation};
pub use error::{Error, Result};
pub use executor::{ProcessExecutor, ProcessOutput, SystemExecutor, locate};

pub mod command;
mod error;
pub mod executor;
