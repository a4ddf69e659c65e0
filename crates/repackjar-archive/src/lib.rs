//! Jar extraction and store-only recompression.
//!
//! # Architecture
//!
//! - `tool.rs` - The `ArchiveTool` capability both backends implement
//! - `native.rs` - In-process backend built on the `zip` crate
//! - `jar_cli.rs` - Backend that drives the JDK `jar` executable
//! - `contents.rs` - Top-level content selection shared by both backends
//! - `inspect.rs` - Entry listing used for verification
//! - `timestamp.rs` - DOS timestamp conversion

pub use error::{Error, Result};
pub use inspect::{EntryInfo, inspect, read_entries};
pub use jar_cli::JarCliTool;
pub use native::NativeZipTool;
pub use tool::{ALL_CONTENTS, ArchiveTool};

pub mod contents;
mod error;
mod inspect;
mod jar_cli;
mod native;
mod timestamp;
mod tool;
