use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use repackjar::{Backend, ConfigError, RepackConfig};

#[derive(Clone, Debug, Parser)]
#[command(name = "repackjar", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    /// Log each step (same as RUST_LOG=debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "r", name = "repack", about = "Store the jar and its nested jars uncompressed")]
    Repack(RepackArg),
    #[command(alias = "i", name = "inspect", about = "List archive entries with their compression")]
    Inspect(InspectArg),
}

#[derive(Clone, Debug, Args)]
pub struct RepackArg {
    /// TOML file with defaults for every option below
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    #[arg(short, long)]
    pub artifact_id: Option<String>,
    /// Appended to the artifact id before `.jar`
    #[arg(short, long, allow_hyphen_values = true)]
    pub suffix: Option<String>,
    /// Library directory inside the jar, e.g. /BOOT-INF/lib
    #[arg(short, long)]
    pub lib_path: Option<String>,
    #[arg(long = "include")]
    pub includes: Vec<String>,
    #[arg(short, long)]
    pub jobs: Option<usize>,
    #[arg(short, long)]
    pub backend: Option<Backend>,
    /// Path or name of the `jar` executable for the jar-cli backend
    #[arg(long)]
    pub jar_tool: Option<String>,
    /// Seconds each jar invocation may run, 0 for no limit
    #[arg(short, long)]
    pub timeout: Option<u64>,
    #[arg(long)]
    pub staging_dir: Option<String>,
}

impl RepackArg {
    /// File config first, then flags on top.
    pub fn into_config(self) -> Result<RepackConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => RepackConfig::load(path)?,
            None => RepackConfig::default(),
        };
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(id) = self.artifact_id {
            config.artifact_id = id;
        }
        if self.suffix.is_some() {
            config.jar_file_suffix = self.suffix;
        }
        if let Some(path) = self.lib_path {
            config.lib_relative_path = path;
        }
        if !self.includes.is_empty() {
            config.includes = self.includes;
        }
        if self.jobs.is_some() {
            config.jobs = self.jobs;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(tool) = self.jar_tool {
            config.jar_tool = tool;
        }
        if let Some(secs) = self.timeout {
            config.tool_timeout_secs = secs;
        }
        if let Some(name) = self.staging_dir {
            config.staging_dir_name = name;
        }
        Ok(config)
    }
}

#[derive(Clone, Debug, Args)]
pub struct InspectArg {
    pub archive: PathBuf,
}
