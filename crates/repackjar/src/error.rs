use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::pipeline::Stage;

#[derive(Debug, Error)]
pub enum RepackError {
    #[error("jar file {final_name} hasn't been built (expected at {})", .path.display())]
    MissingArtifact { final_name: String, path: PathBuf },

    #[error("dependency library directory {} doesn't exist", .path.display())]
    MissingLibraryDirectory { path: PathBuf },

    #[error(transparent)]
    Archive(#[from] repackjar_archive::Error),

    #[error(transparent)]
    Fs(#[from] repackjar_fs::Error),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("nested jar {} has a name that is not valid UTF-8", .path.display())]
    UnsupportedFileName { path: PathBuf },

    #[error(
        "repackaging nested dependency jars failed for {} of {total} archives: {}",
        .failed.len(),
        .failed.join(", ")
    )]
    AggregateDependencyFailure { failed: Vec<String>, total: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl RepackError {
    /// Failures that came from launching or running an external tool.
    pub fn is_subprocess_failure(&self) -> bool {
        matches!(self, RepackError::Archive(repackjar_archive::Error::Process(_)))
    }
}

impl From<repackjar_platform::Error> for RepackError {
    fn from(e: repackjar_platform::Error) -> Self {
        RepackError::Archive(e.into())
    }
}

/// Top-level failure of one run.
#[derive(Debug, Error)]
#[error("error repackaging jar file {final_name} during {stage}: {source}")]
pub struct PipelineError {
    pub final_name: String,
    pub stage: Stage,
    #[source]
    pub source: RepackError,
}
