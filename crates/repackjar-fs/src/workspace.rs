use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::Result;
use crate::primitives::{ensure, remove};

/// Scratch directory owned by a single repackaging run.
///
/// The directory is removed when the guard is dropped, so every exit path
/// (success, error or panic unwinding) attempts cleanup.
pub struct Workspace {
    path: PathBuf,
    removed: bool,
}

impl Workspace {
    /// Create the workspace at `path`, clearing anything left by an earlier run.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.exists() {
            debug!("clearing stale workspace {}", path.display());
            remove(&path)?;
        }
        ensure(&path)?;
        Ok(Self {
            path,
            removed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the workspace now and report the outcome.
    pub fn remove(mut self) -> Result<()> {
        self.removed = true;
        remove(&self.path)
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.removed {
            if let Err(e) = remove(&self.path) {
                warn!("failed to clean up workspace: {e}");
            }
        }
    }
}
