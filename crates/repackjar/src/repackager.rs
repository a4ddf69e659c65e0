use std::fmt;
use std::path::Path;

use filetime::FileTime;
use repackjar_archive::{ALL_CONTENTS, ArchiveTool};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::RepackError;

const JAR_EXTENSION: &str = ".jar";

/// A nested jar in the library directory and the scratch directory its task owns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencyArchive {
    pub file_name: String,
    /// Defaults to the file name without `.jar`, e.g. `guava-33.0` for
    /// `guava-33.0.jar`. Discovery renames it when that is already taken.
    pub staging_dir_name: String,
}

impl DependencyArchive {
    /// Returns `None` unless the name ends in `.jar`, in any letter case.
    pub fn new(file_name: impl Into<String>) -> Option<Self> {
        let file_name = file_name.into();
        let stem = jar_stem(&file_name)?;
        let staging_dir_name = if stem.is_empty() { "jar" } else { stem }.to_string();
        Some(Self {
            staging_dir_name,
            file_name,
        })
    }

    pub fn with_staging_dir(mut self, name: impl Into<String>) -> Self {
        self.staging_dir_name = name.into();
        self
    }
}

/// The name without its `.jar` suffix. `.jar` itself has an empty stem.
fn jar_stem(file_name: &str) -> Option<&str> {
    let split = file_name.len().checked_sub(JAR_EXTENSION.len())?;
    let suffix = file_name.get(split..)?;
    suffix
        .eq_ignore_ascii_case(JAR_EXTENSION)
        .then(|| &file_name[..split])
}

/// The steps of one dependency task, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Stage,
    Copy,
    Extract,
    DeleteOriginal,
    Recompress,
    Promote,
    Cleanup,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Stage => "create staging directory",
            Step::Copy => "copy into staging",
            Step::Extract => "extract",
            Step::DeleteOriginal => "delete staged copy",
            Step::Recompress => "recompress",
            Step::Promote => "replace original",
            Step::Cleanup => "remove staging directory",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
#[error("{step} failed: {source}")]
pub struct DependencyError {
    pub step: Step,
    #[source]
    pub source: RepackError,
}

/// Result of one dependency task. Failures are values, never panics.
#[derive(Debug)]
pub struct TaskOutcome {
    pub archive: DependencyArchive,
    pub error: Option<DependencyError>,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

fn at<T, E: Into<RepackError>>(step: Step, result: Result<T, E>) -> Result<T, DependencyError> {
    result.map_err(|e| DependencyError {
        step,
        source: e.into(),
    })
}

/// Rewrites nested jars of one library directory in place.
pub struct DependencyRepackager<'a> {
    tool: &'a dyn ArchiveTool,
    lib_dir: &'a Path,
}

impl<'a> DependencyRepackager<'a> {
    pub fn new(tool: &'a dyn ArchiveTool, lib_dir: &'a Path) -> Self {
        Self { tool, lib_dir }
    }

    pub fn repack(&self, archive: &DependencyArchive) -> TaskOutcome {
        let error = match self.try_repack(archive) {
            Ok(()) => {
                info!("repacked dependency {}", archive.file_name);
                None
            }
            Err(e) => {
                warn!("failed to repack dependency {}: {e}", archive.file_name);
                if e.step != Step::Stage {
                    let staging = self.lib_dir.join(&archive.staging_dir_name);
                    if let Err(cleanup) = repackjar_fs::remove(&staging) {
                        warn!("{cleanup}");
                    }
                }
                Some(e)
            }
        };
        TaskOutcome {
            archive: archive.clone(),
            error,
        }
    }

    fn try_repack(&self, archive: &DependencyArchive) -> Result<(), DependencyError> {
        let staging = self.lib_dir.join(&archive.staging_dir_name);
        let original = self.lib_dir.join(&archive.file_name);
        let staged = staging.join(&archive.file_name);
        let name = archive.file_name.as_str();

        let original_mtime = std::fs::metadata(&original)
            .ok()
            .map(|m| FileTime::from_last_modification_time(&m));

        debug!("{name}: staging in {}", staging.display());
        at(Step::Stage, repackjar_fs::create_new_dir(&staging))?;

        debug!("{name}: copying into staging");
        at(Step::Copy, repackjar_fs::copy_file(&original, &staged))?;

        debug!("{name}: extracting with {}", self.tool.name());
        at(Step::Extract, self.tool.extract(name, &staging))?;

        debug!("{name}: deleting staged copy");
        at(Step::DeleteOriginal, repackjar_fs::remove_file(&staged))?;

        debug!("{name}: recompressing without compression");
        at(
            Step::Recompress,
            self.tool.create_uncompressed(name, ALL_CONTENTS, &staging),
        )?;

        debug!("{name}: replacing original");
        at(Step::Promote, repackjar_fs::replace_file(&staged, &original))?;
        if let Some(mtime) = original_mtime {
            if let Err(e) = filetime::set_file_mtime(&original, mtime) {
                debug!("{name}: could not restore modification time: {e}");
            }
        }

        debug!("{name}: removing staging directory");
        at(Step::Cleanup, repackjar_fs::remove(&staging))?;
        Ok(())
    }
}
