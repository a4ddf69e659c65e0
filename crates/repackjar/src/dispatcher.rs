use std::collections::HashSet;
use std::path::Path;

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use repackjar_archive::ArchiveTool;
use tracing::{debug, info};

use crate::error::RepackError;
use crate::repackager::{DependencyArchive, DependencyRepackager, TaskOutcome};

/// List the nested jars directly inside `lib_dir`, sorted by file name.
///
/// Every archive gets a staging directory name that no other archive and no
/// existing entry of `lib_dir` uses, compared without regard to letter case.
pub fn discover(lib_dir: &Path) -> Result<Vec<DependencyArchive>, RepackError> {
    let read_err = |source| RepackError::Read {
        path: lib_dir.to_path_buf(),
        source,
    };

    let mut taken = HashSet::new();
    let mut archives = Vec::new();
    for entry in std::fs::read_dir(lib_dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let file_name = entry.file_name();
        taken.insert(file_name.to_string_lossy().to_lowercase());

        if !entry.file_type().map_err(read_err)?.is_file() {
            continue;
        }
        let Some(name) = file_name.to_str() else {
            if file_name.to_string_lossy().to_ascii_lowercase().ends_with(".jar") {
                return Err(RepackError::UnsupportedFileName { path: entry.path() });
            }
            continue;
        };
        archives.extend(DependencyArchive::new(name));
    }

    archives.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    let archives = archives
        .into_iter()
        .map(|archive| {
            let staging = reserve(&archive.staging_dir_name, &mut taken);
            if staging != archive.staging_dir_name {
                debug!("{}: staging in {staging}", archive.file_name);
            }
            archive.with_staging_dir(staging)
        })
        .collect();
    Ok(archives)
}

/// First of `stem`, `stem~2`, `stem~3`, ... not yet in `taken`, which it joins.
fn reserve(stem: &str, taken: &mut HashSet<String>) -> String {
    let mut candidate = stem.to_string();
    let mut attempt = 1;
    while !taken.insert(candidate.to_lowercase()) {
        attempt += 1;
        candidate = format!("{stem}~{attempt}");
    }
    candidate
}

/// Outcomes of every task, in discovery order.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub outcomes: Vec<TaskOutcome>,
}

impl DispatchReport {
    pub fn failed(&self) -> Vec<&TaskOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success()).collect()
    }

    /// Number of repacked archives, or an error naming every failed one.
    pub fn into_verdict(self) -> Result<usize, RepackError> {
        let failed: Vec<String> = self
            .failed()
            .into_iter()
            .map(|o| o.archive.file_name.clone())
            .collect();
        if failed.is_empty() {
            Ok(self.outcomes.len())
        } else {
            Err(RepackError::AggregateDependencyFailure {
                failed,
                total: self.outcomes.len(),
            })
        }
    }
}

/// Runs one task per nested jar on a dedicated worker pool.
pub struct Dispatcher<'a> {
    tool: &'a dyn ArchiveTool,
    jobs: usize,
}

impl<'a> Dispatcher<'a> {
    pub fn new(tool: &'a dyn ArchiveTool, jobs: usize) -> Self {
        Self {
            tool,
            jobs: jobs.max(1),
        }
    }

    /// Run every task to completion. Returns once all of them have finished,
    /// whether or not some failed.
    pub fn run(
        &self,
        lib_dir: &Path,
        archives: &[DependencyArchive],
    ) -> Result<DispatchReport, RepackError> {
        if archives.is_empty() {
            info!("no nested jars in {}", lib_dir.display());
            return Ok(DispatchReport::default());
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .thread_name(|index| format!("repackjar-worker-{index}"))
            .build()?;
        info!(
            "repacking {} nested jars with {} workers",
            archives.len(),
            self.jobs
        );

        let repackager = DependencyRepackager::new(self.tool, lib_dir);
        let outcomes: Vec<TaskOutcome> = pool.install(|| {
            archives
                .par_iter()
                .map(|archive| repackager.repack(archive))
                .collect()
        });
        Ok(DispatchReport { outcomes })
    }
}
