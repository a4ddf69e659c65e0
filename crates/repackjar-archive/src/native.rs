use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use filetime::FileTime;
use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::contents;
use crate::error::{Error, Result};
use crate::timestamp;
use crate::tool::ArchiveTool;

const MANIFEST_DIR: &str = "META-INF/";
const MANIFEST: &str = "META-INF/MANIFEST.MF";

/// In-process backend built on the `zip` crate. Needs no JDK.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeZipTool;

impl NativeZipTool {
    pub fn new() -> Self {
        Self
    }
}

impl ArchiveTool for NativeZipTool {
    fn extract(&self, archive_name: &str, into: &Path) -> Result<()> {
        let archive_path = into.join(archive_name);
        let file = File::open(&archive_path).map_err(Error::io(&archive_path))?;
        let mut archive =
            ZipArchive::new(BufReader::new(file)).map_err(|source| Error::Corrupted {
                path: archive_path.clone(),
                source,
            })?;

        let mut directories = DirectoryTimes::new();
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).map_err(|source| Error::Corrupted {
                path: archive_path.clone(),
                source,
            })?;
            let relative = entry.enclosed_name().ok_or_else(|| Error::UnsafeEntry {
                entry: entry.name().to_string(),
            })?;
            let target = into.join(relative);
            let modified = entry
                .last_modified()
                .and_then(|dt| timestamp::to_unix_seconds(&dt))
                .map(|seconds| FileTime::from_unix_time(seconds, 0));

            if entry.is_dir() {
                repackjar_fs::ensure(&target)?;
                directories.push((target, modified));
                continue;
            }

            ensure_parents(&target, into, modified, &mut directories)?;
            let mut out = File::create(&target).map_err(Error::io(&target))?;
            io::copy(&mut entry, &mut out).map_err(Error::io(&target))?;
            drop(out);

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode() {
                    std::fs::set_permissions(&target, PermissionsExt::from_mode(mode & 0o7777))
                        .map_err(Error::io(&target))?;
                }
            }
            if let Some(modified) = modified {
                filetime::set_file_mtime(&target, modified).map_err(Error::io(&target))?;
            }
        }

        // Writing children touches a directory's mtime, so restore parents last.
        directories.sort_by_key(|(dir, _)| std::cmp::Reverse(dir.components().count()));
        for (dir, modified) in directories {
            if let Some(modified) = modified {
                filetime::set_file_mtime(&dir, modified).map_err(Error::io(&dir))?;
            }
        }

        debug!("extracted {} entries from {}", archive.len(), archive_path.display());
        Ok(())
    }

    fn create_uncompressed(
        &self,
        archive_name: &str,
        contents_glob: &str,
        from: &Path,
    ) -> Result<()> {
        let archive_path = from.join(archive_name);
        let roots = contents::select(from, contents_glob, archive_name)?;
        let entries = manifest_first(collect_entries(from, &roots)?);

        let file = File::create(&archive_path).map_err(Error::io(&archive_path))?;
        let mut writer = ZipWriter::new(BufWriter::new(file));
        let zip_err = |source| Error::Zip {
            path: archive_path.clone(),
            source,
        };

        for entry in &entries {
            let options = stored_options(&entry.path)?;
            if entry.is_dir {
                writer.add_directory(entry.name.clone(), options).map_err(zip_err)?;
            } else {
                writer.start_file(entry.name.clone(), options).map_err(zip_err)?;
                let mut input = File::open(&entry.path).map_err(Error::io(&entry.path))?;
                io::copy(&mut input, &mut writer).map_err(Error::io(&archive_path))?;
            }
        }

        writer
            .finish()
            .map_err(zip_err)?
            .flush()
            .map_err(Error::io(&archive_path))?;

        debug!("stored {} entries into {}", entries.len(), archive_path.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "native"
    }
}

type DirectoryTimes = Vec<(PathBuf, Option<FileTime>)>;

/// Create the missing parents of `target`, recording them so that implicit
/// directories get a timestamp derived from the archive instead of the clock.
fn ensure_parents(
    target: &Path,
    root: &Path,
    modified: Option<FileTime>,
    directories: &mut DirectoryTimes,
) -> Result<()> {
    let Some(parent) = target.parent() else {
        return Ok(());
    };
    let mut cursor = parent;
    while cursor != root && !cursor.exists() {
        directories.push((cursor.to_path_buf(), modified));
        match cursor.parent() {
            Some(next) => cursor = next,
            None => break,
        }
    }
    repackjar_fs::ensure(parent)?;
    Ok(())
}

struct PendingEntry {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

fn collect_entries(base: &Path, roots: &[String]) -> Result<Vec<PendingEntry>> {
    let mut entries = Vec::new();
    for root in roots {
        let walker = WalkDir::new(base.join(root))
            .follow_links(true)
            .sort_by_file_name();
        for item in walker {
            let item = item.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| base.join(root));
                Error::Io {
                    path,
                    source: e.into(),
                }
            })?;
            let relative = item.path().strip_prefix(base).unwrap_or(item.path());
            let is_dir = item.file_type().is_dir();
            entries.push(PendingEntry {
                name: entry_name(relative, is_dir),
                path: item.path().to_path_buf(),
                is_dir,
            });
        }
    }
    Ok(entries)
}

/// Zip entry name for a relative path: `/` separated, directories end in `/`.
fn entry_name(relative: &Path, is_dir: bool) -> String {
    let mut name = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    if is_dir {
        name.push('/');
    }
    name
}

/// Jar readers look for the manifest in the first entries.
fn manifest_first(mut entries: Vec<PendingEntry>) -> Vec<PendingEntry> {
    let mut ordered = Vec::with_capacity(entries.len());
    for wanted in [MANIFEST_DIR, MANIFEST] {
        if let Some(pos) = entries.iter().position(|e| e.name == wanted) {
            ordered.push(entries.remove(pos));
        }
    }
    ordered.extend(entries);
    ordered
}

fn stored_options(path: &Path) -> Result<SimpleFileOptions> {
    let metadata = std::fs::metadata(path).map_err(Error::io(path))?;
    let modified = FileTime::from_last_modification_time(&metadata);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .last_modified_time(timestamp::from_unix_seconds(modified.unix_seconds()))
        .large_file(metadata.len() >= u64::from(u32::MAX));

    #[cfg(unix)]
    let options = {
        use std::os::unix::fs::PermissionsExt;
        options.unix_permissions(metadata.permissions().mode() & 0o7777)
    };

    Ok(options)
}
