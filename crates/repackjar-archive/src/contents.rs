//! Selection of the top-level entries that go into a new archive.

use std::path::Path;

use crate::error::{Error, Result};

/// Names of the entries directly under `dir` that match `pattern`, sorted.
///
/// `exclude` is skipped so that an archive never contains itself.
pub fn select(dir: &Path, pattern: &str, exclude: &str) -> Result<Vec<String>> {
    let pattern = glob::Pattern::new(pattern).map_err(|source| Error::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(Error::io(dir))? {
        let entry = entry.map_err(Error::io(dir))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name != exclude && pattern.matches(&name) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}
