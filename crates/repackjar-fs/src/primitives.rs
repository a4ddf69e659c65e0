use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Error, Result};

/// Create `dir` and its parents. Existing directories are left alone.
pub fn ensure(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).map_err(|e| Error::Create {
        path: dir.to_path_buf(),
        source: e,
    })
}

/// Create `dir`, failing with [`Error::AlreadyExists`] if anything is already there.
pub fn create_new_dir(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    match std::fs::create_dir(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(Error::AlreadyExists {
            path: dir.to_path_buf(),
        }),
        Err(e) => Err(Error::Create {
            path: dir.to_path_buf(),
            source: e,
        }),
    }
}

/// Delete `dir` and everything below it. A missing directory is not an error.
pub fn remove(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Remove {
            path: dir.to_path_buf(),
            source: e,
        }),
    }
}

/// Delete a single file.
pub fn remove_file(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::remove_file(path).map_err(|e| Error::Remove {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Copy `src` to `dest`, overwriting `dest`.
pub fn copy_file(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    let src = src.as_ref();
    let dest = dest.as_ref();
    std::fs::copy(src, dest).map(|_| ()).map_err(|e| Error::Copy {
        from: src.to_path_buf(),
        to: dest.to_path_buf(),
        source: e,
    })
}

/// Move `src` over `dest` so that `dest` is either the old or the new file, never partial.
///
/// A plain rename is tried first. When that fails (for example across
/// devices), `src` is copied into a hidden sibling of `dest` which is then
/// renamed into place, and `src` is removed.
pub fn replace_file(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    let src = src.as_ref();
    let dest = dest.as_ref();

    if std::fs::rename(src, dest).is_ok() {
        return Ok(());
    }

    let parent = dest.parent().unwrap_or(Path::new(""));
    let file_name = dest.file_name().unwrap_or_default().to_string_lossy();
    let tmp_path = parent.join(format!(".{file_name}.tmp"));

    copy_file(src, &tmp_path)?;
    if let Err(e) = std::fs::rename(&tmp_path, dest) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(Error::Replace {
            path: dest.to_path_buf(),
            source: e,
        });
    }
    let _ = std::fs::remove_file(src);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_is_idempotent() -> Result<()> {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        ensure(&nested)?;
        ensure(&nested)?;
        assert!(nested.is_dir());
        Ok(())
    }

    #[test]
    fn test_create_new_dir_rejects_existing() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("staging");
        create_new_dir(&target).unwrap();
        assert!(matches!(
            create_new_dir(&target),
            Err(Error::AlreadyExists { .. })
        ));
    }

    #[test]
    fn test_remove_missing_dir_is_ok() {
        let dir = tempdir().unwrap();
        assert!(remove(dir.path().join("absent")).is_ok());
    }

    #[test]
    fn test_remove_deletes_tree() -> Result<()> {
        let dir = tempdir().unwrap();
        let root = dir.path().join("root");
        ensure(root.join("x/y"))?;
        std::fs::write(root.join("x/y/file.txt"), "data").unwrap();
        remove(&root)?;
        assert!(!root.exists());
        Ok(())
    }

    #[test]
    fn test_replace_file_overwrites_destination() -> Result<()> {
        let dir = tempdir().unwrap();
        let src = dir.path().join("new.jar");
        let dest = dir.path().join("old.jar");
        std::fs::write(&src, "new").unwrap();
        std::fs::write(&dest, "old").unwrap();

        replace_file(&src, &dest)?;

        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "new");
        assert!(!src.exists());
        Ok(())
    }

    #[test]
    fn test_copy_file_missing_source() {
        let dir = tempdir().unwrap();
        let result = copy_file(dir.path().join("missing"), dir.path().join("dest"));
        assert!(matches!(result, Err(Error::Copy { .. })));
    }
}
