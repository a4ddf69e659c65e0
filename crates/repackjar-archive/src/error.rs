use std::io;
use std::path::PathBuf;

use zip::result::ZipError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("archive {} is corrupted: {source}", .path.display())]
    Corrupted { path: PathBuf, source: ZipError },

    #[error("failed to write archive {}: {source}", .path.display())]
    Zip { path: PathBuf, source: ZipError },

    #[error("entry '{entry}' escapes the extraction directory")]
    UnsafeEntry { entry: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("invalid contents pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error(transparent)]
    Process(#[from] repackjar_platform::Error),

    #[error(transparent)]
    Fs(#[from] repackjar_fs::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
