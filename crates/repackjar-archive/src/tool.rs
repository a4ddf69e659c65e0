use std::path::Path;

use crate::Result;

/// Pattern selecting every top-level entry of a directory.
pub const ALL_CONTENTS: &str = "*";

/// The two archive operations the repackaging pipeline needs.
pub trait ArchiveTool: Send + Sync {
    /// Unpack `archive_name`, located in `into`, into `into` itself.
    fn extract(&self, archive_name: &str, into: &Path) -> Result<()>;

    /// Create or overwrite `from/archive_name` from the top-level entries of
    /// `from` matching `contents_glob`. Every entry is stored, not deflated.
    ///
    /// File entries match the files under `from`. A directory entry is written
    /// for every directory in the tree, including ones an earlier archive only
    /// implied through its file names.
    fn create_uncompressed(&self, archive_name: &str, contents_glob: &str, from: &Path)
    -> Result<()>;

    fn name(&self) -> &'static str;
}
