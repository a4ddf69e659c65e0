mod error;
mod primitives;
mod workspace;

pub use error::{Error, Result};
pub use primitives::{copy_file, create_new_dir, ensure, remove, remove_file, replace_file};
pub use workspace::Workspace;
