//! Error types for repository operations
//!
//! Every failure of the core is reported through [`Error`]. I/O failures are
//! wrapped into [`Error::Storage`] together with the action that failed and
//! the path it touched, so the message identifies both the operation and the
//! entity involved.

use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing objects, refs, the index or working-tree files failed.
    #[error("failed to {action} {}: {source}", path.display())]
    Storage {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A blob or commit is absent from the object store.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("branch '{0}' not found")]
    BranchNotFound(String),

    #[error("file '{}' not found in working tree", .0.display())]
    FileNotFound(PathBuf),

    /// A working-tree path that index and commit records cannot hold.
    #[error("cannot track '{}': {reason}", path.display())]
    UntrackablePath { path: PathBuf, reason: &'static str },

    #[error("nothing to commit, the index is empty")]
    NothingToCommit,

    #[error("branch '{0}' already exists")]
    AlreadyExists(String),

    /// Checkout, merge or diff argument names neither a branch nor a known commit.
    #[error("'{0}' is neither a branch nor a known commit")]
    InvalidTarget(String),

    #[error("corrupt record {id}: {reason}")]
    CorruptRecord { id: String, reason: String },

    #[error("no commits yet")]
    NoCommitsYet,

    #[error("not a minigit repository: {}", .0.display())]
    NotARepository(PathBuf),

    #[error("repository already initialized in {}", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("invalid branch name '{0}'")]
    InvalidBranchName(String),

    #[error("invalid object id '{0}'")]
    InvalidObjectId(String),

    #[error("no common ancestor between {ours} and {theirs}")]
    UnrelatedHistories { ours: String, theirs: String },
}

impl Error {
    pub fn storage(action: &'static str, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Storage {
            action,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn corrupt(id: impl ToString, reason: impl Into<String>) -> Self {
        Error::CorruptRecord {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Attach the failing action and path to an `io::Result`.
pub(crate) trait StorageContext<T> {
    fn storage(self, action: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> StorageContext<T> for std::io::Result<T> {
    fn storage(self, action: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|source| Error::storage(action, path, source))
    }
}
