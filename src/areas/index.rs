//! Staging index
//!
//! The index maps working-tree relative paths to the blob staged for them.
//! It holds the changes that go into the next commit and is cleared once that
//! commit succeeds.
//!
//! ## Index File Format
//!
//! One `<path> <blob-id>` line per entry, in insertion order. Paths may
//! contain spaces; the blob id is split off at the last space.

use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result, StorageContext};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::debug;

const INDEX_RECORD_ID: &str = "index";

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.minigit/index`)
    path: Box<Path>,
    /// Staged blobs keyed by path, in insertion order
    entries: IndexMap<PathBuf, ObjectId>,
    /// Flag indicating if the index has been modified since loading
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: IndexMap::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the index from disk, replacing the in-memory entries
    ///
    /// A missing or empty index file yields an empty index.
    pub fn rehydrate(&mut self) -> Result<()> {
        self.entries.clear();
        self.changed = false;

        if !self.path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(&self.path).storage("read index", &self.path)?;
        for line in content.lines().filter(|line| !line.trim().is_empty()) {
            let (path, oid) = line.rsplit_once(' ').ok_or_else(|| {
                Error::corrupt(INDEX_RECORD_ID, format!("malformed entry '{line}'"))
            })?;
            let oid = ObjectId::try_parse(oid).map_err(|_| {
                Error::corrupt(INDEX_RECORD_ID, format!("invalid blob id in '{line}'"))
            })?;

            self.entries.insert(PathBuf::from(path), oid);
        }

        Ok(())
    }

    /// Stage `oid` for `path`, replacing any prior entry for the same path
    pub fn add(&mut self, path: PathBuf, oid: ObjectId) {
        self.entries.insert(path, oid);
        self.changed = true;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.changed = true;
    }

    pub fn entry_by_path(&self, path: &Path) -> Option<&ObjectId> {
        self.entries.get(path)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&PathBuf, &ObjectId)> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Persist the index if it changed since it was loaded
    pub fn write_updates(&mut self) -> Result<()> {
        if !self.changed {
            return Ok(());
        }

        let content = self
            .entries
            .iter()
            .map(|(path, oid)| format!("{} {}\n", path.display(), oid))
            .collect::<String>();

        let temp_path = self.path.with_extension("tmp");
        std::fs::write(&temp_path, content).storage("write index", &temp_path)?;
        std::fs::rename(&temp_path, &self.path).storage("replace index", &self.path)?;

        debug!(entries = self.entries.len(), "index persisted");
        self.changed = false;

        Ok(())
    }
}
