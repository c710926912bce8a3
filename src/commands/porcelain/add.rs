use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Staged {
    pub files: Vec<(PathBuf, ObjectId)>,
}

impl std::fmt::Display for Staged {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lines = self
            .files
            .iter()
            .map(|(path, oid)| format!("add '{}' ({})", path.display(), oid.to_short_oid()))
            .collect::<Vec<_>>();

        write!(f, "{}", lines.join("\n"))
    }
}

impl Repository {
    /// Store the working-tree content of each path as a blob and stage it
    ///
    /// Directories are expanded to the files below them. Staging a path again
    /// replaces its previous entry. Nothing is staged if any path is missing.
    pub fn add(&self, paths: &[impl AsRef<Path>]) -> Result<Staged> {
        let mut index = self.index();
        index.rehydrate()?;

        let files = paths
            .iter()
            .map(|path| self.workspace().list_files(path.as_ref()))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();

        let mut staged = Vec::with_capacity(files.len());
        for path in files {
            let content = self.workspace().read_file(&path)?;
            let blob_id = self.database().put_blob(content)?;
            debug!(path = %path.display(), oid = %blob_id, "staged");

            index.add(path.clone(), blob_id.clone());
            staged.push((path, blob_id));
        }

        index.write_updates()?;

        Ok(Staged { files: staged })
    }
}
