use crate::areas::repository::Repository;
use crate::artifacts::branch::target::Target;
use crate::artifacts::objects::commit::FileSet;
use crate::errors::Result;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedOut {
    pub target: Target,
    pub written: usize,
    pub removed: usize,
}

impl std::fmt::Display for CheckedOut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.target {
            Target::Branch { name, .. } => write!(f, "Switched to branch '{name}'"),
            Target::Commit(oid) => write!(f, "HEAD is now at {}", oid.to_short_oid()),
        }
    }
}

/// Counts of working-tree files touched while switching file sets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Reconciled {
    pub written: usize,
    pub removed: usize,
}

impl Repository {
    /// Switch HEAD to a branch or commit and make the working tree match it
    ///
    /// A branch moves HEAD symbolically, a commit id detaches it. The index is
    /// left as it is.
    pub fn checkout(&self, name: &str) -> Result<CheckedOut> {
        let target = Target::resolve(name, self.refs(), self.database())?;

        // must be read before HEAD moves
        let previous_files = self.head_file_set()?;
        let target_files = match target.oid() {
            Some(oid) => self.database().get_commit(oid)?.file_set(),
            None => FileSet::new(),
        };

        match &target {
            Target::Branch { name, .. } => self.refs().set_head_branch(name)?,
            Target::Commit(oid) => self.refs().set_head_detached(oid)?,
        }

        let reconciled = self.reconcile_workspace(&previous_files, &target_files)?;
        info!(%target, written = reconciled.written, removed = reconciled.removed, "checked out");

        Ok(CheckedOut {
            target,
            written: reconciled.written,
            removed: reconciled.removed,
        })
    }

    /// Files of the commit HEAD resolves to, empty before the first commit
    pub(crate) fn head_file_set(&self) -> Result<FileSet> {
        match self.refs().resolve_head()? {
            Some(oid) => Ok(self.database().get_commit(&oid)?.file_set()),
            None => Ok(FileSet::new()),
        }
    }

    /// Write every file of `files` and delete the paths of `previous` it lacks
    pub(crate) fn reconcile_workspace(
        &self,
        previous: &FileSet,
        files: &FileSet,
    ) -> Result<Reconciled> {
        let mut reconciled = Reconciled::default();

        for (path, oid) in files {
            let blob = self.database().get_blob(oid)?;
            self.workspace().write_file(path, blob.content())?;
            reconciled.written += 1;
        }

        for path in previous.keys().filter(|path| !files.contains_key(*path)) {
            debug!(path = %path.display(), "removing file absent from target");
            self.workspace().remove_file(path)?;
            reconciled.removed += 1;
        }

        Ok(reconciled)
    }
}
