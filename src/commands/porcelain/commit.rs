use crate::areas::refs::Head;
use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Commit, FileSet};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use chrono::{DateTime, FixedOffset};
use tracing::info;

/// Overrides the commit timestamp, as RFC 2822 or `%Y-%m-%d %H:%M:%S %z`
pub const COMMIT_DATE_ENV: &str = "MINIGIT_COMMIT_DATE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed {
    pub oid: ObjectId,
    pub head: Head,
    pub is_root: bool,
    pub summary: String,
}

impl std::fmt::Display for Committed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let head = match &self.head {
            Head::Branch(name) => name.to_string(),
            Head::Detached(_) => "detached HEAD".to_string(),
        };
        let root = if self.is_root { " (root-commit)" } else { "" };

        write!(f, "[{head}{root} {}] {}", self.oid.to_short_oid(), self.summary)
    }
}

impl Repository {
    /// Record the staged snapshot as a new commit on top of HEAD
    ///
    /// The snapshot is the parent's files with every index entry applied on
    /// top. Files carried over from the parent that are gone from the working
    /// tree are dropped. The index is cleared afterwards.
    pub fn commit(&self, message: &str) -> Result<Committed> {
        let mut index = self.index();
        index.rehydrate()?;

        if index.is_empty() {
            return Err(Error::NothingToCommit);
        }

        let parent = self.refs().resolve_head()?;
        let mut files = match &parent {
            Some(parent) => self.database().get_commit(parent)?.file_set(),
            None => FileSet::new(),
        };
        files.retain(|path, _| self.workspace().exists(path));
        files.extend(
            index
                .entries()
                .map(|(path, oid)| (path.clone(), oid.clone())),
        );

        let (oid, commit) = self.write_commit(parent.clone(), message.trim().to_string(), files)?;

        index.clear();
        index.write_updates()?;

        Ok(Committed {
            oid,
            head: self.refs().read_head()?,
            is_root: parent.is_none(),
            summary: commit.short_message().to_string(),
        })
    }

    /// Store a commit, register its edge and advance HEAD to it
    pub(crate) fn write_commit(
        &self,
        parent: Option<ObjectId>,
        message: String,
        files: FileSet,
    ) -> Result<(ObjectId, Commit)> {
        let commit = Commit::new(commit_timestamp(), message, parent.clone(), files);
        let oid = self.database().put_commit(&commit)?;

        self.graph().record_parent(oid.clone(), parent.into_iter().collect());
        self.refs().update_head(&oid)?;

        info!(%oid, files = commit.files().len(), "created commit");

        Ok((oid, commit))
    }
}

fn commit_timestamp() -> DateTime<FixedOffset> {
    std::env::var(COMMIT_DATE_ENV)
        .ok()
        .and_then(|date| {
            DateTime::parse_from_rfc2822(&date)
                .or_else(|_| DateTime::parse_from_str(&date, "%Y-%m-%d %H:%M:%S %z"))
                .ok()
        })
        .unwrap_or_else(|| chrono::Local::now().fixed_offset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::branch::branch_name::BranchName;
    use crate::commands::porcelain::tests::test_repository;
    use pretty_assertions::assert_eq;
    use std::path::{Path, PathBuf};

    #[test]
    fn empty_index_has_nothing_to_commit() {
        let test = test_repository();

        assert!(matches!(
            test.repository.commit("nothing"),
            Err(Error::NothingToCommit)
        ));
        assert_eq!(test.repository.refs().resolve_head().unwrap(), None);
    }

    #[test]
    fn first_commit_advances_the_branch_and_clears_the_index() {
        let test = test_repository();
        test.write("README", "hello");
        test.repository.add(&["README"]).unwrap();

        let committed = test.repository.commit("first").unwrap();

        assert!(committed.is_root);
        assert!(committed.to_string().starts_with("[main (root-commit) "));
        assert_eq!(
            test.repository.refs().resolve_head().unwrap(),
            Some(committed.oid.clone())
        );
        let mut index = test.repository.index();
        index.rehydrate().unwrap();
        assert!(index.is_empty());

        let commit = test.repository.database().get_commit(&committed.oid).unwrap();
        assert_eq!(commit.parent(), None);
        assert_eq!(commit.message(), "first");
        assert!(commit.file(Path::new("README")).is_some());
    }

    #[test]
    fn later_commits_carry_unstaged_files_forward() {
        let test = test_repository();
        let first = test.commit_files(&[("a.txt", "a"), ("b.txt", "b")], "first");

        let second = test.commit_files(&[("b.txt", "b2")], "second");

        let commit = test.repository.database().get_commit(&second).unwrap();
        assert_eq!(commit.parent(), Some(&first));
        assert_eq!(
            commit.file_set().keys().cloned().collect::<Vec<_>>(),
            vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]
        );
        assert_ne!(
            commit.file(Path::new("b.txt")),
            test.repository
                .database()
                .get_commit(&first)
                .unwrap()
                .file(Path::new("b.txt"))
        );
    }

    #[test]
    fn files_deleted_from_the_working_tree_leave_the_snapshot() {
        let test = test_repository();
        test.commit_files(&[("a.txt", "a"), ("b.txt", "b")], "first");
        test.remove("a.txt");

        let second = test.commit_files(&[("c.txt", "c")], "second");

        let commit = test.repository.database().get_commit(&second).unwrap();
        assert_eq!(
            commit.file_set().keys().cloned().collect::<Vec<_>>(),
            vec![PathBuf::from("b.txt"), PathBuf::from("c.txt")]
        );
    }

    #[test]
    fn detached_head_moves_without_touching_branches() {
        let test = test_repository();
        let first = test.commit_files(&[("a.txt", "a")], "first");
        test.repository.refs().set_head_detached(&first).unwrap();

        let second = test.commit_files(&[("a.txt", "a2")], "second");

        assert_eq!(test.repository.refs().read_head().unwrap(), Head::Detached(second));
        assert_eq!(
            test.repository
                .refs()
                .read_ref(&BranchName::try_parse("main").unwrap())
                .unwrap(),
            Some(first)
        );
    }
}
