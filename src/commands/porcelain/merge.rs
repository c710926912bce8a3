use crate::areas::repository::Repository;
use crate::artifacts::branch::target::Target;
use crate::artifacts::merge::conflict::render_conflict;
use crate::artifacts::merge::resolution::{MergeResolution, PathResolution};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use bytes::Bytes;
use colored::Colorize;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The target is already part of HEAD's history
    UpToDate,
    /// HEAD moved forward to the target, no commit created
    FastForward { from: ObjectId, to: ObjectId },
    /// Both sides merged without conflicts into a new commit
    Merged { base: ObjectId, oid: ObjectId },
    /// Conflict markers were written, nothing was committed
    Conflicted {
        base: ObjectId,
        conflicts: Vec<PathBuf>,
    },
}

impl MergeOutcome {
    pub fn conflicts(&self) -> &[PathBuf] {
        match self {
            MergeOutcome::Conflicted { conflicts, .. } => conflicts,
            _ => &[],
        }
    }
}

impl std::fmt::Display for MergeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeOutcome::UpToDate => write!(f, "Already up to date."),
            MergeOutcome::FastForward { from, to } => write!(
                f,
                "Updating {}..{}\nFast-forward",
                from.to_short_oid(),
                to.to_short_oid()
            ),
            MergeOutcome::Merged { oid, .. } => {
                write!(f, "Merge made by the three-way strategy: {}", oid.to_short_oid())
            }
            MergeOutcome::Conflicted { conflicts, .. } => {
                for path in conflicts {
                    writeln!(
                        f,
                        "{} Merge conflict in {}",
                        "CONFLICT (content):".red(),
                        path.display()
                    )?;
                }
                write!(
                    f,
                    "Automatic merge failed; fix conflicts and then commit the result."
                )
            }
        }
    }
}

impl Repository {
    /// Merge a branch or commit into HEAD
    ///
    /// Fast-forwards when HEAD is an ancestor of the target. Otherwise every
    /// path is resolved three ways against the merge base and the result is
    /// written to the working tree. A clean result is committed on top of
    /// HEAD; conflicts are left in the working tree for the user to resolve
    /// and commit.
    pub fn merge(&self, name: &str) -> Result<MergeOutcome> {
        let ours = self.refs().resolve_head()?.ok_or(Error::NoCommitsYet)?;
        let target = Target::resolve(name, self.refs(), self.database())?;
        let theirs = target.oid().cloned().ok_or_else(|| Error::NotFound {
            kind: "commit",
            id: target.to_string(),
        })?;

        if self.graph().is_ancestor(&theirs, &ours)? {
            return Ok(MergeOutcome::UpToDate);
        }
        if self.graph().is_ancestor(&ours, &theirs)? {
            return self.fast_forward(ours, theirs);
        }

        let base = self
            .graph()
            .merge_base(&ours, &theirs)?
            .ok_or_else(|| Error::UnrelatedHistories {
                ours: ours.to_short_oid(),
                theirs: theirs.to_short_oid(),
            })?;
        debug!(%ours, %theirs, %base, "merge base found");

        let ours_files = self.database().get_commit(&ours)?.file_set();
        let theirs_files = self.database().get_commit(&theirs)?.file_set();
        let base_files = self.database().get_commit(&base)?.file_set();

        let resolution = MergeResolution::resolve(&base_files, &ours_files, &theirs_files);
        self.write_resolution(&resolution)?;

        if resolution.is_clean() {
            let message = format!("Merge {} into {}", target, self.refs().read_head()?);
            let (oid, _) = self.write_commit(Some(ours), message, resolution.merged_files())?;
            info!(%oid, %base, "merged cleanly");

            return Ok(MergeOutcome::Merged { base, oid });
        }

        // stage what merged cleanly, conflicts stay unstaged
        let mut index = self.index();
        index.rehydrate()?;
        for (path, oid) in resolution.merged_files() {
            if ours_files.get(&path) != Some(&oid) {
                index.add(path, oid);
            }
        }
        index.write_updates()?;

        let conflicts = resolution.conflicts().cloned().collect::<Vec<_>>();
        info!(%base, conflicts = conflicts.len(), "merge stopped on conflicts");

        Ok(MergeOutcome::Conflicted { base, conflicts })
    }

    fn fast_forward(&self, ours: ObjectId, theirs: ObjectId) -> Result<MergeOutcome> {
        let previous_files = self.database().get_commit(&ours)?.file_set();
        let target_files = self.database().get_commit(&theirs)?.file_set();

        self.reconcile_workspace(&previous_files, &target_files)?;
        self.refs().update_head(&theirs)?;
        info!(from = %ours, to = %theirs, "fast-forwarded");

        Ok(MergeOutcome::FastForward {
            from: ours,
            to: theirs,
        })
    }

    fn write_resolution(&self, resolution: &MergeResolution) -> Result<()> {
        for (path, path_resolution) in resolution.iter() {
            match path_resolution {
                PathResolution::Resolved(Some(oid)) => {
                    let blob = self.database().get_blob(oid)?;
                    self.workspace().write_file(path, blob.content())?;
                }
                PathResolution::Resolved(None) => {
                    self.workspace().remove_file(path)?;
                }
                PathResolution::Conflict { ours, theirs } => {
                    let ours = self.blob_content(ours.as_ref())?;
                    let theirs = self.blob_content(theirs.as_ref())?;
                    self.workspace()
                        .write_file(path, &render_conflict(&ours, &theirs))?;
                }
            }
        }

        Ok(())
    }

    fn blob_content(&self, oid: Option<&ObjectId>) -> Result<Bytes> {
        match oid {
            Some(oid) => Ok(self.database().get_blob(oid)?.into_content()),
            None => Ok(Bytes::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::branch::branch_name::BranchName;
    use crate::commands::porcelain::tests::{TestRepository, test_repository};
    use pretty_assertions::assert_eq;
    use std::path::Path;

    /// main and feature both start from a commit holding `files`
    fn forked(files: &[(&str, &str)]) -> (TestRepository, ObjectId) {
        let test = test_repository();
        let base = test.commit_files(files, "base");
        test.repository.branch("feature", None).unwrap();

        (test, base)
    }

    #[test]
    fn fast_forwards_to_a_descendant() {
        let (test, base) = forked(&[("README", "hello")]);
        test.repository.checkout("feature").unwrap();
        let tip = test.commit_files(&[("README", "hello v2")], "v2");
        test.repository.checkout("main").unwrap();
        assert_eq!(test.read("README"), "hello");

        let outcome = test.repository.merge("feature").unwrap();

        assert_eq!(
            outcome,
            MergeOutcome::FastForward {
                from: base,
                to: tip.clone()
            }
        );
        assert_eq!(test.read("README"), "hello v2");
        assert_eq!(test.repository.refs().resolve_head().unwrap(), Some(tip));
        assert!(outcome.conflicts().is_empty());
    }

    #[test]
    fn ancestor_target_is_up_to_date() {
        let (test, _) = forked(&[("README", "hello")]);
        let tip = test.commit_files(&[("README", "hello v2")], "v2");

        assert_eq!(test.repository.merge("feature").unwrap(), MergeOutcome::UpToDate);
        assert_eq!(test.repository.merge("main").unwrap(), MergeOutcome::UpToDate);
        assert_eq!(test.repository.refs().resolve_head().unwrap(), Some(tip));
    }

    #[test]
    fn diverged_branches_merge_into_a_new_commit() {
        let (test, base) = forked(&[("a.txt", "a"), ("b.txt", "b"), ("gone.txt", "x")]);
        test.repository.checkout("feature").unwrap();
        test.remove("gone.txt");
        test.commit_files(&[("b.txt", "b from feature"), ("new.txt", "new")], "feature work");
        test.repository.checkout("main").unwrap();
        let ours = test.commit_files(&[("a.txt", "a from main")], "main work");

        let outcome = test.repository.merge("feature").unwrap();

        let MergeOutcome::Merged { base: found, oid } = outcome else {
            panic!("expected a clean merge");
        };
        assert_eq!(found, base);
        assert_eq!(test.read("a.txt"), "a from main");
        assert_eq!(test.read("b.txt"), "b from feature");
        assert_eq!(test.read("new.txt"), "new");
        assert!(!test.exists("gone.txt"));

        let commit = test.repository.database().get_commit(&oid).unwrap();
        assert_eq!(commit.parent(), Some(&ours));
        assert_eq!(commit.message(), "Merge feature into main");
        assert!(commit.file(Path::new("gone.txt")).is_none());
        assert_eq!(test.repository.refs().resolve_head().unwrap(), Some(oid));
    }

    #[test]
    fn conflicting_changes_are_marked_and_not_committed() {
        let (test, base) = forked(&[("f.txt", "A\n"), ("other.txt", "same\n")]);
        test.repository.checkout("feature").unwrap();
        test.commit_files(&[("f.txt", "C\n"), ("other.txt", "theirs\n")], "theirs");
        test.repository.checkout("main").unwrap();
        let ours = test.commit_files(&[("f.txt", "B\n")], "ours");

        let outcome = test.repository.merge("feature").unwrap();

        assert_eq!(
            outcome,
            MergeOutcome::Conflicted {
                base,
                conflicts: vec![PathBuf::from("f.txt")]
            }
        );
        assert_eq!(
            test.read("f.txt"),
            "<<<<<<< ours\nB\n=======\nC\n>>>>>>> theirs\n"
        );
        assert_eq!(test.read("other.txt"), "theirs\n");
        assert_eq!(test.repository.refs().resolve_head().unwrap(), Some(ours));

        let mut index = test.repository.index();
        index.rehydrate().unwrap();
        assert!(index.entry_by_path(Path::new("other.txt")).is_some());
        assert!(index.entry_by_path(Path::new("f.txt")).is_none());
    }

    #[test]
    fn merge_needs_a_commit_on_head() {
        let test = test_repository();

        assert!(matches!(
            test.repository.merge("main"),
            Err(Error::NoCommitsYet)
        ));
    }

    #[test]
    fn unknown_and_unborn_targets_are_rejected() {
        let test = test_repository();
        test.commit_files(&[("a.txt", "a")], "first");
        let unborn = BranchName::try_parse("unborn").unwrap();
        test.repository.refs().create_unborn_branch(&unborn).unwrap();

        assert!(matches!(
            test.repository.merge("nowhere"),
            Err(Error::InvalidTarget(_))
        ));
        assert!(matches!(
            test.repository.merge("unborn"),
            Err(Error::NotFound { kind: "commit", .. })
        ));
    }

    #[test]
    fn unrelated_histories_are_rejected() {
        let test = test_repository();
        test.commit_files(&[("a.txt", "a")], "first");
        let orphan = BranchName::try_parse("orphan").unwrap();
        test.repository.refs().create_unborn_branch(&orphan).unwrap();
        test.repository.checkout("orphan").unwrap();
        test.commit_files(&[("b.txt", "b")], "orphan root");

        assert!(matches!(
            test.repository.merge("main"),
            Err(Error::UnrelatedHistories { .. })
        ));
    }
}
