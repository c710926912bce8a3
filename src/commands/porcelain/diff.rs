use crate::areas::repository::Repository;
use crate::artifacts::branch::target::Target;
use crate::artifacts::diff::file_diff::{FileChange, FileChangeType, diff_file_sets};
use crate::artifacts::objects::commit::FileSet;
use crate::errors::Result;
use colored::Colorize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffReport {
    pub from: Target,
    pub to: Target,
    pub changes: Vec<FileChange>,
}

impl std::fmt::Display for DiffReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lines = self
            .changes
            .iter()
            .map(|change| {
                let status = change.change.status().to_string();
                let status = match change.change {
                    FileChangeType::Added(_) => status.green(),
                    FileChangeType::Deleted(_) => status.red(),
                    FileChangeType::Modified { .. } => status.yellow(),
                };
                format!("{status}\t{}", change.path.display())
            })
            .collect::<Vec<_>>();

        write!(f, "{}", lines.join("\n"))
    }
}

impl Repository {
    /// Paths added, deleted or modified going from `from` to `to`
    ///
    /// Both arguments name a branch or a commit. An unborn branch compares as
    /// an empty file set.
    pub fn diff(&self, from: &str, to: &str) -> Result<DiffReport> {
        let from = Target::resolve(from, self.refs(), self.database())?;
        let to = Target::resolve(to, self.refs(), self.database())?;

        let changes = diff_file_sets(&self.target_files(&from)?, &self.target_files(&to)?);

        Ok(DiffReport { from, to, changes })
    }

    fn target_files(&self, target: &Target) -> Result<FileSet> {
        match target.oid() {
            Some(oid) => Ok(self.database().get_commit(oid)?.file_set()),
            None => Ok(FileSet::new()),
        }
    }
}
