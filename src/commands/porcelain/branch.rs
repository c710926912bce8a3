use crate::areas::refs::Head;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::target::Target;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use colored::Colorize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchCreated {
    pub name: BranchName,
    pub oid: ObjectId,
}

impl std::fmt::Display for BranchCreated {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Created branch {} at {}", self.name, self.oid.to_short_oid())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchListing {
    pub name: BranchName,
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branches {
    pub branches: Vec<BranchListing>,
    /// Commit of a detached HEAD
    pub detached: Option<ObjectId>,
}

impl std::fmt::Display for Branches {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut lines = Vec::with_capacity(self.branches.len() + 1);
        if let Some(oid) = &self.detached {
            lines.push(format!(
                "* {}",
                format!("(HEAD detached at {})", oid.to_short_oid()).green()
            ));
        }
        for branch in &self.branches {
            if branch.is_current {
                lines.push(format!("* {}", branch.name.to_string().green()));
            } else {
                lines.push(format!("  {}", branch.name));
            }
        }

        write!(f, "{}", lines.join("\n"))
    }
}

impl Repository {
    /// Create a branch at `start_point`, or at the commit HEAD resolves to
    pub fn branch(&self, name: &str, start_point: Option<&str>) -> Result<BranchCreated> {
        let name = BranchName::try_parse(name)?;
        if self.refs().branch_exists(&name) {
            return Err(Error::AlreadyExists(name.to_string()));
        }

        let oid = match start_point {
            Some(start_point) => {
                let target = Target::resolve(start_point, self.refs(), self.database())?;
                target.oid().cloned().ok_or_else(|| Error::NotFound {
                    kind: "commit",
                    id: target.to_string(),
                })?
            }
            None => self.refs().resolve_head()?.ok_or(Error::NoCommitsYet)?,
        };

        self.refs().create_branch(&name, &oid)?;
        info!(branch = %name, %oid, "created branch");

        Ok(BranchCreated { name, oid })
    }

    /// Every branch, sorted by name, marking the one HEAD follows
    pub fn branches(&self) -> Result<Branches> {
        let head = self.refs().read_head()?;
        let branches = self
            .refs()
            .list_branches()?
            .into_iter()
            .map(|name| BranchListing {
                is_current: head.branch() == Some(&name),
                name,
            })
            .collect();
        let detached = match head {
            Head::Detached(oid) => Some(oid),
            Head::Branch(_) => None,
        };

        Ok(Branches { branches, detached })
    }
}
