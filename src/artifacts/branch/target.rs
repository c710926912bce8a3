//! Checkout, merge and diff targets
//!
//! A target names either a branch or a commit. Branch names are tried first,
//! then full commit ids, then abbreviated commit ids of at least
//! [`MIN_ABBREVIATED_ID_LENGTH`] characters that match exactly one stored
//! commit.

use crate::areas::database::Database;
use crate::areas::refs::Refs;
use crate::artifacts::branch::MIN_ABBREVIATED_ID_LENGTH;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// An existing branch, with its commit unless it is unborn
    Branch {
        name: BranchName,
        oid: Option<ObjectId>,
    },
    /// A stored commit
    Commit(ObjectId),
}

impl Target {
    pub fn resolve(name: &str, refs: &Refs, database: &Database) -> Result<Self> {
        if let Ok(branch) = BranchName::try_parse(name)
            && refs.branch_exists(&branch)
        {
            let oid = refs.read_ref(&branch)?;
            return Ok(Target::Branch { name: branch, oid });
        }

        if ObjectId::is_valid(name) {
            let oid = ObjectId::try_parse(name)?;
            if database.has_commit(&oid)? {
                return Ok(Target::Commit(oid));
            }
            return Err(Error::InvalidTarget(name.to_string()));
        }

        if name.len() >= MIN_ABBREVIATED_ID_LENGTH {
            let mut candidates = Vec::new();
            for oid in database.find_objects_by_prefix(name)? {
                if database.has_commit(&oid)? {
                    candidates.push(oid);
                }
            }

            if let [oid] = candidates.as_slice() {
                return Ok(Target::Commit(oid.clone()));
            }
            debug!(prefix = name, matches = candidates.len(), "abbreviated id not unique");
        }

        Err(Error::InvalidTarget(name.to_string()))
    }

    /// Commit the target points at, `None` for an unborn branch
    pub fn oid(&self) -> Option<&ObjectId> {
        match self {
            Target::Branch { oid, .. } => oid.as_ref(),
            Target::Commit(oid) => Some(oid),
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Branch { name, .. } => write!(f, "{name}"),
            Target::Commit(oid) => write!(f, "{}", oid.to_short_oid()),
        }
    }
}
