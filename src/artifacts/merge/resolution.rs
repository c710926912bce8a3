//! Per-path three-way resolution
//!
//! Every path tracked by the base, ours or theirs takes part. A path missing
//! from a file set is *absent*, which is distinct from every real blob and
//! compares equal only to another absence.
//!
//! | ours vs theirs | ours vs base | theirs vs base | result        |
//! |----------------|--------------|----------------|---------------|
//! | equal          | -            | -              | ours          |
//! | differ         | equal        | -              | theirs        |
//! | differ         | differ       | equal          | ours          |
//! | differ         | differ       | differ         | conflict      |

use crate::artifacts::objects::commit::FileSet;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathResolution {
    /// Merged value, `None` when the path ends up absent
    Resolved(Option<ObjectId>),
    /// Both sides changed the path differently
    Conflict {
        ours: Option<ObjectId>,
        theirs: Option<ObjectId>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeResolution {
    paths: BTreeMap<PathBuf, PathResolution>,
}

impl MergeResolution {
    pub fn resolve(base: &FileSet, ours: &FileSet, theirs: &FileSet) -> Self {
        let all_paths = base
            .keys()
            .chain(ours.keys())
            .chain(theirs.keys())
            .collect::<BTreeSet<_>>();

        let paths = all_paths
            .into_iter()
            .map(|path| {
                let resolution = Self::resolve_path(base.get(path), ours.get(path), theirs.get(path));
                (path.clone(), resolution)
            })
            .collect();

        MergeResolution { paths }
    }

    fn resolve_path(
        base: Option<&ObjectId>,
        ours: Option<&ObjectId>,
        theirs: Option<&ObjectId>,
    ) -> PathResolution {
        if ours == theirs || theirs == base {
            PathResolution::Resolved(ours.cloned())
        } else if ours == base {
            PathResolution::Resolved(theirs.cloned())
        } else {
            PathResolution::Conflict {
                ours: ours.cloned(),
                theirs: theirs.cloned(),
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &PathResolution)> {
        self.paths.iter()
    }

    pub fn is_clean(&self) -> bool {
        self.conflicts().next().is_none()
    }

    /// Conflicted paths, sorted
    pub fn conflicts(&self) -> impl Iterator<Item = &PathBuf> {
        self.paths
            .iter()
            .filter(|(_, resolution)| matches!(resolution, PathResolution::Conflict { .. }))
            .map(|(path, _)| path)
    }

    /// Paths that resolved to a blob, conflicts excluded
    pub fn merged_files(&self) -> FileSet {
        self.paths
            .iter()
            .filter_map(|(path, resolution)| match resolution {
                PathResolution::Resolved(Some(oid)) => Some((path.clone(), oid.clone())),
                _ => None,
            })
            .collect()
    }
}
