use crate::artifacts::objects::commit::FileSet;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChangeType {
    Added(ObjectId),
    Deleted(ObjectId),
    Modified { old: ObjectId, new: ObjectId },
}

impl FileChangeType {
    pub fn from_entries(old: Option<&ObjectId>, new: Option<&ObjectId>) -> Option<Self> {
        match (old, new) {
            (None, Some(new)) => Some(FileChangeType::Added(new.clone())),
            (Some(old), None) => Some(FileChangeType::Deleted(old.clone())),
            (Some(old), Some(new)) if old != new => Some(FileChangeType::Modified {
                old: old.clone(),
                new: new.clone(),
            }),
            _ => None,
        }
    }

    /// Single-letter status used in summaries
    pub fn status(&self) -> char {
        match self {
            FileChangeType::Added(_) => 'A',
            FileChangeType::Deleted(_) => 'D',
            FileChangeType::Modified { .. } => 'M',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: PathBuf,
    pub change: FileChangeType,
}

/// Every path whose blob differs between `old` and `new`, sorted by path
pub fn diff_file_sets(old: &FileSet, new: &FileSet) -> Vec<FileChange> {
    old.keys()
        .chain(new.keys())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .filter_map(|path| {
            FileChangeType::from_entries(old.get(path), new.get(path)).map(|change| FileChange {
                path: path.clone(),
                change,
            })
        })
        .collect()
}
