//! References (branches and HEAD)
//!
//! References are human-readable names pointing to commits. HEAD is either
//! symbolic (it names a branch) or detached (it holds a commit ID directly).
//!
//! ## File Format
//!
//! - `HEAD` contains `ref: <branch-name>` or a 40-character commit ID
//! - `refs/<branch-name>` contains a 40-character commit ID, or nothing when
//!   the branch has no commits yet
//!
//! Reading a branch file that exists but is empty yields `None`. A branch
//! without a file does not exist; callers check [`Refs::branch_exists`] before
//! reporting `BranchNotFound`.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result, StorageContext};
use derive_new::new;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;
use walkdir::WalkDir;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

static SYMREF: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(SYMREF_REGEX).expect("invalid symref regex"));

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

/// Current position pointer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// Follows the named branch
    Branch(BranchName),
    /// Points straight at a commit
    Detached(ObjectId),
}

impl Head {
    pub fn branch(&self) -> Option<&BranchName> {
        match self {
            Head::Branch(name) => Some(name),
            Head::Detached(_) => None,
        }
    }
}

impl std::fmt::Display for Head {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Head::Branch(name) => write!(f, "{name}"),
            Head::Detached(oid) => write!(f, "{}", oid.to_short_oid()),
        }
    }
}

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the repository directory (typically `.minigit`)
    path: Box<Path>,
}

impl Refs {
    pub fn head_path(&self) -> PathBuf {
        self.path.join(HEAD_REF_NAME)
    }

    pub fn refs_path(&self) -> PathBuf {
        self.path.join("refs")
    }

    fn branch_path(&self, name: &BranchName) -> PathBuf {
        self.refs_path().join(name.as_ref())
    }

    pub fn read_head(&self) -> Result<Head> {
        let head_path = self.head_path();
        let content = std::fs::read_to_string(&head_path).storage("read HEAD", &head_path)?;
        let content = content.trim();

        if let Some(symref) = SYMREF.captures(content) {
            return Ok(Head::Branch(BranchName::try_parse(&symref[1])?));
        }

        ObjectId::try_parse(content)
            .map(Head::Detached)
            .map_err(|_| Error::corrupt(HEAD_REF_NAME, format!("unexpected content '{content}'")))
    }

    /// Commit HEAD currently resolves to, `None` before the first commit
    pub fn resolve_head(&self) -> Result<Option<ObjectId>> {
        match self.read_head()? {
            Head::Branch(name) => self.read_ref(&name),
            Head::Detached(oid) => Ok(Some(oid)),
        }
    }

    pub fn set_head_branch(&self, name: &BranchName) -> Result<()> {
        debug!(branch = %name, "HEAD now follows branch");
        self.write_ref_file(&self.head_path(), &format!("ref: {name}"))
    }

    pub fn set_head_detached(&self, oid: &ObjectId) -> Result<()> {
        debug!(%oid, "HEAD detached");
        self.write_ref_file(&self.head_path(), oid.as_ref())
    }

    /// Advance whatever HEAD points at: the current branch, or HEAD itself when detached
    pub fn update_head(&self, oid: &ObjectId) -> Result<()> {
        match self.read_head()? {
            Head::Branch(name) => self.write_ref(&name, oid),
            Head::Detached(_) => self.set_head_detached(oid),
        }
    }

    pub fn branch_exists(&self, name: &BranchName) -> bool {
        self.branch_path(name).is_file()
    }

    /// Commit a branch points at
    ///
    /// `None` both for a branch without commits and for a branch that does not exist.
    pub fn read_ref(&self, name: &BranchName) -> Result<Option<ObjectId>> {
        let ref_path = self.branch_path(name);
        if !ref_path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&ref_path).storage("read ref", &ref_path)?;
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }

        ObjectId::try_parse(content)
            .map(Some)
            .map_err(|_| Error::corrupt(name, format!("unexpected ref content '{content}'")))
    }

    pub fn write_ref(&self, name: &BranchName, oid: &ObjectId) -> Result<()> {
        debug!(branch = %name, %oid, "updating ref");
        self.write_ref_file(&self.branch_path(name), oid.as_ref())
    }

    pub fn create_branch(&self, name: &BranchName, source_oid: &ObjectId) -> Result<()> {
        if self.branch_exists(name) {
            return Err(Error::AlreadyExists(name.to_string()));
        }

        self.write_ref(name, source_oid)
    }

    /// Create a branch that has no commits yet
    pub fn create_unborn_branch(&self, name: &BranchName) -> Result<()> {
        self.write_ref_file(&self.branch_path(name), "")
    }

    /// All branch names, sorted
    pub fn list_branches(&self) -> Result<Vec<BranchName>> {
        let refs_path = self.refs_path();
        let mut branches = WalkDir::new(&refs_path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let relative_path = entry.path().strip_prefix(&refs_path).ok()?;
                BranchName::try_parse(relative_path.to_string_lossy().replace('\\', "/")).ok()
            })
            .collect::<Vec<_>>();
        branches.sort();

        Ok(branches)
    }

    fn write_ref_file(&self, path: &Path, raw_ref: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).storage("create ref directory", parent)?;
        }

        std::fs::write(path, raw_ref).storage("write ref", path)
    }
}
