use crate::areas::repository::{REPOSITORY_DIR, Repository};
use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::{Error, Result, StorageContext};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_BRANCH: &str = "main";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Initialized {
    pub path: PathBuf,
}

impl std::fmt::Display for Initialized {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Initialized empty minigit repository in {}",
            self.path.display()
        )
    }
}

impl Repository {
    /// Create an empty repository in `path`, creating the directory if needed
    ///
    /// HEAD follows the unborn branch `main`.
    pub fn init(path: impl AsRef<Path>) -> Result<Initialized> {
        let path = path.as_ref();
        fs::create_dir_all(path).storage("create directory", path)?;
        let path = path.canonicalize().storage("resolve path", path)?;

        let repository_path = path.join(REPOSITORY_DIR);
        if repository_path.exists() {
            return Err(Error::AlreadyInitialized(repository_path));
        }

        let repository = Repository::at(path.into_boxed_path());
        let objects_path = repository.database().objects_path();
        fs::create_dir_all(objects_path).storage("create objects directory", objects_path)?;

        let refs = repository.refs();
        let refs_path = refs.refs_path();
        fs::create_dir_all(&refs_path).storage("create refs directory", &refs_path)?;

        let default_branch = BranchName::try_parse(DEFAULT_BRANCH)?;
        refs.create_unborn_branch(&default_branch)?;
        refs.set_head_branch(&default_branch)?;

        let index = repository.index();
        if !index.path().exists() {
            fs::write(index.path(), b"").storage("create index", index.path())?;
        }

        info!(path = %repository_path.display(), "initialized repository");

        Ok(Initialized {
            path: repository_path,
        })
    }
}
