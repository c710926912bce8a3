use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::artifacts::graph::commit_graph::CommitGraph;
use crate::errors::{Error, Result, StorageContext};
use std::cell::{RefCell, RefMut};
use std::path::Path;

/// Name of the repository directory inside the working tree
pub const REPOSITORY_DIR: &str = ".minigit";

/// A session on one repository
///
/// Owns the stores of the repository and its commit graph. The graph learns
/// edges as commits are created and loads the rest lazily from the commit
/// records in the object store.
pub struct Repository {
    path: Box<Path>,
    index: RefCell<Index>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
    graph: CommitGraph,
}

impl Repository {
    /// Open the repository rooted at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path = path.canonicalize().storage("resolve path", path)?;

        if !path.join(REPOSITORY_DIR).is_dir() {
            return Err(Error::NotARepository(path));
        }

        Ok(Self::at(path.into_boxed_path()))
    }

    /// Build a session for `path` without checking that a repository exists there
    pub(crate) fn at(path: Box<Path>) -> Self {
        let repository_path = path.join(REPOSITORY_DIR);

        let database = Database::new(repository_path.join("objects").into_boxed_path());
        let index = Index::new(repository_path.join("index").into_boxed_path());
        let refs = Refs::new(repository_path.into_boxed_path());
        let workspace = Workspace::new(path.clone());

        let loader_database = database.clone();
        let graph = CommitGraph::with_loader(move |oid| match loader_database.get_commit(oid) {
            Ok(commit) => Ok(Some(commit.parent().into_iter().cloned().collect())),
            Err(Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        });

        Repository {
            path,
            index: RefCell::new(index),
            database,
            workspace,
            refs,
            graph,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn index(&self) -> RefMut<'_, Index> {
        self.index.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn graph(&self) -> &CommitGraph {
        &self.graph
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("path", &self.path)
            .field("graph", &self.graph)
            .finish()
    }
}
