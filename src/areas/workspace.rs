use crate::areas::repository::REPOSITORY_DIR;
use crate::errors::{Error, Result, StorageContext};
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve a user-supplied path to the working-tree relative files it names
    ///
    /// Directories expand to every file below them, skipping the repository
    /// directory itself. Paths that are not UTF-8 or contain a line break are
    /// rejected, since records store one path per line.
    pub fn list_files(&self, file_path: &Path) -> Result<Vec<PathBuf>> {
        let absolute_path = if file_path.is_absolute() {
            file_path.to_path_buf()
        } else {
            self.path.join(file_path)
        };

        if !absolute_path.exists() {
            return Err(Error::FileNotFound(file_path.to_path_buf()));
        }
        let absolute_path = absolute_path
            .canonicalize()
            .storage("resolve path", &absolute_path)?;
        let relative_path = absolute_path
            .strip_prefix(&self.path)
            .map_err(|_| Error::FileNotFound(file_path.to_path_buf()))?
            .to_path_buf();

        if Self::is_ignored(&relative_path) {
            return Ok(vec![]);
        }

        if absolute_path.is_dir() {
            let mut files = WalkDir::new(&absolute_path)
                .into_iter()
                .filter_entry(|entry| entry.file_name() != REPOSITORY_DIR)
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .filter_map(|entry| {
                    Some(entry.path().strip_prefix(&self.path).ok()?.to_path_buf())
                })
                .map(Self::trackable)
                .collect::<Result<Vec<_>>>()?;
            files.sort();

            Ok(files)
        } else {
            Ok(vec![Self::trackable(relative_path)?])
        }
    }

    fn trackable(path: PathBuf) -> Result<PathBuf> {
        let reason = match path.to_str() {
            None => "path is not valid UTF-8",
            Some(name) if name.contains(['\n', '\r']) => "path contains a line break",
            Some(_) => return Ok(path),
        };

        Err(Error::UntrackablePath { path, reason })
    }

    fn is_ignored(path: &Path) -> bool {
        path.components()
            .any(|component| matches!(component, Component::Normal(name) if name == REPOSITORY_DIR))
    }

    pub fn read_file(&self, file_path: &Path) -> Result<Bytes> {
        let absolute_path = self.path.join(file_path);
        if !absolute_path.is_file() {
            return Err(Error::FileNotFound(file_path.to_path_buf()));
        }

        std::fs::read(&absolute_path)
            .map(Bytes::from)
            .storage("read file", &absolute_path)
    }

    pub fn exists(&self, file_path: &Path) -> bool {
        self.path.join(file_path).is_file()
    }

    /// Overwrite a working-tree file, creating parent directories as needed
    ///
    /// A directory standing where the file goes is removed first.
    pub fn write_file(&self, file_path: &Path, content: &[u8]) -> Result<()> {
        let absolute_path = self.path.join(file_path);

        if let Some(parent) = absolute_path.parent() {
            self.make_directory(parent)?;
        }
        if absolute_path.is_dir() {
            std::fs::remove_dir_all(&absolute_path)
                .storage("remove directory in the way of", &absolute_path)?;
        }

        std::fs::write(&absolute_path, content).storage("write file", &absolute_path)
    }

    /// Delete a working-tree file and prune the directories it leaves empty
    pub fn remove_file(&self, file_path: &Path) -> Result<()> {
        let absolute_path = self.path.join(file_path);

        if absolute_path.is_file() {
            std::fs::remove_file(&absolute_path).storage("remove file", &absolute_path)?;
        }

        self.prune_empty_parent_dirs(&absolute_path)
    }

    fn make_directory(&self, dir_path: &Path) -> Result<()> {
        // a file standing where a directory goes is replaced
        for ancestor in dir_path
            .ancestors()
            .take_while(|ancestor| *ancestor != self.path.as_ref())
        {
            if ancestor.is_file() {
                std::fs::remove_file(ancestor).storage("remove file in the way of", ancestor)?;
            }
        }

        std::fs::create_dir_all(dir_path).storage("create directory", dir_path)
    }

    fn prune_empty_parent_dirs(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.path.as_ref()
            && parent.starts_with(&self.path)
            && parent.is_dir()
            && parent
                .read_dir()
                .storage("read directory", parent)?
                .next()
                .is_none()
        {
            std::fs::remove_dir(parent).storage("remove empty directory", parent)?;
            self.prune_empty_parent_dirs(parent)?;
        }

        Ok(())
    }
}
