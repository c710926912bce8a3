//! Content-addressable object store
//!
//! Blobs and commits share one namespace keyed by the SHA-1 of their framed
//! payload. The type header is part of the hashed payload, so a blob and a
//! commit never share an identity, and reading an id as the wrong type is
//! reported as `NotFound`.
//!
//! Objects are zlib-compressed and sharded by the first two hex characters of
//! their id. The store is write-once: storing an object that already exists is
//! a no-op, and new objects are written to a temp file and renamed into place
//! so a failed write never leaves a truncated object behind.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result, StorageContext};
use bytes::Bytes;
use fake::rand;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn put_blob(&self, content: impl Into<Bytes>) -> Result<ObjectId> {
        self.store(&Blob::new(content.into()))
    }

    pub fn get_blob(&self, object_id: &ObjectId) -> Result<Blob> {
        let mut reader = self.open_as(object_id, ObjectType::Blob)?;
        Blob::deserialize(&mut reader, object_id)
    }

    pub fn put_commit(&self, commit: &Commit) -> Result<ObjectId> {
        self.store(commit)
    }

    pub fn get_commit(&self, object_id: &ObjectId) -> Result<Commit> {
        let mut reader = self.open_as(object_id, ObjectType::Commit)?;
        Commit::deserialize(&mut reader, object_id)
    }

    /// Whether `object_id` is stored and is a commit
    pub fn has_commit(&self, object_id: &ObjectId) -> Result<bool> {
        if !self.contains(object_id) {
            return Ok(false);
        }

        let mut reader = Cursor::new(self.load(object_id)?);
        let (object_type, _) = ObjectType::parse_header(&mut reader, object_id.as_ref())?;

        Ok(object_type == ObjectType::Commit)
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).is_file()
    }

    /// Store an object unless it already exists and return its identity
    pub fn store(&self, object: &impl Object) -> Result<ObjectId> {
        let object_id = object.object_id();
        let object_path = self.path.join(object_id.to_path());

        if object_path.exists() {
            debug!(oid = %object_id, "object already stored");
            return Ok(object_id);
        }

        let object_dir = object_path
            .parent()
            .ok_or_else(|| Error::corrupt(&object_id, "object path has no parent directory"))?;
        std::fs::create_dir_all(object_dir).storage("create object directory", object_dir)?;

        self.write_object(&object_path, object.serialize())?;
        debug!(oid = %object_id, kind = %object.object_type(), "stored object");

        Ok(object_id)
    }

    /// Every stored object whose id starts with `prefix`
    ///
    /// Used to expand abbreviated ids. More than one match means the prefix is
    /// ambiguous. Prefixes shorter than the shard directory name match nothing.
    pub fn find_objects_by_prefix(&self, prefix: &str) -> Result<Vec<ObjectId>> {
        let prefix = prefix.to_ascii_lowercase();
        if prefix.len() < 2 || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Ok(vec![]);
        }

        let (dir_name, file_prefix) = prefix.split_at(2);
        let dir_path = self.path.join(dir_name);
        if !dir_path.is_dir() {
            return Ok(vec![]);
        }

        let mut matches = Vec::new();
        for entry in std::fs::read_dir(&dir_path).storage("read object directory", &dir_path)? {
            let entry = entry.storage("read object directory", &dir_path)?;
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();

            if file_name.starts_with(file_prefix)
                && let Ok(oid) = ObjectId::try_parse(format!("{dir_name}{file_name}"))
            {
                matches.push(oid);
            }
        }
        matches.sort();

        Ok(matches)
    }

    /// Raw, decompressed payload of an object, header included
    pub fn load(&self, object_id: &ObjectId) -> Result<Bytes> {
        let object_path = self.path.join(object_id.to_path());
        if !object_path.is_file() {
            return Err(Error::NotFound {
                kind: "object",
                id: object_id.to_string(),
            });
        }

        self.read_object(&object_path, object_id)
    }

    fn open_as(&self, object_id: &ObjectId, expected: ObjectType) -> Result<Cursor<Bytes>> {
        let not_found = || Error::NotFound {
            kind: expected.as_str(),
            id: object_id.to_string(),
        };

        let content = self.load(object_id).map_err(|e| match e {
            Error::NotFound { .. } => not_found(),
            other => other,
        })?;
        let mut reader = Cursor::new(content);
        let (object_type, size) = ObjectType::parse_header(&mut reader, object_id.as_ref())?;

        if object_type != expected {
            return Err(not_found());
        }

        let body_len = reader.get_ref().len() - reader.position() as usize;
        if body_len != size {
            return Err(Error::corrupt(
                object_id,
                format!("declared size {size} but body has {body_len} bytes"),
            ));
        }

        Ok(reader)
    }

    fn read_object(&self, object_path: &Path, object_id: &ObjectId) -> Result<Bytes> {
        let object_content = std::fs::read(object_path).storage("read object", object_path)?;

        Self::decompress(&object_content)
            .map_err(|e| Error::corrupt(object_id, format!("unable to decompress object: {e}")))
    }

    fn write_object(&self, object_path: &Path, object_content: Bytes) -> Result<()> {
        let object_dir = object_path.parent().unwrap_or(&self.path);
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content =
            Self::compress(&object_content).storage("compress object", object_path)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .storage("open object file", &temp_object_path)?;

        let written = file
            .write_all(&object_content)
            .and_then(|_| file.sync_all())
            .storage("write object file", &temp_object_path);
        if let Err(e) = written {
            let _ = std::fs::remove_file(&temp_object_path);
            return Err(e);
        }

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, object_path).storage("rename object file", object_path)
    }

    fn compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data)?;
        encoder.finish()
    }

    fn decompress(data: &[u8]) -> std::io::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed_content = Vec::new();
        decoder.read_to_end(&mut decompressed_content)?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> PathBuf {
        PathBuf::from(format!("tmp-obj-{}", rand::random::<u32>()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::commit::FileSet;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use walkdir::WalkDir;

    #[fixture]
    fn objects_dir() -> TempDir {
        TempDir::new().expect("Failed to create temp dir")
    }

    fn database(dir: &TempDir) -> Database {
        Database::new(dir.path().join("objects").into_boxed_path())
    }

    fn stored_files(dir: &TempDir) -> Vec<PathBuf> {
        WalkDir::new(dir.path())
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .map(|entry| entry.path().to_path_buf())
            .collect()
    }

    #[rstest]
    fn put_blob_twice_stores_a_single_copy(objects_dir: TempDir) {
        let database = database(&objects_dir);

        let first = database.put_blob("hello").unwrap();
        let second = database.put_blob("hello").unwrap();

        assert_eq!(first, second);
        assert_eq!(stored_files(&objects_dir).len(), 1);
        assert!(
            objects_dir
                .path()
                .join("objects")
                .join(first.to_path())
                .is_file()
        );
    }

    #[rstest]
    fn get_blob_returns_stored_bytes(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let content = Bytes::from_static(&[0, 159, 146, 150, b'\n']);

        let oid = database.put_blob(content.clone()).unwrap();

        assert_eq!(database.get_blob(&oid).unwrap().content(), &content);
    }

    #[rstest]
    fn missing_blob_is_not_found(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let oid = ObjectId::try_parse("f".repeat(40)).unwrap();

        assert!(matches!(
            database.get_blob(&oid),
            Err(Error::NotFound { kind: "blob", .. })
        ));
    }

    #[rstest]
    fn commits_and_blobs_do_not_collide_on_meaning(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let blob_id = database.put_blob("content").unwrap();
        let commit = Commit::new(
            chrono::Local::now().fixed_offset(),
            "first".to_string(),
            None,
            FileSet::from([(PathBuf::from("a.txt"), blob_id.clone())]),
        );
        let commit_id = database.put_commit(&commit).unwrap();

        assert_eq!(database.get_commit(&commit_id).unwrap(), commit);
        assert!(database.has_commit(&commit_id).unwrap());
        assert!(!database.has_commit(&blob_id).unwrap());
        assert!(matches!(
            database.get_commit(&blob_id),
            Err(Error::NotFound { kind: "commit", .. })
        ));
        assert!(matches!(
            database.get_blob(&commit_id),
            Err(Error::NotFound { kind: "blob", .. })
        ));
    }

    #[rstest]
    fn existing_objects_are_never_rewritten(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let oid = database.put_blob("hello").unwrap();
        let object_path = objects_dir.path().join("objects").join(oid.to_path());
        let before = std::fs::metadata(&object_path).unwrap().modified().unwrap();

        database.put_blob("hello").unwrap();

        let after = std::fs::metadata(&object_path).unwrap().modified().unwrap();
        assert_eq!(before, after);
    }

    #[rstest]
    fn prefix_lookup_expands_abbreviated_ids(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let oid = database.put_blob("hello").unwrap();

        assert_eq!(
            database.find_objects_by_prefix(&oid.as_ref()[..6]).unwrap(),
            vec![oid.clone()]
        );
        assert_eq!(
            database
                .find_objects_by_prefix(&oid.as_ref()[..6].to_uppercase())
                .unwrap(),
            vec![oid]
        );
        assert!(database.find_objects_by_prefix("zzzz").unwrap().is_empty());
        assert!(database.find_objects_by_prefix("0000").unwrap().is_empty());
    }

    #[rstest]
    fn garbage_on_disk_is_a_corrupt_record(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let oid = database.put_blob("hello").unwrap();
        let object_path = objects_dir.path().join("objects").join(oid.to_path());
        std::fs::write(&object_path, b"not zlib").unwrap();

        assert!(matches!(
            database.get_blob(&oid),
            Err(Error::CorruptRecord { .. })
        ));
    }

    #[cfg(unix)]
    #[rstest]
    fn failed_write_surfaces_storage_error_without_residue(objects_dir: TempDir) {
        use std::os::unix::fs::PermissionsExt;

        let database = database(&objects_dir);
        let blob = Blob::new(Bytes::from_static(b"hello"));
        let shard = objects_dir
            .path()
            .join("objects")
            .join(blob.object_id().to_path())
            .parent()
            .unwrap()
            .to_path_buf();
        std::fs::create_dir_all(&shard).unwrap();
        std::fs::set_permissions(&shard, std::fs::Permissions::from_mode(0o555)).unwrap();

        // privileged users write through read-only directories
        let writable = std::fs::write(shard.join("check"), b"").is_ok();
        if !writable {
            assert!(matches!(
                database.put_blob("hello"),
                Err(Error::Storage { action: "open object file", .. })
            ));
            assert!(!database.contains(&blob.object_id()));
            assert!(stored_files(&objects_dir).is_empty());
        }

        std::fs::set_permissions(&shard, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}
