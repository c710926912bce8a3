//! Object identifier (SHA-1 hash)
//!
//! Object IDs are 40-character lowercase hexadecimal strings. They identify
//! blobs and commits alike.
//!
//! ## Storage
//!
//! Objects are stored in `.minigit/objects/<first-2-chars>/<remaining-38-chars>`

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::errors::{Error, Result};
use std::path::PathBuf;

/// Object identifier (SHA-1 hash)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object ID from a string
    ///
    /// Uppercase digits are accepted and normalized to lowercase.
    pub fn try_parse(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.len() != OBJECT_ID_LENGTH || !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidObjectId(id));
        }

        Ok(Self(id.to_ascii_lowercase()))
    }

    /// Render a raw 20-byte digest as an object ID
    pub(crate) fn from_digest(digest: &[u8]) -> Self {
        Self(digest.iter().map(|byte| format!("{byte:02x}")).collect())
    }

    /// Cheap syntactic check, used to tell commit ids from branch names
    pub fn is_valid(candidate: &str) -> bool {
        candidate.len() == OBJECT_ID_LENGTH && candidate.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Convert to file system path for object storage
    ///
    /// Splits the hash as `XX/YYYYYY...` where XX is the first 2 chars.
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// First 7 characters of the hash
    pub fn to_short_oid(&self) -> String {
        self.0.split_at(7).0.to_string()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
