//! Blob object
//!
//! Blobs store one version of a file's content, without name or metadata.
//!
//! ## Format
//!
//! On disk: `blob <size>\0<content>`

use crate::artifacts::objects::object::{Object, Packable, Unpackable, frame};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result};
use bytes::Bytes;
use derive_new::new;
use std::io::BufRead;

/// Raw byte content of one file version
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Blob {
    content: Bytes,
}

impl Blob {
    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn into_content(self) -> Bytes {
        self.content
    }
}

impl Packable for Blob {
    fn serialize(&self) -> Bytes {
        frame(self.object_type(), &self.content)
    }
}

impl Unpackable for Blob {
    fn deserialize(mut reader: impl BufRead, id: &ObjectId) -> Result<Self> {
        let mut content = Vec::new();
        reader
            .read_to_end(&mut content)
            .map_err(|e| Error::corrupt(id, format!("unreadable blob body: {e}")))?;

        Ok(Self::new(content.into()))
    }
}

impl Object for Blob {
    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::proptest;

    #[test]
    fn identity_matches_git_blob_hashing() {
        // `printf hello | git hash-object --stdin`
        let blob = Blob::new(Bytes::from_static(b"hello"));
        assert_eq!(
            blob.object_id().as_ref(),
            "b6fc4c620b67d95f953a5c1c1230aaab5db5a1b0"
        );
    }

    proptest! {
        #[test]
        fn equal_content_yields_equal_identity(content in proptest::collection::vec(proptest::num::u8::ANY, 0..256)) {
            let first = Blob::new(Bytes::from(content.clone()));
            let second = Blob::new(Bytes::from(content));
            assert_eq!(first.object_id(), second.object_id());
        }

        #[test]
        fn different_content_yields_different_identity(a in "[a-z]{1,32}", b in "[a-z]{1,32}") {
            proptest::prop_assume!(a != b);
            let first = Blob::new(Bytes::from(a));
            let second = Blob::new(Bytes::from(b));
            assert_ne!(first.object_id(), second.object_id());
        }
    }
}
