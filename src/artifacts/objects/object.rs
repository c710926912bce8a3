use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::Result;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::BufRead;

pub trait Packable {
    /// Full stored payload: `<type> <size>\0<body>`
    fn serialize(&self) -> Bytes;
}

pub trait Unpackable {
    /// Parse the body of an object whose header has already been consumed
    fn deserialize(reader: impl BufRead, id: &ObjectId) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn object_id(&self) -> ObjectId {
        digest(&self.serialize())
    }
}

/// SHA-1 over the given bytes, rendered as an [`ObjectId`]
pub fn digest(content: &[u8]) -> ObjectId {
    let mut hasher = Sha1::new();
    hasher.update(content);

    ObjectId::from_digest(&hasher.finalize())
}

/// Prefix `body` with its object header
pub fn frame(object_type: ObjectType, body: &[u8]) -> Bytes {
    let header = format!("{} {}\0", object_type.as_str(), body.len());
    let mut object_bytes = Vec::with_capacity(header.len() + body.len());
    object_bytes.extend_from_slice(header.as_bytes());
    object_bytes.extend_from_slice(body);

    Bytes::from(object_bytes)
}
