//! Object types and operations
//!
//! All content is stored as objects identified by SHA-1 hashes:
//!
//! - **Blob**: File content (raw bytes)
//! - **Commit**: Snapshot with metadata (timestamp, message, parent commit, tracked files)
//!
//! All objects serialize to the format `<type> <size>\0<content>`; the
//! identity of an object is the SHA-1 of that payload.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;
