//! Data types and algorithms
//!
//! - `branch`: branch names and checkout/merge target resolution
//! - `diff`: file-set comparison between commits
//! - `graph`: commit graph and merge-base search
//! - `merge`: three-way resolution and conflict markers
//! - `objects`: object ids, blobs and commit records

pub mod branch;
pub mod diff;
pub mod graph;
pub mod merge;
pub mod objects;
