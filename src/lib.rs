//! A minimal version-control engine
//!
//! Content-addressed blobs and commits, an append-only commit graph with
//! merge-base search, branches and HEAD, a staging index and a three-way
//! merge that marks conflicts in the working tree.

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;
