//! Commit comparison
//!
//! Compares the file sets of two commits path by path: which files were
//! added, deleted or point at a different blob.

pub mod file_diff;
