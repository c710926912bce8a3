//! Persistent repository components
//!
//! - `database`: content-addressable store for blobs and commits
//! - `index`: staging area for the next commit
//! - `refs`: branches and HEAD
//! - `repository`: session object tying the components together
//! - `workspace`: working-tree file access

pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
