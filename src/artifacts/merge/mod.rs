//! Three-way merge
//!
//! - `resolution`: per-path decision over the base, ours and theirs file sets
//! - `conflict`: conflict marker rendering for paths both sides changed

pub mod conflict;
pub mod resolution;
