//! Commit DAG and merge-base computation

pub mod commit_graph;
pub mod merge_base;
