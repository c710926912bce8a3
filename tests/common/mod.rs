#![allow(dead_code)]

pub mod command;
pub mod file;

pub const REPOSITORY_DIR: &str = ".minigit";
