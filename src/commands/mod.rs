//! Repository commands
//!
//! Every command is an `impl Repository` block in `porcelain` that returns a
//! typed outcome. The outcome's `Display` is the summary shown to the user;
//! the commands themselves never write to the console.

pub mod porcelain;
