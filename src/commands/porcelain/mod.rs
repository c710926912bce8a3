//! User-facing commands
//!
//! - `init`: create a repository
//! - `add`: stage files for the next commit
//! - `commit`: record the staged snapshot
//! - `log`: show the first-parent history
//! - `branch`: create or list branches
//! - `checkout`: switch to a branch or commit
//! - `merge`: merge a branch or commit into HEAD
//! - `diff`: compare the files of two commits

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod diff;
pub mod init;
pub mod log;
pub mod merge;
