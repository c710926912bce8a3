use crate::artifacts::branch::INVALID_BRANCH_NAME_REGEX;
use crate::errors::{Error, Result};
use std::sync::LazyLock;

static INVALID_BRANCH_NAME: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(INVALID_BRANCH_NAME_REGEX).expect("invalid branch name regex")
});

/// Validated branch name, stored as `refs/<name>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        if name.is_empty() || INVALID_BRANCH_NAME.is_match(&name) {
            return Err(Error::InvalidBranchName(name));
        }

        Ok(Self(name))
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
