pub mod branch_name;
pub mod target;

pub const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";

/// Shortest commit id prefix accepted as a checkout, merge or diff target
pub const MIN_ABBREVIATED_ID_LENGTH: usize = 4;
