/// Constants used throughout the groundwork codebase

// Remote cache layout
pub const DEFAULT_CACHE_ROOT: &str = "/var/lib/groundwork";
pub const DEFAULT_GROUP: &str = "groundwork";
pub const DONE_SUFFIX: &str = ".done";
pub const FAILED_SUFFIX: &str = ".failed";

// Mode for cache directories: group writable plus set-group-ID
pub const CACHE_DIR_MODE: &str = "2775";

// Package names starting with this prefix are managed internally
pub const RESERVED_TASK_PREFIX: &str = "gw.";

// Length of a hex encoded SHA-256 digest
pub const CHECKSUM_LEN: usize = 64;

pub const SUPERUSER: &str = "root";
pub const DEFAULT_SSH_PORT: u16 = 22;

// Environment variable names
pub const GROUNDWORK_LOG_VAR: &str = "GROUNDWORK_LOG";
pub const GROUNDWORK_USER_VAR: &str = "GROUNDWORK_USER";
pub const GROUNDWORK_CACHE_ROOT_VAR: &str = "GROUNDWORK_CACHE_ROOT";
pub const GROUNDWORK_GROUP_VAR: &str = "GROUNDWORK_GROUP";
pub const GROUNDWORK_DRY_RUN_VAR: &str = "GROUNDWORK_DRY_RUN";
