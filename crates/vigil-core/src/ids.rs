//! ID prefixes for every stored entity.
//!
//! IDs are generated by the store as `{prefix}-{8 hex chars}`, e.g. `job-a3f8b2c1`.

pub const PREFIX_USER: &str = "usr";
pub const PREFIX_PROJECT: &str = "prj";
pub const PREFIX_SCAN_JOB: &str = "job";
pub const PREFIX_FINDING: &str = "fnd";
