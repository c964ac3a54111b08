//! Repository modules implementing the store operations.
//!
//! Each module adds methods to `VigilService` via `impl VigilService` blocks.

pub mod finding;
pub mod project;
pub mod scan_job;
pub mod user;
