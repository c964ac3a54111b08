//! Entity structs for all vigil domain objects.
//!
//! Each entity maps to a table in the libSQL database. All structs derive
//! `Serialize`, `Deserialize`, and `JsonSchema`.

mod finding;
mod project;
mod scan_job;
mod user;

pub use finding::Finding;
pub use project::{Project, ProjectSummary};
pub use scan_job::{JobSummary, ScanJob};
pub use user::User;
