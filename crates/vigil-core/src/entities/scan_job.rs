use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::ProjectSummary;
use crate::enums::{JobStatus, JobType};

/// One unit of asynchronous analysis work tied to a project.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ScanJob {
    pub id: String,
    pub project_id: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub status: JobStatus,
    /// Opaque key/value payload handed through to the analysis engine.
    pub config: serde_json::Value,
    /// 0–100.
    pub progress: u8,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A scan job as returned by listings: the job, its project, and its finding count.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct JobSummary {
    #[serde(flatten)]
    pub job: ScanJob,
    pub project: ProjectSummary,
    pub vulnerability_count: u64,
}
