//! camelCase wire shapes for job responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vigil_core::entities::{JobSummary, ProjectSummary, ScanJob};
use vigil_core::enums::{JobStatus, JobType, ProjectStatus};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: String,
    pub name: String,
    pub status: ProjectStatus,
}

impl From<ProjectSummary> for ProjectResponse {
    fn from(project: ProjectSummary) -> Self {
        Self {
            id: project.id,
            name: project.name,
            status: project.status,
        }
    }
}

/// A scan job as returned by the API.
///
/// `project` and `vulnerabilityCount` are present on reads and omitted on
/// the create response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub id: String,
    pub project_id: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub status: JobStatus,
    pub config: serde_json::Value,
    pub progress: u8,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vulnerability_count: Option<u64>,
}

impl From<ScanJob> for JobResponse {
    fn from(job: ScanJob) -> Self {
        Self {
            id: job.id,
            project_id: job.project_id,
            job_type: job.job_type,
            status: job.status,
            config: job.config,
            progress: job.progress,
            error: job.error,
            started_at: job.started_at,
            completed_at: job.completed_at,
            project: None,
            vulnerability_count: None,
        }
    }
}

impl From<JobSummary> for JobResponse {
    fn from(summary: JobSummary) -> Self {
        Self {
            project: Some(summary.project.into()),
            vulnerability_count: Some(summary.vulnerability_count),
            ..summary.job.into()
        }
    }
}

/// Query string of the list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListJobsQuery {
    pub project_id: Option<String>,
}
