//! Scan job store: creation, failure writes, engine progress, and listings.
//!
//! Listings are always scoped by project ownership, never by raw project id,
//! so one user can never read another user's jobs.

use chrono::Utc;

use vigil_core::entities::{JobSummary, ProjectSummary, ScanJob};
use vigil_core::enums::{JobStatus, JobType};
use vigil_core::ids::PREFIX_SCAN_JOB;

use crate::error::DatabaseError;
use crate::helpers::{
    format_timestamp, get_count, get_opt_string, get_progress, parse_datetime, parse_enum,
    parse_json, parse_optional_datetime,
};
use crate::service::VigilService;

const SELECT_COLS: &str = "id, project_id, type, status, config, progress, error, \
                           started_at, completed_at, created_at, updated_at";

/// Job columns plus the embedded project summary and finding count.
const SUMMARY_SELECT: &str = "SELECT j.id, j.project_id, j.type, j.status, j.config, j.progress, \
     j.error, j.started_at, j.completed_at, j.created_at, j.updated_at, \
     p.name, p.status, \
     (SELECT COUNT(*) FROM findings f WHERE f.scan_job_id = j.id) \
     FROM scan_jobs j JOIN projects p ON p.id = j.project_id";

fn row_to_job(row: &libsql::Row) -> Result<ScanJob, DatabaseError> {
    Ok(ScanJob {
        id: row.get(0)?,
        project_id: row.get(1)?,
        job_type: parse_enum(&row.get::<String>(2)?)?,
        status: parse_enum(&row.get::<String>(3)?)?,
        config: parse_json(&row.get::<String>(4)?)?,
        progress: get_progress(row, 5)?,
        error: get_opt_string(row, 6)?,
        started_at: parse_datetime(&row.get::<String>(7)?)?,
        completed_at: parse_optional_datetime(get_opt_string(row, 8)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
        updated_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

fn row_to_summary(row: &libsql::Row) -> Result<JobSummary, DatabaseError> {
    let job = row_to_job(row)?;
    let project = ProjectSummary {
        id: job.project_id.clone(),
        name: row.get(11)?,
        status: parse_enum(&row.get::<String>(12)?)?,
    };
    Ok(JobSummary {
        job,
        project,
        vulnerability_count: get_count(row, 13)?,
    })
}

impl VigilService {
    /// Insert a new `PENDING` job for a project owned by `owner_id`.
    ///
    /// Only persists the job. Marking the project as analyzing is a separate
    /// call the orchestrator makes afterwards.
    ///
    /// # Errors
    ///
    /// - `DatabaseError::Validation` if an identifier is missing or `config`
    ///   is neither an object nor null.
    /// - `DatabaseError::NotFound` if the project does not exist or is not
    ///   owned by `owner_id`.
    pub async fn create_job(
        &self,
        owner_id: &str,
        project_id: &str,
        job_type: JobType,
        config: &serde_json::Value,
    ) -> Result<ScanJob, DatabaseError> {
        if owner_id.trim().is_empty() {
            return Err(DatabaseError::Validation("owner id is required".into()));
        }
        if project_id.trim().is_empty() {
            return Err(DatabaseError::Validation("projectId is required".into()));
        }
        let config = match config {
            serde_json::Value::Null => serde_json::Value::Object(serde_json::Map::new()),
            serde_json::Value::Object(_) => config.clone(),
            _ => {
                return Err(DatabaseError::Validation(
                    "config must be a JSON object".into(),
                ));
            }
        };

        if self.get_owned_project(owner_id, project_id).await?.is_none() {
            return Err(DatabaseError::NotFound {
                entity: "project",
                id: project_id.to_string(),
            });
        }

        let now = Utc::now();
        let ts = format_timestamp(now);
        let id = self.db().generate_id(PREFIX_SCAN_JOB).await?;
        let config_text =
            serde_json::to_string(&config).map_err(|e| DatabaseError::Other(e.into()))?;

        self.db()
            .conn()
            .execute(
                "INSERT INTO scan_jobs (id, project_id, type, status, config, progress, error,
                                        started_at, completed_at, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0, NULL, ?6, NULL, ?6, ?6)",
                libsql::params![
                    id.as_str(),
                    project_id,
                    job_type.as_str(),
                    JobStatus::Pending.as_str(),
                    config_text,
                    ts
                ],
            )
            .await?;

        tracing::debug!(job_id = %id, project_id, job_type = %job_type, "scan job created");

        Ok(ScanJob {
            id,
            project_id: project_id.to_string(),
            job_type,
            status: JobStatus::Pending,
            config,
            progress: 0,
            error: None,
            started_at: now,
            completed_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_job(&self, id: &str) -> Result<ScanJob, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM scan_jobs WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_job(&row)
    }

    /// Fetch one job with its project and finding count, if `owner_id` owns it.
    pub async fn get_job_for_owner(
        &self,
        owner_id: &str,
        job_id: &str,
    ) -> Result<Option<JobSummary>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("{SUMMARY_SELECT} WHERE j.id = ?1 AND p.owner_id = ?2"),
                [job_id, owner_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_summary(&row)?)),
            None => Ok(None),
        }
    }

    /// List jobs on projects owned by `owner_id`, newest first.
    ///
    /// Optionally restricted to one project. Bounded by the service's list
    /// limit. Returns an empty list when nothing matches.
    pub async fn list_jobs(
        &self,
        owner_id: &str,
        project_id: Option<&str>,
    ) -> Result<Vec<JobSummary>, DatabaseError> {
        let mut params: Vec<libsql::Value> = vec![libsql::Value::Text(owner_id.to_string())];
        let mut conditions = vec!["p.owner_id = ?1".to_string()];

        if let Some(project_id) = project_id {
            params.push(libsql::Value::Text(project_id.to_string()));
            conditions.push(format!("j.project_id = ?{}", params.len()));
        }

        params.push(libsql::Value::Integer(i64::from(self.list_limit())));
        let sql = format!(
            "{SUMMARY_SELECT} WHERE {} ORDER BY j.started_at DESC, j.rowid DESC LIMIT ?{}",
            conditions.join(" AND "),
            params.len()
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;

        let mut jobs = Vec::new();
        while let Some(row) = rows.next().await? {
            jobs.push(row_to_summary(&row)?);
        }
        Ok(jobs)
    }

    /// Write the terminal `FAILED` state: error message stored, progress reset to 0.
    ///
    /// Guarded: a job that is already `COMPLETED` or `FAILED` is left untouched,
    /// so repeated calls are harmless. Returns whether a row changed.
    pub async fn mark_job_failed(&self, job_id: &str, message: &str) -> Result<bool, DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute(
                "UPDATE scan_jobs SET status = ?1, error = ?2, progress = 0, updated_at = ?3
                 WHERE id = ?4 AND status NOT IN (?5, ?6)",
                libsql::params![
                    JobStatus::Failed.as_str(),
                    message,
                    format_timestamp(Utc::now()),
                    job_id,
                    JobStatus::Completed.as_str(),
                    JobStatus::Failed.as_str()
                ],
            )
            .await?;
        if changed == 0 {
            tracing::debug!(job_id, "failure write skipped: job missing or already terminal");
        }
        Ok(changed > 0)
    }

    /// Engine-side progress report. Moves `PENDING` to `RUNNING`; clamps to 100.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if the job is already terminal.
    pub async fn record_job_progress(
        &self,
        job_id: &str,
        progress: u8,
    ) -> Result<ScanJob, DatabaseError> {
        let current = self.get_job(job_id).await?;
        if current.status.is_terminal() {
            return Err(DatabaseError::InvalidState(format!(
                "Cannot record progress on job {job_id} in terminal state {}",
                current.status
            )));
        }

        let progress = progress.min(100);
        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "UPDATE scan_jobs SET status = ?1, progress = ?2, updated_at = ?3 WHERE id = ?4",
                libsql::params![
                    JobStatus::Running.as_str(),
                    i64::from(progress),
                    format_timestamp(now),
                    job_id
                ],
            )
            .await?;

        Ok(ScanJob {
            status: JobStatus::Running,
            progress,
            updated_at: now,
            ..current
        })
    }

    /// Engine-side completion. Sets progress to 100 and `completed_at`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Core` unless the job is `RUNNING`.
    pub async fn complete_job(&self, job_id: &str) -> Result<ScanJob, DatabaseError> {
        let current = self.get_job(job_id).await?;
        current.status.ensure_transition(job_id, JobStatus::Completed)?;

        let now = Utc::now();
        let ts = format_timestamp(now);
        self.db()
            .conn()
            .execute(
                "UPDATE scan_jobs SET status = ?1, progress = 100, completed_at = ?2, updated_at = ?2
                 WHERE id = ?3",
                libsql::params![JobStatus::Completed.as_str(), ts, job_id],
            )
            .await?;

        Ok(ScanJob {
            status: JobStatus::Completed,
            progress: 100,
            completed_at: Some(now),
            updated_at: now,
            ..current
        })
    }
}
