//! Findings reported by the analysis engine against a scan job.

use chrono::Utc;

use vigil_core::entities::Finding;
use vigil_core::enums::Severity;
use vigil_core::ids::PREFIX_FINDING;

use crate::error::DatabaseError;
use crate::helpers::{format_timestamp, get_count, get_opt_string, parse_datetime, parse_enum};
use crate::service::VigilService;

const SELECT_COLS: &str = "id, scan_job_id, severity, title, description, created_at";

fn row_to_finding(row: &libsql::Row) -> Result<Finding, DatabaseError> {
    Ok(Finding {
        id: row.get(0)?,
        scan_job_id: row.get(1)?,
        severity: parse_enum(&row.get::<String>(2)?)?,
        title: row.get(3)?,
        description: get_opt_string(row, 4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

impl VigilService {
    /// Attach a finding to a scan job.
    ///
    /// # Errors
    ///
    /// - `DatabaseError::Validation` if `title` is blank.
    /// - `DatabaseError::LibSql` if the job does not exist (foreign key).
    pub async fn record_finding(
        &self,
        scan_job_id: &str,
        severity: Severity,
        title: &str,
        description: Option<&str>,
    ) -> Result<Finding, DatabaseError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DatabaseError::Validation("finding title is required".into()));
        }

        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_FINDING).await?;

        self.db()
            .conn()
            .execute(
                &format!("INSERT INTO findings ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
                libsql::params![
                    id.as_str(),
                    scan_job_id,
                    severity.as_str(),
                    title,
                    description,
                    format_timestamp(now)
                ],
            )
            .await?;

        tracing::debug!(finding_id = %id, scan_job_id, %severity, "finding recorded");

        Ok(Finding {
            id,
            scan_job_id: scan_job_id.to_string(),
            severity,
            title: title.to_string(),
            description: description.map(str::to_string),
            created_at: now,
        })
    }

    pub async fn count_findings(&self, scan_job_id: &str) -> Result<u64, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT COUNT(*) FROM findings WHERE scan_job_id = ?1",
                [scan_job_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        get_count(&row, 0)
    }

    /// Findings for one job, in the order they were reported.
    pub async fn list_findings_for_job(
        &self,
        scan_job_id: &str,
    ) -> Result<Vec<Finding>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM findings WHERE scan_job_id = ?1
                     ORDER BY created_at, rowid"
                ),
                [scan_job_id],
            )
            .await?;

        let mut findings = Vec::new();
        while let Some(row) = rows.next().await? {
            findings.push(row_to_finding(&row)?);
        }
        Ok(findings)
    }
}
