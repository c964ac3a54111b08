//! Project repository and parent-status synchronization.
//!
//! The synchronizer methods are plain status writes. The job store never
//! calls them: the orchestrator issues job and project writes separately so a
//! failure between the two stays observable.

use chrono::Utc;

use vigil_core::entities::Project;
use vigil_core::enums::ProjectStatus;
use vigil_core::ids::PREFIX_PROJECT;

use crate::error::DatabaseError;
use crate::helpers::{format_timestamp, parse_datetime, parse_enum};
use crate::service::VigilService;

const SELECT_COLS: &str = "id, owner_id, name, status, created_at, updated_at";

fn row_to_project(row: &libsql::Row) -> Result<Project, DatabaseError> {
    Ok(Project {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        status: parse_enum(&row.get::<String>(3)?)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
        updated_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

impl VigilService {
    pub async fn create_project(&self, owner_id: &str, name: &str) -> Result<Project, DatabaseError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DatabaseError::Validation("project name is required".into()));
        }

        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_PROJECT).await?;

        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO projects ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?5)"
                ),
                libsql::params![
                    id.as_str(),
                    owner_id,
                    name,
                    ProjectStatus::Idle.as_str(),
                    format_timestamp(now)
                ],
            )
            .await?;

        Ok(Project {
            id,
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            status: ProjectStatus::Idle,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_project(&self, id: &str) -> Result<Project, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM projects WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_project(&row)
    }

    /// Fetch a project only if `owner_id` owns it.
    ///
    /// A project owned by someone else is indistinguishable from a missing one.
    pub async fn get_owned_project(
        &self,
        owner_id: &str,
        project_id: &str,
    ) -> Result<Option<Project>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM projects WHERE id = ?1 AND owner_id = ?2"),
                [project_id, owner_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_project(&row)?)),
            None => Ok(None),
        }
    }

    /// Mark the project as having a job in progress.
    pub async fn mark_project_analyzing(&self, project_id: &str) -> Result<(), DatabaseError> {
        self.set_project_status(project_id, ProjectStatus::Analyzing)
            .await
    }

    /// Mark the project failed after a dispatched job's execution raised.
    pub async fn mark_project_failed(&self, project_id: &str) -> Result<(), DatabaseError> {
        self.set_project_status(project_id, ProjectStatus::Failed)
            .await
    }

    /// Mark the project completed. Written by the analysis engine, not the orchestrator.
    pub async fn mark_project_completed(&self, project_id: &str) -> Result<(), DatabaseError> {
        self.set_project_status(project_id, ProjectStatus::Completed)
            .await
    }

    async fn set_project_status(
        &self,
        project_id: &str,
        status: ProjectStatus,
    ) -> Result<(), DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute(
                "UPDATE projects SET status = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![status.as_str(), format_timestamp(Utc::now()), project_id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NotFound {
                entity: "project",
                id: project_id.to_string(),
            });
        }
        tracing::debug!(project_id, status = %status, "project status updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_project, seed_user, test_service};

    #[tokio::test]
    async fn create_project_starts_idle() {
        let svc = test_service().await;
        let (user, project) = seed_project(&svc, "owner@example.com", "token-vault").await;

        assert!(project.id.starts_with("prj-"));
        assert_eq!(project.owner_id, user.id);
        assert_eq!(project.status, ProjectStatus::Idle);

        let fetched = svc.get_project(&project.id).await.unwrap();
        assert_eq!(fetched.name, "token-vault");
    }

    #[tokio::test]
    async fn blank_project_name_is_rejected() {
        let svc = test_service().await;
        let user = seed_user(&svc, "owner@example.com").await;
        let result = svc.create_project(&user.id, "   ").await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));
    }

    #[tokio::test]
    async fn ownership_scopes_lookup() {
        let svc = test_service().await;
        let (owner, project) = seed_project(&svc, "owner@example.com", "mine").await;
        let stranger = seed_user(&svc, "stranger@example.com").await;

        assert!(svc.get_owned_project(&owner.id, &project.id).await.unwrap().is_some());
        assert!(svc.get_owned_project(&stranger.id, &project.id).await.unwrap().is_none());
        assert!(svc.get_owned_project(&owner.id, "prj-missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn status_sync_writes() {
        let svc = test_service().await;
        let (_, project) = seed_project(&svc, "owner@example.com", "p").await;

        svc.mark_project_analyzing(&project.id).await.unwrap();
        assert_eq!(svc.get_project(&project.id).await.unwrap().status, ProjectStatus::Analyzing);

        svc.mark_project_failed(&project.id).await.unwrap();
        assert_eq!(svc.get_project(&project.id).await.unwrap().status, ProjectStatus::Failed);

        svc.mark_project_completed(&project.id).await.unwrap();
        assert_eq!(svc.get_project(&project.id).await.unwrap().status, ProjectStatus::Completed);
    }

    #[tokio::test]
    async fn status_sync_on_missing_project_is_not_found() {
        let svc = test_service().await;
        let result = svc.mark_project_analyzing("prj-missing").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { entity: "project", .. })));
    }
}
