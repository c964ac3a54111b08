//! Job creation flow and the read path over the job store.

use std::sync::Arc;

use serde::Deserialize;
use tokio::task::JoinHandle;

use vigil_core::entities::{JobSummary, ScanJob};
use vigil_core::enums::JobType;
use vigil_core::identity::SessionIdentity;
use vigil_db::service::VigilService;

use crate::dispatcher::{DispatchOutcome, Dispatcher};
use crate::error::OrchestratorError;

/// Body of a create-job request.
///
/// `type` is advisory and normalized. `config` must be an object when present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub project_id: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    pub config: Option<serde_json::Value>,
}

/// A freshly created job and the handle of its background dispatch.
#[derive(Debug)]
pub struct JobCreation {
    pub job: ScanJob,
    pub dispatch: JoinHandle<DispatchOutcome>,
}

#[derive(Debug, Clone)]
pub struct Orchestrator {
    service: Arc<VigilService>,
    dispatcher: Dispatcher,
}

impl Orchestrator {
    #[must_use]
    pub const fn new(service: Arc<VigilService>, dispatcher: Dispatcher) -> Self {
        Self {
            service,
            dispatcher,
        }
    }

    #[must_use]
    pub fn service(&self) -> &VigilService {
        &self.service
    }

    /// Create a scan job for `session` and dispatch it.
    ///
    /// Steps, in order: reject anonymous sessions, validate the request,
    /// resolve the user, normalize the job type, persist the `PENDING` job,
    /// mark the project `ANALYZING`, dispatch. Nothing is written if any step
    /// before persistence fails.
    ///
    /// The dispatched task may start, or finish, before the project write
    /// lands. If the project write fails the job stays `PENDING` and is not
    /// dispatched.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` when the session has neither user id nor email.
    /// - `Validation` when `projectId` is missing or `config` is not an object.
    /// - `NotFound` when the project is absent or owned by someone else.
    /// - `Identity` or `Store` when the store fails.
    pub async fn create_job(
        &self,
        session: &SessionIdentity,
        request: CreateJobRequest,
    ) -> Result<JobCreation, OrchestratorError> {
        if session.is_anonymous() {
            return Err(OrchestratorError::Unauthorized);
        }

        let project_id = request
            .project_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| OrchestratorError::Validation("projectId is required".into()))?;

        let config = match request.config {
            None | Some(serde_json::Value::Null) => serde_json::json!({}),
            Some(config @ serde_json::Value::Object(_)) => config,
            Some(_) => {
                return Err(OrchestratorError::Validation(
                    "config must be a JSON object".into(),
                ));
            }
        };

        let user = self.service.resolve_user(session).await?;
        let job_type = JobType::normalize(request.job_type.as_deref());

        let job = self
            .service
            .create_job(&user.id, project_id, job_type, &config)
            .await?;

        if let Err(e) = self.service.mark_project_analyzing(project_id).await {
            tracing::error!(
                job_id = %job.id,
                project_id,
                error = %e,
                "job created but project status sync failed; not dispatching"
            );
            return Err(e.into());
        }

        tracing::info!(
            job_id = %job.id,
            project_id,
            user_id = %user.id,
            job_type = %job.job_type,
            "scan job created"
        );

        let dispatch = self.dispatcher.dispatch(&job);
        Ok(JobCreation { job, dispatch })
    }

    /// Jobs visible to `session`, optionally scoped to one project.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for anonymous sessions, otherwise store errors.
    pub async fn list_jobs(
        &self,
        session: &SessionIdentity,
        project_id: Option<&str>,
    ) -> Result<Vec<JobSummary>, OrchestratorError> {
        if session.is_anonymous() {
            return Err(OrchestratorError::Unauthorized);
        }
        let user = self.service.resolve_user(session).await?;
        let project_id = project_id.map(str::trim).filter(|id| !id.is_empty());
        Ok(self.service.list_jobs(&user.id, project_id).await?)
    }

    /// One job, if the session's user owns its project.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for anonymous sessions, `NotFound` when the job is not
    /// visible to the user.
    pub async fn get_job(
        &self,
        session: &SessionIdentity,
        job_id: &str,
    ) -> Result<JobSummary, OrchestratorError> {
        if session.is_anonymous() {
            return Err(OrchestratorError::Unauthorized);
        }
        let user = self.service.resolve_user(session).await?;
        self.service
            .get_job_for_owner(&user.id, job_id)
            .await?
            .ok_or_else(|| OrchestratorError::NotFound {
                entity: "scan job",
                id: job_id.to_string(),
            })
    }
}
