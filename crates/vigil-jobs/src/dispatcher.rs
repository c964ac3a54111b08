//! Fire-and-forget dispatch with deferred compensation.
//!
//! [`Dispatcher::dispatch`] spawns the engine call on its own tokio task and
//! returns the handle immediately. On success nothing else happens: the
//! engine owns progress and completion. On failure the task writes the
//! terminal `FAILED` state to the job, then to its project.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinHandle;

use vigil_core::entities::ScanJob;
use vigil_core::enums::JobStatus;
use vigil_db::error::DatabaseError;
use vigil_db::retry::{RetryConfig, retry_async};
use vigil_db::service::VigilService;

use crate::engine::AnalysisEngine;

/// How one dispatched execution ended, as seen by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The engine accepted the job. No core-driven writes followed.
    Succeeded,
    /// The engine failed and the failure was persisted on the job and project.
    Compensated { message: String },
    /// The engine failed but the job was already terminal (or gone), so the
    /// core did not rewrite it. A job that ended `FAILED` still has its
    /// project marked `FAILED`; a `COMPLETED` job leaves the project alone.
    JobUnchanged {
        message: String,
        job_status: Option<JobStatus>,
    },
    /// The engine failed and persisting the failure also failed. The job is
    /// left in whatever state it had before.
    CompensationFailed { message: String, cause: String },
}

#[derive(Clone)]
pub struct Dispatcher {
    service: Arc<VigilService>,
    engine: Arc<dyn AnalysisEngine>,
    retry: RetryConfig,
}

impl Dispatcher {
    #[must_use]
    pub fn new(service: Arc<VigilService>, engine: Arc<dyn AnalysisEngine>) -> Self {
        Self {
            service,
            engine,
            retry: RetryConfig::default(),
        }
    }

    /// Bound the compensating writes by `retry`. The default is a single attempt.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Start analysis of `job` on a background task.
    ///
    /// Returns before the engine is guaranteed to have started. Dropping the
    /// handle detaches the task; it still runs to completion.
    pub fn dispatch(&self, job: &ScanJob) -> JoinHandle<DispatchOutcome> {
        let this = self.clone();
        let job_id = job.id.clone();
        let project_id = job.project_id.clone();
        tracing::info!(job_id = %job_id, project_id = %project_id, "dispatching scan job");
        tokio::spawn(async move { this.run(&job_id, &project_id).await })
    }

    async fn run(&self, job_id: &str, project_id: &str) -> DispatchOutcome {
        let started = AssertUnwindSafe(self.engine.start_analysis(job_id))
            .catch_unwind()
            .await;

        let message = match started {
            Ok(Ok(())) => {
                tracing::debug!(job_id, "analysis engine accepted job");
                return DispatchOutcome::Succeeded;
            }
            Ok(Err(e)) => format!("{e:#}"),
            Err(panic) => panic_message(panic.as_ref()),
        };

        tracing::warn!(job_id, project_id, error = %message, "analysis failed, compensating");

        match self.compensate(job_id, project_id, &message).await {
            Ok(Compensation::Written) => DispatchOutcome::Compensated { message },
            Ok(Compensation::JobUnchanged(job_status)) => {
                DispatchOutcome::JobUnchanged {
                    message,
                    job_status,
                }
            }
            Err(cause) => {
                tracing::error!(
                    job_id,
                    project_id,
                    error = %message,
                    cause = %cause,
                    "failed to persist analysis failure; job left unchanged"
                );
                DispatchOutcome::CompensationFailed {
                    message,
                    cause: cause.to_string(),
                }
            }
        }
    }

    /// Job first, then project. The project write is skipped only when the
    /// job already completed or no longer exists.
    async fn compensate(
        &self,
        job_id: &str,
        project_id: &str,
        message: &str,
    ) -> Result<Compensation, DatabaseError> {
        let changed = retry_async(&self.retry, "mark_job_failed", || {
            self.service.mark_job_failed(job_id, message)
        })
        .await?;

        if changed {
            self.fail_project(project_id).await?;
            return Ok(Compensation::Written);
        }

        let job_status = match self.service.get_job(job_id).await {
            Ok(job) => Some(job.status),
            Err(DatabaseError::NoResult) => None,
            Err(e) => return Err(e),
        };
        tracing::debug!(job_id, ?job_status, "job not rewritten by compensation");

        if job_status == Some(JobStatus::Failed) {
            self.fail_project(project_id).await?;
        }
        Ok(Compensation::JobUnchanged(job_status))
    }

    async fn fail_project(&self, project_id: &str) -> Result<(), DatabaseError> {
        retry_async(&self.retry, "mark_project_failed", || {
            self.service.mark_project_failed(project_id)
        })
        .await
    }
}

enum Compensation {
    Written,
    JobUnchanged(Option<JobStatus>),
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "analysis engine panicked".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    struct Failing(&'static str);

    #[async_trait]
    impl AnalysisEngine for Failing {
        async fn start_analysis(&self, _job_id: &str) -> anyhow::Result<()> {
            anyhow::bail!(self.0)
        }
    }

    #[test]
    fn panic_payloads_become_messages() {
        let literal: Box<dyn Any + Send> = Box::new("engine exploded");
        assert_eq!(panic_message(literal.as_ref()), "engine exploded");

        let owned: Box<dyn Any + Send> = Box::new(String::from("index out of range"));
        assert_eq!(panic_message(owned.as_ref()), "index out of range");

        let other: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(other.as_ref()), "analysis engine panicked");
    }

    #[tokio::test]
    async fn failure_on_vanished_job_writes_nothing() {
        let service = Arc::new(VigilService::new_local(":memory:").await.unwrap());
        let dispatcher = Dispatcher::new(service, Arc::new(Failing("boom")));

        let outcome = dispatcher.run("job-missing", "prj-missing").await;
        assert_eq!(
            outcome,
            DispatchOutcome::JobUnchanged {
                message: "boom".into(),
                job_status: None,
            }
        );
    }
}
