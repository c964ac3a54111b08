use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::{Value, json};

use vigil_jobs::CreateJobRequest;

use crate::dto::{JobResponse, ListJobsQuery};
use crate::error::{AppError, AppResult};
use crate::session::Session;
use crate::state::AppState;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /api/jobs`
///
/// The session is checked before the body, so an anonymous caller gets 401
/// even with a malformed payload. The dispatch handle is dropped: the
/// response goes out while analysis runs on its own task.
pub async fn create_job(
    State(state): State<AppState>,
    Session(session): Session,
    payload: Result<Json<CreateJobRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<JobResponse>)> {
    if session.is_anonymous() {
        return Err(AppError::unauthorized("Unauthorized"));
    }
    let Json(request) = payload?;

    let created = state.orchestrator.create_job(&session, request).await?;
    Ok((StatusCode::CREATED, Json(created.job.into())))
}

/// `GET /api/jobs?projectId=`
pub async fn list_jobs(
    State(state): State<AppState>,
    Session(session): Session,
    Query(query): Query<ListJobsQuery>,
) -> AppResult<Json<Vec<JobResponse>>> {
    let jobs = state
        .orchestrator
        .list_jobs(&session, query.project_id.as_deref())
        .await?;
    Ok(Json(jobs.into_iter().map(JobResponse::from).collect()))
}

/// `GET /api/jobs/{id}`
pub async fn get_job(
    State(state): State<AppState>,
    Session(session): Session,
    Path(id): Path<String>,
) -> AppResult<Json<JobResponse>> {
    let job = state.orchestrator.get_job(&session, &id).await?;
    Ok(Json(job.into()))
}
