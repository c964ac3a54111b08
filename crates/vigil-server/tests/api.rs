//! HTTP surface tests driven through the axum router with `oneshot`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

use vigil_core::entities::Project;
use vigil_core::identity::SessionIdentity;
use vigil_db::service::VigilService;
use vigil_jobs::{AnalysisEngine, Dispatcher, Orchestrator};
use vigil_server::session::{USER_EMAIL_HEADER, USER_NAME_HEADER};
use vigil_server::{AppState, create_app};

struct Accepting;

#[async_trait]
impl AnalysisEngine for Accepting {
    async fn start_analysis(&self, _job_id: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

const ADA: &str = "ada@example.com";

async fn test_app() -> (Router, Arc<VigilService>) {
    let service = Arc::new(VigilService::new_local(":memory:").await.unwrap());
    let dispatcher = Dispatcher::new(Arc::clone(&service), Arc::new(Accepting));
    let state = AppState::new(Orchestrator::new(Arc::clone(&service), dispatcher));
    (create_app(state), service)
}

async fn seed_project(svc: &VigilService, email: &str, name: &str) -> Project {
    let user = svc
        .resolve_user(&SessionIdentity {
            email: Some(email.to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    svc.create_project(&user.id, name).await.unwrap()
}

fn post_json(email: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/jobs")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(email) = email {
        builder = builder.header(USER_EMAIL_HEADER, email);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, email: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(email) = email {
        builder = builder.header(USER_EMAIL_HEADER, email);
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

// ---------------------------------------------------------------------------
// POST /api/jobs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_returns_201_with_pending_job() {
    let (app, svc) = test_app().await;
    let project = seed_project(&svc, ADA, "vault").await;

    let body = json!({"projectId": project.id, "type": "gas_optimization", "config": {"runs": 200}});
    let (status, job) = send(&app, post_json(Some(ADA), &body.to_string())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(job["status"], "PENDING");
    assert_eq!(job["type"], "GAS_OPTIMIZATION");
    assert_eq!(job["progress"], 0);
    assert_eq!(job["projectId"], project.id.as_str());
    assert_eq!(job["config"], json!({"runs": 200}));
    assert!(job["error"].is_null());
    assert!(job["id"].as_str().unwrap().starts_with("job-"));
}

#[tokio::test]
async fn create_without_session_is_401() {
    let (app, svc) = test_app().await;
    let project = seed_project(&svc, ADA, "vault").await;

    let body = json!({"projectId": project.id});
    let (status, error) = send(&app, post_json(None, &body.to_string())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error["error"]["status"], 401);
}

#[tokio::test]
async fn create_with_non_json_body_is_415() {
    let (app, _svc) = test_app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/jobs")
        .header(header::CONTENT_TYPE, "text/plain")
        .header(USER_EMAIL_HEADER, ADA)
        .body(Body::from("projectId=prj-1"))
        .unwrap();

    let (status, error) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(error["error"]["status"], 415);
}

#[tokio::test]
async fn create_with_malformed_json_is_400() {
    let (app, _svc) = test_app().await;
    let (status, _) = send(&app, post_json(Some(ADA), "{\"projectId\": ")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_without_project_id_is_400_and_writes_nothing() {
    let (app, _svc) = test_app().await;
    let (status, error) = send(&app, post_json(Some(ADA), r#"{"type": "QUICK"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"]["message"], "projectId is required");

    let (status, jobs) = send(&app, get("/api/jobs", Some(ADA))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(jobs, json!([]));
}

#[tokio::test]
async fn create_with_array_config_is_400() {
    let (app, svc) = test_app().await;
    let project = seed_project(&svc, ADA, "vault").await;
    let body = json!({"projectId": project.id, "config": [1, 2, 3]});
    let (status, _) = send(&app, post_json(Some(ADA), &body.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_on_foreign_project_is_404() {
    let (app, svc) = test_app().await;
    let project = seed_project(&svc, "owner@example.com", "vault").await;

    let body = json!({"projectId": project.id});
    let (status, error) = send(&app, post_json(Some(ADA), &body.to_string())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"]["message"], "Project not found");
}

#[tokio::test]
async fn session_profile_is_recorded_on_first_request() {
    let (app, svc) = test_app().await;
    let request = Request::builder()
        .uri("/api/jobs")
        .header(USER_EMAIL_HEADER, "grace@example.com")
        .header(USER_NAME_HEADER, "Grace")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let user = svc
        .find_user_by_email("grace@example.com")
        .await
        .unwrap()
        .expect("user created on first sight");
    assert_eq!(user.name.as_deref(), Some("Grace"));
}

// ---------------------------------------------------------------------------
// GET /api/jobs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_filters_by_project() {
    let (app, svc) = test_app().await;
    let first = seed_project(&svc, ADA, "first").await;
    let second = seed_project(&svc, ADA, "second").await;

    for project in [&first, &second] {
        let body = json!({"projectId": project.id});
        let (status, _) = send(&app, post_json(Some(ADA), &body.to_string())).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, jobs) = send(&app, get(&format!("/api/jobs?projectId={}", first.id), Some(ADA))).await;
    assert_eq!(status, StatusCode::OK);
    let jobs = jobs.as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["projectId"], first.id.as_str());
    assert_eq!(jobs[0]["project"]["name"], "first");
    assert_eq!(jobs[0]["project"]["status"], "ANALYZING");
    assert_eq!(jobs[0]["vulnerabilityCount"], 0);

    let (_, all) = send(&app, get("/api/jobs", Some(ADA))).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn list_without_session_is_401() {
    let (app, _svc) = test_app().await;
    let (status, _) = send(&app, get("/api/jobs", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// GET /api/jobs/{id}
// ---------------------------------------------------------------------------

#[tokio::test]
async fn single_job_is_visible_only_to_owner() {
    let (app, svc) = test_app().await;
    let project = seed_project(&svc, ADA, "vault").await;
    let body = json!({"projectId": project.id});
    let (_, created) = send(&app, post_json(Some(ADA), &body.to_string())).await;
    let uri = format!("/api/jobs/{}", created["id"].as_str().unwrap());

    let (status, job) = send(&app, get(&uri, Some(ADA))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(job["id"], created["id"]);
    assert_eq!(job["project"]["id"], project.id.as_str());

    let (status, _) = send(&app, get(&uri, Some("eve@example.com"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_is_ok() {
    let (app, _svc) = test_app().await;
    let (status, body) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}
