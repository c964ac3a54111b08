//! # vigil-server
//!
//! axum HTTP surface over the scan job orchestrator.
//!
//! | Route                  | Purpose                                  |
//! |------------------------|------------------------------------------|
//! | `POST /api/jobs`       | create and dispatch a scan job           |
//! | `GET /api/jobs`        | list jobs, optional `?projectId=` filter |
//! | `GET /api/jobs/{id}`   | one job owned by the session's user      |
//! | `GET /health`          | liveness                                 |

pub mod dto;
pub mod error;
pub mod handlers;
pub mod session;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the application router.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/jobs",
            post(handlers::create_job).get(handlers::list_jobs),
        )
        .route("/api/jobs/{id}", get(handlers::get_job))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
