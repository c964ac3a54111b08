//! Shared test utilities for vigil-db unit tests.

use vigil_core::entities::{Project, User};
use vigil_core::identity::SessionIdentity;

use crate::service::VigilService;

/// Create an in-memory service.
pub async fn test_service() -> VigilService {
    VigilService::new_local(":memory:").await.unwrap()
}

/// Session that identifies a user by email only.
pub fn email_session(email: &str) -> SessionIdentity {
    SessionIdentity {
        email: Some(email.to_string()),
        ..Default::default()
    }
}

/// Resolve (creating if needed) a user by email.
pub async fn seed_user(svc: &VigilService, email: &str) -> User {
    svc.resolve_user(&email_session(email)).await.unwrap()
}

/// Create a user with one project.
pub async fn seed_project(svc: &VigilService, email: &str, name: &str) -> (User, Project) {
    let user = seed_user(svc, email).await;
    let project = svc.create_project(&user.id, name).await.unwrap();
    (user, project)
}
