use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use vigil_jobs::OrchestratorError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unsupported_media_type(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<OrchestratorError> for AppError {
    fn from(err: OrchestratorError) -> Self {
        match err {
            OrchestratorError::Unauthorized => Self::unauthorized("Unauthorized"),
            OrchestratorError::Validation(msg) => Self::bad_request(msg),
            OrchestratorError::NotFound { entity, .. } => {
                Self::not_found(format!("{} not found", capitalize(entity)))
            }
            OrchestratorError::Identity(msg) => {
                tracing::error!(error = %msg, "session could not be resolved to a user");
                Self::internal("Failed to resolve user")
            }
            OrchestratorError::Store(err) => {
                tracing::error!(error = %err, "database operation failed");
                Self::internal("Database operation failed")
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                Self::unsupported_media_type("Expected request with `Content-Type: application/json`")
            }
            other => Self::bad_request(other.body_text()),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orchestrator_errors_map_to_status_codes() {
        let cases = [
            (OrchestratorError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                OrchestratorError::Validation("projectId is required".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                OrchestratorError::NotFound {
                    entity: "project",
                    id: "prj-1".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                OrchestratorError::Identity("no email".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status, status);
        }
    }

    #[test]
    fn not_found_message_names_entity() {
        let err = AppError::from(OrchestratorError::NotFound {
            entity: "project",
            id: "prj-1".into(),
        });
        assert_eq!(err.message, "Project not found");
    }
}
