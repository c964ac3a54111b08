//! Errors surfaced synchronously by the orchestrator.
//!
//! Failures after dispatch never appear here. They are written to the job and
//! project rows instead.

use thiserror::Error;
use vigil_db::error::DatabaseError;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The session carries neither a user id nor an email.
    #[error("Unauthorized")]
    Unauthorized,

    /// A required field is missing or malformed. Nothing was written.
    #[error("{0}")]
    Validation(String),

    /// The referenced entity does not exist or is not owned by the caller.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The session could not be resolved to a user.
    #[error("Identity resolution failed: {0}")]
    Identity(String),

    #[error("Store error: {0}")]
    Store(DatabaseError),
}

impl From<DatabaseError> for OrchestratorError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Validation(message) => Self::Validation(message),
            DatabaseError::NotFound { entity, id } => Self::NotFound { entity, id },
            DatabaseError::UnresolvableIdentity(message) => Self::Identity(message),
            other => Self::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_keep_their_category() {
        let err: OrchestratorError = DatabaseError::NotFound {
            entity: "project",
            id: "prj-1".into(),
        }
        .into();
        assert!(matches!(err, OrchestratorError::NotFound { entity: "project", .. }));

        let err: OrchestratorError = DatabaseError::UnresolvableIdentity("no email".into()).into();
        assert!(matches!(err, OrchestratorError::Identity(_)));

        let err: OrchestratorError = DatabaseError::NoResult.into();
        assert!(matches!(err, OrchestratorError::Store(DatabaseError::NoResult)));
    }
}
