//! Cross-cutting error types for vigil.
//!
//! Domain-specific errors (`DatabaseError`, `OrchestratorError`, `AppError`) live
//! in their respective crates. `CoreError` covers rule violations detected on
//! core types themselves.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} {id} from {from} to {to}")]
    InvalidTransition {
        entity_type: &'static str,
        id: String,
        from: String,
        to: String,
    },
}
