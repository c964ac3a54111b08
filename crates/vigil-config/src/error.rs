//! Errors raised while loading or checking vigil configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source failed to parse, or a value had the wrong type.
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// A value parsed but is unusable: a zero `jobs.list_limit` or
    /// `jobs.compensation_attempts`, an empty `database.path`, or a
    /// `server.bind` that is not `host:port`.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
