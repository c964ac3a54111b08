//! External analysis engine configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Executable that runs one analysis. The job id is appended as the last argument.
    #[serde(default)]
    pub command: String,

    /// Extra arguments placed before the job id.
    #[serde(default)]
    pub args: Vec<String>,
}

impl EngineConfig {
    /// Check if an engine executable has been configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.command.trim().is_empty()
    }
}
