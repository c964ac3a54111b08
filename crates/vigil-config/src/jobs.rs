//! Scan job orchestration settings.

use serde::{Deserialize, Serialize};

/// Page size for job listings.
const fn default_list_limit() -> u32 {
    20
}

/// One attempt means a failed compensating write is not retried.
const fn default_compensation_attempts() -> u32 {
    1
}

const fn default_compensation_delay_ms() -> u64 {
    100
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JobsConfig {
    /// Maximum number of jobs returned by a listing.
    #[serde(default = "default_list_limit")]
    pub list_limit: u32,

    /// Attempts at writing the compensating failure state (including the first).
    #[serde(default = "default_compensation_attempts")]
    pub compensation_attempts: u32,

    /// Initial backoff between compensation attempts, in milliseconds.
    #[serde(default = "default_compensation_delay_ms")]
    pub compensation_delay_ms: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            list_limit: default_list_limit(),
            compensation_attempts: default_compensation_attempts(),
            compensation_delay_ms: default_compensation_delay_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = JobsConfig::default();
        assert_eq!(config.list_limit, 20);
        assert_eq!(config.compensation_attempts, 1);
        assert_eq!(config.compensation_delay_ms, 100);
    }
}
