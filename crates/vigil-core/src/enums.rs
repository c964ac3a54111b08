//! Status enums and the job-type set for vigil.
//!
//! All enums serialize as `SCREAMING_SNAKE_CASE`, which is also the form stored
//! in SQL. Status enums with state machines provide `allowed_next_states()` to
//! enforce valid transitions at the application layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// JobType
// ---------------------------------------------------------------------------

/// Kind of analysis a scan job runs.
///
/// The set is closed. Callers never fail on an unknown type: [`JobType::normalize`]
/// coerces anything outside the set to [`JobType::DEFAULT`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    #[default]
    Comprehensive,
    Quick,
    Security,
    GasOptimization,
    Custom,
}

impl JobType {
    /// Type used when the caller supplies nothing usable.
    pub const DEFAULT: Self = Self::Comprehensive;

    pub const ALL: [Self; 5] = [
        Self::Comprehensive,
        Self::Quick,
        Self::Security,
        Self::GasOptimization,
        Self::Custom,
    ];

    /// Normalize a caller-supplied type. Total: never fails.
    ///
    /// Input is trimmed and upper-cased before matching, so `"quick"` and
    /// `"QUICK"` are the same type. Empty, absent, or unknown input yields
    /// [`JobType::DEFAULT`].
    #[must_use]
    pub fn normalize(raw: Option<&str>) -> Self {
        raw.and_then(Self::parse_canonical).unwrap_or(Self::DEFAULT)
    }

    fn parse_canonical(raw: &str) -> Option<Self> {
        let folded = raw.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|t| t.as_str() == folded)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Comprehensive => "COMPREHENSIVE",
            Self::Quick => "QUICK",
            Self::Security => "SECURITY",
            Self::GasOptimization => "GAS_OPTIMIZATION",
            Self::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// JobStatus
// ---------------------------------------------------------------------------

/// Status of a scan job.
///
/// ```text
/// pending → running → completed
///         ↘         ↘ failed
///           failed
/// ```
///
/// `Running` and `Completed` are written by the analysis engine. The
/// orchestrator only ever writes `Pending` (on create) and `Failed` (on
/// compensation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Running, Self::Failed],
            Self::Running => &[Self::Completed, Self::Failed],
            Self::Completed | Self::Failed => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Like [`Self::can_transition_to`], but reports the rejected move for job `id`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` when `next` is not reachable.
    pub fn ensure_transition(self, id: &str, next: Self) -> Result<(), CoreError> {
        if self.can_transition_to(next) {
            return Ok(());
        }
        Err(CoreError::InvalidTransition {
            entity_type: "scan job",
            id: id.to_string(),
            from: self.to_string(),
            to: next.to_string(),
        })
    }

    /// Terminal states accept no further mutation.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ProjectStatus
// ---------------------------------------------------------------------------

/// Status of a project, mirroring the aggregate state of its jobs.
///
/// No state machine: the synchronizer writes whichever phase the job
/// lifecycle dictates, and a project can be re-analyzed from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Idle,
    Analyzing,
    Completed,
    Failed,
}

impl ProjectStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Analyzing => "ANALYZING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Severity of a finding reported by the analysis engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::Info => "INFO",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
