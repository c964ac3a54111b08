use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Severity;

/// A vulnerability reported by the analysis engine against one scan job.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Finding {
    pub id: String,
    pub scan_job_id: String,
    pub severity: Severity,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}
