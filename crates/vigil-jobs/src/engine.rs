//! The analysis engine seam.
//!
//! The orchestrator never inspects how analysis runs. It only starts it and
//! learns whether the start failed.

use std::process::Stdio;
use std::sync::Arc;

use anyhow::{Context, bail};
use async_trait::async_trait;
use vigil_config::EngineConfig;

/// Entry point of the out-of-process analysis engine.
///
/// Implementations own progress and completion writes for the job. An `Err`
/// (or a panic) is treated as a dispatch failure and triggers compensation.
#[async_trait]
pub trait AnalysisEngine: Send + Sync {
    async fn start_analysis(&self, job_id: &str) -> anyhow::Result<()>;
}

/// Runs an external executable once per job, passing the job id as the last argument.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
}

impl CommandEngine {
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl AnalysisEngine for CommandEngine {
    async fn start_analysis(&self, job_id: &str) -> anyhow::Result<()> {
        tracing::debug!(job_id, program = %self.program, "starting analysis command");

        let output = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg(job_id)
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("failed to run analysis engine '{}'", self.program))?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if stderr.is_empty() {
            bail!("analysis engine exited with {}", output.status);
        }
        bail!("{stderr}");
    }
}

/// Used when no engine command is configured. Every dispatch fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredEngine;

#[async_trait]
impl AnalysisEngine for UnconfiguredEngine {
    async fn start_analysis(&self, _job_id: &str) -> anyhow::Result<()> {
        bail!("analysis engine not configured")
    }
}

/// Build the engine described by `[engine]` configuration.
#[must_use]
pub fn from_config(config: &EngineConfig) -> Arc<dyn AnalysisEngine> {
    if config.is_configured() {
        Arc::new(CommandEngine::new(config.command.trim(), config.args.clone()))
    } else {
        tracing::warn!("no analysis engine configured; dispatched jobs will fail");
        Arc::new(UnconfiguredEngine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_engine_always_fails() {
        let err = UnconfiguredEngine.start_analysis("job-1").await.unwrap_err();
        assert_eq!(err.to_string(), "analysis engine not configured");
    }

    #[tokio::test]
    async fn missing_executable_is_a_failure() {
        let engine = CommandEngine::new("/nonexistent/vigil-engine", Vec::new());
        let err = engine.start_analysis("job-1").await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/vigil-engine"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn command_receives_job_id_last() {
        let engine = CommandEngine::new(
            "sh",
            vec!["-c".into(), r#"test "$1" = job-42"#.into(), "sh".into()],
        );
        engine.start_analysis("job-42").await.unwrap();
        assert!(engine.start_analysis("job-7").await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_reports_trimmed_stderr() {
        let engine = CommandEngine::new(
            "sh",
            vec!["-c".into(), "echo '  boom  ' >&2; exit 3".into(), "sh".into()],
        );
        let err = engine.start_analysis("job-1").await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn silent_failure_reports_exit_status() {
        let engine = CommandEngine::new("sh", vec!["-c".into(), "exit 4".into(), "sh".into()]);
        let err = engine.start_analysis("job-1").await.unwrap_err();
        assert!(err.to_string().starts_with("analysis engine exited with"));
    }

    #[test]
    fn blank_command_builds_unconfigured_engine() {
        let config = EngineConfig {
            command: "   ".into(),
            args: Vec::new(),
        };
        assert!(!config.is_configured());
        let _engine = from_config(&config);
    }
}
