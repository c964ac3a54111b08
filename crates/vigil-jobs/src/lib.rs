//! # vigil-jobs
//!
//! The scan job lifecycle: an [`Orchestrator`] turns a session and a create
//! request into a persisted job, marks its project as analyzing, and hands the
//! job to a [`Dispatcher`]. The dispatcher runs the [`AnalysisEngine`] on a
//! background task and writes the failure state back when the engine fails.

pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod orchestrator;

pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use engine::{AnalysisEngine, CommandEngine, UnconfiguredEngine};
pub use error::OrchestratorError;
pub use orchestrator::{CreateJobRequest, JobCreation, Orchestrator};
