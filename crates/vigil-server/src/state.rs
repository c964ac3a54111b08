use std::sync::Arc;

use vigil_jobs::Orchestrator;

/// Shared handler state.
#[derive(Clone, Debug)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    #[must_use]
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}
