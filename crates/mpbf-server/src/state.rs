//! Shared server state.

use mpbf_pipeline::CommandPipeline;
use std::sync::Arc;

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<CommandPipeline>,
}

impl AppState {
    pub fn new(pipeline: CommandPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}
