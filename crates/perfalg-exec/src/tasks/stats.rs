use std::sync::Arc;

use async_trait::async_trait;
use perfalg_core::{RunData, Task, TaskError};
use tracing::info;

/// Drops every statistics entry recorded so far.
#[derive(Clone)]
pub struct ClearStats {
    run: Arc<RunData>,
}

impl ClearStats {
    pub const NAME: &'static str = "ClearStats";

    pub fn new(run: &Arc<RunData>) -> Self {
        Self {
            run: Arc::clone(run),
        }
    }
}

#[async_trait]
impl Task for ClearStats {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn execute_once(&mut self) -> Result<u64, TaskError> {
        let dropped = self.run.stats().len();
        self.run.stats().clear();
        info!(dropped, "statistics cleared");
        Ok(0)
    }

    fn box_clone(&self) -> Box<dyn Task> {
        Box::new(self.clone())
    }
}
