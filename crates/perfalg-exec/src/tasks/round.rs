use std::sync::Arc;

use async_trait::async_trait;
use perfalg_core::{RunData, Task, TaskError};

/// Advances the configuration round.
#[derive(Clone)]
pub struct NewRound {
    run: Arc<RunData>,
}

impl NewRound {
    pub const NAME: &'static str = "NewRound";

    pub fn new(run: &Arc<RunData>) -> Self {
        Self {
            run: Arc::clone(run),
        }
    }
}

#[async_trait]
impl Task for NewRound {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn execute_once(&mut self) -> Result<u64, TaskError> {
        self.run.config().advance_round();
        Ok(0)
    }

    fn box_clone(&self) -> Box<dyn Task> {
        Box::new(self.clone())
    }
}
