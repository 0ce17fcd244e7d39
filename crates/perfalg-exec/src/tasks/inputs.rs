use std::sync::Arc;

use async_trait::async_trait;
use perfalg_core::{RunData, Task, TaskError};

use crate::error::BuiltinError;

/// Rewinds the bound content source.
///
/// An enclosing run-until-exhausted sequence keeps looping after this task ran.
#[derive(Clone)]
pub struct ResetInputs {
    run: Arc<RunData>,
}

impl ResetInputs {
    pub const NAME: &'static str = "ResetInputs";

    pub fn new(run: &Arc<RunData>) -> Self {
        Self {
            run: Arc::clone(run),
        }
    }
}

#[async_trait]
impl Task for ResetInputs {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn execute_once(&mut self) -> Result<u64, TaskError> {
        self.run.reset_inputs()?;
        Ok(0)
    }

    fn box_clone(&self) -> Box<dyn Task> {
        Box::new(self.clone())
    }

    fn resets_inputs(&self) -> bool {
        true
    }
}

/// Pulls one item from the bound content source.
#[derive(Clone)]
pub struct ConsumeContentSource {
    run: Arc<RunData>,
    last: Option<String>,
}

impl ConsumeContentSource {
    pub const NAME: &'static str = "ConsumeContentSource";

    pub fn new(run: &Arc<RunData>) -> Self {
        Self {
            run: Arc::clone(run),
            last: None,
        }
    }
}

#[async_trait]
impl Task for ConsumeContentSource {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn execute_once(&mut self) -> Result<u64, TaskError> {
        let source = self
            .run
            .source()
            .ok_or(BuiltinError::NoContentSource { task: Self::NAME })?;
        self.last = Some(source.next_item()?);
        Ok(1)
    }

    fn box_clone(&self) -> Box<dyn Task> {
        Box::new(Self {
            run: Arc::clone(&self.run),
            last: None,
        })
    }

    fn log_message(&self, invocations: u64) -> String {
        match &self.last {
            Some(item) => format!("consumed {invocations} items, last {item}"),
            None => format!("consumed {invocations} items"),
        }
    }
}
