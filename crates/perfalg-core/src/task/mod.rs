//! Task contract and the tree leaf that drives a task's lifecycle.

mod meta;
pub(crate) use meta::NodeMeta;

mod node;
pub use node::TaskNode;

use async_trait::async_trait;

use crate::error::TaskError;

/// A unit of work in an algorithm.
///
/// Tasks are built by the registry, bound to the shared run context at construction.
/// Every invocation runs `setup`, `execute_once` and `tear_down`; only `execute_once`
/// is measured. `execute_once` returns the number of work items done, or
/// [`TaskError::Exhausted`] when its input has no more data.
#[async_trait]
pub trait Task: Send + 'static {
    /// Registry name of the task.
    fn name(&self) -> &str;

    /// Whether `set_params` accepts a parameter string.
    fn supports_params(&self) -> bool {
        false
    }

    /// Apply the raw text between the parentheses in `Name(params)`.
    fn set_params(&mut self, params: &str) -> Result<(), TaskError> {
        Err(TaskError::InvalidParams {
            task: self.name().to_string(),
            reason: format!("parameters not supported: {params:?}"),
        })
    }

    async fn setup(&mut self) -> Result<(), TaskError> {
        Ok(())
    }

    async fn execute_once(&mut self) -> Result<u64, TaskError>;

    async fn tear_down(&mut self) -> Result<(), TaskError> {
        Ok(())
    }

    /// Release resources. Called once when the owning sequence closes; must be idempotent.
    fn close(&mut self) {}

    /// Independent copy for a parallel unit. Per-invocation state must not be shared.
    fn box_clone(&self) -> Box<dyn Task>;

    /// `true` for tasks that rewind the inputs; an enclosing run-until-exhausted loop
    /// then keeps going.
    fn resets_inputs(&self) -> bool {
        false
    }

    /// Whether invocations are recorded in statistics.
    fn records_stats(&self) -> bool {
        true
    }

    /// Whether invocations log "starting task".
    fn logs_start(&self) -> bool {
        true
    }

    /// Progress text logged every `log.step` invocations.
    fn log_message(&self, invocations: u64) -> String {
        format!("processed {invocations} records")
    }
}

impl Clone for Box<dyn Task> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}
