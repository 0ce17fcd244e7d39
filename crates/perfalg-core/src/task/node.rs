use std::{fmt, sync::Arc};

use tracing::debug;

use super::{NodeMeta, Task};
use crate::{
    error::{ExecError, TaskError},
    run::RunData,
    sequence::Outcome,
};

/// Leaf of the algorithm tree: a task plus its per-node settings.
#[derive(Clone)]
pub struct TaskNode {
    task: Box<dyn Task>,
    params: Option<String>,
    disable_counting: bool,
    meta: NodeMeta,
}

impl TaskNode {
    pub fn new(task: Box<dyn Task>, run: Arc<RunData>) -> Self {
        let meta = NodeMeta::new(run, task.name());
        Self {
            task,
            params: None,
            disable_counting: false,
            meta,
        }
    }

    /// Pass a parameter string to the task and remember it for display.
    pub fn set_params(&mut self, params: &str) -> Result<(), TaskError> {
        if !self.task.supports_params() {
            return Err(TaskError::InvalidParams {
                task: self.task.name().to_string(),
                reason: "task does not take parameters".to_string(),
            });
        }
        self.task.set_params(params)?;
        self.params = Some(params.to_string());
        Ok(())
    }

    /// Exclude this task's work items from aggregate counts.
    #[inline]
    pub fn set_disable_counting(&mut self, disable: bool) {
        self.disable_counting = disable;
    }

    #[inline]
    pub fn disable_counting(&self) -> bool {
        self.disable_counting
    }

    #[inline]
    pub fn params(&self) -> Option<&str> {
        self.params.as_deref()
    }

    #[inline]
    pub fn task_name(&self) -> &str {
        self.task.name()
    }

    /// `Name` or `Name(params)`; statistics are grouped under this name.
    pub fn name(&self) -> String {
        match &self.params {
            Some(p) => format!("{}({p})", self.task.name()),
            None => self.task.name().to_string(),
        }
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.meta.depth
    }

    pub(crate) fn set_depth(&mut self, depth: usize) {
        self.meta.depth = depth;
    }

    #[inline]
    pub fn resets_inputs(&self) -> bool {
        self.task.resets_inputs()
    }

    /// Number of invocations so far.
    #[inline]
    pub fn invocations(&self) -> u64 {
        self.meta.invocations
    }

    /// Run one invocation: setup, measured execute, tear-down.
    ///
    /// Tear-down runs even when execute fails; the execute error is the one returned.
    pub async fn run(&mut self, reporting: bool) -> Result<Outcome, ExecError> {
        let name = self.name();
        let record = reporting && self.task.records_stats();
        if reporting && self.task.logs_start() {
            self.meta.log_start(&name);
        }

        self.task.setup().await.map_err(|e| self.wrap(e))?;

        let run = Arc::clone(&self.meta.run);
        let handle = record.then(|| run.stats().mark_start(&name, run.config().round()));
        let executed = self.task.execute_once().await;

        let counted = match &executed {
            Ok(n) if self.disable_counting => Some((0, *n)),
            Ok(n) => Some((*n, *n)),
            Err(_) => None,
        };
        if let (Some(h), Some((count, _))) = (handle, counted) {
            run.stats().mark_end(h, count);
        }

        let torn_down = self.task.tear_down().await;
        let task = &self.task;
        self.meta.tick(&name, |n| task.log_message(n));

        let (count, raw_count) = match executed {
            Ok(_) => counted.unwrap_or_default(),
            Err(e) => return Err(self.wrap(e)),
        };
        torn_down.map_err(|e| self.wrap(e))?;

        Ok(Outcome {
            count,
            raw_count,
            exhausted: false,
            reset: self.task.resets_inputs(),
        })
    }

    /// Close the task once.
    pub fn close(&mut self) {
        if self.meta.closed {
            return;
        }
        self.meta.closed = true;
        self.task.close();
        debug!(task = %self.name(), "task closed");
    }

    fn wrap(&self, err: TaskError) -> ExecError {
        match err {
            TaskError::Exhausted => ExecError::Exhausted,
            source => ExecError::Task {
                task: self.name(),
                depth: self.meta.depth,
                source,
            },
        }
    }
}

impl fmt::Display for TaskNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.disable_counting {
            f.write_str("-")?;
        }
        f.write_str(&self.name())
    }
}

impl fmt::Debug for TaskNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskNode")
            .field("name", &self.name())
            .field("depth", &self.meta.depth)
            .field("disable_counting", &self.disable_counting)
            .finish()
    }
}
