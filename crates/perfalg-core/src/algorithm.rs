use std::{fmt, sync::Arc, time::Duration};

use perfalg_model::TaskDescriptor;
use tokio::time::Instant;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    error::{ExecError, GrammarError},
    parser,
    registry::TaskRegistry,
    run::RunData,
    sequence::Sequence,
};

/// Summary of one algorithm execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: Uuid,
    /// Work items counted toward aggregates.
    pub count: u64,
    /// Work items actually done.
    pub raw_count: u64,
    /// The run ended because input data ran out.
    pub exhausted: bool,
    pub elapsed: Duration,
}

/// A parsed algorithm bound to its run context.
pub struct Algorithm {
    root: Sequence,
    run: Arc<RunData>,
}

impl Algorithm {
    pub fn parse(
        text: &str,
        registry: &TaskRegistry,
        run: Arc<RunData>,
    ) -> Result<Self, GrammarError> {
        let root = parser::parse(text, registry, &run)?;
        Ok(Self { root, run })
    }

    #[inline]
    pub fn root(&self) -> &Sequence {
        &self.root
    }

    #[inline]
    pub fn run_data(&self) -> &Arc<RunData> {
        &self.run
    }

    /// Every sequence and task in pre-order.
    pub fn extract_tasks(&self) -> Vec<TaskDescriptor> {
        let mut out = Vec::new();
        self.root.describe_into(&mut out);
        out
    }

    /// Indented listing of the tree.
    pub fn tree(&self) -> String {
        let mut out = String::new();
        self.root.write_tree(&mut out, 0);
        out
    }

    /// Run the whole tree with reporting on, then close it.
    ///
    /// Running out of input data ends the run normally with `exhausted` set.
    #[instrument(level = "info", skip(self), fields(run_id = %self.run.run_id()))]
    pub async fn execute(&mut self) -> Result<RunSummary, ExecError> {
        self.run.mark_started();
        let started = Instant::now();

        let result = match self.root.run(true).await {
            Ok(o) => Ok((o.count, o.raw_count, o.exhausted)),
            Err(ExecError::Exhausted) => Ok((0, 0, true)),
            Err(e) => Err(e),
        };
        self.close();

        let (count, raw_count, exhausted) = result?;
        let summary = RunSummary {
            run_id: self.run.run_id(),
            count,
            raw_count,
            exhausted,
            elapsed: started.elapsed(),
        };
        info!(
            count = summary.count,
            exhausted = summary.exhausted,
            elapsed_secs = summary.elapsed.as_secs_f64(),
            "algorithm completed"
        );
        Ok(summary)
    }

    /// Close every node of the tree. Idempotent.
    pub fn close(&mut self) {
        self.root.close();
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt(f)
    }
}

impl fmt::Debug for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Algorithm")
            .field("root", &self.root)
            .field("run", &self.run)
            .finish()
    }
}
