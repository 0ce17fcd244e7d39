use std::sync::Arc;

use tracing::info;

use crate::run::RunData;

/// Default progress cadence, in invocations.
pub(crate) const DEFAULT_LOG_STEP: i64 = 1000;

/// Bookkeeping every tree node carries besides its work.
#[derive(Clone)]
pub(crate) struct NodeMeta {
    pub(crate) run: Arc<RunData>,
    pub(crate) depth: usize,
    /// Progress cadence; `<= 0` disables progress lines.
    pub(crate) log_step: i64,
    pub(crate) invocations: u64,
    pub(crate) closed: bool,
}

impl NodeMeta {
    /// Resolve the progress cadence from `log.step.<name>` or `log.step`.
    pub(crate) fn new(run: Arc<RunData>, name: &str) -> Self {
        let cfg = run.config();
        let own = format!("log.step.{name}");
        let key = if cfg.contains(&own) { own.as_str() } else { "log.step" };
        let log_step = cfg.get_int(key, DEFAULT_LOG_STEP).unwrap_or(DEFAULT_LOG_STEP);

        Self {
            run,
            depth: 0,
            log_step,
            invocations: 0,
            closed: false,
        }
    }

    pub(crate) fn log_start(&self, name: &str) {
        let max_depth = self
            .run
            .config()
            .get_int("task.max.depth.log", 0)
            .unwrap_or(0);
        if i64::try_from(self.depth).unwrap_or(i64::MAX) <= max_depth {
            info!(task = name, depth = self.depth, "starting task");
        }
    }

    /// Count one invocation and log progress on every `log_step`-th.
    pub(crate) fn tick(&mut self, name: &str, message: impl FnOnce(u64) -> String) {
        self.invocations += 1;
        if self.log_step > 0 && self.invocations % self.log_step as u64 == 0 {
            let thread = std::thread::current();
            info!(
                task = name,
                elapsed_secs = self.run.elapsed().as_secs_f64(),
                thread = thread.name().unwrap_or("unnamed"),
                "{}",
                message(self.invocations)
            );
        }
    }
}
