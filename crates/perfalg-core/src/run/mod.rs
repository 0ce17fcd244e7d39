//! Shared run context handed to every task.

mod source;
pub use source::ContentSource;

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use tracing::{debug, info};
use uuid::Uuid;

use crate::{config::Config, error::TaskError, stats::Stats};

/// State shared by all tasks of one run: configuration, statistics and inputs.
pub struct RunData {
    run_id: Uuid,
    config: Config,
    stats: Stats,
    started: Mutex<Instant>,
    source: Option<Arc<dyn ContentSource>>,
}

impl RunData {
    pub fn new(config: Config) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            config,
            stats: Stats::new(),
            started: Mutex::new(Instant::now()),
            source: None,
        }
    }

    /// Bind the content source that input-consuming tasks read from.
    pub fn with_source(mut self, source: Arc<dyn ContentSource>) -> Self {
        self.source = Some(source);
        self
    }

    #[inline]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    #[inline]
    pub fn source(&self) -> Option<&Arc<dyn ContentSource>> {
        self.source.as_ref()
    }

    /// Restart the run clock. Progress lines report time since this point.
    pub fn mark_started(&self) {
        *self.started.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    pub fn elapsed(&self) -> Duration {
        self.started
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elapsed()
    }

    /// Rewind the content source to its first item.
    pub fn reset_inputs(&self) -> Result<(), TaskError> {
        match &self.source {
            Some(src) => {
                src.reset()?;
                info!(source = src.name(), run_id = %self.run_id, "inputs reset");
                Ok(())
            }
            None => {
                debug!("reset requested with no content source bound");
                Ok(())
            }
        }
    }

    /// Close the content source. Safe to call more than once.
    pub fn close_sources(&self) {
        if let Some(src) = &self.source {
            src.close();
        }
    }
}

impl std::fmt::Debug for RunData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunData")
            .field("run_id", &self.run_id)
            .field("round", &self.config.round())
            .field("entries", &self.stats.len())
            .field("source", &self.source.as_ref().map(|s| s.name().to_string()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Default)]
    struct Counting {
        resets: AtomicUsize,
        closes: AtomicUsize,
    }

    impl ContentSource for Counting {
        fn name(&self) -> &str {
            "counting"
        }
        fn next_item(&self) -> Result<String, TaskError> {
            Err(TaskError::Exhausted)
        }
        fn reset(&self) -> Result<(), TaskError> {
            self.resets.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn close(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn reset_and_close_reach_the_source() {
        let src = Arc::new(Counting::default());
        let run = RunData::new(Config::new()).with_source(src.clone());
        run.reset_inputs().unwrap();
        run.close_sources();
        run.close_sources();
        assert_eq!(src.resets.load(Ordering::SeqCst), 1);
        assert_eq!(src.closes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn reset_without_source_is_noop() {
        let run = RunData::new(Config::new());
        assert!(run.reset_inputs().is_ok());
    }

    #[test]
    fn mark_started_restarts_clock() {
        let run = RunData::new(Config::new());
        std::thread::sleep(Duration::from_millis(20));
        run.mark_started();
        assert!(run.elapsed() < Duration::from_millis(20));
    }
}
