//! Probe tasks for unit tests.

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use rand::Rng;

use crate::{
    config::Config,
    error::TaskError,
    registry::TaskRegistry,
    run::RunData,
    task::{Task, TaskNode},
};

/// Ordered log of successful invocations, shared by probes and their clones.
#[derive(Clone, Default)]
pub(crate) struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    fn push(&self, name: &str) {
        self.0.lock().unwrap().push(name.to_string());
    }

    pub(crate) fn names(&self) -> String {
        self.0.lock().unwrap().join(",")
    }

    pub(crate) fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

#[derive(Clone)]
pub(crate) struct Probe {
    name: String,
    journal: Journal,
    count: u64,
    delay: Option<Duration>,
    jitter: Option<Duration>,
    exhaust_after: Option<u64>,
    fail_after: Option<u64>,
    source: Arc<AtomicU64>,
    resets: Option<Arc<AtomicU64>>,
    takes_params: bool,
    params: Option<String>,
    calls: u64,
}

impl Probe {
    pub(crate) fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            journal: journal.clone(),
            count: 1,
            delay: None,
            jitter: None,
            exhaust_after: None,
            fail_after: None,
            source: Arc::new(AtomicU64::new(0)),
            resets: None,
            takes_params: false,
            params: None,
            calls: 0,
        }
    }

    /// Work items returned per invocation.
    pub(crate) fn counting(mut self, count: u64) -> Self {
        self.count = count;
        self
    }

    pub(crate) fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sleep a random time up to `max` on every invocation.
    pub(crate) fn jitter(mut self, max: Duration) -> Self {
        self.jitter = Some(max);
        self
    }

    /// Succeed `n` times on the shared source, then report exhaustion.
    pub(crate) fn exhaust_after(mut self, n: u64) -> Self {
        self.exhaust_after = Some(n);
        self
    }

    /// Fail once this instance has succeeded `n` times.
    pub(crate) fn fail_after(mut self, n: u64) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// Rewind `source` on every invocation.
    pub(crate) fn resetting(mut self, source: Arc<AtomicU64>) -> Self {
        self.resets = Some(source);
        self
    }

    pub(crate) fn with_params(mut self) -> Self {
        self.takes_params = true;
        self
    }

    pub(crate) fn source(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.source)
    }
}

#[async_trait]
impl Task for Probe {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports_params(&self) -> bool {
        self.takes_params
    }

    fn set_params(&mut self, params: &str) -> Result<(), TaskError> {
        self.params = Some(params.to_string());
        Ok(())
    }

    async fn execute_once(&mut self) -> Result<u64, TaskError> {
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        if let Some(max) = self.jitter {
            let max_nanos = u64::try_from(max.as_nanos()).unwrap_or(u64::MAX);
            let nanos = rand::thread_rng().gen_range(0..=max_nanos);
            tokio::time::sleep(Duration::from_nanos(nanos)).await;
        }
        if self.fail_after.is_some_and(|n| self.calls >= n) {
            return Err(TaskError::failed(format!("{} failed", self.name)));
        }
        if let Some(limit) = self.exhaust_after
            && self.source.fetch_add(1, Ordering::SeqCst) + 1 > limit
        {
            return Err(TaskError::Exhausted);
        }
        if let Some(src) = &self.resets {
            src.store(0, Ordering::SeqCst);
        }
        self.calls += 1;
        self.journal.push(&self.name);
        Ok(self.count)
    }

    fn box_clone(&self) -> Box<dyn Task> {
        Box::new(self.clone())
    }

    fn resets_inputs(&self) -> bool {
        self.resets.is_some()
    }
}

pub(crate) fn run_data(props: &[(&str, &str)]) -> Arc<RunData> {
    Arc::new(RunData::new(Config::from_props(props.iter().copied())))
}

pub(crate) fn task(run: &Arc<RunData>, probe: Probe) -> TaskNode {
    TaskNode::new(Box::new(probe), Arc::clone(run))
}

/// Registry with probes `A`..`D`, `Read` (exhausts after 6), `Param` (takes parameters)
/// and `Boom` (always fails).
pub(crate) fn registry(journal: &Journal) -> TaskRegistry {
    let mut reg = TaskRegistry::new();
    for name in ["A", "B", "C", "D", "Add", "Search"] {
        let j = journal.clone();
        reg.register(name, move |_| Box::new(Probe::new(name, &j)));
    }
    let j = journal.clone();
    reg.register("Read", move |_| Box::new(Probe::new("Read", &j).exhaust_after(6)));
    let j = journal.clone();
    reg.register("Param", move |_| Box::new(Probe::new("Param", &j).with_params()));
    let j = journal.clone();
    reg.register("Boom", move |_| Box::new(Probe::new("Boom", &j).fail_after(0)));
    reg
}
