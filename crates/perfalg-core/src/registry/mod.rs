use std::{collections::BTreeMap, sync::Arc};

use tracing::{instrument, trace};

use crate::{run::RunData, task::Task};

/// Constructor of a task bound to the run context.
pub type TaskFactory = Arc<dyn Fn(&Arc<RunData>) -> Box<dyn Task> + Send + Sync>;

/// Maps task names used in algorithm text to constructors.
#[derive(Default, Clone)]
pub struct TaskRegistry {
    factories: BTreeMap<String, TaskFactory>,
}

impl TaskRegistry {
    #[inline]
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register `name`, replacing any earlier constructor under that name.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Arc<RunData>) -> Box<dyn Task> + Send + Sync + 'static,
    {
        let name = name.into();
        trace!(task = %name, "task registered");
        self.factories.insert(name, Arc::new(factory));
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build a fresh task for `name`, or `None` when the name is unknown.
    #[instrument(level = "trace", skip(self, run))]
    pub fn create(&self, name: &str, run: &Arc<RunData>) -> Option<Box<dyn Task>> {
        let factory = self.factories.get(name)?;
        let task = factory(run);
        trace!(task = task.name(), "registry built task");
        Some(task)
    }
}

impl std::fmt::Debug for TaskRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}
