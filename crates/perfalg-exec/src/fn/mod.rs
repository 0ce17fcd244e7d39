//! Closure-backed tasks.
//!
//! Embedders register async closures under a name; [`FnRegistry::install`] exposes them to
//! the algorithm parser through a [`TaskRegistry`].

use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, PoisonError, RwLock},
};

use async_trait::async_trait;
use perfalg_core::{BoxFuture, RunData, Task, TaskError, TaskRegistry};
use tracing::{debug, trace};

/// What a registered closure receives on every invocation.
#[derive(Clone)]
pub struct FnContext {
    pub run: Arc<RunData>,
    pub params: Option<String>,
    /// 1-based invocation number of this task instance.
    pub invocation: u64,
}

type FnLogic = Arc<dyn Fn(FnContext) -> BoxFuture<'static, Result<u64, TaskError>> + Send + Sync>;

#[derive(Clone)]
struct FnEntry {
    logic: FnLogic,
    takes_params: bool,
}

/// Named closures that become tasks.
#[derive(Clone, Default)]
pub struct FnRegistry {
    registry: Arc<RwLock<HashMap<String, FnEntry>>>,
}

impl FnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure that takes no parameters.
    pub fn register<F, Fut>(&self, name: impl Into<String>, f: F) -> &Self
    where
        F: Fn(FnContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<u64, TaskError>> + Send + 'static,
    {
        self.insert(name.into(), f, false)
    }

    /// Register a closure that accepts `Name(params)`.
    pub fn register_with_params<F, Fut>(&self, name: impl Into<String>, f: F) -> &Self
    where
        F: Fn(FnContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<u64, TaskError>> + Send + 'static,
    {
        self.insert(name.into(), f, true)
    }

    pub fn unregister(&self, name: &str) -> bool {
        self.write().remove(name).is_some()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    pub fn count(&self) -> usize {
        self.read().len()
    }

    /// Add every registered closure to `tasks`.
    pub fn install(&self, tasks: &mut TaskRegistry) {
        for (name, entry) in self.read().iter() {
            let name = name.clone();
            let entry = entry.clone();
            tasks.register(name.clone(), move |run| {
                Box::new(FnTask {
                    name: name.clone(),
                    entry: entry.clone(),
                    run: Arc::clone(run),
                    params: None,
                    invocations: 0,
                })
            });
        }
        debug!(count = self.count(), "function tasks installed");
    }

    fn insert<F, Fut>(&self, name: String, f: F, takes_params: bool) -> &Self
    where
        F: Fn(FnContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<u64, TaskError>> + Send + 'static,
    {
        let logic: FnLogic = Arc::new(
            move |ctx: FnContext| -> BoxFuture<'static, Result<u64, TaskError>> {
                Box::pin(f(ctx))
            },
        );
        trace!(task = %name, takes_params, "function registered");
        self.write().insert(
            name,
            FnEntry {
                logic,
                takes_params,
            },
        );
        self
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, FnEntry>> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, FnEntry>> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Task that runs a registered closure.
#[derive(Clone)]
pub struct FnTask {
    name: String,
    entry: FnEntry,
    run: Arc<RunData>,
    params: Option<String>,
    invocations: u64,
}

#[async_trait]
impl Task for FnTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports_params(&self) -> bool {
        self.entry.takes_params
    }

    fn set_params(&mut self, params: &str) -> Result<(), TaskError> {
        self.params = Some(params.to_string());
        Ok(())
    }

    async fn execute_once(&mut self) -> Result<u64, TaskError> {
        self.invocations += 1;
        let ctx = FnContext {
            run: Arc::clone(&self.run),
            params: self.params.clone(),
            invocation: self.invocations,
        };
        (self.entry.logic)(ctx).await
    }

    fn box_clone(&self) -> Box<dyn Task> {
        Box::new(self.clone())
    }
}
