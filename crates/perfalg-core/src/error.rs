use thiserror::Error;

/// Malformed algorithm text.
///
/// Always fatal: raised before anything executes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}, column {column}: {message} (near {near:?})")]
pub struct GrammarError {
    pub message: String,
    /// 1-based line of the offending span.
    pub line: usize,
    /// 1-based column of the offending span.
    pub column: usize,
    /// The offending source text.
    pub near: String,
}

/// Illegal configuration access.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("cannot modify multi-value property {name:?}")]
    MultiValueProperty { name: String },
    #[error("cannot assign multiple values to {name:?}: {value:?}")]
    MultiValueAssignment { name: String, value: String },
    #[error("property {name:?}: cannot parse {value:?} as {expected}")]
    InvalidValue {
        name: String,
        value: String,
        expected: &'static str,
    },
}

/// Error returned by a single task operation.
///
/// `Exhausted` is the cooperative "no more input data" signal, distinct from every failure.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("no more data")]
    Exhausted,
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid parameters for {task}: {reason}")]
    InvalidParams { task: String, reason: String },
    #[error("{reason}")]
    Failed { reason: String },
}

impl TaskError {
    pub fn failed(reason: impl Into<String>) -> Self {
        TaskError::Failed {
            reason: reason.into(),
        }
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, TaskError::Exhausted)
    }
}

/// Error returned while executing an algorithm tree.
#[derive(Error, Debug)]
pub enum ExecError {
    /// Input exhausted outside of any run-until-exhausted scope.
    #[error("no more data")]
    Exhausted,
    /// A task failed; always fatal.
    #[error("task {task} (depth {depth}) failed: {source}")]
    Task {
        task: String,
        depth: usize,
        #[source]
        source: TaskError,
    },
    /// A parallel unit panicked or was aborted.
    #[error("parallel unit of {task} did not complete: {reason}")]
    Join { task: String, reason: String },
}

impl ExecError {
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, ExecError::Exhausted)
    }
}

/// Facade-level error.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("cannot understand algorithm: {0}")]
    Grammar(#[from] GrammarError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("cannot execute the algorithm: {0}")]
    Exec(#[from] ExecError),
    #[error("benchmark was already executed")]
    AlreadyExecuted,
}
