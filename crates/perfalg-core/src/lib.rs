pub mod config;
pub use config::Config;

pub mod error;
pub use error::{ConfigError, CoreError, ExecError, GrammarError, TaskError};

pub mod memory;

pub mod registry;
pub use registry::{TaskFactory, TaskRegistry};

pub mod run;
pub use run::{ContentSource, RunData};

pub mod stats;
pub use stats::Stats;

pub mod task;
pub use task::{Task, TaskNode};

pub mod sequence;
pub use sequence::{Outcome, Sequence};

mod node;
pub use node::{BoxFuture, Node};

pub mod parser;

mod algorithm;
pub use algorithm::{Algorithm, RunSummary};

mod benchmark;
pub use benchmark::Benchmark;

#[cfg(test)]
mod testing;

pub mod prelude {
    pub use crate::error::{ConfigError, CoreError, ExecError, GrammarError, TaskError};
    pub use crate::{Algorithm, Benchmark, Config, ContentSource, RunData, Task, TaskRegistry};
    pub use perfalg_model::{Concurrency, Rate, RateUnit, Repetition, Report, StatsRow};
}
