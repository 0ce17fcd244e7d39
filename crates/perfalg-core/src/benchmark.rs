use std::sync::Arc;

use tracing::info;

use crate::{
    algorithm::{Algorithm, RunSummary},
    config::Config,
    error::CoreError,
    registry::TaskRegistry,
    run::RunData,
};

/// Parse-once, execute-once entry point.
#[derive(Debug)]
pub struct Benchmark {
    algorithm: Algorithm,
    executed: bool,
}

impl Benchmark {
    /// Build from the algorithm text held by the run's configuration.
    pub fn new(run: Arc<RunData>, registry: &TaskRegistry) -> Result<Self, CoreError> {
        let text = run.config().algorithm_text();
        let algorithm = Algorithm::parse(&text, registry, run)?;
        info!(
            run_id = %algorithm.run_data().run_id(),
            tasks = algorithm.extract_tasks().len(),
            "benchmark ready"
        );
        Ok(Self {
            algorithm,
            executed: false,
        })
    }

    /// Build from a whole `.alg` file with no content source bound.
    pub fn from_alg_text(text: &str, registry: &TaskRegistry) -> Result<Self, CoreError> {
        let config = Config::from_alg_text(text)?;
        Self::new(Arc::new(RunData::new(config)), registry)
    }

    #[inline]
    pub fn algorithm(&self) -> &Algorithm {
        &self.algorithm
    }

    #[inline]
    pub fn run_data(&self) -> &Arc<RunData> {
        self.algorithm.run_data()
    }

    /// Execute the algorithm. A second call fails with [`CoreError::AlreadyExecuted`].
    pub async fn execute(&mut self) -> Result<RunSummary, CoreError> {
        if self.executed {
            return Err(CoreError::AlreadyExecuted);
        }
        self.executed = true;
        Ok(self.algorithm.execute().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Journal, registry};

    #[tokio::test]
    async fn executes_exactly_once() {
        let journal = Journal::default();
        let text = "print.props=false\nlog.step=0\n{ A }:2\n";
        let mut bench = Benchmark::from_alg_text(text, &registry(&journal)).unwrap();

        let summary = bench.execute().await.unwrap();
        assert_eq!(summary.count, 2);
        assert!(matches!(
            bench.execute().await,
            Err(CoreError::AlreadyExecuted)
        ));
        assert_eq!(journal.len(), 2);
    }

    #[test]
    fn grammar_errors_surface() {
        let err = Benchmark::from_alg_text("{ A", &registry(&Journal::default())).unwrap_err();
        assert!(matches!(err, CoreError::Grammar(_)));
    }

    #[test]
    fn debug_shows_state() {
        let bench = Benchmark::from_alg_text("A", &registry(&Journal::default())).unwrap();
        let text = format!("{bench:?}");
        assert!(text.starts_with("Benchmark"));
        assert!(text.contains("executed: false"));
    }
}
