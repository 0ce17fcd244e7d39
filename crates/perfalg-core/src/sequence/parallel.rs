use perfalg_model::Repetition;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::{Outcome, Sequence, pacer::Pacer};
use crate::error::ExecError;

impl Sequence {
    /// Launch `count` clones of every child as independent units and join them all.
    ///
    /// Exhaustion inside a unit marks the sequence exhausted without touching siblings.
    /// A failure stops further launches; units already running are joined before the first
    /// failure is returned.
    pub(super) async fn run_parallel(
        &mut self,
        name: &str,
        child_report: bool,
    ) -> Result<Outcome, ExecError> {
        let reps = match self.repetition {
            Repetition::Count(n) => n,
            Repetition::UntilExhausted | Repetition::For(_) => 1,
        };
        let total = reps as usize * self.children.len();
        let token = CancellationToken::new();
        let mut pacer = self.rate.map(Pacer::new);
        let mut units = JoinSet::new();
        self.completed_passes = 0;

        // Node is not Sync: no child borrow may live across the pacing await.
        'launch: for _ in 0..reps {
            for i in 0..self.children.len() {
                if let Some(p) = pacer.as_mut()
                    && !p.wait_or_cancel(&token).await
                {
                    break 'launch;
                }
                if token.is_cancelled() {
                    break 'launch;
                }

                let mut unit = self.children[i].clone();
                let token = token.clone();
                units.spawn(async move {
                    let result = unit.run(child_report).await;
                    if matches!(&result, Err(e) if !e.is_exhausted()) {
                        token.cancel();
                    }
                    result
                });
            }
        }

        if units.len() < total {
            warn!(
                sequence = name,
                launched = units.len(),
                total,
                "parallel units not launched after a failure"
            );
        }

        let mut out = Outcome::default();
        let mut failure = None;
        while let Some(joined) = units.join_next().await {
            match joined {
                Ok(Ok(o)) => out.absorb(&o),
                Ok(Err(ExecError::Exhausted)) => out.exhausted = true,
                Ok(Err(e)) => {
                    failure.get_or_insert(e);
                }
                Err(e) => {
                    token.cancel();
                    failure.get_or_insert(ExecError::Join {
                        task: name.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        match failure {
            Some(e) => Err(e),
            None => {
                self.completed_passes = u64::from(reps);
                Ok(out)
            }
        }
    }
}
