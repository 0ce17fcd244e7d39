use std::time::Duration;

use perfalg_model::Rate;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

/// Paces starts at fixed ideal times `t0, t0 + step, t0 + 2*step, ...`.
///
/// Overruns do not shift later ideal times, so the average rate holds.
pub(crate) struct Pacer {
    next: Instant,
    step: Duration,
}

impl Pacer {
    pub(crate) fn new(rate: Rate) -> Self {
        Self {
            next: Instant::now(),
            step: rate.delay_step(),
        }
    }

    pub(crate) async fn wait(&mut self) {
        sleep_until(self.next).await;
        self.next += self.step;
    }

    /// Like `wait`, but returns `false` as soon as `token` is cancelled.
    pub(crate) async fn wait_or_cancel(&mut self, token: &CancellationToken) -> bool {
        tokio::select! {
            _ = token.cancelled() => false,
            _ = sleep_until(self.next) => {
                self.next += self.step;
                true
            }
        }
    }
}
