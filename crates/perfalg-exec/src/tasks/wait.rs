use std::time::Duration;

use async_trait::async_trait;
use perfalg_core::{Task, TaskError};

use crate::error::{BuiltinError, BuiltinResult};

/// `Wait(1.5)`, `Wait(2s)`, `Wait(250ms)`: sleep without doing work.
#[derive(Clone, Default)]
pub struct Wait {
    time: Option<Duration>,
}

impl Wait {
    pub const NAME: &'static str = "Wait";
}

/// Seconds with an optional `s` or `ms` suffix.
pub(crate) fn parse_wait(text: &str) -> BuiltinResult<Duration> {
    let text = text.trim();
    let bad = |reason: &str| BuiltinError::BadParam {
        task: Wait::NAME,
        value: text.to_string(),
        reason: reason.to_string(),
    };

    let (number, per_sec) = if let Some(ms) = text.strip_suffix("ms") {
        (ms, 1000.0)
    } else if let Some(s) = text.strip_suffix('s') {
        (s, 1.0)
    } else {
        (text, 1.0)
    };
    let value: f64 = number.trim().parse().map_err(|_| bad("not a number"))?;
    if value < 0.0 {
        return Err(bad("negative wait"));
    }
    Duration::try_from_secs_f64(value / per_sec).map_err(|_| bad("out of range"))
}

#[async_trait]
impl Task for Wait {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn supports_params(&self) -> bool {
        true
    }

    fn set_params(&mut self, params: &str) -> Result<(), TaskError> {
        self.time = Some(parse_wait(params)?);
        Ok(())
    }

    async fn execute_once(&mut self) -> Result<u64, TaskError> {
        let time = self.time.ok_or(BuiltinError::MissingParam {
            task: Self::NAME,
            expected: "wait time",
        })?;
        tokio::time::sleep(time).await;
        Ok(0)
    }

    fn box_clone(&self) -> Box<dyn Task> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_units() {
        assert_eq!(parse_wait("1.5").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_wait("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_wait(" 250ms ").unwrap(), Duration::from_millis(250));
        assert!(parse_wait("soon").is_err());
        assert!(parse_wait("-1").is_err());
    }

    #[tokio::test]
    async fn wait_sleeps() {
        let mut w = Wait::default();
        w.set_params("20ms").unwrap();
        let started = tokio::time::Instant::now();
        assert_eq!(w.execute_once().await.unwrap(), 0);
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn wait_without_time_fails() {
        let mut w = Wait::default();
        assert!(matches!(
            w.execute_once().await,
            Err(TaskError::InvalidParams { .. })
        ));
    }
}
