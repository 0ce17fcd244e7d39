use std::sync::Arc;

use async_trait::async_trait;
use perfalg_core::{RunData, Task, TaskError};
use tracing::info;

use crate::error::BuiltinError;

/// `SetProp(name,value)`: overwrite a single-valued property.
#[derive(Clone)]
pub struct SetProp {
    run: Arc<RunData>,
    prop: Option<(String, String)>,
}

impl SetProp {
    pub const NAME: &'static str = "SetProp";

    pub fn new(run: &Arc<RunData>) -> Self {
        Self {
            run: Arc::clone(run),
            prop: None,
        }
    }
}

#[async_trait]
impl Task for SetProp {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn supports_params(&self) -> bool {
        true
    }

    fn set_params(&mut self, params: &str) -> Result<(), TaskError> {
        let (name, value) = params.split_once(',').ok_or(BuiltinError::BadParam {
            task: Self::NAME,
            value: params.to_string(),
            reason: "expected name,value".to_string(),
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(BuiltinError::BadParam {
                task: Self::NAME,
                value: params.to_string(),
                reason: "empty property name".to_string(),
            }
            .into());
        }
        self.prop = Some((name.to_string(), value.trim().to_string()));
        Ok(())
    }

    async fn execute_once(&mut self) -> Result<u64, TaskError> {
        let (name, value) = self.prop.as_ref().ok_or(BuiltinError::MissingParam {
            task: Self::NAME,
            expected: "name,value",
        })?;
        self.run.config().set(name, value)?;
        info!(property = %name, value = %value, "property set");
        Ok(0)
    }

    fn box_clone(&self) -> Box<dyn Task> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use perfalg_core::Config;

    use super::*;

    #[tokio::test]
    async fn sets_scalar_property() {
        let run = Arc::new(RunData::new(Config::new()));
        let mut task = SetProp::new(&run);
        task.set_params("merge.factor, 10").unwrap();
        task.execute_once().await.unwrap();
        assert_eq!(run.config().get_int("merge.factor", 0).unwrap(), 10);
    }

    #[tokio::test]
    async fn by_round_property_is_refused() {
        let run = Arc::new(RunData::new(Config::from_props([("mf", "1:2")])));
        run.config().get_int("mf", 0).unwrap();
        let mut task = SetProp::new(&run);
        task.set_params("mf,3").unwrap();
        assert!(matches!(
            task.execute_once().await,
            Err(TaskError::Config(_))
        ));
    }

    #[test]
    fn params_need_a_comma() {
        let run = Arc::new(RunData::new(Config::new()));
        let mut task = SetProp::new(&run);
        assert!(matches!(
            task.set_params("novalue"),
            Err(TaskError::InvalidParams { .. })
        ));
    }
}
