use crate::error::TaskError;

/// Input data consumed by tasks, shared across parallel units.
///
/// `next_item` returns [`TaskError::Exhausted`] once no more data is available for the
/// current pass. `close` may be called more than once.
pub trait ContentSource: Send + Sync {
    fn name(&self) -> &str;

    fn next_item(&self) -> Result<String, TaskError>;

    fn reset(&self) -> Result<(), TaskError>;

    fn close(&self);
}
