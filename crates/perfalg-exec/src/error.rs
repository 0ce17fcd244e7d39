use perfalg_core::TaskError;
use thiserror::Error;

/// Errors raised by the built-in tasks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuiltinError {
    #[error("{task}: missing parameter ({expected})")]
    MissingParam {
        task: &'static str,
        expected: &'static str,
    },
    #[error("{task}: cannot parse {value:?} ({reason})")]
    BadParam {
        task: &'static str,
        value: String,
        reason: String,
    },
    #[error("{task}: no content source bound to the run")]
    NoContentSource { task: &'static str },
    #[error("content source {0:?} is closed")]
    SourceClosed(String),
    #[error("invalid report format {0:?}, expected text or json")]
    InvalidReportFormat(String),
    #[error("cannot render report: {0}")]
    Render(String),
}

pub type BuiltinResult<T> = Result<T, BuiltinError>;

impl From<BuiltinError> for TaskError {
    fn from(e: BuiltinError) -> Self {
        match e {
            BuiltinError::MissingParam { task, .. } | BuiltinError::BadParam { task, .. } => {
                TaskError::InvalidParams {
                    task: task.to_string(),
                    reason: e.to_string(),
                }
            }
            other => TaskError::failed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_errors_become_invalid_params() {
        let e: TaskError = BuiltinError::MissingParam {
            task: "Wait",
            expected: "duration",
        }
        .into();
        assert!(matches!(e, TaskError::InvalidParams { ref task, .. } if task == "Wait"));
    }

    #[test]
    fn other_errors_become_failures() {
        let e: TaskError = BuiltinError::NoContentSource { task: "Consume" }.into();
        assert!(matches!(e, TaskError::Failed { .. }));
    }
}
