mod error;
pub use error::{BuiltinError, BuiltinResult};

pub mod r#fn;
pub use r#fn::{FnContext, FnRegistry, FnTask};

pub mod source;
pub use source::SyntheticSource;

pub mod tasks;
pub use tasks::register_builtins;

pub mod prelude {
    pub use crate::error::{BuiltinError, BuiltinResult};
    pub use crate::tasks::{ReportFormat, ReportKind, register_builtins};
    pub use crate::{FnContext, FnRegistry, SyntheticSource};
}
