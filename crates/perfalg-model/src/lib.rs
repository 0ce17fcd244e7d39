//! Plain value types shared by the perfalg crates.
//!
//! Nothing in here executes anything: these are the shapes the parser produces,
//! the scheduler consumes and the statistics collector reports.

mod domain;
pub use domain::*;

mod kind;
pub use kind::*;
