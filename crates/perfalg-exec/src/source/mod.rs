//! Bundled content source producing numbered synthetic items.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use perfalg_core::{Config, ConfigError, ContentSource, TaskError};
use tracing::debug;

use crate::error::BuiltinError;

/// Default number of items per pass.
pub const DEFAULT_ITEMS: u64 = 1000;

/// Serves `items` items per pass, then either starts over (`forever`) or reports exhaustion
/// until reset.
#[derive(Debug)]
pub struct SyntheticSource {
    items: u64,
    forever: bool,
    next: AtomicU64,
    closed: AtomicBool,
}

impl SyntheticSource {
    pub fn new(items: u64, forever: bool) -> Self {
        Self {
            items,
            forever,
            next: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Size and cycling from `content.source.items` and `content.source.forever`.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let items = config.get_int("content.source.items", DEFAULT_ITEMS as i64)?;
        let forever = config.get_bool("content.source.forever", true)?;
        Ok(Self::new(u64::try_from(items).unwrap_or(0), forever))
    }

    /// Items handed out since the last reset.
    pub fn served(&self) -> u64 {
        let n = self.next.load(Ordering::SeqCst);
        if self.forever { n } else { n.min(self.items) }
    }
}

impl ContentSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn next_item(&self) -> Result<String, TaskError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(BuiltinError::SourceClosed(self.name().to_string()).into());
        }
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        if self.items == 0 || (!self.forever && n >= self.items) {
            return Err(TaskError::Exhausted);
        }
        Ok(format!("item-{}", n % self.items))
    }

    fn reset(&self) -> Result<(), TaskError> {
        self.next.store(0, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!(source = self.name(), served = self.served(), "content source closed");
        }
    }
}
