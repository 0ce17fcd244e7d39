//! Process memory sampling for statistics entries.
//!
//! On Unix "used" is the peak resident set size reported by `getrusage(RUSAGE_SELF)` and
//! "total" is the physical memory of the host. Other platforms report zero for both.

/// A memory sample in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemorySample {
    pub used: u64,
    pub total: u64,
}

impl MemorySample {
    /// Keep the larger of each field.
    #[inline]
    pub fn max(self, other: MemorySample) -> MemorySample {
        MemorySample {
            used: self.used.max(other.used),
            total: self.total.max(other.total),
        }
    }
}

/// Sample current process memory.
pub fn sample() -> MemorySample {
    #[cfg(unix)]
    {
        unix_impl::sample()
    }

    #[cfg(not(unix))]
    {
        MemorySample::default()
    }
}

#[cfg(unix)]
mod unix_impl {
    use super::MemorySample;

    pub(super) fn sample() -> MemorySample {
        MemorySample {
            used: peak_rss(),
            total: physical_memory(),
        }
    }

    fn peak_rss() -> u64 {
        let mut usage = std::mem::MaybeUninit::<libc::rusage>::zeroed();
        // SAFETY: `usage` is a valid out pointer for the duration of the call.
        let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
        if rc != 0 {
            return 0;
        }
        // SAFETY: getrusage succeeded and filled the struct.
        let usage = unsafe { usage.assume_init() };
        let maxrss = u64::try_from(usage.ru_maxrss).unwrap_or(0);

        // ru_maxrss is in bytes on macOS and in kilobytes elsewhere.
        if cfg!(target_os = "macos") {
            maxrss
        } else {
            maxrss * 1024
        }
    }

    fn physical_memory() -> u64 {
        // SAFETY: sysconf has no memory-safety preconditions.
        let (pages, page_size) =
            unsafe { (libc::sysconf(libc::_SC_PHYS_PAGES), libc::sysconf(libc::_SC_PAGESIZE)) };
        match (u64::try_from(pages), u64::try_from(page_size)) {
            (Ok(p), Ok(s)) => p.saturating_mul(s),
            _ => 0,
        }
    }
}
