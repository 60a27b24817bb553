use std::sync::atomic::{AtomicU64, Ordering};

/// Per-ring counters.
///
/// Uses relaxed atomics so that the read-only dump path can record
/// through `&self`.
#[derive(Debug, Default)]
pub(crate) struct Metrics {
    bytes_written: AtomicU64,
    bytes_overwritten: AtomicU64,
    writes: AtomicU64,
    dumps: AtomicU64,
    bytes_dumped: AtomicU64,
    transfer_faults: AtomicU64,
}

impl Metrics {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn add_write(&self, bytes: usize, overwritten: usize) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
        self.bytes_overwritten
            .fetch_add(overwritten as u64, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_dump(&self, bytes: usize) {
        self.dumps.fetch_add(1, Ordering::Relaxed);
        self.bytes_dumped.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_fault(&self) {
        self.transfer_faults.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            bytes_overwritten: self.bytes_overwritten.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            dumps: self.dumps.load(Ordering::Relaxed),
            bytes_dumped: self.bytes_dumped.load(Ordering::Relaxed),
            transfer_faults: self.transfer_faults.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of a ring's metrics.
///
/// All fields stay zero unless [`Config::enable_metrics`](crate::Config) is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Bytes accepted by enqueue.
    pub bytes_written: u64,
    /// Bytes discarded by the overwrite-oldest policy.
    pub bytes_overwritten: u64,
    /// Completed enqueue calls.
    pub writes: u64,
    /// Completed dump calls.
    pub dumps: u64,
    /// Bytes copied out by dumps.
    pub bytes_dumped: u64,
    /// Enqueue or dump calls aborted by a transfer fault.
    pub transfer_faults: u64,
}
