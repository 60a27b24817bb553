use crate::invariants::{
    debug_assert_bounded_dump, debug_assert_chunk_fits, debug_assert_cursor_in_range,
    debug_assert_full_convention,
};
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::transfer::{TransferFault, TransferSink, TransferSource};
use crate::Config;
use std::collections::TryReserveError;
use tracing::{trace, warn};

// =============================================================================
// CURSOR PROTOCOL
// =============================================================================
//
// `head` and `tail` are wrapped indices into `storage`, paired with a `full`
// flag to tell "zero bytes" from "capacity bytes" when the cursors meet.
//
// ## Before the first wrap
//
// `head` stays at 0 and the valid bytes are `storage[0..tail]`. Nothing has
// been overwritten yet, so the oldest byte is always at index 0.
//
// ## After the first wrap
//
// The moment `tail` wraps to 0, `full` is set and never cleared. From then on
// every chunk drags `head` along with `tail`: the ring always holds exactly
// `capacity` bytes and the oldest one sits at `head`. Writers never block;
// the oldest bytes are silently discarded (overwrite-oldest).
//
// ## Serialization
//
// The ring has no internal locking. `enqueue` takes `&mut self` and `dump`
// takes `&self`, so the borrow checker (or the registry's per-channel mutex)
// rules out a dump observing `head`, `tail` and `full` mid-update.
//
// =============================================================================

/// Fixed-capacity circular byte buffer with overwrite-oldest writes.
///
/// Reads never consume: [`dump`](Ring::dump) copies the whole current
/// content out, oldest byte first, and leaves the cursors untouched.
#[derive(Debug)]
pub struct Ring {
    /// Index of the oldest valid byte
    head: usize,
    /// Index of the next byte to be written
    tail: usize,
    /// True iff the ring holds exactly `capacity` bytes
    full: bool,
    /// Lifetime count of bytes accepted by enqueue
    written: u64,
    metrics: Metrics,
    enable_metrics: bool,
    /// Backing storage, fixed at construction.
    storage: Box<[u8]>,
}

impl Ring {
    /// Creates an empty ring of `config.capacity` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `config.capacity` is zero.
    pub fn new(config: Config) -> Self {
        assert!(config.capacity > 0, "ring capacity must be positive");
        Self::with_storage(vec![0u8; config.capacity].into_boxed_slice(), config)
    }

    /// Creates an empty ring, reporting allocation failure instead of aborting.
    ///
    /// # Panics
    ///
    /// Panics if `config.capacity` is zero.
    pub fn try_new(config: Config) -> Result<Self, TryReserveError> {
        assert!(config.capacity > 0, "ring capacity must be positive");
        let mut storage = Vec::new();
        storage.try_reserve_exact(config.capacity)?;
        storage.resize(config.capacity, 0u8);
        Ok(Self::with_storage(storage.into_boxed_slice(), config))
    }

    fn with_storage(storage: Box<[u8]>, config: Config) -> Self {
        Self {
            head: 0,
            tail: 0,
            full: false,
            written: 0,
            metrics: Metrics::new(),
            enable_metrics: config.enable_metrics,
            storage,
        }
    }

    // ---------------------------------------------------------------------
    // STATUS
    // ---------------------------------------------------------------------

    /// Returns the ring capacity in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Returns the number of valid bytes.
    #[inline]
    pub fn len(&self) -> usize {
        if self.full {
            self.capacity()
        } else {
            (self.tail + self.capacity() - self.head) % self.capacity()
        }
    }

    /// Returns true if the ring holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.full && self.head == self.tail
    }

    /// Returns true once the ring has wrapped and holds `capacity` bytes.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Returns the index of the oldest valid byte.
    #[inline]
    pub fn head(&self) -> usize {
        self.head
    }

    /// Returns the index of the next byte to be written.
    #[inline]
    pub fn tail(&self) -> usize {
        self.tail
    }

    /// Returns the number of bytes ever accepted by this ring.
    ///
    /// `total_written() - len()` is the number of bytes lost to overwrite.
    #[inline]
    pub fn total_written(&self) -> u64 {
        self.written
    }

    // ---------------------------------------------------------------------
    // WRITE PATH
    // ---------------------------------------------------------------------

    /// Appends every byte of `source`, splitting at the wraparound boundary.
    ///
    /// Never blocks and never rejects input for lack of room: once the ring
    /// has wrapped, each chunk overwrites the oldest bytes. Returns the number
    /// of bytes consumed, which always equals the source length.
    ///
    /// If the source faults, the chunk in progress is abandoned without
    /// moving any cursor, and the fault reports the bytes committed by the
    /// earlier chunks of this call. Those stay in the ring.
    pub fn enqueue<S>(&mut self, source: &mut S) -> Result<usize, TransferFault>
    where
        S: TransferSource + ?Sized,
    {
        let capacity = self.capacity();
        let len_before = self.len();
        let mut consumed = 0usize;

        while source.remaining() > 0 {
            let room_to_end = capacity - self.tail;
            let chunk = source.remaining().min(room_to_end);

            debug_assert_chunk_fits!(self.tail, chunk, capacity);

            if let Err(fault) = source.copy_out(&mut self.storage[self.tail..self.tail + chunk]) {
                warn!(
                    %fault,
                    chunk,
                    consumed,
                    head = self.head,
                    tail = self.tail,
                    "enqueue aborted"
                );
                if self.enable_metrics {
                    self.metrics.add_fault();
                    // Earlier chunks of this call stay committed.
                    if consumed > 0 {
                        let overwritten = (len_before + consumed).saturating_sub(capacity);
                        self.metrics.add_write(consumed, overwritten);
                    }
                }
                return Err(TransferFault::after(consumed));
            }

            let mut next_tail = self.tail + chunk;
            if next_tail == capacity {
                next_tail = 0;
                self.full = true;
            }
            self.tail = next_tail;

            if self.full {
                self.head = self.tail;
            }

            consumed += chunk;
            self.written += chunk as u64;

            debug_assert_cursor_in_range!("tail", self.tail, capacity);
            debug_assert_cursor_in_range!("head", self.head, capacity);
            debug_assert_full_convention!(self.full, self.head, self.tail);
        }

        let overwritten = (len_before + consumed).saturating_sub(capacity);
        if self.enable_metrics {
            self.metrics.add_write(consumed, overwritten);
        }

        trace!(
            consumed,
            overwritten,
            head = self.head,
            tail = self.tail,
            full = self.full,
            "enqueue"
        );

        Ok(consumed)
    }

    /// Appends `bytes` (convenience for in-memory callers).
    #[inline]
    pub fn write(&mut self, bytes: &[u8]) -> usize {
        let mut source = bytes;
        // A slice never hands out fewer bytes than it advertises.
        self.enqueue(&mut source)
            .unwrap_or_else(|fault| fault.transferred)
    }

    // ---------------------------------------------------------------------
    // READ PATH
    // ---------------------------------------------------------------------

    /// Returns the valid bytes as up to two slices, oldest first.
    ///
    /// The second slice is non-empty only when the ring has wrapped and
    /// `head != 0`. Concatenated, the slices hold `len()` bytes.
    pub fn segments(&self) -> (&[u8], &[u8]) {
        debug_assert_full_convention!(self.full, self.head, self.tail);

        if self.full {
            (&self.storage[self.head..], &self.storage[..self.tail])
        } else {
            (&self.storage[..self.tail], &[])
        }
    }

    /// Copies the whole current content into `sink`, oldest byte first.
    ///
    /// Non-consuming: cursors are untouched and a second dump with no write
    /// in between yields the same bytes. Each segment is truncated to what
    /// the sink can still accept. Returns the number of bytes copied.
    ///
    /// On a sink fault the error carries the bytes copied by earlier
    /// segments.
    pub fn dump<S>(&self, sink: &mut S) -> Result<usize, TransferFault>
    where
        S: TransferSink + ?Sized,
    {
        self.dump_from(0, sink)
    }

    /// Like [`dump`](Ring::dump), but leaves out the `skip` oldest bytes.
    ///
    /// Only bytes handed to `sink` are counted, in the return value, in the
    /// fault and in the metrics.
    pub(crate) fn dump_from<S>(&self, skip: usize, sink: &mut S) -> Result<usize, TransferFault>
    where
        S: TransferSink + ?Sized,
    {
        let (first, second) = self.segments();
        let mut skip = skip;
        let mut copied = 0usize;

        for segment in [first, second] {
            let skipped = skip.min(segment.len());
            skip -= skipped;

            let segment = &segment[skipped..];
            let n = segment.len().min(sink.remaining());
            if n == 0 {
                continue;
            }
            if let Err(fault) = sink.copy_in(&segment[..n]) {
                warn!(%fault, copied, head = self.head, tail = self.tail, "dump aborted");
                if self.enable_metrics {
                    self.metrics.add_fault();
                }
                return Err(TransferFault::after(copied));
            }
            copied += n;
        }

        debug_assert_bounded_dump!(copied, self.capacity());

        if self.enable_metrics {
            self.metrics.add_dump(copied);
        }

        Ok(copied)
    }

    /// Returns a copy of the current content, oldest byte first.
    pub fn snapshot(&self) -> Vec<u8> {
        let (first, second) = self.segments();
        let mut out = Vec::with_capacity(first.len() + second.len());
        out.extend_from_slice(first);
        out.extend_from_slice(second);
        out
    }

    // ---------------------------------------------------------------------
    // METRICS
    // ---------------------------------------------------------------------

    /// Get a snapshot of metrics if enabled.
    pub fn metrics(&self) -> MetricsSnapshot {
        if self.enable_metrics {
            self.metrics.snapshot()
        } else {
            MetricsSnapshot::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::{LimitedSink, RegionFault};

    fn ring(capacity: usize) -> Ring {
        Ring::new(Config::new(capacity, 1, true))
    }

    /// Source that faults on its `fail_on`-th copy.
    struct FaultySource<'a> {
        data: &'a [u8],
        calls: usize,
        fail_on: usize,
    }

    impl TransferSource for FaultySource<'_> {
        fn remaining(&self) -> usize {
            self.data.len()
        }

        fn copy_out(&mut self, dst: &mut [u8]) -> Result<(), RegionFault> {
            self.calls += 1;
            if self.calls == self.fail_on {
                return Err(RegionFault);
            }
            self.data.copy_out(dst)
        }
    }

    #[test]
    fn test_ring_fresh_is_empty() {
        let ring = ring(20);
        assert!(ring.is_empty());
        assert!(!ring.is_full());
        assert_eq!(ring.len(), 0);
        assert_eq!(ring.snapshot(), Vec::<u8>::new());
    }

    #[test]
    fn test_ring_fifo_without_wrap() {
        let mut ring = ring(20);
        assert_eq!(ring.write(b"hello"), 5);
        assert_eq!(ring.write(b" world"), 6);

        assert!(!ring.is_empty());
        assert_eq!(ring.len(), 11);
        assert_eq!(ring.head(), 0);
        assert_eq!(ring.tail(), 11);
        assert_eq!(ring.snapshot(), b"hello world");
    }

    #[test]
    fn test_ring_exact_fill_sets_full() {
        let mut ring = ring(10);
        let data: Vec<u8> = (0..10).collect();
        ring.write(&data);

        assert!(ring.is_full());
        assert_eq!(ring.head(), 0);
        assert_eq!(ring.tail(), 0);
        assert_eq!(ring.len(), 10);
        assert!(!ring.is_empty());
        assert_eq!(ring.snapshot(), data);
    }

    #[test]
    fn test_ring_wraparound_split_dump() {
        let mut ring = ring(10);
        ring.write(&(0..10).collect::<Vec<u8>>());
        ring.write(&[10u8, 11, 12, 13]);

        assert_eq!(ring.head(), 4);
        assert_eq!(ring.tail(), 4);

        let (first, second) = ring.segments();
        assert_eq!(first, &[4u8, 5, 6, 7, 8, 9]);
        assert_eq!(second, &[10u8, 11, 12, 13]);

        let mut out = Vec::new();
        assert_eq!(ring.dump(&mut out).unwrap(), 10);
        assert_eq!(out, vec![4u8, 5, 6, 7, 8, 9, 10, 11, 12, 13]);
    }

    #[test]
    fn test_ring_single_write_larger_than_capacity() {
        let mut ring = ring(8);
        let data: Vec<u8> = (0..27).collect();
        assert_eq!(ring.write(&data), 27);

        assert_eq!(ring.len(), 8);
        assert_eq!(ring.snapshot(), &data[19..]);
        assert_eq!(ring.total_written(), 27);
    }

    #[test]
    fn test_ring_dump_is_idempotent() {
        let mut ring = ring(6);
        ring.write(b"abcdefgh");

        let mut first = Vec::new();
        let mut second = Vec::new();
        ring.dump(&mut first).unwrap();
        ring.dump(&mut second).unwrap();

        assert_eq!(first, b"cdefgh");
        assert_eq!(first, second);
        assert_eq!((ring.head(), ring.tail(), ring.is_full()), (2, 2, true));
    }

    /// Sink that faults on its `fail_on`-th copy.
    struct FaultySink {
        out: Vec<u8>,
        calls: usize,
        fail_on: usize,
    }

    impl TransferSink for FaultySink {
        fn remaining(&self) -> usize {
            usize::MAX - self.out.len()
        }

        fn copy_in(&mut self, src: &[u8]) -> Result<(), RegionFault> {
            self.calls += 1;
            if self.calls == self.fail_on {
                return Err(RegionFault);
            }
            self.out.copy_in(src)
        }
    }

    #[test]
    fn test_ring_dump_fault_on_second_segment() {
        let mut ring = ring(10);
        ring.write(&(0..14).collect::<Vec<u8>>());
        assert_eq!(ring.head(), 4);

        let mut sink = FaultySink {
            out: Vec::new(),
            calls: 0,
            fail_on: 2,
        };
        let err = ring.dump(&mut sink).unwrap_err();

        assert_eq!(
            err,
            TransferFault {
                transferred: ring.capacity() - ring.head()
            }
        );
        assert_eq!(sink.out, vec![4u8, 5, 6, 7, 8, 9]);
        assert_eq!((ring.head(), ring.tail(), ring.is_full()), (4, 4, true));

        let m = ring.metrics();
        assert_eq!(m.transfer_faults, 1);
        assert_eq!(m.dumps, 0);
        assert_eq!(m.bytes_dumped, 0);
    }

    #[test]
    fn test_ring_dump_from_skips_oldest() {
        let mut ring = ring(10);
        ring.write(&(0..14).collect::<Vec<u8>>());

        // Skip runs past the first segment into the second.
        let mut out = Vec::new();
        assert_eq!(ring.dump_from(8, &mut out).unwrap(), 2);
        assert_eq!(out, vec![12u8, 13]);

        let mut short = LimitedSink::new(3);
        assert_eq!(ring.dump_from(2, &mut short).unwrap(), 3);
        assert_eq!(short.as_slice(), &[6u8, 7, 8]);

        assert_eq!(ring.metrics().bytes_dumped, 5);
    }

    #[test]
    fn test_ring_dump_truncates_to_sink() {
        let mut ring = ring(10);
        ring.write(&(0..14).collect::<Vec<u8>>());

        let mut sink = LimitedSink::new(8);
        assert_eq!(ring.dump(&mut sink).unwrap(), 8);
        assert_eq!(sink.as_slice(), &[4u8, 5, 6, 7, 8, 9, 10, 11]);
    }

    #[test]
    fn test_ring_empty_write_is_noop() {
        let mut ring = ring(4);
        assert_eq!(ring.write(&[]), 0);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_ring_fault_keeps_committed_chunks() {
        let mut ring = ring(10);
        ring.write(b"0123456");

        // First chunk fills positions 7..10, second chunk faults.
        let mut source = FaultySource {
            data: b"abcdef",
            calls: 0,
            fail_on: 2,
        };
        let err = ring.enqueue(&mut source).unwrap_err();

        assert_eq!(err, TransferFault { transferred: 3 });
        assert!(ring.is_full());
        assert_eq!(ring.tail(), 0);
        assert_eq!(ring.snapshot(), b"0123456abc");
        assert_eq!(ring.total_written(), 10);

        let m = ring.metrics();
        assert_eq!(m.transfer_faults, 1);
        assert_eq!(m.writes, 2);
        assert_eq!(m.bytes_written, ring.total_written());
        assert_eq!(m.bytes_overwritten, 0);
    }

    #[test]
    fn test_ring_fault_after_wrap_counts_overwritten() {
        let mut ring = ring(10);
        ring.write(b"01234567");

        // "ab" fills 8..10 and wraps, "cdefghijkl" overwrites the whole
        // ring, then the third chunk faults.
        let mut source = FaultySource {
            data: b"abcdefghijklmn",
            calls: 0,
            fail_on: 3,
        };
        let err = ring.enqueue(&mut source).unwrap_err();
        assert_eq!(err.transferred, 12);
        assert_eq!(ring.snapshot(), b"cdefghijkl");

        let m = ring.metrics();
        assert_eq!(m.bytes_written, 20);
        assert_eq!(m.bytes_written, ring.total_written());
        assert_eq!(m.bytes_overwritten, ring.total_written() - ring.len() as u64);
    }

    #[test]
    fn test_ring_fault_on_first_chunk_leaves_ring_untouched() {
        let mut ring = ring(10);
        let mut source = FaultySource {
            data: b"abc",
            calls: 0,
            fail_on: 1,
        };
        assert_eq!(
            ring.enqueue(&mut source),
            Err(TransferFault { transferred: 0 })
        );
        assert!(ring.is_empty());
        assert_eq!(ring.tail(), 0);
    }

    #[test]
    fn test_ring_metrics() {
        let mut ring = ring(4);
        ring.write(b"abc");
        ring.write(b"def");
        let _ = ring.snapshot();
        let mut out = Vec::new();
        ring.dump(&mut out).unwrap();

        let m = ring.metrics();
        assert_eq!(m.writes, 2);
        assert_eq!(m.bytes_written, 6);
        assert_eq!(m.bytes_overwritten, 2);
        assert_eq!(m.dumps, 1);
        assert_eq!(m.bytes_dumped, 4);
    }

    #[test]
    fn test_ring_metrics_disabled() {
        let mut ring = Ring::new(Config::new(4, 1, false));
        ring.write(b"abcdef");
        assert_eq!(ring.metrics(), MetricsSnapshot::default());
    }

    #[test]
    fn test_try_new_reports_overflow() {
        let config = Config::new(usize::MAX, 1, false);
        assert!(Ring::try_new(config).is_err());
    }
}
