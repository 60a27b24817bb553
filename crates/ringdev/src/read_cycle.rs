//! Per-channel read cycle over a non-consuming ring.
//!
//! A [`Ring`] dump never consumes, so a reader polling a channel would see the
//! same bytes forever. The read cycle alternates a burst of data with a single
//! zero-length response (end of data), and remembers how far into the ring's
//! write stream it has already delivered so that the next burst carries only
//! bytes written since.
//!
//! ```text
//!                  burst of new bytes
//!   start --> Ready ------------------> Drained
//!             |   ^ <------------------
//!             |   |  0 bytes (end of data)
//!             `---'
//!       0 bytes (nothing new)
//! ```

use crate::invariants::debug_assert_watermark;
use crate::transfer::{TransferFault, TransferSink};
use crate::Ring;
use tracing::trace;

/// Observable state of a read cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadState {
    /// The next read delivers new bytes, if any.
    #[default]
    Ready,
    /// A burst was delivered; the next read returns the end-of-data marker.
    Drained,
}

/// Read-cycle marker kept alongside each channel's ring.
#[derive(Debug, Clone, Default)]
pub struct ReadCycle {
    pending_eof: bool,
    /// Value of the ring's write counter up to which bytes were handed out
    delivered: u64,
}

impl ReadCycle {
    /// Creates a cycle in the [`ReadState::Ready`] state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    #[inline]
    pub fn state(&self) -> ReadState {
        if self.pending_eof {
            ReadState::Drained
        } else {
            ReadState::Ready
        }
    }

    /// Returns true while the end-of-data marker is owed to the reader.
    #[inline]
    pub fn pending_eof(&self) -> bool {
        self.pending_eof
    }

    /// Returns the write-counter position already delivered.
    #[inline]
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Bytes a `Ready` read would deliver given unlimited room.
    ///
    /// A cycle follows the write counter of one ring. Against a ring that
    /// has seen fewer bytes than were delivered, nothing counts as unread.
    pub fn unread(&self, ring: &Ring) -> usize {
        let fresh = ring.total_written().saturating_sub(self.delivered);
        fresh.min(ring.len() as u64) as usize
    }

    /// Serves one read request against `ring`.
    ///
    /// Returns the number of bytes copied into `sink`; zero means either
    /// nothing new or the end-of-data marker. Bytes that do not fit in the
    /// sink stay unread and come with the next burst (unless overwritten
    /// first). On a sink fault the cycle is left exactly as it was.
    pub fn read<S>(&mut self, ring: &Ring, sink: &mut S) -> Result<usize, TransferFault>
    where
        S: TransferSink + ?Sized,
    {
        if self.pending_eof {
            self.pending_eof = false;
            trace!("read: end of data");
            return Ok(0);
        }

        if ring.is_empty() {
            return Ok(0);
        }

        let unread = self.unread(ring);
        let take = unread.min(sink.remaining());
        if take == 0 {
            return Ok(0);
        }

        let copied = ring.dump_from(ring.len() - unread, sink)?;
        debug_assert_eq!(copied, take);

        self.delivered = ring.total_written() - (unread - take) as u64;
        self.pending_eof = true;

        debug_assert_watermark!(self.delivered, ring.total_written());

        trace!(
            delivered = take,
            left_unread = unread - take,
            "read: burst"
        );

        Ok(take)
    }
}
