//! Byte transfer between ring storage and a caller's memory region.
//!
//! The ring never touches caller memory directly. Writes pull bytes from a
//! [`TransferSource`] and dumps push bytes into a [`TransferSink`], so the
//! engine can be embedded behind any I/O framework (and tested with plain
//! slices and vectors).
//!
//! Both traits follow scatter/gather move semantics: a sink advertises how many
//! bytes it can still accept and the ring never offers more than that.

use thiserror::Error;

/// The caller's memory region could not be read or written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("caller memory region is not accessible")]
pub struct RegionFault;

/// A copy failed partway through a ring operation.
///
/// `transferred` counts the bytes committed by earlier chunks of the same call.
/// Those bytes are not rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("transfer fault after {transferred} bytes")]
pub struct TransferFault {
    /// Bytes moved before the fault.
    pub transferred: usize,
}

impl TransferFault {
    #[inline]
    pub(crate) const fn after(transferred: usize) -> Self {
        Self { transferred }
    }
}

/// Caller-supplied bytes to be enqueued.
pub trait TransferSource {
    /// Bytes not yet moved out of the source.
    fn remaining(&self) -> usize;

    /// Moves exactly `dst.len()` bytes into `dst` and consumes them.
    ///
    /// On error nothing is consumed.
    fn copy_out(&mut self, dst: &mut [u8]) -> Result<(), RegionFault>;
}

/// Caller-supplied destination for dumped bytes.
pub trait TransferSink {
    /// Bytes the sink can still accept.
    fn remaining(&self) -> usize;

    /// Appends all of `src`. Never called with more than `remaining()` bytes.
    fn copy_in(&mut self, src: &[u8]) -> Result<(), RegionFault>;
}

impl TransferSource for &[u8] {
    #[inline]
    fn remaining(&self) -> usize {
        self.len()
    }

    fn copy_out(&mut self, dst: &mut [u8]) -> Result<(), RegionFault> {
        if dst.len() > self.len() {
            return Err(RegionFault);
        }
        let (head, rest) = self.split_at(dst.len());
        dst.copy_from_slice(head);
        *self = rest;
        Ok(())
    }
}

impl<S: TransferSource + ?Sized> TransferSource for &mut S {
    #[inline]
    fn remaining(&self) -> usize {
        (**self).remaining()
    }

    #[inline]
    fn copy_out(&mut self, dst: &mut [u8]) -> Result<(), RegionFault> {
        (**self).copy_out(dst)
    }
}

/// Unbounded sink.
impl TransferSink for Vec<u8> {
    #[inline]
    fn remaining(&self) -> usize {
        usize::MAX - self.len()
    }

    #[inline]
    fn copy_in(&mut self, src: &[u8]) -> Result<(), RegionFault> {
        self.extend_from_slice(src);
        Ok(())
    }
}

impl<S: TransferSink + ?Sized> TransferSink for &mut S {
    #[inline]
    fn remaining(&self) -> usize {
        (**self).remaining()
    }

    #[inline]
    fn copy_in(&mut self, src: &[u8]) -> Result<(), RegionFault> {
        (**self).copy_in(src)
    }
}

/// Growable sink that accepts at most `limit` bytes.
#[derive(Debug, Clone, Default)]
pub struct LimitedSink {
    buf: Vec<u8>,
    limit: usize,
}

impl LimitedSink {
    /// Creates an empty sink accepting up to `limit` bytes.
    pub fn new(limit: usize) -> Self {
        Self {
            buf: Vec::new(),
            limit,
        }
    }

    /// Bytes collected so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the sink, returning the collected bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

impl TransferSink for LimitedSink {
    #[inline]
    fn remaining(&self) -> usize {
        self.limit - self.buf.len()
    }

    fn copy_in(&mut self, src: &[u8]) -> Result<(), RegionFault> {
        if src.len() > self.remaining() {
            return Err(RegionFault);
        }
        self.buf.extend_from_slice(src);
        Ok(())
    }
}

/// Sink over a fixed caller buffer, filled from the front.
#[derive(Debug)]
pub struct SliceSink<'a> {
    buf: &'a mut [u8],
    filled: usize,
}

impl<'a> SliceSink<'a> {
    /// Wraps `buf`; nothing is filled yet.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, filled: 0 }
    }

    /// Number of bytes written into the buffer.
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// The filled prefix of the buffer.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.filled]
    }
}

impl TransferSink for SliceSink<'_> {
    #[inline]
    fn remaining(&self) -> usize {
        self.buf.len() - self.filled
    }

    fn copy_in(&mut self, src: &[u8]) -> Result<(), RegionFault> {
        let end = self.filled + src.len();
        if end > self.buf.len() {
            return Err(RegionFault);
        }
        self.buf[self.filled..end].copy_from_slice(src);
        self.filled = end;
        Ok(())
    }
}
