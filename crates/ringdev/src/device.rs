//! Open/read/write/close/control facade over the channel registry.
//!
//! This is the surface an I/O framework calls into: each request names a
//! channel index (a device minor number, say) and the device routes it to that
//! channel's ring under the channel's lock.

use crate::metrics::MetricsSnapshot;
use crate::transfer::{LimitedSink, TransferSink, TransferSource};
use crate::{Config, Error, Registry};
use tracing::{debug, trace};

/// Multi-channel ring device.
#[derive(Debug)]
pub struct Device {
    registry: Registry,
}

impl Device {
    /// Builds every channel. Nothing is left allocated on failure.
    pub fn open(config: Config) -> Result<Self, Error> {
        let registry = Registry::initialize(config)?;
        debug!("device loaded");
        Ok(Self { registry })
    }

    /// Releases every channel.
    pub fn close(self) {
        self.registry.teardown();
        debug!("device unloaded");
    }

    /// Returns the underlying registry.
    #[inline]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Opens a channel. Carries no per-open state.
    pub fn open_channel(&self, channel: usize) -> Result<(), Error> {
        self.registry.check(channel)?;
        debug!(channel, "open");
        Ok(())
    }

    /// Closes a channel. Carries no per-open state.
    pub fn close_channel(&self, channel: usize) -> Result<(), Error> {
        self.registry.check(channel)?;
        debug!(channel, "close");
        Ok(())
    }

    /// Writes `bytes` to `channel`. Always consumes the whole input.
    pub fn write(&self, channel: usize, bytes: &[u8]) -> Result<usize, Error> {
        let mut source = bytes;
        self.write_from(channel, &mut source)
    }

    /// Writes everything `source` holds to `channel`.
    pub fn write_from<S>(&self, channel: usize, source: &mut S) -> Result<usize, Error>
    where
        S: TransferSource + ?Sized,
    {
        let consumed = self
            .registry
            .with_channel(channel, |ch| ch.write(source))??;
        trace!(channel, consumed, "write");
        Ok(consumed)
    }

    /// Reads up to `max_len` bytes from `channel`.
    ///
    /// Alternates a burst of new bytes with an empty response marking the
    /// end of data; see [`ReadCycle`](crate::ReadCycle).
    pub fn read(&self, channel: usize, max_len: usize) -> Result<Vec<u8>, Error> {
        let mut sink = LimitedSink::new(max_len);
        self.read_into(channel, &mut sink)?;
        Ok(sink.into_inner())
    }

    /// Reads from `channel` into `sink`, returning the bytes copied.
    pub fn read_into<S>(&self, channel: usize, sink: &mut S) -> Result<usize, Error>
    where
        S: TransferSink + ?Sized,
    {
        let copied = self
            .registry
            .with_channel(channel, |ch| ch.read(sink))??;
        trace!(channel, copied, "read");
        Ok(copied)
    }

    /// Device control. No command is supported.
    pub fn control(&self, channel: usize, command: u64, arg: u64) -> Result<(), Error> {
        self.registry.check(channel)?;
        debug!(channel, command, arg, "control");
        Err(Error::Unsupported { command })
    }

    /// Returns `channel`'s metrics.
    pub fn metrics(&self, channel: usize) -> Result<MetricsSnapshot, Error> {
        self.registry.metrics(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_open_close_channel() {
        let device = Device::open(Config::default()).unwrap();
        assert!(device.open_channel(0).is_ok());
        assert!(device.close_channel(3).is_ok());
        assert_eq!(
            device.open_channel(4),
            Err(Error::InvalidChannel {
                channel: 4,
                channels: 4
            })
        );
        device.close();
    }

    #[test]
    fn test_device_control_is_unsupported() {
        let device = Device::open(Config::default()).unwrap();
        for command in [0, 1, 2, u64::MAX] {
            assert_eq!(
                device.control(0, command, 0),
                Err(Error::Unsupported { command })
            );
        }
        assert!(matches!(
            device.control(9, 1, 0),
            Err(Error::InvalidChannel { channel: 9, .. })
        ));
    }

    #[test]
    fn test_device_write_read_cycle() {
        let device = Device::open(Config::default()).unwrap();

        assert_eq!(device.write(0, b"hello").unwrap(), 5);
        assert_eq!(device.read(0, 64).unwrap(), b"hello");
        assert!(device.read(0, 64).unwrap().is_empty());
        assert_eq!(device.write(0, b"hi").unwrap(), 2);
        assert_eq!(device.read(0, 64).unwrap(), b"hi");
    }

    #[test]
    fn test_device_invalid_channel_touches_nothing() {
        let device = Device::open(Config::default()).unwrap();
        assert!(matches!(
            device.write(7, b"x"),
            Err(Error::InvalidChannel { channel: 7, .. })
        ));
        assert!(device.read(7, 8).is_err());
        for channel in 0..4 {
            assert!(device.registry().is_empty(channel).unwrap());
        }
    }

    #[test]
    fn test_device_metrics_count_delivered_bytes() {
        let device = Device::open(Config::default().with_metrics(true)).unwrap();

        device.write(0, b"hello").unwrap();
        let mut received = device.read(0, 64).unwrap().len();
        received += device.read(0, 64).unwrap().len();
        device.write(0, b"hi").unwrap();
        received += device.read(0, 64).unwrap().len();

        let m = device.metrics(0).unwrap();
        assert_eq!(received, 7);
        assert_eq!(m.bytes_dumped, received as u64);
        assert_eq!(m.bytes_written, 7);
        assert_eq!(m.writes, 2);
    }
}
