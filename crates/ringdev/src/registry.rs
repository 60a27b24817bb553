use crate::metrics::MetricsSnapshot;
use crate::read_cycle::ReadCycle;
use crate::transfer::{TransferFault, TransferSink, TransferSource};
use crate::{Config, Error, Ring};
use crossbeam_utils::CachePadded;
use parking_lot::{Mutex, MutexGuard};
use std::collections::TryReserveError;
use tracing::{debug, warn};

/// One addressable channel: a ring plus its reader's cycle marker.
#[derive(Debug)]
pub struct Channel {
    ring: Ring,
    cycle: ReadCycle,
}

impl Channel {
    fn new(ring: Ring) -> Self {
        Self {
            ring,
            cycle: ReadCycle::new(),
        }
    }

    /// Returns the channel's ring.
    #[inline]
    pub fn ring(&self) -> &Ring {
        &self.ring
    }

    /// Returns the channel's read-cycle marker.
    #[inline]
    pub fn read_cycle(&self) -> &ReadCycle {
        &self.cycle
    }

    /// Enqueues `source` into the ring.
    #[inline]
    pub fn write<S>(&mut self, source: &mut S) -> Result<usize, TransferFault>
    where
        S: TransferSource + ?Sized,
    {
        self.ring.enqueue(source)
    }

    /// Serves one read request through the read cycle.
    #[inline]
    pub fn read<S>(&mut self, sink: &mut S) -> Result<usize, TransferFault>
    where
        S: TransferSink + ?Sized,
    {
        self.cycle.read(&self.ring, sink)
    }
}

/// Fixed-size arena of independently locked channels.
///
/// Every channel owns its ring and sits behind its own mutex, padded to a
/// cache line, so operations on distinct channels never contend and share no
/// mutable state. Within a channel, enqueue and dump are serialized by that
/// mutex.
///
/// All channels are built by [`initialize`](Registry::initialize) and released
/// together when the registry is torn down or dropped.
pub struct Registry {
    channels: Box<[CachePadded<Mutex<Channel>>]>,
    config: Config,
}

impl Registry {
    /// Allocates `config.channels` empty rings of `config.capacity` bytes.
    ///
    /// If any allocation fails, every ring built so far is released and
    /// [`Error::InitializationFailure`] names the channel that failed.
    pub fn initialize(config: Config) -> Result<Self, Error> {
        Self::initialize_with(config, |_, config| Ring::try_new(config))
    }

    /// Builds the registry with `alloc` producing the ring for each channel.
    pub(crate) fn initialize_with<F>(config: Config, mut alloc: F) -> Result<Self, Error>
    where
        F: FnMut(usize, Config) -> Result<Ring, TryReserveError>,
    {
        config.validate()?;

        let mut channels = Vec::new();
        channels
            .try_reserve_exact(config.channels)
            .map_err(|source| Error::InitializationFailure { channel: 0, source })?;

        for index in 0..config.channels {
            let ring = alloc(index, config).map_err(|source| {
                warn!(
                    channel = index,
                    released = channels.len(),
                    %source,
                    "channel allocation failed"
                );
                Error::InitializationFailure {
                    channel: index,
                    source,
                }
            })?;
            channels.push(CachePadded::new(Mutex::new(Channel::new(ring))));
        }

        debug!(
            channels = config.channels,
            capacity = config.capacity,
            "registry initialized"
        );

        Ok(Self {
            channels: channels.into_boxed_slice(),
            config,
        })
    }

    /// Releases every ring.
    pub fn teardown(self) {
        debug!(channels = self.channels.len(), "registry torn down");
    }

    /// Returns the number of channels.
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels.len()
    }

    /// Returns the per-ring capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Returns the configuration the registry was built from.
    #[inline]
    pub fn config(&self) -> Config {
        self.config
    }

    /// Checks that `index` names a channel.
    pub fn check(&self, index: usize) -> Result<(), Error> {
        if index < self.channels.len() {
            Ok(())
        } else {
            Err(Error::InvalidChannel {
                channel: index,
                channels: self.channels.len(),
            })
        }
    }

    /// Locks channel `index`.
    pub fn lock(&self, index: usize) -> Result<MutexGuard<'_, Channel>, Error> {
        self.check(index)?;
        Ok(self.channels[index].lock())
    }

    /// Runs `f` with channel `index` locked.
    pub fn with_channel<R, F>(&self, index: usize, f: F) -> Result<R, Error>
    where
        F: FnOnce(&mut Channel) -> R,
    {
        let mut channel = self.lock(index)?;
        Ok(f(&mut channel))
    }

    /// Returns true if channel `index` holds no bytes.
    pub fn is_empty(&self, index: usize) -> Result<bool, Error> {
        self.with_channel(index, |channel| channel.ring().is_empty())
    }

    /// Returns a copy of channel `index`'s content, oldest byte first.
    pub fn snapshot(&self, index: usize) -> Result<Vec<u8>, Error> {
        self.with_channel(index, |channel| channel.ring().snapshot())
    }

    /// Returns channel `index`'s metrics.
    pub fn metrics(&self, index: usize) -> Result<MetricsSnapshot, Error> {
        self.with_channel(index, |channel| channel.ring().metrics())
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("channels", &self.channels.len())
            .field("config", &self.config)
            .finish()
    }
}
