use crate::Error;

/// Configuration for Ring and Registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Bytes held by every ring (default: 20)
    pub capacity: usize,
    /// Number of independent channels (default: 4)
    pub channels: usize,
    /// Enable metrics collection (slight overhead)
    pub enable_metrics: bool,
}

impl Config {
    /// Creates a new configuration with custom settings.
    pub const fn new(capacity: usize, channels: usize, enable_metrics: bool) -> Self {
        Self {
            capacity,
            channels,
            enable_metrics,
        }
    }

    /// Sets the per-ring capacity.
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the channel count.
    pub const fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    /// Enables or disables metrics.
    pub const fn with_metrics(mut self, enable_metrics: bool) -> Self {
        self.enable_metrics = enable_metrics;
        self
    }

    /// Checks that both the capacity and the channel count are positive.
    pub fn validate(&self) -> Result<(), Error> {
        if self.capacity == 0 {
            return Err(Error::InvalidConfig("ring capacity must be positive"));
        }
        if self.channels == 0 {
            return Err(Error::InvalidConfig("channel count must be positive"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 20,
            channels: 4,
            enable_metrics: false,
        }
    }
}

/// Telemetry sink configuration (4K per channel, 16 channels, metrics on)
pub const TELEMETRY_CONFIG: Config = Config::new(4096, 16, true);
