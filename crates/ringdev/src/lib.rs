//! ringdev - Multi-Channel Byte Ring Device
//!
//! A fixed set of independent byte rings, one per channel, behind an
//! open/read/write/close/control interface.
//!
//! # Key Features
//!
//! - Overwrite-oldest writes: producers never block and never see "full"
//! - Non-consuming dumps: a read copies the whole ring out, oldest byte first
//! - Read cycle: bursts of new data alternate with an empty end-of-data response
//! - Per-channel locking with cache-padded slots, no shared cursors
//! - Injected copy capability ([`TransferSource`] / [`TransferSink`]) so the
//!   engine runs behind any I/O framework
//!
//! # Example
//!
//! ```
//! use ringdev::{Config, Device};
//!
//! let device = Device::open(Config::default()).unwrap();
//!
//! device.write(0, b"hello").unwrap();
//! assert_eq!(device.read(0, 64).unwrap(), b"hello");
//!
//! // End of data for this cycle
//! assert!(device.read(0, 64).unwrap().is_empty());
//!
//! device.write(0, b"hi").unwrap();
//! assert_eq!(device.read(0, 64).unwrap(), b"hi");
//!
//! device.close();
//! ```
//!
//! The ring can also be used on its own:
//!
//! ```
//! use ringdev::{Config, Ring};
//!
//! let mut ring = Ring::new(Config::default().with_capacity(10));
//! ring.write(&[0u8, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
//! ring.write(&[10u8, 11, 12, 13]);
//!
//! // Oldest four bytes were overwritten
//! assert_eq!(ring.snapshot(), [4u8, 5, 6, 7, 8, 9, 10, 11, 12, 13]);
//! ```

mod config;
mod device;
mod error;
mod invariants;
mod metrics;
mod read_cycle;
mod registry;
mod ring;
mod transfer;

pub use config::{Config, TELEMETRY_CONFIG};
pub use device::Device;
pub use error::Error;
pub use metrics::MetricsSnapshot;
pub use read_cycle::{ReadCycle, ReadState};
pub use registry::{Channel, Registry};
pub use ring::Ring;
pub use transfer::{
    LimitedSink, RegionFault, SliceSink, TransferFault, TransferSink, TransferSource,
};
