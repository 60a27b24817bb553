//! Error types for ring device operations.

use crate::transfer::TransferFault;
use std::collections::TryReserveError;
use thiserror::Error;

/// Errors returned to the caller of a ring device operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Copying bytes to or from the caller's region failed partway.
    #[error(transparent)]
    Transfer(#[from] TransferFault),

    /// Allocating the storage of one channel failed; no registry was built.
    #[error("failed to allocate storage for channel {channel}: {source}")]
    InitializationFailure {
        /// The channel whose ring could not be allocated.
        channel: usize,
        /// The underlying allocation error.
        source: TryReserveError,
    },

    /// The configuration cannot describe a usable registry.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// Channel index outside `[0, channels)`.
    #[error("invalid channel {channel} (channels: {channels})")]
    InvalidChannel {
        /// The requested index.
        channel: usize,
        /// Number of channels in the registry.
        channels: usize,
    },

    /// Control command not supported by the device.
    #[error("unsupported control command {command:#x}")]
    Unsupported {
        /// The rejected command.
        command: u64,
    },
}

impl Error {
    /// Returns `true` if the error came from the caller's memory region
    /// rather than from the device itself.
    #[inline]
    pub fn is_transfer_fault(&self) -> bool {
        matches!(self, Self::Transfer(_))
    }

    /// Returns the bytes committed before a transfer fault, if this is one.
    #[inline]
    pub fn transferred(&self) -> Option<usize> {
        match self {
            Self::Transfer(fault) => Some(fault.transferred),
            _ => None,
        }
    }
}
