//! Driver error types
//!
//! Every failure the driver can report is an [`Error`]. Errors are `Copy` so a
//! [`Radio`](crate::Radio) can keep the first one in its sticky error slot and
//! hand it back from every later call without touching the hardware again.

use embedded_hal::{digital, spi};

/// Failure of the underlying hardware primitive.
///
/// The HAL error itself is logged when it happens and reduced to its kind here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// A single-byte SPI exchange failed
    #[error("SPI transfer failed: {0:?}")]
    Bus(spi::ErrorKind),
    /// Driving the reset line failed
    #[error("reset pin write failed: {0:?}")]
    ResetPin(digital::ErrorKind),
    /// Reading or writing the serial port failed
    #[error("serial I/O failed: {0:?}")]
    Serial(embedded_io::ErrorKind),
}

/// Errors reported by the subg_rfspy driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The bus, reset pin or serial port failed
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    /// No zero-terminated response arrived within the time budget
    #[error("no response from radio")]
    ProtocolTimeout,
    /// The firmware answered with a code the driver does not expect, or with
    /// nothing where data was required (`None`)
    #[error("unexpected firmware response {0:02X?}")]
    UnexpectedFirmwareResponse(Option<u8>),
    /// A request payload exceeded the one-byte length field
    #[error("request of {0} bytes exceeds 255")]
    RequestTooLarge(usize),
    /// The firmware version banner does not identify subg_rfspy
    #[error("unsupported firmware")]
    UnsupportedFirmware,
}
