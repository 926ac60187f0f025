//! Physical links to the radio
//!
//! The subg_rfspy firmware is reachable two ways:
//!
//! - [`SpiLink`]: a full-duplex SPI bus plus a reset line. The bus has no flow
//!   control, so the driver must keep probing the firmware to get anything
//!   back, and every byte travels bit-reversed.
//! - [`SerialLink`]: a UART byte stream. Requests are written as-is and
//!   responses simply show up on the stream. There is no reset line.
//!
//! Both implement [`Link`], which is all the [`Radio`](crate::Radio) needs.

use embedded_hal::delay::DelayNs;

use crate::{frame::ReceiveBuffer, Config, Error};

mod serial;
mod spi;

pub use serial::SerialLink;
pub use spi::SpiLink;

/// Byte transport between the driver and the firmware
pub trait Link {
    /// Short description of the link, used in logs
    fn name(&self) -> &'static str;

    /// Sends one request payload (`[command][params...]`).
    ///
    /// Any bytes the firmware returns while the request is being clocked out
    /// are appended to `buffer`.
    ///
    /// # Errors
    /// * `Error::RequestTooLarge` - payload longer than 255 bytes, nothing sent
    /// * `Error::Transport` - the underlying bus or port failed
    fn send_request(&mut self, payload: &[u8], buffer: &mut ReceiveBuffer) -> Result<(), Error>;

    /// Appends whatever the firmware has ready to `buffer`, without blocking.
    fn poll(&mut self, buffer: &mut ReceiveBuffer) -> Result<(), Error>;

    /// Reads and discards anything the firmware has ready.
    fn drain(&mut self) -> Result<(), Error>;

    /// Performs a hardware reset of the radio, if the link has a reset line.
    fn reset<D: DelayNs>(&mut self, delay: &mut D, config: &Config) -> Result<(), Error>;
}
