use embedded_hal::delay::DelayNs;
use embedded_io::{Read, ReadReady, Write};

use crate::{
    error::TransportError,
    frame::{self, ReceiveBuffer},
    Config, Error,
};

use super::Link;

const READ_CHUNK: usize = 64;
/// Upper bound on chunks discarded by one drain, for ports that never go quiet
const MAX_DRAIN_CHUNKS: usize = 32;

/// UART connection to a CC111x running subg_rfspy.
///
/// Requests go out as the bare `[command][params...]` payload; the stream
/// itself delimits them. The radio's reset line is not reachable over serial,
/// so [`Link::reset`] does nothing.
pub struct SerialLink<UART> {
    uart: UART,
}

impl<UART> SerialLink<UART> {
    pub fn new(uart: UART) -> Self {
        Self { uart }
    }

    /// Releases the serial port.
    pub fn release(self) -> UART {
        self.uart
    }
}

fn serial_error<E: embedded_io::Error>(e: E) -> Error {
    log::warn!("serial I/O failed: {:?}", e);
    TransportError::Serial(e.kind()).into()
}

impl<UART> SerialLink<UART>
where
    UART: Read + ReadReady,
{
    /// Reads one chunk if the port has data, returning how many bytes arrived.
    fn read_available(&mut self, chunk: &mut [u8]) -> Result<usize, Error> {
        if !self.uart.read_ready().map_err(serial_error)? {
            return Ok(0);
        }
        self.uart.read(chunk).map_err(serial_error)
    }
}

impl<UART> Link for SerialLink<UART>
where
    UART: Read + Write + ReadReady,
{
    fn name(&self) -> &'static str {
        "serial"
    }

    fn send_request(&mut self, payload: &[u8], _buffer: &mut ReceiveBuffer) -> Result<(), Error> {
        frame::payload_length(payload)?;
        log::debug!("request: {:02X?}", payload);

        self.uart.write_all(payload).map_err(serial_error)?;
        self.uart.flush().map_err(serial_error)
    }

    fn poll(&mut self, buffer: &mut ReceiveBuffer) -> Result<(), Error> {
        let mut chunk = [0u8; READ_CHUNK];
        let n = self.read_available(&mut chunk)?;
        if n != 0 {
            log::trace!("read {} bytes: {:02X?}", n, &chunk[..n]);
            buffer.extend_from_slice(&chunk[..n]);
        }
        Ok(())
    }

    fn drain(&mut self) -> Result<(), Error> {
        let mut chunk = [0u8; READ_CHUNK];
        let mut drained = 0;
        for _ in 0..MAX_DRAIN_CHUNKS {
            let n = self.read_available(&mut chunk)?;
            if n == 0 {
                break;
            }
            drained += n;
        }
        if drained != 0 {
            log::debug!("drained {} bytes", drained);
        }
        Ok(())
    }

    fn reset<D: DelayNs>(&mut self, _delay: &mut D, _config: &Config) -> Result<(), Error> {
        log::debug!("no reset line on serial link, skipping reset");
        Ok(())
    }
}
