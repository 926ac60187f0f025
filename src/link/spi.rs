use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiDevice};

use crate::{
    config::as_micros,
    error::TransportError,
    frame::{self, ReceiveBuffer, ESCAPE},
    Config, Error,
};

use super::Link;

/// SPI connection to a CC111x running subg_rfspy, with its reset line.
///
/// Every transfer is a single full-duplex byte. The firmware shifts bits in
/// the opposite order from the host controller, so both directions are
/// bit-reversed here. The bus is expected to run at about 62.5 kHz.
pub struct SpiLink<SPI, RST> {
    spi: SPI,
    reset: RST,
}

impl<SPI, RST> SpiLink<SPI, RST> {
    pub fn new(spi: SPI, reset: RST) -> Self {
        Self { spi, reset }
    }

    /// Releases the SPI device and reset pin.
    pub fn release(self) -> (SPI, RST) {
        (self.spi, self.reset)
    }
}

impl<SPI, RST> SpiLink<SPI, RST>
where
    SPI: SpiDevice,
    RST: OutputPin,
{
    fn xfer(&mut self, byte: u8) -> Result<u8, Error> {
        use embedded_hal::spi::Error as _;

        let mut buf = [byte.reverse_bits()];
        self.spi.transfer_in_place(&mut buf).map_err(|e| {
            log::warn!("xfer {:02X} failed: {:?}", byte, e);
            TransportError::Bus(e.kind())
        })?;
        let rx = buf[0].reverse_bits();
        log::trace!("xfer {:02X} -> {:02X}", byte, rx);
        Ok(rx)
    }

    /// Sends an escape and a zero length, returning how many bytes the
    /// firmware has queued for us.
    fn probe(&mut self) -> Result<u8, Error> {
        self.xfer(ESCAPE)?;
        self.xfer(0)
    }

    fn set_reset(&mut self, high: bool) -> Result<(), Error> {
        use embedded_hal::digital::Error as _;

        let result = if high {
            self.reset.set_high()
        } else {
            self.reset.set_low()
        };
        result.map_err(|e| {
            log::warn!("reset pin write failed: {:?}", e);
            TransportError::ResetPin(e.kind()).into()
        })
    }
}

impl<SPI, RST> Link for SpiLink<SPI, RST>
where
    SPI: SpiDevice,
    RST: OutputPin,
{
    fn name(&self) -> &'static str {
        "spi"
    }

    fn send_request(&mut self, payload: &[u8], buffer: &mut ReceiveBuffer) -> Result<(), Error> {
        let length = frame::payload_length(payload)?;
        log::debug!("request: {:02X?}", payload);

        self.xfer(ESCAPE)?;
        // The echo of the length byte is how much the firmware wants to send.
        let mut pending = self.xfer(length)?;
        for &b in payload {
            let rx = self.xfer(b)?;
            if pending > 0 {
                buffer.push(rx);
                pending -= 1;
            }
        }
        while pending > 0 {
            buffer.push(self.xfer(0)?);
            pending -= 1;
        }
        Ok(())
    }

    fn poll(&mut self, buffer: &mut ReceiveBuffer) -> Result<(), Error> {
        let count = self.probe()?;
        for _ in 0..count {
            buffer.push(self.xfer(0)?);
        }
        if count != 0 {
            log::trace!("read {} bytes", count);
        }
        Ok(())
    }

    fn drain(&mut self) -> Result<(), Error> {
        let count = self.probe()?;
        for _ in 0..count {
            self.xfer(0)?;
        }
        if count != 0 {
            log::debug!("drained {} bytes", count);
        }
        Ok(())
    }

    fn reset<D: DelayNs>(&mut self, delay: &mut D, config: &Config) -> Result<(), Error> {
        log::info!("resetting CC111x");
        self.set_reset(true)?;
        delay.delay_us(as_micros(config.reset_pulse));
        self.set_reset(false)?;
        delay.delay_us(as_micros(config.reset_settle));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;

    use alloc::{collections::VecDeque, vec, vec::Vec};
    use embedded_hal::spi::{ErrorType, Operation};

    use super::*;

    /// Records every byte clocked out and answers from a script.
    #[derive(Default)]
    struct ScriptedSpi {
        sent: Vec<u8>,
        echoes: VecDeque<u8>,
    }

    impl ErrorType for ScriptedSpi {
        type Error = Infallible;
    }

    impl SpiDevice for ScriptedSpi {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
            for op in operations {
                if let Operation::TransferInPlace(buf) = op {
                    for b in buf.iter_mut() {
                        self.sent.push(b.reverse_bits());
                        *b = self.echoes.pop_front().unwrap_or(0).reverse_bits();
                    }
                }
            }
            Ok(())
        }
    }

    struct NoPin;

    impl embedded_hal::digital::ErrorType for NoPin {
        type Error = Infallible;
    }

    impl OutputPin for NoPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    fn link_with_echoes(echoes: &[u8]) -> SpiLink<ScriptedSpi, NoPin> {
        let spi = ScriptedSpi {
            sent: Vec::new(),
            echoes: echoes.iter().copied().collect(),
        };
        SpiLink::new(spi, NoPin)
    }

    #[test]
    fn request_is_escape_length_payload() {
        let mut link = link_with_echoes(&[]);
        let mut buffer = ReceiveBuffer::new();

        link.send_request(&[0x06, 0x09, 0x24], &mut buffer).unwrap();

        let (spi, _) = link.release();
        assert_eq!(spi.sent, vec![0x99, 0x03, 0x06, 0x09, 0x24]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn full_size_request_is_framed() {
        let mut link = link_with_echoes(&[]);
        let mut buffer = ReceiveBuffer::new();
        let payload = [0x04u8; 255];

        link.send_request(&payload, &mut buffer).unwrap();

        let (spi, _) = link.release();
        assert_eq!(spi.sent.len(), 2 + 255);
        assert_eq!(spi.sent[1], 0xFF);
    }

    #[test]
    fn oversized_request_sends_nothing() {
        let mut link = link_with_echoes(&[]);
        let mut buffer = ReceiveBuffer::new();

        let result = link.send_request(&[0u8; 256], &mut buffer);

        assert_eq!(result, Err(Error::RequestTooLarge(256)));
        let (spi, _) = link.release();
        assert!(spi.sent.is_empty());
    }

    #[test]
    fn echo_is_captured_while_pending() {
        // escape echo, length echo says 2 bytes pending, then payload echoes
        let mut link = link_with_echoes(&[0x00, 0x02, 0x41, 0x00, 0xEE]);
        let mut buffer = ReceiveBuffer::new();

        link.send_request(&[0x02, 0x01, 0x02], &mut buffer).unwrap();

        assert_eq!(buffer.take_response(), Some(vec![0x41]));
        assert!(buffer.is_empty(), "echo past the pending count is dropped");
    }

    #[test]
    fn pending_longer_than_payload_is_drained_with_zeros() {
        let mut link = link_with_echoes(&[0x00, 0x03, 0x4F, 0x4B, 0x00]);
        let mut buffer = ReceiveBuffer::new();

        link.send_request(&[0x01], &mut buffer).unwrap();

        assert_eq!(buffer.take_response(), Some(vec![0x4F, 0x4B]));
        let (spi, _) = link.release();
        assert_eq!(spi.sent, vec![0x99, 0x01, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn poll_reads_announced_bytes() {
        let mut link = link_with_echoes(&[0x00, 0x02, 0x37, 0x00]);
        let mut buffer = ReceiveBuffer::new();

        link.poll(&mut buffer).unwrap();

        assert_eq!(buffer.take_response(), Some(vec![0x37]));
        let (spi, _) = link.release();
        assert_eq!(spi.sent, vec![0x99, 0x00, 0x00, 0x00]);
    }
}
