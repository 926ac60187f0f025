//! subg_rfspy Radio Session
//!
//! This module provides [`Radio`], the session object for one CC111x radio
//! running subg_rfspy. It owns the [`Link`] to the firmware, the buffer
//! response bytes accumulate in, the transfer statistics and the sticky error.
//!
//! # Sticky errors
//! The first failure a session sees (bus error, missing response, unexpected
//! firmware answer) is recorded and never cleared. From then on every
//! operation returns that same error immediately, without touching the link.
//! Recovering means dropping the session and opening a new one. A sequence of
//! calls can therefore be checked once at the end with [`Radio::error`].
//!
//! # Example
//! ```no_run
//! use core::time::Duration;
//! use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiDevice};
//! use subg_rfspy::{Config, Error, Radio, SpiLink};
//!
//! fn listen<SPI: SpiDevice, RST: OutputPin, D: DelayNs>(
//!     spi: SPI,
//!     reset: RST,
//!     delay: D,
//! ) -> Result<(), Error> {
//!     let mut radio = Radio::new(SpiLink::new(spi, reset), delay, Config::default());
//!     radio.open()?;
//!     radio.set_frequency(916_600_000)?;
//!
//!     if let Some(packet) = radio.receive(Duration::from_millis(500))? {
//!         log::info!("{} bytes at {} dBm", packet.data.len(), packet.rssi);
//!     }
//!     Ok(())
//! }
//! ```

use core::{convert::Infallible, time::Duration};

use alloc::{string::String, vec::Vec};
use embedded_hal::delay::DelayNs;
use regiface::{ReadableRegister, WritableRegister};

use crate::{
    commands::{
        infallible, GetPacket, GetState, GetVersion, LedState, ListenParameters, Packet,
        ReadRegister, Reception, RegisterWrite, Reset, SendAndListen, SendPacket, SetLed,
        TransmitParameters, UpdateRegister,
    },
    config::{as_micros, as_millis},
    frame::{self, ReceiveBuffer, ResponseReader},
    registers::{Freq0, Freq1, Freq2, FrequencyWord},
    Command, Config, Error, Link, FIRMWARE_PREFIX,
};

/// Byte and packet counters for a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Statistics {
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub packets_sent: u64,
    pub packets_received: u64,
}

/// An open CC111x radio running subg_rfspy.
///
/// All operations block until the firmware answers or their time budget runs
/// out. The firmware handles one request at a time, and `&mut self` on every
/// operation keeps it that way.
pub struct Radio<L, D> {
    link: L,
    delay: D,
    config: Config,
    buffer: ReceiveBuffer,
    reader: ResponseReader,
    stats: Statistics,
    error: Option<Error>,
}

impl<L, D> Radio<L, D> {
    /// Creates a session over `link` without talking to the radio.
    ///
    /// Call [`open`](Radio::open) to reset the radio and check its firmware.
    pub fn new(link: L, delay: D, config: Config) -> Self {
        Self {
            link,
            delay,
            config,
            buffer: ReceiveBuffer::new(),
            reader: ResponseReader::new(),
            stats: Statistics::default(),
            error: None,
        }
    }

    /// Releases the link and delay provider, closing the session.
    pub fn release(self) -> (L, D) {
        (self.link, self.delay)
    }

    pub fn name(&self) -> &'static str {
        "CC111x"
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn statistics(&self) -> Statistics {
        self.stats
    }

    /// Returns the sticky error, if any operation on this session has failed.
    pub fn error(&self) -> Option<Error> {
        self.error
    }

    /// Records `error` unless an earlier one is already held.
    pub fn set_error(&mut self, error: Error) {
        match self.error {
            Some(first) => log::debug!("ignoring {} after {}", error, first),
            None => {
                log::warn!("radio error: {}", error);
                self.error = Some(error);
            }
        }
    }

    /// Runs `op` unless the session already failed, recording any failure it
    /// returns.
    fn guarded<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T, Error>) -> Result<T, Error> {
        if let Some(error) = self.error {
            return Err(error);
        }
        op(self).inspect_err(|e| self.set_error(*e))
    }
}

impl<L, D> Radio<L, D>
where
    L: Link,
    D: DelayNs,
{
    /// Resets the radio, flushes anything stale out of the firmware and
    /// checks that it runs subg_rfspy.
    ///
    /// # Errors
    /// * `Error::Transport` - reset line or bus failed
    /// * `Error::ProtocolTimeout` - the firmware did not answer `GetVersion`
    /// * `Error::UnsupportedFirmware` - the version banner is not subg_rfspy's
    pub fn open(&mut self) -> Result<(), Error> {
        self.reset()?;
        self.guarded(|radio| radio.link.drain())?;
        let version = self.version()?;
        log::info!("opened {} over {}: {}", self.name(), self.link.name(), version);
        if self.config.verify_firmware && !version.starts_with(FIRMWARE_PREFIX) {
            log::warn!("unexpected firmware version {:?}", version);
            self.set_error(Error::UnsupportedFirmware);
            return Err(Error::UnsupportedFirmware);
        }
        Ok(())
    }

    /// Pulses the radio's reset line and waits for the firmware to boot.
    ///
    /// Takes about a second. Does nothing on links without a reset line.
    pub fn reset(&mut self) -> Result<(), Error> {
        self.guarded(|radio| radio.link.reset(&mut radio.delay, &radio.config))
    }

    /// Returns the firmware's status text.
    pub fn state(&mut self) -> Result<String, Error> {
        self.execute(GetState)
    }

    /// Returns the firmware version banner.
    pub fn version(&mut self) -> Result<String, Error> {
        self.execute(GetVersion)
    }

    /// Asks the firmware to restart itself.
    pub fn firmware_reset(&mut self) -> Result<(), Error> {
        self.execute(Reset)
    }

    pub fn set_led(&mut self, state: LedState) -> Result<(), Error> {
        self.execute(SetLed { state })
    }

    /// Reads a CC111x register by address.
    pub fn read_register_at(&mut self, address: u8) -> Result<u8, Error> {
        self.execute(ReadRegister { address })
    }

    /// Writes a CC111x register by address.
    pub fn write_register_at(&mut self, address: u8, value: u8) -> Result<(), Error> {
        self.execute(UpdateRegister {
            write: RegisterWrite { address, value },
        })
    }

    /// Reads a register value from the radio.
    ///
    /// # Type Parameters
    /// * `R` - Single-byte register type with a u8 address
    pub fn read_register<R>(&mut self) -> Result<R, Error>
    where
        R: ReadableRegister<IdType = u8, Array = [u8; 1], Error = Infallible>,
    {
        let value = self.read_register_at(R::id())?;
        Ok(infallible(R::from_bytes([value])))
    }

    /// Writes a register value to the radio.
    pub fn write_register<R>(&mut self, register: R) -> Result<(), Error>
    where
        R: WritableRegister<IdType = u8, Array = [u8; 1], Error = Infallible>,
    {
        let [value] = infallible(register.to_bytes());
        self.write_register_at(R::id(), value)
    }

    /// Returns the carrier frequency the radio is tuned to, in Hz.
    pub fn frequency(&mut self) -> Result<u32, Error> {
        let freq2 = self.read_register::<Freq2>()?;
        let freq1 = self.read_register::<Freq1>()?;
        let freq0 = self.read_register::<Freq0>()?;
        Ok(FrequencyWord::from_registers(freq2, freq1, freq0).to_hz())
    }

    /// Tunes the radio to the nearest frequency it can synthesize.
    ///
    /// The three frequency registers are written high byte first. A failure
    /// part way leaves the radio mistuned; the session is poisoned either way.
    pub fn set_frequency(&mut self, hz: u32) -> Result<(), Error> {
        let word = FrequencyWord::from_hz(hz);
        log::debug!("setting frequency {} Hz (word {:06X})", hz, word.value());
        let (freq2, freq1, freq0) = word.to_registers();
        self.write_register(freq2)?;
        self.write_register(freq1)?;
        self.write_register(freq0)
    }

    /// Transmits one packet.
    ///
    /// Counts toward the sent statistics once the firmware confirms the
    /// transmission.
    pub fn send(&mut self, data: &[u8]) -> Result<(), Error> {
        self.guarded(|radio| {
            let command = SendPacket {
                transmit: radio.transmit_parameters(),
                data,
            };
            // One millisecond per parameter byte, but never less than the
            // usual response budget.
            let params = command.payload().len() - 1;
            let mut budget = Duration::from_millis(params as u64).max(radio.config.response_timeout);
            radio.request(&command)?;
            radio.response(&mut budget)?;
            radio.stats.bytes_sent += data.len() as u64;
            radio.stats.packets_sent += 1;
            Ok(())
        })
    }

    /// Listens for one packet for up to `timeout`.
    ///
    /// Returns `Ok(None)` when nothing arrives in time.
    pub fn receive(&mut self, timeout: Duration) -> Result<Option<Packet>, Error> {
        self.guarded(|radio| {
            let command = GetPacket {
                listen: radio.listen_parameters(timeout),
            };
            radio.request(&command)?;
            radio.finish_receive::<GetPacket>(timeout)
        })
    }

    /// Transmits `data` and then listens for a reply for up to `timeout`, as
    /// one firmware command.
    pub fn send_and_receive(
        &mut self,
        data: &[u8],
        timeout: Duration,
    ) -> Result<Option<Packet>, Error> {
        self.guarded(|radio| {
            let command = SendAndListen {
                transmit: radio.transmit_parameters(),
                listen: radio.listen_parameters(timeout),
                retry_count: radio.config.packet.retry_count,
                data,
            };
            radio.request(&command)?;
            radio.finish_receive::<SendAndListen>(timeout)
        })
    }

    /// Executes one command and waits the default budget for its response.
    pub fn execute<C: Command>(&mut self, command: C) -> Result<C::Response, Error> {
        self.guarded(|radio| {
            radio.request(&command)?;
            if !C::EXPECTS_RESPONSE {
                return C::parse_response(Vec::new());
            }
            let mut budget = radio.config.response_timeout;
            let response = radio.response(&mut budget)?;
            C::parse_response(response)
        })
    }

    fn transmit_parameters(&self) -> TransmitParameters {
        TransmitParameters {
            channel: self.config.packet.channel,
            repeat_count: self.config.packet.repeat_count,
            delay_ms: self.config.packet.delay_ms,
        }
    }

    fn listen_parameters(&self, timeout: Duration) -> ListenParameters {
        ListenParameters {
            channel: self.config.packet.listen_channel,
            timeout_ms: as_millis(timeout),
        }
    }

    fn request<C: Command>(&mut self, command: &C) -> Result<(), Error> {
        let payload = command.payload();
        frame::payload_length(&payload)?;
        // Complete responses still buffered belong to earlier commands.
        while let Some(stale) = self.buffer.take_response() {
            log::debug!("discarding stale response {:02X?}", stale);
        }
        self.link.send_request(&payload, &mut self.buffer)
    }

    /// Waits for one terminated response, drawing the time spent from `budget`.
    fn response(&mut self, budget: &mut Duration) -> Result<Vec<u8>, Error> {
        let poll_interval = self.config.poll_interval;
        self.reader.start();
        while !budget.is_zero() {
            self.link.poll(&mut self.buffer)?;
            if let Some(response) = self.reader.advance(&mut self.buffer) {
                log::debug!("received {}-byte response {:02X?}", response.len(), response);
                return Ok(response);
            }
            self.delay.delay_us(as_micros(poll_interval));
            *budget = budget.saturating_sub(poll_interval);
        }
        self.reader.abandon();
        log::debug!("no response");
        Err(Error::ProtocolTimeout)
    }

    /// Waits for the answer to a listening command.
    ///
    /// The wait is slightly longer than the firmware's own listen window. An
    /// interrupted command is waited on again with whatever remains of that
    /// window.
    fn finish_receive<C>(&mut self, timeout: Duration) -> Result<Option<Packet>, Error>
    where
        C: Command<Response = Reception>,
    {
        let mut budget = timeout.saturating_add(self.config.receive_margin);
        loop {
            let response = self.response(&mut budget)?;
            match C::parse_response(response)? {
                Reception::Packet(packet) => {
                    log::debug!("packet of {} bytes, RSSI {} dBm", packet.data.len(), packet.rssi);
                    self.stats.bytes_received += packet.data.len() as u64;
                    self.stats.packets_received += 1;
                    return Ok(Some(packet));
                }
                Reception::Nothing => return Ok(None),
                Reception::Interrupted => log::debug!("receive interrupted, waiting again"),
            }
        }
    }
}
