//! Simulated subg_rfspy firmware and fake hardware for driving a `Radio`.

#![allow(dead_code)]

use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    rc::Rc,
};

use embedded_hal::{
    delay::DelayNs,
    digital::{self, OutputPin},
    spi::{self, Operation, SpiDevice},
};

/// Firmware model shared by the fake links.
///
/// Commands are processed as soon as the whole request has arrived and their
/// responses, terminator included, are queued in `outbox`.
#[derive(Default)]
pub struct Firmware {
    pub version: String,
    pub registers: HashMap<u8, u8>,
    /// What each `GetPacket` or `SendAndListen` answers with, in order. One
    /// command can produce several responses, e.g. an interruption code
    /// followed by the packet.
    pub receptions: VecDeque<Vec<Vec<u8>>>,
    pub requests: Vec<Vec<u8>>,
    pub outbox: VecDeque<u8>,
    /// Number of bytes exchanged or read by the host
    pub io_count: usize,
    /// Fail every transport operation from now on
    pub broken: bool,
    /// Break the bus when the host starts a request beyond this many
    pub request_limit: Option<usize>,
}

impl Firmware {
    pub fn new() -> Self {
        Self {
            version: "subg_rfspy 0.8".into(),
            ..Default::default()
        }
    }

    pub fn shared() -> Rc<RefCell<Firmware>> {
        Rc::new(RefCell::new(Self::new()))
    }

    fn reply(&mut self, bytes: &[u8]) {
        self.outbox.extend(bytes.iter().copied());
        self.outbox.push_back(0);
    }

    pub fn handle(&mut self, request: &[u8]) {
        self.requests.push(request.to_vec());
        match request {
            [1] => self.reply(b"OK"),
            [2] => {
                let version = self.version.clone();
                self.reply(version.as_bytes());
            }
            [3, ..] | [5, ..] => {
                for response in self.receptions.pop_front().unwrap_or_default() {
                    self.reply(&response);
                }
            }
            [4, ..] => self.reply(&[0x01]),
            [6, address, value] => {
                self.registers.insert(*address, *value);
                self.reply(&[]);
            }
            [9, address] => {
                let value = self.registers.get(address).copied().unwrap_or(0);
                self.reply(&[value]);
            }
            _ => {}
        }
    }
}

#[derive(Debug)]
pub struct FakeError;

impl spi::Error for FakeError {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

impl digital::Error for FakeError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

impl embedded_io::Error for FakeError {
    fn kind(&self) -> embedded_io::ErrorKind {
        embedded_io::ErrorKind::Other
    }
}

enum Phase {
    Escape,
    Length,
    Body { remaining: usize },
}

/// The firmware's SPI side: escape byte, length byte whose echo announces
/// queued output, then the request body while queued output is shifted out.
pub struct FakeSpi {
    pub firmware: Rc<RefCell<Firmware>>,
    phase: Phase,
    sending: usize,
    request: Vec<u8>,
}

impl FakeSpi {
    pub fn new(firmware: Rc<RefCell<Firmware>>) -> Self {
        Self {
            firmware,
            phase: Phase::Escape,
            sending: 0,
            request: Vec::new(),
        }
    }

    fn exchange(&mut self, byte: u8) -> Result<u8, FakeError> {
        let mut fw = self.firmware.borrow_mut();
        if fw.broken {
            return Err(FakeError);
        }
        fw.io_count += 1;
        let out = match self.phase {
            Phase::Escape => {
                if byte == 0x99 {
                    self.phase = Phase::Length;
                }
                0
            }
            Phase::Length => {
                if byte != 0 && fw.request_limit.is_some_and(|n| fw.requests.len() >= n) {
                    fw.broken = true;
                    return Err(FakeError);
                }
                self.sending = fw.outbox.len().min(0xFF);
                self.request.clear();
                self.phase = Phase::Body {
                    remaining: byte as usize,
                };
                let announced = self.sending as u8;
                if byte == 0 && self.sending == 0 {
                    self.phase = Phase::Escape;
                }
                announced
            }
            Phase::Body { remaining } => {
                let out = if self.sending > 0 {
                    self.sending -= 1;
                    fw.outbox.pop_front().unwrap_or(0)
                } else {
                    0
                };
                let mut remaining = remaining;
                if remaining > 0 {
                    self.request.push(byte);
                    remaining -= 1;
                    if remaining == 0 {
                        let request = std::mem::take(&mut self.request);
                        fw.handle(&request);
                    }
                }
                self.phase = if remaining == 0 && self.sending == 0 {
                    Phase::Escape
                } else {
                    Phase::Body { remaining }
                };
                out
            }
        };
        Ok(out)
    }
}

impl spi::ErrorType for FakeSpi {
    type Error = FakeError;
}

impl SpiDevice for FakeSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), FakeError> {
        for op in operations {
            match op {
                Operation::TransferInPlace(buf) => {
                    for b in buf.iter_mut() {
                        *b = self.exchange(b.reverse_bits())?.reverse_bits();
                    }
                }
                Operation::Write(buf) => {
                    for b in buf.iter() {
                        self.exchange(b.reverse_bits())?;
                    }
                }
                Operation::Read(buf) => {
                    for b in buf.iter_mut() {
                        *b = self.exchange(0)?.reverse_bits();
                    }
                }
                Operation::Transfer(read, write) => {
                    for (r, w) in read.iter_mut().zip(write.iter()) {
                        *r = self.exchange(w.reverse_bits())?.reverse_bits();
                    }
                }
                Operation::DelayNs(_) => {}
            }
        }
        Ok(())
    }
}

/// The firmware's UART side: every write is one request.
pub struct FakeUart {
    pub firmware: Rc<RefCell<Firmware>>,
}

impl embedded_io::ErrorType for FakeUart {
    type Error = FakeError;
}

impl embedded_io::Write for FakeUart {
    fn write(&mut self, buf: &[u8]) -> Result<usize, FakeError> {
        let mut fw = self.firmware.borrow_mut();
        if fw.broken {
            return Err(FakeError);
        }
        fw.io_count += 1;
        fw.handle(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), FakeError> {
        Ok(())
    }
}

impl embedded_io::Read for FakeUart {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, FakeError> {
        let mut fw = self.firmware.borrow_mut();
        if fw.broken {
            return Err(FakeError);
        }
        fw.io_count += 1;
        let n = buf.len().min(fw.outbox.len());
        for slot in buf.iter_mut().take(n) {
            *slot = fw.outbox.pop_front().unwrap_or(0);
        }
        Ok(n)
    }
}

impl embedded_io::ReadReady for FakeUart {
    fn read_ready(&mut self) -> Result<bool, FakeError> {
        let fw = self.firmware.borrow();
        if fw.broken {
            return Err(FakeError);
        }
        Ok(!fw.outbox.is_empty())
    }
}

/// Reset line that remembers every level it was driven to
#[derive(Default)]
pub struct RecordingPin {
    pub levels: Rc<RefCell<Vec<bool>>>,
}

impl digital::ErrorType for RecordingPin {
    type Error = FakeError;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), FakeError> {
        self.levels.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), FakeError> {
        self.levels.borrow_mut().push(true);
        Ok(())
    }
}

/// Delay that returns at once and adds up how long it was asked to wait
#[derive(Default, Clone)]
pub struct FakeDelay {
    pub elapsed_ns: Rc<RefCell<u64>>,
}

impl FakeDelay {
    pub fn elapsed_ms(&self) -> u64 {
        *self.elapsed_ns.borrow() / 1_000_000
    }
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.elapsed_ns.borrow_mut() += u64::from(ns);
    }
}
