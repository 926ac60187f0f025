//! subg_rfspy framing
//!
//! Requests travel as `[0x99][length][command][params...]` where the length
//! byte counts the command byte plus its parameters. Responses have no header:
//! the firmware streams bytes back and the end of a response is the first
//! `0x00` in that stream.
//!
//! This module holds the link-independent half of the framing: request
//! encoding checks, the [`ReceiveBuffer`] bytes accumulate in, and the
//! [`ResponseReader`] state machine that extracts one terminated response.

use alloc::{collections::VecDeque, vec::Vec};

use crate::Error;

/// Marker byte preceding every request frame and every SPI poll probe
pub const ESCAPE: u8 = 0x99;

/// Byte that ends a firmware response
pub const TERMINATOR: u8 = 0x00;

/// Largest payload (command byte plus parameters) a single frame can carry
pub const MAX_PAYLOAD: usize = 0xFF;

/// Returns the length byte for a request payload.
///
/// # Errors
/// * `Error::RequestTooLarge` - the payload does not fit in one frame
pub fn payload_length(payload: &[u8]) -> Result<u8, Error> {
    u8::try_from(payload.len()).map_err(|_| Error::RequestTooLarge(payload.len()))
}

/// Ordered queue of bytes received from the firmware.
///
/// Links only ever append to it. Bytes only leave through
/// [`take_response`](ReceiveBuffer::take_response), which removes a whole
/// terminated response at once.
#[derive(Debug, Default)]
pub struct ReceiveBuffer {
    bytes: VecDeque<u8>,
}

impl ReceiveBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, byte: u8) {
        self.bytes.push_back(byte);
    }

    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.bytes.extend(bytes.iter().copied());
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Removes the bytes before the first terminator, and the terminator itself.
    ///
    /// Returns `None` and leaves the buffer untouched when no terminator has
    /// arrived yet.
    pub fn take_response(&mut self) -> Option<Vec<u8>> {
        let end = self.bytes.iter().position(|&b| b == TERMINATOR)?;
        let response = self.bytes.drain(..end).collect();
        self.bytes.pop_front();
        Some(response)
    }
}

/// Where a [`ResponseReader`] is in the request/response cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameState {
    /// No response is being waited for
    Idle,
    /// Bytes are being collected until a terminator shows up
    AwaitingTerminator,
}

/// Two-state response extractor.
///
/// [`start`](ResponseReader::start) arms the reader; each call to
/// [`advance`](ResponseReader::advance) after new bytes land in the buffer
/// either yields the finished response, returning the reader to
/// [`FrameState::Idle`], or keeps waiting.
#[derive(Debug)]
pub struct ResponseReader {
    state: FrameState,
}

impl Default for ResponseReader {
    fn default() -> Self {
        Self {
            state: FrameState::Idle,
        }
    }
}

impl ResponseReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn start(&mut self) {
        self.state = FrameState::AwaitingTerminator;
    }

    pub fn advance(&mut self, buffer: &mut ReceiveBuffer) -> Option<Vec<u8>> {
        if self.state != FrameState::AwaitingTerminator {
            return None;
        }
        let response = buffer.take_response()?;
        self.state = FrameState::Idle;
        Some(response)
    }

    /// Gives up on the current response.
    pub fn abandon(&mut self) {
        self.state = FrameState::Idle;
    }
}
