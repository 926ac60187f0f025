//! subg_rfspy command implementations
//!
//! Every firmware command is a type implementing [`Command`]. The command
//! knows its opcode, how to lay out its parameters after the opcode byte, and
//! how to decode the response the firmware sends back.
//!
//! # Command Categories
//! - [`system`]: firmware state, version, reset and LED control
//! - [`register`]: raw CC111x register access
//! - [`packet`]: packet transmission and reception, RSSI decoding
//!
//! Multi-byte parameters (listen timeouts) are sent most-significant byte
//! first.

use core::convert::Infallible;

use alloc::vec::Vec;

use crate::Error;

mod packet;
mod register;
mod system;

pub use packet::*;
pub use register::*;
pub use system::*;

/// Opcode of a subg_rfspy command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Opcode {
    GetState = 1,
    GetVersion = 2,
    GetPacket = 3,
    SendPacket = 4,
    SendAndListen = 5,
    UpdateRegister = 6,
    Reset = 7,
    Led = 8,
    ReadRegister = 9,
}

/// Error signalled by the firmware as a single-byte response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FirmwareError {
    /// Nothing was received before the listen timeout expired
    RxTimeout = 0xAA,
    /// The command was interrupted before it completed
    CmdInterrupted = 0xBB,
    /// A packet command carried no data
    ZeroData = 0xCC,
}

impl TryFrom<u8> for FirmwareError {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0xAA => Ok(Self::RxTimeout),
            0xBB => Ok(Self::CmdInterrupted),
            0xCC => Ok(Self::ZeroData),
            invalid => Err(invalid),
        }
    }
}

/// A request understood by the subg_rfspy firmware
pub trait Command {
    /// Decoded form of the firmware's answer
    type Response;

    /// Whether the firmware answers this command at all. Commands that do not
    /// answer are decoded from an empty response without waiting.
    const EXPECTS_RESPONSE: bool = true;

    fn opcode() -> Opcode;

    /// Appends the parameter bytes that follow the opcode.
    fn write_parameters(&self, _params: &mut Vec<u8>) {}

    /// Decodes the bytes before the response terminator.
    fn parse_response(response: Vec<u8>) -> Result<Self::Response, Error>;

    /// Builds the full request payload, opcode first.
    fn payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(8);
        payload.push(Self::opcode() as u8);
        self.write_parameters(&mut payload);
        payload
    }
}

pub(crate) fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}
