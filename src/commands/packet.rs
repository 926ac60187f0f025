//! Packet commands
//!
//! This module contains the commands that move packets over the air:
//! - `GetPacket`: listen on a channel for one packet
//! - `SendPacket`: transmit one packet, optionally repeated
//! - `SendAndListen`: transmit, then immediately listen for the reply
//!
//! Outgoing packet data is followed by a zero byte. Received packets come back
//! as `[rssi][lqi][data...]`; when nothing usable arrives the firmware answers
//! with a single [`FirmwareError`] byte instead.

use core::convert::Infallible;

use alloc::vec::Vec;
use regiface::ToByteArray;

use crate::{Command, Error, FirmwareError, Opcode};

use super::infallible;

/// Offset subtracted from the halved raw RSSI (CC1110 datasheet, table 68)
pub const RSSI_OFFSET: i16 = 73;

/// Converts the raw RSSI byte reported with a packet to dBm.
///
/// The raw value is a two's-complement number of half-dB steps. The halving
/// truncates toward zero.
pub fn rssi_dbm(raw: u8) -> i16 {
    i16::from(raw as i8) / 2 - RSSI_OFFSET
}

/// A packet received over the air
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Packet contents, without the RSSI and LQI bytes
    pub data: Vec<u8>,
    /// Signal strength in dBm
    pub rssi: i16,
    /// Link quality indicator, as reported by the radio
    pub lqi: u8,
}

/// Decoded answer to a listening command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reception {
    /// A packet arrived
    Packet(Packet),
    /// The listen window closed with nothing received
    Nothing,
    /// The firmware interrupted the command; the listen should be retried
    Interrupted,
}

fn parse_reception(response: Vec<u8>) -> Result<Reception, Error> {
    match response.as_slice() {
        [] => Ok(Reception::Nothing),
        [code] => match FirmwareError::try_from(*code) {
            Ok(FirmwareError::RxTimeout) => Ok(Reception::Nothing),
            Ok(FirmwareError::CmdInterrupted) => Ok(Reception::Interrupted),
            _ => Err(Error::UnexpectedFirmwareResponse(Some(*code))),
        },
        [rssi, lqi, data @ ..] => Ok(Reception::Packet(Packet {
            data: data.to_vec(),
            rssi: rssi_dbm(*rssi),
            lqi: *lqi,
        })),
    }
}

/// Transmit settings leading a `SendPacket` or `SendAndListen` request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransmitParameters {
    pub channel: u8,
    pub repeat_count: u8,
    pub delay_ms: u8,
}

impl ToByteArray for TransmitParameters {
    type Error = Infallible;
    type Array = [u8; 3];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.channel, self.repeat_count, self.delay_ms])
    }
}

/// Listen settings carried by `GetPacket` and `SendAndListen`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenParameters {
    pub channel: u8,
    /// How long the firmware listens; zero means forever
    pub timeout_ms: u32,
}

impl ToByteArray for ListenParameters {
    type Error = Infallible;
    type Array = [u8; 5];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let mut bytes = [0u8; 5];
        bytes[0] = self.channel;
        bytes[1..].copy_from_slice(&self.timeout_ms.to_be_bytes());
        Ok(bytes)
    }
}

/// GetPacket command (3)
#[derive(Debug, Clone, Copy)]
pub struct GetPacket {
    pub listen: ListenParameters,
}

impl Command for GetPacket {
    type Response = Reception;

    fn opcode() -> Opcode {
        Opcode::GetPacket
    }

    fn write_parameters(&self, params: &mut Vec<u8>) {
        params.extend_from_slice(&infallible(self.listen.to_bytes()));
    }

    fn parse_response(response: Vec<u8>) -> Result<Self::Response, Error> {
        parse_reception(response)
    }
}

/// SendPacket command (4)
///
/// The firmware answers once transmission completes. The answer carries no
/// information the driver uses.
#[derive(Debug, Clone, Copy)]
pub struct SendPacket<'a> {
    pub transmit: TransmitParameters,
    pub data: &'a [u8],
}

impl Command for SendPacket<'_> {
    type Response = ();

    fn opcode() -> Opcode {
        Opcode::SendPacket
    }

    fn write_parameters(&self, params: &mut Vec<u8>) {
        params.extend_from_slice(&infallible(self.transmit.to_bytes()));
        params.extend_from_slice(self.data);
        params.push(0);
    }

    fn parse_response(_response: Vec<u8>) -> Result<Self::Response, Error> {
        Ok(())
    }
}

/// SendAndListen command (5)
///
/// Layout: transmit parameters, listen parameters, retry count, packet data,
/// zero byte.
#[derive(Debug, Clone, Copy)]
pub struct SendAndListen<'a> {
    pub transmit: TransmitParameters,
    pub listen: ListenParameters,
    pub retry_count: u8,
    pub data: &'a [u8],
}

impl Command for SendAndListen<'_> {
    type Response = Reception;

    fn opcode() -> Opcode {
        Opcode::SendAndListen
    }

    fn write_parameters(&self, params: &mut Vec<u8>) {
        params.extend_from_slice(&infallible(self.transmit.to_bytes()));
        params.extend_from_slice(&infallible(self.listen.to_bytes()));
        params.push(self.retry_count);
        params.extend_from_slice(self.data);
        params.push(0);
    }

    fn parse_response(response: Vec<u8>) -> Result<Self::Response, Error> {
        parse_reception(response)
    }
}
