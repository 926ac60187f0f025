//! Register access commands
//!
//! These give raw access to the CC111x radio registers behind the firmware.
//! Typed access to individual registers lives in [`crate::registers`].

use core::convert::Infallible;

use alloc::vec::Vec;

use regiface::ToByteArray;

use crate::{Command, Error, Opcode};

use super::infallible;

/// ReadRegister command (9)
///
/// Returns the value of one register. Available on subg_rfspy 1.0 and later.
///
/// A register holding zero comes back as a bare terminator, so an empty
/// response decodes as `0`.
#[derive(Debug, Clone, Copy)]
pub struct ReadRegister {
    pub address: u8,
}

impl Command for ReadRegister {
    type Response = u8;

    fn opcode() -> Opcode {
        Opcode::ReadRegister
    }

    fn write_parameters(&self, params: &mut Vec<u8>) {
        params.push(self.address);
    }

    fn parse_response(response: Vec<u8>) -> Result<Self::Response, Error> {
        Ok(response.first().copied().unwrap_or(0))
    }
}

/// Register address and value pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterWrite {
    pub address: u8,
    pub value: u8,
}

impl ToByteArray for RegisterWrite {
    type Error = Infallible;
    type Array = [u8; 2];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.address, self.value])
    }
}

/// UpdateRegister command (6)
///
/// Writes one register. The response carries nothing; it only confirms the
/// firmware processed the request.
#[derive(Debug, Clone, Copy)]
pub struct UpdateRegister {
    pub write: RegisterWrite,
}

impl Command for UpdateRegister {
    type Response = ();

    fn opcode() -> Opcode {
        Opcode::UpdateRegister
    }

    fn write_parameters(&self, params: &mut Vec<u8>) {
        params.extend_from_slice(&infallible(self.write.to_bytes()));
    }

    fn parse_response(_response: Vec<u8>) -> Result<Self::Response, Error> {
        Ok(())
    }
}
