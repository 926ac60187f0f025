//! Firmware status and control commands

use alloc::{string::String, vec::Vec};

use crate::{Command, Error, Opcode};

fn text(response: Vec<u8>) -> String {
    String::from_utf8_lossy(&response).into_owned()
}

/// GetState command (1)
///
/// Returns the firmware's status text, `"OK"` when the radio is healthy.
#[derive(Debug, Clone, Copy)]
pub struct GetState;

impl Command for GetState {
    type Response = String;

    fn opcode() -> Opcode {
        Opcode::GetState
    }

    fn parse_response(response: Vec<u8>) -> Result<Self::Response, Error> {
        Ok(text(response))
    }
}

/// GetVersion command (2)
///
/// Returns the firmware banner, e.g. `"subg_rfspy 0.8"`.
#[derive(Debug, Clone, Copy)]
pub struct GetVersion;

impl Command for GetVersion {
    type Response = String;

    fn opcode() -> Opcode {
        Opcode::GetVersion
    }

    fn parse_response(response: Vec<u8>) -> Result<Self::Response, Error> {
        Ok(text(response))
    }
}

/// Reset command (7)
///
/// Restarts the firmware. The firmware does not answer; anything it had
/// queued is lost.
#[derive(Debug, Clone, Copy)]
pub struct Reset;

impl Command for Reset {
    type Response = ();

    const EXPECTS_RESPONSE: bool = false;

    fn opcode() -> Opcode {
        Opcode::Reset
    }

    fn parse_response(_response: Vec<u8>) -> Result<Self::Response, Error> {
        Ok(())
    }
}

/// State of the radio board's LED
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedState {
    Off = 0,
    On = 1,
}

/// LED command (8)
#[derive(Debug, Clone, Copy)]
pub struct SetLed {
    pub state: LedState,
}

impl Command for SetLed {
    type Response = ();

    const EXPECTS_RESPONSE: bool = false;

    fn opcode() -> Opcode {
        Opcode::Led
    }

    fn write_parameters(&self, params: &mut Vec<u8>) {
        params.push(self.state as u8);
    }

    fn parse_response(_response: Vec<u8>) -> Result<Self::Response, Error> {
        Ok(())
    }
}
