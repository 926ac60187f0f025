#![no_std]
//! subg_rfspy Radio Driver
//!
//! This crate drives a TI CC111x sub-GHz radio running the
//! [subg_rfspy](https://github.com/ps2/subg_rfspy) firmware. The firmware turns
//! the radio into a packet modem: the host tunes it, hands it packets to
//! transmit and asks it to listen for packets, each tagged with its signal
//! strength.
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`device`]: the [`Radio`] session
//!   - Dispatches commands and waits for their responses
//!   - Tunes the frequency, sends and receives packets
//!   - Keeps statistics and the sticky session error
//!
//! - [`link`]: how bytes reach the firmware
//!   - [`SpiLink`]: bit-banged SPI with a reset line
//!   - [`SerialLink`]: UART byte stream
//!
//! - [`frame`]: request framing and zero-terminated response extraction
//!
//! - [`commands`]: one type per firmware command
//!   - status, version, reset and LED commands
//!   - register read and write
//!   - packet send, receive and send-and-listen
//!
//! - [`registers`]: typed CC111x registers and frequency arithmetic
//!
//! # Wire protocol
//! Requests are `[0x99][length][command][params...]`. Responses are streamed
//! back and end at the first `0x00`. Over SPI the firmware cannot push data,
//! so the driver polls it every millisecond until the terminator arrives or
//! the time budget runs out.
//!
//! # Important Notes
//! - Errors are sticky: after the first failure every call on the session
//!   returns that error without touching the hardware
//! - Opening the radio resets it, which blocks for about a second
//! - A session serves one caller at a time
//!
//! # Example
//! ```no_run
//! use embedded_hal::delay::DelayNs;
//! use embedded_io::{Read, ReadReady, Write};
//! use subg_rfspy::{Config, Error, Radio, SerialLink};
//!
//! fn probe<U: Read + Write + ReadReady, D: DelayNs>(uart: U, delay: D) -> Result<(), Error> {
//!     let mut radio = Radio::new(SerialLink::new(uart), delay, Config::default());
//!     radio.open()?;
//!
//!     log::info!("state: {}", radio.state()?);
//!     log::info!("frequency: {} Hz", radio.frequency()?);
//!     radio.set_frequency(916_600_000)?;
//!
//!     Ok(())
//! }
//! ```

extern crate alloc;

pub mod commands;
pub mod config;
pub mod device;
pub mod error;
pub mod frame;
pub mod link;
pub mod registers;

pub use commands::*;
pub use config::{Config, PacketConfig, FIRMWARE_PREFIX};
pub use device::{Radio, Statistics};
pub use error::{Error, TransportError};
pub use link::{Link, SerialLink, SpiLink};
pub use registers::*;
