//! Frequency synthesizer registers
//!
//! The carrier frequency is a 24-bit word split over FREQ2 (high byte), FREQ1
//! and FREQ0 (low byte):
//!
//! `f_carrier = FREQ * f_xosc / 2^16`
//!
//! with a 24 MHz crystal, giving a resolution of about 366 Hz.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// Crystal oscillator frequency of the CC111x, in Hz
pub const FXOSC: u64 = 24_000_000;

/// Frequency control word, high byte (address: 0x09)
#[register(0x09u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct Freq2 {
    pub value: u8,
}

/// Frequency control word, middle byte (address: 0x0A)
#[register(0x0Au8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct Freq1 {
    pub value: u8,
}

/// Frequency control word, low byte (address: 0x0B)
#[register(0x0Bu8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct Freq0 {
    pub value: u8,
}

/// The 24-bit frequency control word held in FREQ2..FREQ0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrequencyWord(u32);

impl FrequencyWord {
    /// Nearest control word for a carrier frequency in Hz.
    pub fn from_hz(hz: u32) -> Self {
        let word = ((u64::from(hz) << 16) + FXOSC / 2) / FXOSC;
        Self(word as u32 & 0x00FF_FFFF)
    }

    /// Carrier frequency in Hz, truncated.
    pub fn to_hz(self) -> u32 {
        let hz = (u64::from(self.0) * FXOSC) >> 16;
        u32::try_from(hz).unwrap_or(u32::MAX)
    }

    pub fn from_registers(freq2: Freq2, freq1: Freq1, freq0: Freq0) -> Self {
        Self(u32::from_be_bytes([0, freq2.value, freq1.value, freq0.value]))
    }

    /// Splits the word into its registers, high byte first.
    pub fn to_registers(self) -> (Freq2, Freq1, Freq0) {
        let [_, f2, f1, f0] = self.0.to_be_bytes();
        (Freq2 { value: f2 }, Freq1 { value: f1 }, Freq0 { value: f0 })
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

macro_rules! byte_register {
    ($($name:ident),*) => {
        $(
            impl FromByteArray for $name {
                type Error = Infallible;
                type Array = [u8; 1];

                fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
                    Ok(Self { value: bytes[0] })
                }
            }

            impl ToByteArray for $name {
                type Error = Infallible;
                type Array = [u8; 1];

                fn to_bytes(self) -> Result<Self::Array, Self::Error> {
                    Ok([self.value])
                }
            }
        )*
    };
}

byte_register!(Freq2, Freq1, Freq0);
