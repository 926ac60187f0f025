//! Session configuration
//!
//! [`Config::default`] reproduces the timing the subg_rfspy firmware was
//! designed around. Only change these when the target hardware needs it.

use core::time::Duration;

/// Prefix the `GetVersion` banner must start with for [`Radio::open`](crate::Radio::open) to succeed
pub const FIRMWARE_PREFIX: &str = "subg_rfspy";

/// Driver timing and behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Sleep between two attempts to read more response bytes
    pub poll_interval: Duration,
    /// Budget for responses to non-packet commands, and the minimum budget
    /// for a `SendPacket` completion
    pub response_timeout: Duration,
    /// Extra wait added on top of the firmware's own listen timeout
    pub receive_margin: Duration,
    /// How long the reset line is held high
    pub reset_pulse: Duration,
    /// How long the firmware needs after reset before it answers
    pub reset_settle: Duration,
    /// Reject firmware whose version banner lacks [`FIRMWARE_PREFIX`]
    pub verify_firmware: bool,
    /// Channel and repeat settings used for every packet command
    pub packet: PacketConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1),
            response_timeout: Duration::from_millis(50),
            receive_margin: Duration::from_millis(5),
            reset_pulse: Duration::from_micros(100),
            reset_settle: Duration::from_secs(1),
            verify_firmware: true,
            packet: PacketConfig::default(),
        }
    }
}

/// Radio parameters carried by the packet commands
///
/// All zero by default: channel 0, send once, no inter-packet delay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketConfig {
    /// Channel used to transmit
    pub channel: u8,
    /// Number of additional transmissions of each packet
    pub repeat_count: u8,
    /// Delay between repeated transmissions, in milliseconds
    pub delay_ms: u8,
    /// Channel listened on by `GetPacket` and `SendAndListen`
    pub listen_channel: u8,
    /// Number of times `SendAndListen` resends when nothing is heard
    pub retry_count: u8,
}

/// Converts a duration to whole microseconds for `DelayNs`, saturating.
pub(crate) fn as_micros(duration: Duration) -> u32 {
    u32::try_from(duration.as_micros()).unwrap_or(u32::MAX)
}

/// Converts a duration to whole milliseconds for the wire, saturating.
pub(crate) fn as_millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}
