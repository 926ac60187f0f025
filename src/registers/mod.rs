//! Register definitions for the CC111x radio
//!
//! Only the registers the driver itself manipulates are declared here. Any
//! other register can be reached by address through
//! [`Radio::read_register_at`](crate::Radio::read_register_at) and
//! [`Radio::write_register_at`](crate::Radio::write_register_at).

mod frequency;

pub use frequency::*;
