//! Non-blocking link abstraction for talking to a microcontroller.
//!
//! Provides a unified interface over the ways the desktop side can reach
//! the target:
//! - A serial tty device (raw mode, non-blocking)
//! - A unix domain socket (simulators, `socat` bridges)
//! - A null link for dry runs without hardware
//!
//! This is the lowest layer of vperiph. Everything else builds on top of
//! the [`Link`] trait provided here.

pub mod error;
pub mod traits;

#[cfg(unix)]
pub mod tty;

pub use error::{Result, TransportError};
pub use traits::{Link, SerialLink};

#[cfg(unix)]
pub use tty::{Baud, SerialConfig};
