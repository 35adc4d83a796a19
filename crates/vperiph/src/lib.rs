//! Virtual peripherals for microcontroller boards.
//!
//! A board talks to the desktop over a serial line using short text
//! messages; the desktop plays LEDs, switches, a clock display and other
//! "screens" for it.
//!
//! # Crate Structure
//!
//! - [`transport`]: non-blocking serial, socket and dry-run links
//! - [`frame`]: newline framing of the byte stream
//! - [`engine`]: message routing, screens, and the transport loop

/// Re-export transport types.
pub mod transport {
    pub use vperiph_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use vperiph_frame::*;
}

/// Re-export engine types.
pub mod engine {
    pub use vperiph_engine::*;
}
