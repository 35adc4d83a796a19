//! Compiled-in screen handlers.
//!
//! Each screen is a pure state model: it decodes the data of messages
//! addressed to it, keeps its state, and queues outgoing lines when local
//! input changes. Rendering is left to the [`View`](crate::View).

pub mod alarm_clock;
pub mod io;
pub mod seesaw;

pub use alarm_clock::AlarmClockScreen;
pub use io::IoScreen;
pub use seesaw::{SeesawSample, SeesawScreen};

use crate::error::{Result, ScreenError};
use crate::registry::ScreenRegistryBuilder;

pub const IO_SCREEN_ID: u8 = 0;
pub const ALARM_CLOCK_SCREEN_ID: u8 = 1;
pub const SEESAW_SCREEN_ID: u8 = 2;

/// Register the three mandatory screens at their fixed ids.
pub fn register_builtin(builder: &mut ScreenRegistryBuilder) -> Result<()> {
    builder
        .register(IO_SCREEN_ID, io::NAME, |id| Box::new(IoScreen::new(id)))?
        .register(ALARM_CLOCK_SCREEN_ID, alarm_clock::NAME, |_| {
            Box::new(AlarmClockScreen::new())
        })?
        .register(SEESAW_SCREEN_ID, seesaw::NAME, |_| {
            Box::new(SeesawScreen::new())
        })?;
    Ok(())
}

/// Parse exactly `width` hex digits at the start of `data`.
pub(crate) fn hex_field(
    data: &str,
    start: usize,
    width: usize,
) -> std::result::Result<u32, ScreenError> {
    let field = data
        .get(start..start + width)
        .ok_or(ScreenError::Length {
            expected: start + width,
            actual: data.len(),
        })?;
    if !field.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ScreenError::Decode(field.to_string()));
    }
    u32::from_str_radix(field, 16).map_err(|_| ScreenError::Decode(field.to_string()))
}
