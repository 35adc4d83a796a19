use std::any::Any;

use crate::error::ScreenError;
use crate::outbox::Outbox;
use crate::screen::{Screen, ScreenMessage, TestContext};
use crate::screens::hex_field;

pub const NAME: &str = "alarm-clock";

/// Number of seven-segment digits.
pub const DIGITS: usize = 4;

/// Segment masks for 0-9, segment A = bit 0 through G = bit 6.
pub const SEGMENT_DIGITS: [u8; 10] = [0x3f, 0x06, 0x5b, 0x4f, 0x66, 0x6d, 0x7d, 0x07, 0x7f, 0x6f];

const DOT_BIT: u8 = 0x80;
const SEGMENT_BITS: u8 = 0x7f;

/// A four digit clock display with colon, alarm and beep indicators.
///
/// Set data is eight hex digits, one byte per digit, leftmost digit first.
/// Bit 7 of a byte is a dot flag: the rightmost byte carries the beep
/// indicator, the next one the colon, the next one the alarm indicator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlarmClockScreen {
    /// Segment masks, leftmost digit first.
    masks: [u8; DIGITS],
    colon: bool,
    alarm: bool,
    beep: bool,
}

impl AlarmClockScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn masks(&self) -> [u8; DIGITS] {
        self.masks
    }

    pub fn colon(&self) -> bool {
        self.colon
    }

    pub fn alarm(&self) -> bool {
        self.alarm
    }

    pub fn beep(&self) -> bool {
        self.beep
    }

    /// Decode the eight hex digit display payload.
    pub fn show(&mut self, data: &str) -> Result<(), ScreenError> {
        let mut bytes = [0u8; DIGITS];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = hex_field(data, i * 2, 2)? as u8;
        }

        for (mask, byte) in self.masks.iter_mut().zip(bytes) {
            *mask = byte & SEGMENT_BITS;
        }
        self.beep = bytes[3] & DOT_BIT != 0;
        self.colon = bytes[2] & DOT_BIT != 0;
        self.alarm = bytes[1] & DOT_BIT != 0;
        Ok(())
    }

    /// Show a decimal number, blanking leading zeros.
    pub fn set_number(&mut self, number: u64) {
        let mut base = 1u64;
        for mask in self.masks.iter_mut().rev() {
            let digit = (number / base % 10) as usize;
            *mask = if digit != 0 || number >= base {
                SEGMENT_DIGITS[digit]
            } else {
                0
            };
            base = base.saturating_mul(10);
        }
    }

    /// The display as text, e.g. `12:34`; unknown segment patterns show `?`.
    pub fn render(&self) -> String {
        let mut text = String::with_capacity(DIGITS + 1);
        for (i, mask) in self.masks.iter().enumerate() {
            if i == DIGITS / 2 {
                text.push(if self.colon { ':' } else { ' ' });
            }
            text.push(match mask {
                0 => ' ',
                m => SEGMENT_DIGITS
                    .iter()
                    .position(|d| d == m)
                    .and_then(|d| char::from_digit(d as u32, 10))
                    .unwrap_or('?'),
            });
        }
        text
    }
}

impl Screen for AlarmClockScreen {
    fn name(&self) -> &'static str {
        NAME
    }

    fn handle_set(
        &mut self,
        msg: &ScreenMessage<'_>,
        _outbox: &mut Outbox,
    ) -> Result<(), ScreenError> {
        self.show(msg.data)
    }

    fn test_init(&mut self, _ctx: &TestContext) -> u32 {
        1
    }

    fn test_do(&mut self, tick: u64, _ctx: &TestContext) {
        self.set_number(tick);
    }

    fn summary(&self) -> String {
        format!("[{}] alarm={} beep={}", self.render(), self.alarm, self.beep)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
