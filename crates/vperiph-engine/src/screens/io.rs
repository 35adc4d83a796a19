use std::any::Any;

use tracing::debug;

use crate::error::ScreenError;
use crate::message::ScreenId;
use crate::outbox::Outbox;
use crate::screen::{Screen, ScreenMessage, TestContext};

pub const NAME: &str = "io";

pub const LED_COUNT: usize = 8;
pub const SWITCH_COUNT: usize = 8;
pub const BUTTON_COUNT: usize = 4;
pub const ADC_CHANNELS: usize = 3;
/// Full scale of the 10-bit converters.
pub const ADC_MAX: u16 = 1023;

const ITEM_LEDS: char = '0';
const ITEM_SWITCHES: char = '1';
const ITEM_BUTTONS: char = '2';
const ITEM_FIRST_ADC: char = 'a';

/// Plain digital and analog I/O: LEDs driven by the peer, switches,
/// buttons and ADC sliders driven locally.
#[derive(Debug, Clone)]
pub struct IoScreen {
    id: ScreenId,
    leds: u8,
    switches: u8,
    buttons: u8,
    adc: [u16; ADC_CHANNELS],
}

impl IoScreen {
    pub fn new(id: ScreenId) -> Self {
        Self {
            id,
            leds: 0,
            switches: 0,
            buttons: 0,
            adc: [0; ADC_CHANNELS],
        }
    }

    /// LED states, bit 0 = LED 0.
    pub fn leds(&self) -> u8 {
        self.leds
    }

    pub fn switches(&self) -> u8 {
        self.switches
    }

    pub fn buttons(&self) -> u8 {
        self.buttons
    }

    pub fn adc(&self, channel: usize) -> Option<u16> {
        self.adc.get(channel).copied()
    }

    /// Change the switch positions and tell the peer.
    pub fn set_switches(&mut self, value: u8, outbox: &mut Outbox) {
        self.switches = value;
        self.report_switches(outbox);
    }

    /// Change the pressed buttons (low four bits) and tell the peer.
    pub fn set_buttons(&mut self, value: u8, outbox: &mut Outbox) {
        self.buttons = value & 0x0f;
        self.report_buttons(outbox);
    }

    /// Move an ADC slider and tell the peer. Values are clamped to 10 bits.
    pub fn set_adc(
        &mut self,
        channel: usize,
        value: u16,
        outbox: &mut Outbox,
    ) -> Result<(), ScreenError> {
        let slot = self
            .adc
            .get_mut(channel)
            .ok_or(ScreenError::Decode(format!("adc channel {channel}")))?;
        *slot = value.min(ADC_MAX);
        self.report_adc(channel, outbox);
        Ok(())
    }

    fn report_switches(&self, outbox: &mut Outbox) {
        outbox.push(format!("d{}{ITEM_SWITCHES}{:02x}", self.id.as_char(), self.switches));
    }

    fn report_buttons(&self, outbox: &mut Outbox) {
        outbox.push(format!("d{}{ITEM_BUTTONS}{:02x}", self.id.as_char(), self.buttons));
    }

    fn report_adc(&self, channel: usize, outbox: &mut Outbox) {
        let item = char::from(ITEM_FIRST_ADC as u8 + channel as u8);
        outbox.push(format!("d{}{item}{:04x}", self.id.as_char(), self.adc[channel]));
    }

    fn adc_channel(item: char) -> Option<usize> {
        match item {
            'a'..='c' => Some(item as usize - ITEM_FIRST_ADC as usize),
            _ => None,
        }
    }
}

impl Screen for IoScreen {
    fn name(&self) -> &'static str {
        NAME
    }

    fn handle_set(
        &mut self,
        msg: &ScreenMessage<'_>,
        outbox: &mut Outbox,
    ) -> Result<(), ScreenError> {
        match msg.item() {
            Some(ITEM_LEDS) => {
                let data = msg.item_data();
                match u32::from_str_radix(data, 16) {
                    Ok(value) if data.bytes().all(|b| b.is_ascii_hexdigit()) => {
                        self.leds = (value & 0xff) as u8;
                    }
                    _ => debug!(data, "ignoring undecodable LED value"),
                }
            }
            _ => outbox.push(format!("e02{}:{}", msg.message, msg.offset)),
        }
        Ok(())
    }

    fn handle_request(
        &mut self,
        msg: &ScreenMessage<'_>,
        outbox: &mut Outbox,
    ) -> Result<Option<String>, ScreenError> {
        match msg.item() {
            Some(ITEM_SWITCHES) => self.report_switches(outbox),
            Some(ITEM_BUTTONS) => self.report_buttons(outbox),
            Some(item) => match Self::adc_channel(item) {
                Some(channel) => self.report_adc(channel, outbox),
                None => return Err(ScreenError::UnknownItem(Some(item))),
            },
            None => return Err(ScreenError::UnknownItem(None)),
        }
        Ok(None)
    }

    fn test_init(&mut self, _ctx: &TestContext) -> u32 {
        1
    }

    fn test_do(&mut self, tick: u64, _ctx: &TestContext) {
        self.leds = (tick & 0xff) as u8;
    }

    fn summary(&self) -> String {
        format!(
            "leds={:08b} switches={:08b} buttons={:04b} adc={:?}",
            self.leds, self.switches, self.buttons, self.adc
        )
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
