use std::any::Any;
use std::collections::VecDeque;

use crate::error::ScreenError;
use crate::outbox::Outbox;
use crate::screen::{Screen, ScreenMessage, TestContext};
use crate::screens::hex_field;

pub const NAME: &str = "seesaw";

/// Samples kept for the graph, one per horizontal position.
pub const HISTORY_LEN: usize = 301;

/// Length of a set payload: three 16-bit hex values and the boing flag.
pub const PAYLOAD_LEN: usize = 13;

const POSITION_SCALE: f64 = 50_000.0;
const ANGLE_SCALE: f64 = 2_000.0;

/// One telemetry sample of the ball-on-seesaw experiment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeesawSample {
    /// Setpoint in meters, nominally -0.5..=0.5.
    pub reference: f64,
    /// Ball position in meters, nominally -0.6..=0.6.
    pub ball: f64,
    /// Seesaw angle in degrees, nominally -15..=15.
    pub angle: f64,
    pub boing: bool,
}

impl SeesawSample {
    const SWEEP_START: SeesawSample = SeesawSample {
        reference: -0.5,
        ball: -0.6,
        angle: -15.0,
        boing: false,
    };

    /// Decode `RRRRBBBBAAAAx`: big-endian signed hex fields and `t`/`f`.
    pub fn decode(data: &str) -> Result<Self, ScreenError> {
        let signed = |start| hex_field(data, start, 4).map(|raw| f64::from(raw as u16 as i16));
        let reference = signed(0)? / POSITION_SCALE;
        let ball = signed(4)? / POSITION_SCALE;
        let angle = signed(8)? / ANGLE_SCALE;
        let boing = match data.as_bytes().get(PAYLOAD_LEN - 1) {
            Some(b't') => true,
            Some(_) => false,
            None => {
                return Err(ScreenError::Length {
                    expected: PAYLOAD_LEN,
                    actual: data.len(),
                })
            }
        };
        Ok(Self {
            reference,
            ball,
            angle,
            boing,
        })
    }

    /// Next step of the deterministic test sweep.
    fn advance(mut self) -> Self {
        self.reference = wrap(self.reference + 0.0051, 0.5);
        self.ball = wrap(self.ball + 0.0126, 0.6);
        self.angle = wrap(self.angle + 0.29, 15.0);
        self.boing = self.ball <= 0.0;
        self
    }
}

fn wrap(value: f64, limit: f64) -> f64 {
    if value > limit {
        -limit
    } else {
        value
    }
}

/// Ball-on-seesaw telemetry with a bounded history for plotting.
#[derive(Debug, Clone)]
pub struct SeesawScreen {
    history: VecDeque<SeesawSample>,
    sweep: SeesawSample,
}

impl Default for SeesawScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl SeesawScreen {
    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(HISTORY_LEN),
            sweep: SeesawSample::SWEEP_START,
        }
    }

    /// Most recent sample, if any arrived.
    pub fn current(&self) -> Option<&SeesawSample> {
        self.history.back()
    }

    /// Samples oldest first, at most [`HISTORY_LEN`].
    pub fn history(&self) -> impl Iterator<Item = &SeesawSample> {
        self.history.iter()
    }

    pub fn show(&mut self, sample: SeesawSample) {
        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(sample);
    }
}

impl Screen for SeesawScreen {
    fn name(&self) -> &'static str {
        NAME
    }

    fn handle_set(
        &mut self,
        msg: &ScreenMessage<'_>,
        _outbox: &mut Outbox,
    ) -> Result<(), ScreenError> {
        let sample = SeesawSample::decode(msg.data)?;
        self.show(sample);
        Ok(())
    }

    fn test_init(&mut self, _ctx: &TestContext) -> u32 {
        self.sweep = SeesawSample::SWEEP_START;
        2
    }

    fn test_do(&mut self, _tick: u64, _ctx: &TestContext) {
        self.sweep = self.sweep.advance();
        self.show(self.sweep);
    }

    fn summary(&self) -> String {
        match self.current() {
            Some(s) => format!(
                "ref={:+.3} ball={:+.3} angle={:+.2} boing={}",
                s.reference, s.ball, s.angle, s.boing
            ),
            None => "no data".to_string(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
