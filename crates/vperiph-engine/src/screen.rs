use std::any::Any;

use crate::error::ScreenError;
use crate::message::{MessageKind, ScreenId};
use crate::outbox::Outbox;

/// A set or request message addressed to one screen.
#[derive(Debug, Clone, Copy)]
pub struct ScreenMessage<'a> {
    pub kind: MessageKind,
    pub screen: ScreenId,
    /// The whole line, used when echoing it back in an error.
    pub message: &'a str,
    /// Everything after the screen digit.
    pub data: &'a str,
    /// Index of `data` within `message`.
    pub offset: usize,
}

impl<'a> ScreenMessage<'a> {
    /// First character of the data, used by screens with item codes.
    pub fn item(&self) -> Option<char> {
        self.data.chars().next()
    }

    /// Data after the item code.
    pub fn item_data(&self) -> &'a str {
        self.data.get(1..).unwrap_or("")
    }
}

/// Read-only test-mode settings passed to screen hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestContext {
    pub screen: ScreenId,
    /// Ticks since the engine started.
    pub call_counter: u64,
    pub message_interval: u32,
}

/// A screen handler.
///
/// Implementations keep their own state model and may queue outgoing lines
/// on the [`Outbox`] as a side effect of any call.
pub trait Screen {
    /// Short machine-friendly name, e.g. `alarm-clock`.
    fn name(&self) -> &'static str;

    /// Apply a set message.
    fn handle_set(
        &mut self,
        msg: &ScreenMessage<'_>,
        outbox: &mut Outbox,
    ) -> Result<(), ScreenError>;

    /// Answer a request message. `Ok(Some(line))` is queued as the reply.
    fn handle_request(
        &mut self,
        msg: &ScreenMessage<'_>,
        outbox: &mut Outbox,
    ) -> Result<Option<String>, ScreenError> {
        let _ = outbox;
        Err(ScreenError::UnknownItem(msg.item()))
    }

    /// Prepare for test mode and return the tick divider (0 is treated as 1).
    fn test_init(&mut self, _ctx: &TestContext) -> u32 {
        1
    }

    /// Advance the test animation by one divided tick.
    fn test_do(&mut self, _tick: u64, _ctx: &TestContext) {}

    /// One-line description of the current state.
    fn summary(&self) -> String;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
