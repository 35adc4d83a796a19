use std::fmt::Display;

use tracing::{debug, info, trace};

use crate::builtin::{BuiltinRequestCode, BuiltinSetCode};
use crate::clock::{Clock, TIME_FORMAT};
use crate::config::EngineConfig;
use crate::diagnostics::Diagnostics;
use crate::error::{EngineError, Result};
use crate::message::{Message, MessageKind, ScreenId, Target, DATA_OFFSET};
use crate::outbox::Outbox;
use crate::registry::ScreenRegistry;
use crate::screen::{Screen, ScreenMessage};
use crate::view::View;

/// Protocol version announced in the `?V` reply.
pub const VERSION_CODE: &str = "03";

/// Prefix of the reply to a request that could not be routed.
pub const ROUTING_ERROR_CODE: &str = "e01";

/// Prefix of the reply to a request a screen could not answer.
pub const SCREEN_ERROR_CODE: &str = "e02";

/// Prefix of debug entries generated by the engine itself.
pub const LOCAL_PREFIX: &str = "[local] ";

/// Dispatches classified messages to builtin handlers and screens.
///
/// Owns the active screen, the outgoing queue and the collaborators. Screen
/// 0 is always reachable; any other screen only while it is active.
pub struct Router<V, C> {
    registry: ScreenRegistry,
    active: ScreenId,
    outbox: Outbox,
    view: V,
    clock: C,
    debug: bool,
    diagnostics: Diagnostics,
}

impl<V: View, C: Clock> Router<V, C> {
    /// Construct screen 0, present it, and set up test mode if configured.
    pub fn new(
        registry: ScreenRegistry,
        view: V,
        clock: C,
        config: &EngineConfig,
    ) -> Result<Self> {
        let mut router = Self {
            registry,
            active: ScreenId::DEFAULT,
            outbox: Outbox::new(),
            view,
            clock,
            debug: config.debug,
            diagnostics: Diagnostics::new(config),
        };

        let screen = router.registry.instantiate(ScreenId::DEFAULT)?;
        router.view.activate_screen(ScreenId::DEFAULT, screen);
        router.prepare_test()?;
        Ok(router)
    }

    fn prepare_test(&mut self) -> Result<()> {
        let Some(id) = self.diagnostics.test_screen() else {
            return Ok(());
        };
        info!(screen = %id, "test mode enabled");
        if !id.is_default() {
            return self.switch_screen(id);
        }
        let ctx = self.diagnostics.context();
        let divider = self.registry.instantiate(id)?.test_init(&ctx);
        self.diagnostics.set_divider(divider);
        Ok(())
    }

    /// Classify and dispatch one framed line.
    pub fn route_line(&mut self, line: &str) -> Result<()> {
        self.dispatch(&Message::new(line))
    }

    /// Dispatch a classified message.
    ///
    /// Only an invalid screen switch is returned as an error; every other
    /// problem is reported on the debug channel.
    pub fn dispatch(&mut self, message: &Message) -> Result<()> {
        match message.kind() {
            MessageKind::Set => self.route_set(message),
            MessageKind::Request => {
                self.route_request(message);
                Ok(())
            }
            MessageKind::Error => {
                self.local_debug(format_args!("incoming error message: {message}"));
                Ok(())
            }
            MessageKind::Unknown => {
                trace!(line = message.text(), "dropping unclassified line");
                Ok(())
            }
        }
    }

    fn route_set(&mut self, message: &Message) -> Result<()> {
        match message.target() {
            Target::Set(BuiltinSetCode::Log) => self.view.notify_log(message.data()),
            Target::Set(BuiltinSetCode::Debug) => self.view.notify_debug(message.data()),
            Target::Set(BuiltinSetCode::Screen) => return self.switch_screen_to(message.data()),
            Target::Screen(id) => self.deliver_set(id, message),
            Target::Request(_) | Target::Unrecognized => {
                self.local_debug(format_args!("unknown item in setter: {message}"))
            }
        }
        Ok(())
    }

    fn route_request(&mut self, message: &Message) {
        let answer = match message.target() {
            Target::Request(BuiltinRequestCode::Time) => Some(self.time_reply()),
            Target::Request(BuiltinRequestCode::Version) => Some(self.version_reply()),
            Target::Screen(id) => self.deliver_request(id, message),
            Target::Set(_) | Target::Unrecognized => {
                self.local_debug(format_args!("unknown item in requester: {message}"));
                Some(format!("{ROUTING_ERROR_CODE}{message}"))
            }
        };
        if let Some(answer) = answer {
            self.outbox.push(answer);
        }
    }

    fn deliver_set(&mut self, id: ScreenId, message: &Message) {
        if !self.accepts(id) {
            self.local_debug(format_args!("write to non-active screen {id}: {message}"));
            return;
        }
        let msg = screen_message(id, message);
        let screen = match self.registry.instantiate(id) {
            Ok(screen) => screen,
            Err(err) => {
                self.local_debug(format_args!("cannot deliver {message}: {err}"));
                return;
            }
        };
        match screen.handle_set(&msg, &mut self.outbox) {
            Ok(()) => self.view.screen_updated(id, screen),
            Err(err) => self.local_debug(format_args!("screen {id} rejected {message}: {err}")),
        }
    }

    fn deliver_request(&mut self, id: ScreenId, message: &Message) -> Option<String> {
        if !self.accepts(id) {
            self.local_debug(format_args!("request to non-active screen {id}: {message}"));
            return Some(format!("{ROUTING_ERROR_CODE}{message}"));
        }
        let msg = screen_message(id, message);
        let screen = match self.registry.instantiate(id) {
            Ok(screen) => screen,
            Err(err) => {
                self.local_debug(format_args!("cannot deliver {message}: {err}"));
                return Some(format!("{ROUTING_ERROR_CODE}{message}"));
            }
        };
        match screen.handle_request(&msg, &mut self.outbox) {
            Ok(answer) => answer,
            Err(err) => {
                self.local_debug(format_args!("screen {id} rejected {message}: {err}"));
                Some(format!("{SCREEN_ERROR_CODE}{message}"))
            }
        }
    }

    fn accepts(&self, id: ScreenId) -> bool {
        id.is_default() || id == self.active
    }

    fn switch_screen_to(&mut self, arg: &str) -> Result<()> {
        let id = arg
            .chars()
            .next()
            .and_then(ScreenId::from_digit)
            .ok_or_else(|| EngineError::InvalidScreen(arg.to_string()))?;
        self.switch_screen(id)
    }

    /// Make `id` the active screen, constructing it on first use.
    ///
    /// The view releases the previous screen before the new one is
    /// presented. Switching to the already active screen does nothing.
    pub fn switch_screen(&mut self, id: ScreenId) -> Result<()> {
        if !self.registry.contains(id) {
            return Err(EngineError::UnknownScreen(id));
        }
        if id == self.active {
            trace!(screen = %id, "screen already active");
            return Ok(());
        }
        if !self.active.is_default() {
            self.view.release_screen(self.active);
        }

        let screen = self.registry.instantiate(id)?;
        self.active = id;
        info!(screen = %id, name = screen.name(), "active screen changed");

        if self.diagnostics.test_screen() == Some(id) {
            let divider = screen.test_init(&self.diagnostics.context());
            self.diagnostics.set_divider(divider);
        }
        self.view.activate_screen(id, screen);
        Ok(())
    }

    /// `dT` followed by the local time as `YYYYMMDDHHMMSS`.
    pub fn time_reply(&self) -> String {
        format!("dT{}", self.clock.now().format(TIME_FORMAT))
    }

    /// `dV03`, a `d` when debugging, then every registered id in order.
    pub fn version_reply(&self) -> String {
        let mut reply = format!("dV{VERSION_CODE}");
        if self.debug {
            reply.push('d');
        }
        reply.extend(self.registry.ids().map(ScreenId::as_char));
        reply
    }

    /// Run the per-tick diagnostics.
    pub fn on_tick(&mut self) {
        let step = self.diagnostics.tick(self.active);
        if let Some(nr) = step.message {
            let interval = self.diagnostics.message_interval();
            self.local_debug(format_args!("message {nr} after {interval} calls"));
        }
        if let Some(tick) = step.test_tick {
            let ctx = self.diagnostics.context();
            let id = self.active;
            if let Ok(screen) = self.registry.instantiate(id) {
                screen.test_do(tick, &ctx);
                self.view.screen_updated(id, screen);
            }
        }
    }

    /// Apply local input to a screen of concrete type `T`.
    ///
    /// Returns `Ok(None)` when the screen at `id` is not a `T`.
    pub fn local_input<T, R>(
        &mut self,
        id: ScreenId,
        input: impl FnOnce(&mut T, &mut Outbox) -> R,
    ) -> Result<Option<R>>
    where
        T: Screen + 'static,
    {
        let screen = self.registry.instantiate(id)?;
        let Some(concrete) = screen.as_any_mut().downcast_mut::<T>() else {
            return Ok(None);
        };
        let result = input(concrete, &mut self.outbox);
        self.view.screen_updated(id, screen);
        Ok(Some(result))
    }

    /// Report an engine-generated entry on the debug channel.
    pub fn local_debug(&mut self, text: impl Display) {
        let entry = format!("{LOCAL_PREFIX}{text}");
        debug!("{entry}");
        self.view.notify_debug(&entry);
    }

    /// Queue an outgoing line.
    pub fn enqueue(&mut self, line: impl Into<String>) {
        self.outbox.push(line);
    }

    /// Remove every queued outgoing line.
    pub fn take_outgoing(&mut self) -> Vec<String> {
        self.outbox.drain()
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn active(&self) -> ScreenId {
        self.active
    }

    pub fn registry(&self) -> &ScreenRegistry {
        &self.registry
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }
}

fn screen_message<'a>(id: ScreenId, message: &'a Message) -> ScreenMessage<'a> {
    ScreenMessage {
        kind: message.kind(),
        screen: id,
        message: message.text(),
        data: message.data(),
        offset: DATA_OFFSET,
    }
}
