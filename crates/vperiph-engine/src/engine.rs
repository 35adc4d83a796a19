use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, trace};
use vperiph_frame::{FrameConfig, FrameError, LineReader, LineWriter};
use vperiph_transport::Link;

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::message::ScreenId;
use crate::registry::ScreenRegistry;
use crate::router::Router;
use crate::view::View;

/// Sent on the first tick: the engine asks which screen the peer shows.
pub const ACTIVE_SCREEN_QUERY: &str = "?S";

/// Extra room outgoing lines get over inbound ones.
///
/// Error replies echo the offending line behind `e01`, or behind `e02` with a
/// `:<offset>` suffix, so a maximum-length request must still be answerable.
pub const REPLY_OVERHEAD: usize = 8;

/// Transport loop state between and during ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Waiting for the next tick.
    Idle,
    /// Pulling and routing available input.
    Draining,
}

/// Counts for one completed tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Lines framed and routed.
    pub received: usize,
    /// Lines written to the link.
    pub sent: usize,
}

/// The transport loop.
///
/// Each [`tick`](Engine::tick) drains every byte the link has right now,
/// routes the completed lines in arrival order, runs diagnostics, and then
/// flushes the outgoing queue. Transport failures and invalid screen
/// switches are returned to the caller, who is expected to stop.
pub struct Engine<L, V, C = SystemClock> {
    link: L,
    reader: LineReader,
    writer: LineWriter,
    router: Router<V, C>,
    state: LoopState,
    ticks: u64,
    tick_interval: Duration,
    startup_delay: Duration,
}

impl<L: Link, V: View> Engine<L, V, SystemClock> {
    /// Engine with the compiled-in screens and the system clock.
    pub fn new(link: L, view: V, config: EngineConfig) -> Result<Self> {
        let registry = ScreenRegistry::with_builtin_screens()?;
        Self::with_parts(link, registry, view, SystemClock, config)
    }
}

impl<L: Link, V: View, C: Clock> Engine<L, V, C> {
    pub fn with_parts(
        link: L,
        registry: ScreenRegistry,
        view: V,
        clock: C,
        config: EngineConfig,
    ) -> Result<Self> {
        let router = Router::new(registry, view, clock, &config)?;
        info!(link = %link.describe(), screens = ?router.registry(), "engine ready");
        let outgoing = FrameConfig {
            max_line_len: config.frame.max_line_len.saturating_add(REPLY_OVERHEAD),
        };
        Ok(Self {
            link,
            reader: LineReader::with_config(config.frame.clone()),
            writer: LineWriter::with_config(outgoing),
            router,
            state: LoopState::Idle,
            ticks: 0,
            tick_interval: config.tick_interval,
            startup_delay: config.startup_delay,
        })
    }

    /// Run one drain-route-flush cycle.
    pub fn tick(&mut self) -> Result<TickReport> {
        self.state = LoopState::Draining;
        let drained = self.drain();
        self.state = LoopState::Idle;
        let received = drained?;

        if self.ticks == 0 {
            self.router.enqueue(ACTIVE_SCREEN_QUERY);
        }
        self.ticks += 1;
        self.router.on_tick();

        let mut sent = 0;
        for line in self.router.take_outgoing() {
            match self.writer.send(&mut self.link, &line) {
                Ok(()) => sent += 1,
                Err(
                    err @ (FrameError::LineTooLong { .. } | FrameError::EmbeddedDelimiter(_)),
                ) => {
                    self.router
                        .local_debug(format_args!("dropped outgoing message: {err}"));
                }
                Err(err) => return Err(err.into()),
            }
        }

        let report = TickReport { received, sent };
        if report != TickReport::default() {
            trace!(tick = self.ticks, ?report, "tick complete");
        }
        Ok(report)
    }

    fn drain(&mut self) -> Result<usize> {
        let lines = self.reader.poll(&mut self.link)?;
        for line in &lines {
            self.router.route_line(line.as_str())?;
        }
        let max = self.reader.framer().config().max_line_len;
        for _ in 0..self.reader.take_discarded() {
            self.router.local_debug(format_args!(
                "discarded over-long line (more than {max} bytes)"
            ));
        }
        Ok(lines.len())
    }

    /// Tick until `running` is cleared or `max_ticks` ticks have run.
    ///
    /// Sleeps the startup delay first and the tick interval after each tick.
    /// The flag is only checked between ticks. Returns the ticks run.
    pub fn run(&mut self, running: &AtomicBool, max_ticks: Option<u64>) -> Result<u64> {
        thread::sleep(self.startup_delay);
        let mut ran = 0u64;
        while running.load(Ordering::SeqCst) {
            if max_ticks.is_some_and(|max| ran >= max) {
                break;
            }
            self.tick()?;
            ran += 1;
            thread::sleep(self.tick_interval);
        }
        debug!(ticks = ran, "transport loop stopped");
        Ok(ran)
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Ticks completed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn active_screen(&self) -> ScreenId {
        self.router.active()
    }

    pub fn router(&self) -> &Router<V, C> {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut Router<V, C> {
        &mut self.router
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use bytes::BytesMut;
    use vperiph_transport::TransportError;

    use super::*;
    use crate::error::EngineError;
    use crate::view::RecordingView;

    #[derive(Default)]
    struct ScriptedLink {
        reads: VecDeque<std::result::Result<Vec<u8>, ()>>,
        written: Vec<u8>,
    }

    impl Link for ScriptedLink {
        fn read_available(&mut self, dst: &mut BytesMut) -> vperiph_transport::Result<usize> {
            match self.reads.pop_front() {
                Some(Ok(chunk)) => {
                    dst.extend_from_slice(&chunk);
                    Ok(chunk.len())
                }
                Some(Err(())) => Err(TransportError::Disconnected),
                None => Ok(0),
            }
        }

        fn write_all(&mut self, data: &[u8]) -> vperiph_transport::Result<()> {
            self.written.extend_from_slice(data);
            Ok(())
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    fn engine(link: ScriptedLink) -> Engine<ScriptedLink, RecordingView> {
        Engine::new(link, RecordingView::new(), EngineConfig::default()).unwrap()
    }

    #[test]
    fn first_tick_asks_for_active_screen() {
        let mut engine = engine(ScriptedLink::default());
        let report = engine.tick().unwrap();
        assert_eq!(report, TickReport { received: 0, sent: 1 });
        assert_eq!(engine.link().written, b"?S\n");

        engine.tick().unwrap();
        assert_eq!(engine.link().written, b"?S\n");
        assert_eq!(engine.ticks(), 2);
        assert_eq!(engine.state(), LoopState::Idle);
    }

    #[test]
    fn replies_precede_first_query() {
        let mut link = ScriptedLink::default();
        link.reads.push_back(Ok(b"?V\n".to_vec()));
        let mut engine = engine(link);

        engine.tick().unwrap();
        assert_eq!(engine.link().written, b"dV03012\n?S\n");
    }

    #[test]
    fn transport_failure_is_fatal() {
        let mut link = ScriptedLink::default();
        link.reads.push_back(Err(()));
        let mut engine = engine(link);

        let err = engine.tick().unwrap_err();
        assert!(err.is_transport());
        assert_eq!(engine.state(), LoopState::Idle);
        assert!(engine.link().written.is_empty());
    }

    #[test]
    fn unsendable_line_is_reported_and_tick_continues() {
        let mut engine = engine(ScriptedLink::default());
        engine.router_mut().enqueue("dLone\ntwo");
        engine.router_mut().enqueue("dT20240101120000");

        let report = engine.tick().unwrap();
        assert_eq!(report.sent, 2);
        assert_eq!(engine.link().written, b"dT20240101120000\n?S\n");
        assert_eq!(engine.router().view().debugs().len(), 1);
        assert!(engine.router().view().debugs()[0]
            .starts_with("[local] dropped outgoing message: "));
    }

    #[test]
    fn invalid_switch_stops_the_tick() {
        let mut link = ScriptedLink::default();
        link.reads.push_back(Ok(b"dS8\n?T\n".to_vec()));
        let mut engine = engine(link);

        assert!(matches!(engine.tick(), Err(EngineError::UnknownScreen(_))));
    }

    #[test]
    fn run_honours_tick_limit_and_stop_flag() {
        let config = EngineConfig {
            tick_interval: Duration::ZERO,
            startup_delay: Duration::ZERO,
            ..EngineConfig::default()
        };
        let mut engine =
            Engine::new(ScriptedLink::default(), RecordingView::new(), config).unwrap();

        let running = AtomicBool::new(true);
        assert_eq!(engine.run(&running, Some(5)).unwrap(), 5);

        running.store(false, Ordering::SeqCst);
        assert_eq!(engine.run(&running, None).unwrap(), 0);
        assert_eq!(engine.ticks(), 5);
    }
}
