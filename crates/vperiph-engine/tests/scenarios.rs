use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use bytes::BytesMut;
use chrono::NaiveDate;
use vperiph_engine::screens::{IoScreen, SeesawScreen};
use vperiph_engine::{
    Engine, EngineConfig, EngineError, FixedClock, RecordingView, ScreenId, ScreenRegistry,
    ViewEvent,
};
use vperiph_frame::DEFAULT_MAX_LINE_LEN;
use vperiph_transport::Link;

/// In-memory link: each queued chunk is returned by one read.
#[derive(Default)]
struct MemoryLink {
    incoming: VecDeque<Vec<u8>>,
    written: Vec<u8>,
}

impl MemoryLink {
    fn with_input(chunks: &[&[u8]]) -> Self {
        Self {
            incoming: chunks.iter().map(|c| c.to_vec()).collect(),
            written: Vec::new(),
        }
    }

    fn written_lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.written)
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Link for MemoryLink {
    fn read_available(&mut self, dst: &mut BytesMut) -> vperiph_transport::Result<usize> {
        match self.incoming.pop_front() {
            Some(chunk) => {
                dst.extend_from_slice(&chunk);
                Ok(chunk.len())
            }
            None => Ok(0),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> vperiph_transport::Result<()> {
        self.written.extend_from_slice(data);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

fn fixed_clock() -> FixedClock {
    FixedClock(
        NaiveDate::from_ymd_opt(2025, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 58)
            .unwrap(),
    )
}

fn engine_with(
    link: MemoryLink,
    config: EngineConfig,
) -> Engine<MemoryLink, RecordingView, FixedClock> {
    let registry = ScreenRegistry::with_builtin_screens().unwrap();
    Engine::with_parts(link, registry, RecordingView::new(), fixed_clock(), config).unwrap()
}

fn engine(link: MemoryLink) -> Engine<MemoryLink, RecordingView, FixedClock> {
    engine_with(link, EngineConfig::default())
}

fn id(n: u8) -> ScreenId {
    ScreenId::new(n).unwrap()
}

#[test]
fn time_request_is_answered() {
    let mut engine = engine(MemoryLink::with_input(&[b"?T\n"]));
    engine.tick().unwrap();
    assert_eq!(engine.link().written_lines(), vec!["dT20251231235958", "?S"]);
}

#[test]
fn time_reply_from_system_clock_has_fourteen_digits() {
    let mut engine = Engine::new(
        MemoryLink::with_input(&[b"?T\n"]),
        RecordingView::new(),
        EngineConfig::default(),
    )
    .unwrap();
    engine.tick().unwrap();

    let lines = engine.link().written_lines();
    let digits = lines[0].strip_prefix("dT").unwrap();
    assert_eq!(digits.len(), 14);
    assert!(digits.bytes().all(|b| b.is_ascii_digit()));
}

#[test]
fn led_set_updates_state_without_reply() {
    let mut engine = engine(MemoryLink::with_input(&[b"d00ff\n"]));
    engine.tick().unwrap();

    assert_eq!(engine.link().written_lines(), vec!["?S"]);
    let io = engine
        .router()
        .registry()
        .get_as::<IoScreen>(ScreenId::DEFAULT)
        .unwrap();
    assert_eq!(io.leds(), 0xff);
}

#[test]
fn request_to_inactive_screen_gets_e01() {
    let mut engine = engine(MemoryLink::with_input(&[b"dS1\n", b"?99\n"]));
    engine.tick().unwrap();
    engine.tick().unwrap();

    assert_eq!(engine.link().written_lines(), vec!["?S", "e01?99"]);
    assert_eq!(
        engine.router().view().debugs(),
        vec!["[local] request to non-active screen 9: ?99"]
    );
}

#[test]
fn version_lists_registered_screens() {
    let config = EngineConfig {
        debug: true,
        ..EngineConfig::default()
    };
    let mut engine = engine_with(MemoryLink::with_input(&[b"?V\n"]), config);
    engine.tick().unwrap();
    assert_eq!(engine.link().written_lines()[0], "dV03d012");
}

#[test]
fn version_includes_extension_screens_in_order() {
    let mut builder = ScreenRegistry::builder();
    builder
        .register(7, "extra", |id| Box::new(IoScreen::new(id)))
        .unwrap();
    let builder = builder.with_builtin_screens().unwrap();
    let registry = builder.build().unwrap();

    let mut engine = Engine::with_parts(
        MemoryLink::with_input(&[b"?V\n"]),
        registry,
        RecordingView::new(),
        fixed_clock(),
        EngineConfig::default(),
    )
    .unwrap();
    engine.tick().unwrap();
    assert_eq!(engine.link().written_lines()[0], "dV030127");
}

#[test]
fn unknown_builtin_produces_single_debug_entry() {
    let mut engine = engine(MemoryLink::with_input(&[b"dZfoo\n"]));
    engine.tick().unwrap();

    assert_eq!(engine.link().written_lines(), vec!["?S"]);
    assert_eq!(
        engine.router().view().debugs(),
        vec!["[local] unknown item in setter: dZfoo"]
    );
}

#[test]
fn repeated_switch_constructs_screen_once() {
    let built = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&built);

    let mut builder = ScreenRegistry::builder().with_builtin_screens().unwrap();
    builder
        .register(4, "counted", move |id| {
            counter.set(counter.get() + 1);
            Box::new(IoScreen::new(id))
        })
        .unwrap();
    let registry = builder.build().unwrap();

    let mut engine = Engine::with_parts(
        MemoryLink::with_input(&[b"dS4\ndS4\n"]),
        registry,
        RecordingView::new(),
        fixed_clock(),
        EngineConfig::default(),
    )
    .unwrap();
    engine.tick().unwrap();

    assert_eq!(built.get(), 1);
    assert_eq!(engine.active_screen(), id(4));
    let activations = engine
        .router()
        .view()
        .events
        .iter()
        .filter(|e| **e == ViewEvent::Activated(id(4)))
        .count();
    assert_eq!(activations, 1);
}

#[test]
fn lines_split_across_reads_are_reassembled() {
    let mut engine = engine(MemoryLink::with_input(&[b"?", b"T", b"\r", b"\n?V\n"]));
    for _ in 0..4 {
        engine.tick().unwrap();
    }
    assert_eq!(
        engine.link().written_lines(),
        vec!["?S", "dT20251231235958", "dV03012"]
    );
}

#[test]
fn short_lines_are_dropped_silently() {
    let mut engine = engine(MemoryLink::with_input(&[b"d\n\n?\r?T\n"]));
    engine.tick().unwrap();

    assert_eq!(
        engine.link().written_lines(),
        vec!["dT20251231235958", "?S"]
    );
    assert!(engine.router().view().debugs().is_empty());
}

#[test]
fn messages_are_processed_in_arrival_order() {
    let mut engine = engine(MemoryLink::with_input(&[b"dLone\ndS2\ndLtwo\n?21\ndS0\n?21\n"]));
    engine.tick().unwrap();

    assert_eq!(engine.router().view().logs(), vec!["one", "two"]);
    // The seesaw has no request items; the second request hits an inactive screen.
    assert_eq!(
        engine.link().written_lines(),
        vec!["e02?21", "e01?21", "?S"]
    );
}

#[test]
fn seesaw_samples_reach_active_screen() {
    let mut engine = engine(MemoryLink::with_input(&[b"dS2\nd261a8d8f04e20t\n"]));
    engine.tick().unwrap();

    let seesaw = engine
        .router()
        .registry()
        .get_as::<SeesawScreen>(id(2))
        .unwrap();
    let sample = seesaw.current().unwrap();
    assert!((sample.reference - 0.5).abs() < 1e-9);
    assert!(sample.boing);
}

#[test]
fn invalid_switch_is_a_configuration_error() {
    let mut engine = engine(MemoryLink::with_input(&[b"dS5\n"]));
    let err = engine.tick().unwrap_err();
    assert!(matches!(err, EngineError::UnknownScreen(s) if s == id(5)));
    assert!(!err.is_transport());
}

#[test]
fn test_mode_animates_active_screen() {
    let config = EngineConfig::default()
        .with_test_screen(id(0))
        .with_message_interval(3);
    let mut engine = engine_with(MemoryLink::default(), config);
    for _ in 0..6 {
        engine.tick().unwrap();
    }

    let io = engine
        .router()
        .registry()
        .get_as::<IoScreen>(ScreenId::DEFAULT)
        .unwrap();
    assert_eq!(io.leds(), 6);
    assert_eq!(
        engine.router().view().debugs(),
        vec![
            "[local] message 1 after 3 calls",
            "[local] message 2 after 3 calls",
        ]
    );
}

#[test]
fn peer_error_lines_are_reported() {
    let mut engine = engine(MemoryLink::with_input(&[b"e01?T\n"]));
    engine.tick().unwrap();
    assert_eq!(
        engine.router().view().debugs(),
        vec!["[local] incoming error message: e01?T"]
    );
    assert_eq!(engine.link().written_lines(), vec!["?S"]);
}

#[test]
fn longest_rejected_request_is_still_answered() {
    let request = format!("?9{}", "x".repeat(DEFAULT_MAX_LINE_LEN - 2));
    let input = format!("{request}\n");
    let mut engine = engine(MemoryLink::with_input(&[input.as_bytes()]));

    let report = engine.tick().unwrap();
    assert_eq!(report.received, 1);
    assert_eq!(
        engine.link().written_lines(),
        vec![format!("e01{request}"), "?S".to_string()]
    );
}

#[test]
fn longest_unknown_io_item_is_still_echoed() {
    let set = format!("d0q{}", "x".repeat(DEFAULT_MAX_LINE_LEN - 3));
    let input = format!("{set}\n");
    let mut engine = engine(MemoryLink::with_input(&[input.as_bytes()]));

    engine.tick().unwrap();
    assert_eq!(
        engine.link().written_lines(),
        vec![format!("e02{set}:2"), "?S".to_string()]
    );
}

#[test]
fn overlong_line_leaves_a_debug_entry() {
    let input = format!("dL{}\n?T\n", "x".repeat(DEFAULT_MAX_LINE_LEN + 10));
    let mut engine = engine(MemoryLink::with_input(&[input.as_bytes()]));

    let report = engine.tick().unwrap();
    assert_eq!(report.received, 1);
    assert_eq!(
        engine.router().view().debugs(),
        vec![format!(
            "[local] discarded over-long line (more than {DEFAULT_MAX_LINE_LEN} bytes)"
        )]
    );
    assert_eq!(engine.link().written_lines(), vec!["dT20251231235958", "?S"]);
    assert!(engine.router().view().logs().is_empty());
}
