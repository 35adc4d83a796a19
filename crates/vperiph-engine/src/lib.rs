//! Message protocol engine for virtual peripherals.
//!
//! A microcontroller talks to the desktop over a serial link using short
//! text lines. This crate classifies those lines, routes them to built-in
//! handlers or to numbered screens, answers requests, and drives the
//! non-blocking read/write loop that ties it all together.

pub mod builtin;
pub mod clock;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod message;
pub mod outbox;
pub mod registry;
pub mod router;
pub mod screen;
pub mod screens;
pub mod view;

pub use builtin::{BuiltinRequestCode, BuiltinSetCode};
pub use clock::{Clock, FixedClock, SystemClock, TIME_FORMAT};
pub use config::EngineConfig;
pub use engine::{Engine, LoopState, TickReport, ACTIVE_SCREEN_QUERY, REPLY_OVERHEAD};
pub use error::{EngineError, Result, ScreenError};
pub use message::{Message, MessageKind, ScreenId, Target};
pub use outbox::Outbox;
pub use registry::{ScreenRegistry, ScreenRegistryBuilder};
pub use router::{Router, ROUTING_ERROR_CODE, VERSION_CODE};
pub use screen::{Screen, ScreenMessage, TestContext};
pub use view::{RecordingView, View, ViewEvent};
