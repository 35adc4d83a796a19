//! Line framing for the vperiph serial protocol.
//!
//! Every message on the wire is a short ASCII line:
//! - Inbound lines end with `\n` or `\r` (either one terminates a line)
//! - Lines shorter than two characters are line noise and are dropped
//! - Outbound lines are always terminated with a single `\n`
//!
//! Callers get whole lines; partial input stays buffered across polls.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    encode_line, FrameConfig, Line, LineFramer, DEFAULT_MAX_LINE_LEN, LINE_TERMINATOR,
    MIN_LINE_LEN,
};
pub use error::{FrameError, Result};
pub use reader::LineReader;
pub use writer::LineWriter;
