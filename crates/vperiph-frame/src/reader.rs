use bytes::BytesMut;
use tracing::{debug, trace};
use vperiph_transport::Link;

use crate::codec::{FrameConfig, Line, LineFramer};
use crate::error::Result;

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Pulls whatever a link has pending and turns it into complete lines.
///
/// Partial lines stay buffered in the framer until a later poll completes them.
#[derive(Debug)]
pub struct LineReader {
    framer: LineFramer,
    scratch: BytesMut,
}

impl Default for LineReader {
    fn default() -> Self {
        Self::new()
    }
}

impl LineReader {
    /// Create a line reader with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create a line reader with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            framer: LineFramer::with_config(config),
            scratch: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Drain all currently available input and return the completed lines.
    ///
    /// Returns an empty vector when nothing (or only a partial line) arrived.
    pub fn poll<L: Link + ?Sized>(&mut self, link: &mut L) -> Result<Vec<Line>> {
        self.scratch.clear();
        let read = link.read_available(&mut self.scratch)?;
        if read == 0 {
            return Ok(Vec::new());
        }
        trace!(bytes = read, "read from link");

        let lines = self.framer.push(&self.scratch);
        for line in &lines {
            debug!("> {line}");
        }
        Ok(lines)
    }

    /// Number of over-long lines dropped since the last call.
    ///
    /// Such lines never reach the caller as [`Line`]s, so this is the only
    /// trace they leave.
    pub fn take_discarded(&mut self) -> usize {
        self.framer.take_discarded()
    }

    /// Borrow the framer, e.g. to inspect pending bytes.
    pub fn framer(&self) -> &LineFramer {
        &self.framer
    }
}
