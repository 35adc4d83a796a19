use bytes::{BufMut, BytesMut};
use tracing::warn;

use crate::error::{FrameError, Result};

/// Terminator appended to every outgoing line.
pub const LINE_TERMINATOR: u8 = b'\n';

/// Shortest inbound line that is treated as a message.
pub const MIN_LINE_LEN: usize = 2;

/// Default cap on a single inbound or outbound line.
pub const DEFAULT_MAX_LINE_LEN: usize = 1024;

fn is_delimiter(byte: u8) -> bool {
    byte == b'\n' || byte == b'\r'
}

/// One complete protocol line, without its delimiter.
///
/// Lines are always ASCII: the framer drops any byte outside that range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Line(String);

impl Line {
    /// The line text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for framed lines; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the line and return its text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Line {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Configuration for line framing.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum line length in bytes. Default: 1024.
    pub max_line_len: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }
}

/// Splits an inbound byte stream into lines.
///
/// Either `\n` or `\r` ends a line, so `\r\n` produces one line followed by
/// an empty (dropped) one. The buffer is reset on every delimiter, even when
/// the pending text is too short to be a message.
#[derive(Debug)]
pub struct LineFramer {
    buf: BytesMut,
    config: FrameConfig,
    discarding: bool,
    discarded: usize,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineFramer {
    /// Create a framer with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create a framer with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(64),
            config,
            discarding: false,
            discarded: 0,
        }
    }

    /// Feed a single byte, returning a line if it completed one.
    pub fn feed(&mut self, byte: u8) -> Option<Line> {
        if is_delimiter(byte) {
            let discarded = std::mem::take(&mut self.discarding);
            let pending = self.buf.split();
            if discarded || pending.len() < MIN_LINE_LEN {
                return None;
            }
            return Some(Line(pending.iter().map(|&b| char::from(b)).collect()));
        }

        if !byte.is_ascii() || self.discarding {
            return None;
        }

        if self.buf.len() >= self.config.max_line_len {
            warn!(
                max = self.config.max_line_len,
                "inbound line too long, discarding until next delimiter"
            );
            self.buf.clear();
            self.discarding = true;
            self.discarded += 1;
            return None;
        }

        self.buf.put_u8(byte);
        None
    }

    /// Feed a chunk of bytes, returning every line it completed, in order.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Line> {
        bytes.iter().filter_map(|&b| self.feed(b)).collect()
    }

    /// Bytes received since the last delimiter.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }

    /// Number of over-long lines discarded since the last call.
    pub fn take_discarded(&mut self) -> usize {
        std::mem::take(&mut self.discarded)
    }

    /// Drop any partial line.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.discarding = false;
    }

    /// Current framer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

/// Encode one outgoing line into `dst`, appending the terminator.
pub fn encode_line(text: &str, max_line_len: usize, dst: &mut BytesMut) -> Result<()> {
    if text.bytes().any(is_delimiter) {
        return Err(FrameError::EmbeddedDelimiter(text.to_string()));
    }
    if text.len() > max_line_len {
        return Err(FrameError::LineTooLong {
            size: text.len(),
            max: max_line_len,
        });
    }
    dst.reserve(text.len() + 1);
    dst.put_slice(text.as_bytes());
    dst.put_u8(LINE_TERMINATOR);
    Ok(())
}
