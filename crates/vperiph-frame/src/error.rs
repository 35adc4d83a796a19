use vperiph_transport::TransportError;

/// Errors that can occur while framing lines.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Outgoing text contains a line delimiter and would split into two messages.
    #[error("outgoing message contains a line delimiter: {0:?}")]
    EmbeddedDelimiter(String),

    /// Outgoing text exceeds the configured maximum line length.
    #[error("outgoing message too long ({size} bytes, max {max})")]
    LineTooLong { size: usize, max: usize },

    /// The underlying link failed.
    #[error("link error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, FrameError>;
