use crate::message::ScreenId;

/// Errors that stop the engine.
///
/// Message-level problems never show up here; the router reports those on
/// the debug channel and keeps going.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Line framing or the link underneath it failed.
    #[error("frame error: {0}")]
    Frame(#[from] vperiph_frame::FrameError),

    /// The link failed outside of framing.
    #[error("transport error: {0}")]
    Transport(#[from] vperiph_transport::TransportError),

    /// A screen switch named something that is not a screen digit.
    #[error("invalid screen id: {0:?}")]
    InvalidScreen(String),

    /// A screen switch or test target named a screen that is not registered.
    #[error("screen {0} is not registered")]
    UnknownScreen(ScreenId),

    /// A screen id outside 0-9.
    #[error("screen id {0} out of range (0-9)")]
    ScreenIdOutOfRange(u8),

    /// Two handlers claimed the same screen id.
    #[error("screen {0} registered twice")]
    DuplicateScreen(ScreenId),

    /// Screen 0 must always be present.
    #[error("screen 0 is mandatory but was not registered")]
    MissingDefaultScreen,
}

impl EngineError {
    /// Whether the error came from the link rather than from configuration.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            EngineError::Transport(_)
                | EngineError::Frame(vperiph_frame::FrameError::Transport(_))
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors a screen reports for a single message.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScreenError {
    /// The item code after the screen digit is not handled by this screen.
    #[error("unknown item {0:?}")]
    UnknownItem(Option<char>),

    /// The data part has the wrong size.
    #[error("expected {expected} characters of data, got {actual}")]
    Length { expected: usize, actual: usize },

    /// The data part could not be decoded.
    #[error("cannot decode {0:?}")]
    Decode(String),
}
