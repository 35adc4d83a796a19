use std::fmt;
use std::io;

use vperiph_engine::EngineError;
use vperiph_frame::FrameError;
use vperiph_transport::TransportError;

// Exit codes follow sysexits where one fits.
pub const SUCCESS: i32 = 0;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const USAGE: i32 = 64;
pub const CONFIG: i32 = 78;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        _ => TRANSPORT_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Open { ref source, .. } | TransportError::Connect { ref source, .. }
            if source.kind() == io::ErrorKind::PermissionDenied =>
        {
            CliError::new(PERMISSION_DENIED, format!("{context}: {err}"))
        }
        TransportError::Io(source) => io_error(context, source),
        TransportError::UnsupportedBaud(_) => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Transport(err) => transport_error(context, err),
        FrameError::EmbeddedDelimiter(_) | FrameError::LineTooLong { .. } => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
    }
}

pub fn engine_error(context: &str, err: EngineError) -> CliError {
    match err {
        EngineError::Transport(err) => transport_error(context, err),
        EngineError::Frame(err) => frame_error(context, err),
        EngineError::InvalidScreen(_)
        | EngineError::UnknownScreen(_)
        | EngineError::ScreenIdOutOfRange(_)
        | EngineError::DuplicateScreen(_)
        | EngineError::MissingDefaultScreen => CliError::new(CONFIG, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use vperiph_engine::ScreenId;

    use super::*;

    #[test]
    fn transport_faults_map_to_transport_code() {
        let err = transport_error("read failed", TransportError::Disconnected);
        assert_eq!(err.code, TRANSPORT_ERROR);
        assert!(err.message.starts_with("read failed: "));

        let err = frame_error("read failed", FrameError::Transport(TransportError::Disconnected));
        assert_eq!(err.code, TRANSPORT_ERROR);

        let stalled = TransportError::WriteStalled { written: 0, len: 3 };
        assert_eq!(transport_error("write failed", stalled).code, TRANSPORT_ERROR);
    }

    #[test]
    fn permission_denied_is_reported_separately() {
        let err = transport_error(
            "open failed",
            TransportError::Open {
                path: "/dev/ttyS0".into(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            },
        );
        assert_eq!(err.code, PERMISSION_DENIED);
    }

    #[test]
    fn bad_input_is_usage() {
        assert_eq!(
            transport_error("open failed", TransportError::UnsupportedBaud(1234)).code,
            USAGE
        );
        assert_eq!(
            frame_error("send failed", FrameError::EmbeddedDelimiter("a\nb".into())).code,
            USAGE
        );
    }

    #[test]
    fn screen_problems_are_configuration_errors() {
        let id = ScreenId::new(5).unwrap();
        assert_eq!(engine_error("loop", EngineError::UnknownScreen(id)).code, CONFIG);
        assert_eq!(
            engine_error("loop", EngineError::InvalidScreen("x".into())).code,
            CONFIG
        );
        assert_eq!(
            engine_error("loop", EngineError::Transport(TransportError::Disconnected)).code,
            TRANSPORT_ERROR
        );
    }
}
