use std::path::PathBuf;

/// Errors that can occur on the serial link.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the serial device.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to put the serial device into raw mode or set its speed.
    #[error("failed to configure {path}: {source}")]
    Configure {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to connect to a socket-backed link.
    #[error("failed to connect to {path}: {source}")]
    Connect {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The requested baud rate is not supported.
    #[error("unsupported baud rate {0} (expected 9600, 19200, 38400 or 115200)")]
    UnsupportedBaud(u32),

    /// An I/O error occurred while reading or writing the link.
    #[error("link I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The link could not take more output without blocking.
    #[error("link stalled after writing {written} of {len} bytes")]
    WriteStalled { written: usize, len: usize },

    /// The remote end closed the link.
    #[error("link closed by peer")]
    Disconnected,
}

pub type Result<T> = std::result::Result<T, TransportError>;
