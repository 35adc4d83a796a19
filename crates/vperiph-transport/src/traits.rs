use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use bytes::BytesMut;
use tracing::debug;

use crate::error::{Result, TransportError};

const READ_CHUNK_SIZE: usize = 1024;

/// A byte link to the microcontroller.
///
/// Both directions are best effort and must never wait for the peer:
/// absence of input is not an error, it is simply a read of zero bytes.
pub trait Link {
    /// Append every byte that is available right now to `dst`.
    ///
    /// Returns the number of bytes appended; `0` means nothing is pending.
    fn read_available(&mut self, dst: &mut BytesMut) -> Result<usize>;

    /// Write all of `data` to the link.
    fn write_all(&mut self, data: &[u8]) -> Result<()>;

    /// Human-readable description used in logs.
    fn describe(&self) -> String;
}

impl<L: Link + ?Sized> Link for &mut L {
    fn read_available(&mut self, dst: &mut BytesMut) -> Result<usize> {
        (**self).read_available(dst)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        (**self).write_all(data)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<L: Link + ?Sized> Link for Box<L> {
    fn read_available(&mut self, dst: &mut BytesMut) -> Result<usize> {
        (**self).read_available(dst)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        (**self).write_all(data)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// The concrete link used by the application.
///
/// On Unix this wraps either a raw-mode tty device or a unix socket.
/// The null variant is used for dry runs without hardware.
pub struct SerialLink {
    inner: SerialLinkInner,
    label: String,
}

enum SerialLinkInner {
    #[cfg(unix)]
    Tty(std::fs::File),
    #[cfg(unix)]
    Socket(std::os::unix::net::UnixStream),
    Null,
}

impl SerialLink {
    /// A link that never yields input and discards all output.
    pub fn dry_run() -> Self {
        Self {
            inner: SerialLinkInner::Null,
            label: "dry run (no serial interface)".to_string(),
        }
    }

    /// Wrap an already configured tty device.
    #[cfg(unix)]
    pub(crate) fn from_tty(file: std::fs::File, label: String) -> Self {
        Self {
            inner: SerialLinkInner::Tty(file),
            label,
        }
    }

    /// Connect to a unix socket that speaks the line protocol.
    #[cfg(unix)]
    pub fn connect_socket(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let stream =
            std::os::unix::net::UnixStream::connect(path).map_err(|e| TransportError::Connect {
                path: path.to_path_buf(),
                source: e,
            })?;
        Self::from_socket(stream, format!("socket {}", path.display()))
    }

    /// Wrap a connected unix stream, switching it to non-blocking mode.
    #[cfg(unix)]
    pub fn from_socket(stream: std::os::unix::net::UnixStream, label: String) -> Result<Self> {
        stream.set_nonblocking(true)?;
        debug!(%label, "using socket link");
        Ok(Self {
            inner: SerialLinkInner::Socket(stream),
            label,
        })
    }

    /// Whether this link is the dry-run null link.
    pub fn is_dry_run(&self) -> bool {
        matches!(self.inner, SerialLinkInner::Null)
    }
}

impl Link for SerialLink {
    fn read_available(&mut self, dst: &mut BytesMut) -> Result<usize> {
        match &mut self.inner {
            #[cfg(unix)]
            SerialLinkInner::Tty(file) => drain(file, dst, false),
            #[cfg(unix)]
            SerialLinkInner::Socket(stream) => drain(stream, dst, true),
            SerialLinkInner::Null => Ok(0),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        match &mut self.inner {
            #[cfg(unix)]
            SerialLinkInner::Tty(file) => write_fully(file, data),
            #[cfg(unix)]
            SerialLinkInner::Socket(stream) => write_fully(stream, data),
            SerialLinkInner::Null => {
                debug!(len = data.len(), "dry run, discarding output");
                Ok(())
            }
        }
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

impl std::fmt::Debug for SerialLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.inner {
            #[cfg(unix)]
            SerialLinkInner::Tty(_) => "tty",
            #[cfg(unix)]
            SerialLinkInner::Socket(_) => "socket",
            SerialLinkInner::Null => "null",
        };
        f.debug_struct("SerialLink")
            .field("type", &kind)
            .field("label", &self.label)
            .finish()
    }
}

/// Read until the source reports that nothing more is pending.
///
/// For a non-blocking tty a zero-length read means "no data"; for a socket
/// it means the peer hung up.
fn drain<R: Read>(reader: &mut R, dst: &mut BytesMut, eof_is_close: bool) -> Result<usize> {
    let mut total = 0usize;
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    loop {
        match reader.read(&mut chunk) {
            Ok(0) if eof_is_close && total == 0 => return Err(TransportError::Disconnected),
            Ok(0) => return Ok(total),
            Ok(n) => {
                dst.extend_from_slice(&chunk[..n]);
                total += n;
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(total),
            Err(err) => return Err(TransportError::Io(err)),
        }
    }
}

/// Write all of `data` without waiting for the peer.
///
/// A link that would block is reported as stalled instead of retried.
fn write_fully<W: Write>(writer: &mut W, data: &[u8]) -> Result<()> {
    let mut offset = 0usize;
    while offset < data.len() {
        match writer.write(&data[offset..]) {
            Ok(0) => return Err(TransportError::Disconnected),
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == ErrorKind::WouldBlock => {
                return Err(TransportError::WriteStalled {
                    written: offset,
                    len: data.len(),
                })
            }
            Err(err) => return Err(TransportError::Io(err)),
        }
    }

    loop {
        match writer.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == ErrorKind::WouldBlock => {
                return Err(TransportError::WriteStalled {
                    written: offset,
                    len: data.len(),
                })
            }
            Err(err) => return Err(TransportError::Io(err)),
        }
    }
}
