use bytes::BytesMut;
use tracing::debug;
use vperiph_transport::Link;

use crate::codec::{encode_line, FrameConfig};
use crate::error::Result;

const INITIAL_BUFFER_CAPACITY: usize = 256;

/// Writes newline-terminated lines to a link.
#[derive(Debug)]
pub struct LineWriter {
    buf: BytesMut,
    config: FrameConfig,
}

impl Default for LineWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl LineWriter {
    /// Create a line writer with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create a line writer with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Frame `text` and write it to the link.
    pub fn send<L: Link + ?Sized>(&mut self, link: &mut L, text: &str) -> Result<()> {
        self.buf.clear();
        encode_line(text, self.config.max_line_len, &mut self.buf)?;
        debug!("< {text}");
        link.write_all(&self.buf)?;
        Ok(())
    }

    /// Current line writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use vperiph_transport::TransportError;

    use super::*;
    use crate::error::FrameError;

    #[derive(Default)]
    struct CaptureLink {
        written: Vec<u8>,
        broken: bool,
    }

    impl Link for CaptureLink {
        fn read_available(
            &mut self,
            _dst: &mut BytesMut,
        ) -> vperiph_transport::Result<usize> {
            Ok(0)
        }

        fn write_all(&mut self, data: &[u8]) -> vperiph_transport::Result<()> {
            if self.broken {
                return Err(TransportError::Io(std::io::Error::from(
                    std::io::ErrorKind::BrokenPipe,
                )));
            }
            self.written.extend_from_slice(data);
            Ok(())
        }

        fn describe(&self) -> String {
            "capture".to_string()
        }
    }

    #[test]
    fn send_appends_single_newline() {
        let mut link = CaptureLink::default();
        let mut writer = LineWriter::new();

        writer.send(&mut link, "?S").unwrap();
        writer.send(&mut link, "dV03012").unwrap();

        assert_eq!(link.written, b"?S\ndV03012\n");
    }

    #[test]
    fn send_rejects_embedded_newline_without_writing() {
        let mut link = CaptureLink::default();
        let mut writer = LineWriter::new();

        let err = writer.send(&mut link, "dLone\ntwo").unwrap_err();
        assert!(matches!(err, FrameError::EmbeddedDelimiter(_)));
        assert!(link.written.is_empty());
    }

    #[test]
    fn send_propagates_write_failure() {
        let mut link = CaptureLink {
            broken: true,
            ..CaptureLink::default()
        };
        let mut writer = LineWriter::new();

        let err = writer.send(&mut link, "?S").unwrap_err();
        assert!(matches!(err, FrameError::Transport(TransportError::Io(_))));
    }
}
