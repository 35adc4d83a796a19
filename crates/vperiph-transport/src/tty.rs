use std::fs::OpenOptions;
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Result, TransportError};
use crate::traits::SerialLink;

/// Line speeds understood by the target firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Baud {
    #[default]
    B9600,
    B19200,
    B38400,
    B115200,
}

impl Baud {
    /// All supported rates, slowest first.
    pub const ALL: [Baud; 4] = [Baud::B9600, Baud::B19200, Baud::B38400, Baud::B115200];

    /// Bits per second.
    pub fn bits_per_second(self) -> u32 {
        match self {
            Baud::B9600 => 9600,
            Baud::B19200 => 19200,
            Baud::B38400 => 38400,
            Baud::B115200 => 115200,
        }
    }

    fn speed(self) -> libc::speed_t {
        match self {
            Baud::B9600 => libc::B9600,
            Baud::B19200 => libc::B19200,
            Baud::B38400 => libc::B38400,
            Baud::B115200 => libc::B115200,
        }
    }
}

impl TryFrom<u32> for Baud {
    type Error = TransportError;

    fn try_from(value: u32) -> Result<Self> {
        Baud::ALL
            .into_iter()
            .find(|baud| baud.bits_per_second() == value)
            .ok_or(TransportError::UnsupportedBaud(value))
    }
}

impl std::fmt::Display for Baud {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.bits_per_second())
    }
}

/// Serial device settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttyACM0`.
    pub path: PathBuf,
    /// Line speed. 8N1 framing is always used.
    pub baud: Baud,
}

impl SerialConfig {
    pub fn new(path: impl AsRef<Path>, baud: Baud) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            baud,
        }
    }
}

impl SerialLink {
    /// Open a tty device in raw, non-blocking mode.
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK)
            .open(&config.path)
            .map_err(|e| TransportError::Open {
                path: config.path.clone(),
                source: e,
            })?;

        configure_raw(file.as_raw_fd(), config.baud).map_err(|e| TransportError::Configure {
            path: config.path.clone(),
            source: e,
        })?;

        let label = format!("{}@{}", config.path.display(), config.baud);
        info!(link = %label, "opened serial device");
        Ok(SerialLink::from_tty(file, label))
    }
}

fn configure_raw(fd: libc::c_int, baud: Baud) -> std::io::Result<()> {
    // SAFETY: termios is a plain C struct; an all-zero value is a valid
    // starting point that tcgetattr fully overwrites.
    let mut tio: libc::termios = unsafe { std::mem::zeroed() };

    // SAFETY: `fd` is an open descriptor owned by the caller and `tio` is a
    // valid writable termios.
    if unsafe { libc::tcgetattr(fd, &mut tio) } != 0 {
        return Err(std::io::Error::last_os_error());
    }

    // SAFETY: `tio` was initialised by tcgetattr above.
    unsafe { libc::cfmakeraw(&mut tio) };
    tio.c_cflag |= libc::CLOCAL | libc::CREAD;
    tio.c_cc[libc::VMIN] = 0;
    tio.c_cc[libc::VTIME] = 0;

    // SAFETY: `tio` is a valid termios and the speed constant comes from libc.
    let rc = unsafe {
        libc::cfsetispeed(&mut tio, baud.speed()) | libc::cfsetospeed(&mut tio, baud.speed())
    };
    if rc != 0 {
        return Err(std::io::Error::last_os_error());
    }

    // SAFETY: `fd` is open and `tio` is fully initialised.
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &tio) } != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baud_from_supported_rates() {
        assert_eq!(Baud::try_from(9600).unwrap(), Baud::B9600);
        assert_eq!(Baud::try_from(115200).unwrap(), Baud::B115200);
        assert_eq!(Baud::default(), Baud::B9600);
        assert_eq!(Baud::B38400.to_string(), "38400");
    }

    #[test]
    fn baud_rejects_unsupported_rate() {
        let err = Baud::try_from(57600).unwrap_err();
        assert!(matches!(err, TransportError::UnsupportedBaud(57600)));
    }

    #[test]
    fn open_missing_device_fails() {
        let config = SerialConfig::new("/dev/vperiph-does-not-exist", Baud::B9600);
        let err = SerialLink::open(&config).unwrap_err();
        assert!(matches!(err, TransportError::Open { .. }));
    }

    #[test]
    fn open_regular_file_fails_to_configure() {
        let path = std::env::temp_dir().join(format!("vperiph-not-a-tty-{}", std::process::id()));
        std::fs::write(&path, b"").unwrap();

        let err = SerialLink::open(&SerialConfig::new(&path, Baud::B9600)).unwrap_err();
        assert!(matches!(err, TransportError::Configure { .. }));

        let _ = std::fs::remove_file(&path);
    }
}
