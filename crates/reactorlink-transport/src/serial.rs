//! Raw serial device links.
//!
//! Opens a tty character device and configures it for 8N1 raw mode at the
//! requested baud rate. The read timeout maps onto termios `VTIME`
//! (tenths of a second, `VMIN = 0`), which is how the link I/O loop gets
//! its short bounded reads.

use std::fs::OpenOptions;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::time::Duration;

use tracing::info;

use crate::error::{Result, TransportError};
use crate::stream::LinkStream;

/// Serial device link endpoint.
pub struct SerialLink;

impl SerialLink {
    /// Default baud rate for reactor links.
    pub const DEFAULT_BAUD: u32 = 115_200;

    /// Open a serial device and configure raw 8N1 mode at `baud`.
    pub fn open(path: impl AsRef<Path>, baud: u32) -> Result<LinkStream> {
        let path = path.as_ref();
        let speed = baud_constant(baud)?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY)
            .open(path)
            .map_err(|e| TransportError::Open {
                path: path.to_path_buf(),
                source: e,
            })?;

        configure_raw(&file, speed, None)?;
        info!(?path, baud, "opened serial link");

        Ok(LinkStream::from_serial(file))
    }
}

/// Apply a read timeout to an already-open serial device.
///
/// `None` blocks until at least one byte arrives; `Some` rounds up to the
/// nearest tenth of a second (VTIME granularity, capped at 25.5 s).
pub(crate) fn set_read_timeout(file: &std::fs::File, timeout: Option<Duration>) -> Result<()> {
    let mut tio = get_termios(file)?;
    apply_timeout(&mut tio, timeout);
    set_termios(file, &tio)
}

fn baud_constant(baud: u32) -> Result<libc::speed_t> {
    let speed = match baud {
        9_600 => libc::B9600,
        19_200 => libc::B19200,
        38_400 => libc::B38400,
        57_600 => libc::B57600,
        115_200 => libc::B115200,
        230_400 => libc::B230400,
        _ => return Err(TransportError::UnsupportedBaud(baud)),
    };
    Ok(speed)
}

fn get_termios(file: &std::fs::File) -> Result<libc::termios> {
    let fd = file.as_raw_fd();
    let mut tio = unsafe { std::mem::zeroed::<libc::termios>() };
    // SAFETY: `tio` is a valid writable termios struct and `fd` is an open
    // descriptor owned by `file`.
    let rc = unsafe { libc::tcgetattr(fd, &mut tio) };
    if rc != 0 {
        return Err(TransportError::Io(std::io::Error::last_os_error()));
    }
    Ok(tio)
}

fn set_termios(file: &std::fs::File, tio: &libc::termios) -> Result<()> {
    let fd = file.as_raw_fd();
    // SAFETY: `tio` is a fully-initialized termios struct and `fd` is an
    // open descriptor owned by `file`.
    let rc = unsafe { libc::tcsetattr(fd, libc::TCSANOW, tio) };
    if rc != 0 {
        return Err(TransportError::Io(std::io::Error::last_os_error()));
    }
    Ok(())
}

fn apply_timeout(tio: &mut libc::termios, timeout: Option<Duration>) {
    match timeout {
        Some(timeout) => {
            let deciseconds = timeout.as_millis().div_ceil(100).clamp(1, 255);
            tio.c_cc[libc::VMIN] = 0;
            tio.c_cc[libc::VTIME] = deciseconds as libc::cc_t;
        }
        None => {
            tio.c_cc[libc::VMIN] = 1;
            tio.c_cc[libc::VTIME] = 0;
        }
    }
}

fn configure_raw(
    file: &std::fs::File,
    speed: libc::speed_t,
    timeout: Option<Duration>,
) -> Result<()> {
    let mut tio = get_termios(file)?;

    // Raw mode: no echo, no canonical line handling, no signal chars,
    // no flow control, no output post-processing.
    tio.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);
    tio.c_oflag &= !libc::OPOST;
    tio.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);

    // 8N1, receiver enabled, modem control lines ignored.
    tio.c_cflag &= !(libc::CSIZE | libc::PARENB | libc::CSTOPB);
    tio.c_cflag |= libc::CS8 | libc::CREAD | libc::CLOCAL;

    apply_timeout(&mut tio, timeout);

    // SAFETY: `tio` is a valid termios struct obtained from tcgetattr.
    unsafe {
        libc::cfsetispeed(&mut tio, speed);
        libc::cfsetospeed(&mut tio, speed);
    }

    set_termios(file, &tio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unsupported_baud() {
        let result = SerialLink::open("/dev/null", 1234);
        assert!(matches!(result, Err(TransportError::UnsupportedBaud(1234))));
    }

    #[test]
    fn open_missing_device_fails() {
        let result = SerialLink::open("/dev/reactorlink-does-not-exist", 115_200);
        assert!(matches!(result, Err(TransportError::Open { .. })));
    }

    #[test]
    fn timeout_rounds_to_deciseconds() {
        let mut tio = unsafe { std::mem::zeroed::<libc::termios>() };

        apply_timeout(&mut tio, Some(Duration::from_millis(50)));
        assert_eq!(tio.c_cc[libc::VMIN], 0);
        assert_eq!(tio.c_cc[libc::VTIME], 1);

        apply_timeout(&mut tio, Some(Duration::from_secs(60)));
        assert_eq!(tio.c_cc[libc::VTIME], 255);

        apply_timeout(&mut tio, None);
        assert_eq!(tio.c_cc[libc::VMIN], 1);
        assert_eq!(tio.c_cc[libc::VTIME], 0);
    }
}
