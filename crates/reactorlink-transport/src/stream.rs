use std::io::{Read, Write};

use crate::error::Result;

/// A connected link stream — implements Read + Write.
///
/// This is the fundamental I/O type returned by transport operations.
/// It wraps either a Unix domain socket stream (loopback/bench links) or
/// an opened serial character device (real hardware links).
pub struct LinkStream {
    inner: LinkStreamInner,
}

enum LinkStreamInner {
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
    #[cfg(unix)]
    Serial(std::fs::File),
}

impl Read for LinkStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.read(buf),
            #[cfg(unix)]
            LinkStreamInner::Serial(file) => file.read(buf),
        }
    }
}

impl Write for LinkStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.write(buf),
            #[cfg(unix)]
            LinkStreamInner::Serial(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.flush(),
            #[cfg(unix)]
            LinkStreamInner::Serial(file) => file.flush(),
        }
    }
}

impl LinkStream {
    /// Create a LinkStream from a Unix domain socket stream.
    #[cfg(unix)]
    pub(crate) fn from_unix(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: LinkStreamInner::Unix(stream),
        }
    }

    /// Create a LinkStream from an already-configured serial device.
    #[cfg(unix)]
    pub(crate) fn from_serial(file: std::fs::File) -> Self {
        Self {
            inner: LinkStreamInner::Serial(file),
        }
    }

    /// Set read timeout on the underlying stream.
    ///
    /// Serial devices round the timeout to tenths of a second (termios
    /// VTIME granularity); `None` means block until at least one byte.
    pub fn set_read_timeout(&self, timeout: Option<std::time::Duration>) -> Result<()> {
        match &self.inner {
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
            #[cfg(unix)]
            LinkStreamInner::Serial(file) => crate::serial::set_read_timeout(file, timeout),
        }
    }

    /// Set write timeout on the underlying stream.
    ///
    /// Serial devices have no write timeout; the call is a no-op for them.
    pub fn set_write_timeout(&self, timeout: Option<std::time::Duration>) -> Result<()> {
        match &self.inner {
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
            #[cfg(unix)]
            LinkStreamInner::Serial(_) => Ok(()),
        }
    }

    /// Try to clone this stream (creates a new file descriptor).
    ///
    /// The link I/O loop uses the clone to hold separate read and write
    /// halves of the same link.
    pub fn try_clone(&self) -> Result<Self> {
        match &self.inner {
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => {
                let cloned = stream.try_clone()?;
                Ok(Self::from_unix(cloned))
            }
            #[cfg(unix)]
            LinkStreamInner::Serial(file) => {
                let cloned = file.try_clone()?;
                Ok(Self::from_serial(cloned))
            }
        }
    }
}

impl std::fmt::Debug for LinkStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            #[cfg(unix)]
            LinkStreamInner::Unix(_) => f.debug_struct("LinkStream").field("type", &"unix").finish(),
            #[cfg(unix)]
            LinkStreamInner::Serial(_) => f
                .debug_struct("LinkStream")
                .field("type", &"serial")
                .finish(),
        }
    }
}
