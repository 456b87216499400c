use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use reactorlink_transport::LinkStream;

use crate::codec::{Frame, FrameConfig, FrameDecoder};
use crate::error::{FrameError, Result};

const READ_CHUNK_SIZE: usize = 256;

/// Reads complete frames from any `Read` stream.
///
/// Handles partial reads internally — callers always get complete frames.
/// Corrupt bytes are consumed by the decoder's resynchronization and never
/// surface as errors.
pub struct FrameReader<T> {
    inner: T,
    decoder: FrameDecoder,
    pending: VecDeque<Frame>,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            decoder: FrameDecoder::new(),
            pending: VecDeque::new(),
            config,
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = self.pending.pop_front() {
                return Ok(frame);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.pending.extend(self.decoder.feed(&chunk[..read]));
        }
    }

    /// Perform one read and return whatever frames it completed.
    ///
    /// With a read timeout set on the stream this is the link loop's
    /// bounded poll: a timed-out read yields an empty vec rather than an
    /// error. EOF still reports `ConnectionClosed`.
    pub fn poll_frames(&mut self) -> Result<Vec<Frame>> {
        let mut frames: Vec<Frame> = self.pending.drain(..).collect();

        let mut chunk = [0u8; READ_CHUNK_SIZE];
        match self.inner.read(&mut chunk) {
            Ok(0) => {
                if frames.is_empty() {
                    return Err(FrameError::ConnectionClosed);
                }
            }
            Ok(n) => frames.extend(self.decoder.feed(&chunk[..n])),
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut
                ) => {}
            Err(err) => return Err(FrameError::Io(err)),
        }

        Ok(frames)
    }

    /// Receive-path counters from the underlying decoder.
    pub fn stats(&self) -> crate::codec::DecoderStats {
        self.decoder.stats()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameReader<LinkStream> {
    /// Create a frame reader for a `LinkStream` and apply the read timeout
    /// from config.
    pub fn with_config_link(inner: LinkStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

fn transport_to_frame_error(err: reactorlink_transport::TransportError) -> FrameError {
    match err {
        reactorlink_transport::TransportError::Io(io)
        | reactorlink_transport::TransportError::Accept(io) => FrameError::Io(io),
        reactorlink_transport::TransportError::Bind { source, .. }
        | reactorlink_transport::TransportError::Connect { source, .. }
        | reactorlink_transport::TransportError::Open { source, .. } => FrameError::Io(source),
        other => FrameError::Io(std::io::Error::other(other.to_string())),
    }
}
