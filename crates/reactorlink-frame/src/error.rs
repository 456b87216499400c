/// Errors that can occur during frame encoding or stream I/O.
///
/// Corruption on the receive path (checksum mismatch, oversized length
/// byte) is recovered locally by the decoder and never surfaces here; the
/// decoder counts those events in its stats instead.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload exceeds the wire format's 64-byte limit.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The link was closed before a complete frame was received.
    #[error("link closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
