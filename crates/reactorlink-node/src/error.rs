use reactorlink_frame::FrameError;
use reactorlink_transport::TransportError;

/// Result alias for node runtime operations.
pub type Result<T> = std::result::Result<T, NodeError>;

/// Errors surfaced by the node runtime loops.
///
/// Corrupt frames and malformed payloads never appear here. Those are
/// recovered in place (decoder resynchronization, discard-and-log). A
/// `NodeError` means a loop cannot continue.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Frame(#[from] FrameError),
}
