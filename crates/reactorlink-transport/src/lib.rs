//! Point-to-point link streams for reactorlink.
//!
//! A controller node and an agent node talk over exactly one byte stream.
//! In production that stream is a serial character device; for loopback
//! testing and development it is a Unix domain socket. Both are exposed as
//! [`LinkStream`], a `Read + Write` stream with per-direction timeouts.

pub mod error;
pub mod serial;
pub mod stream;
pub mod uds;

pub use error::{Result, TransportError};
pub use serial::SerialLink;
pub use stream::LinkStream;
pub use uds::UnixDomainSocket;
