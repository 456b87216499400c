use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::error::{FrameError, Result};

/// Start-of-frame marker byte.
pub const START_BYTE: u8 = 0xAA;

/// Maximum payload length. The wire format uses a single length byte, but
/// the protocol caps it well below 255 so a corrupt length byte cannot
/// drive a large read.
pub const MAX_PAYLOAD_LEN: usize = 64;

/// Frame header: start (1) + type (1) + length (1) = 3 bytes.
pub const HEADER_SIZE: usize = 3;

/// A validated frame with its message type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The message type byte.
    pub msg_type: u8,
    /// The message payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(msg_type: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            msg_type,
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (header + payload + checksum).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len() + 1
    }
}

/// XOR checksum over message type, length and payload bytes.
pub fn checksum(msg_type: u8, payload: &[u8]) -> u8 {
    payload
        .iter()
        .fold(msg_type ^ payload.len() as u8, |acc, b| acc ^ b)
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────────┬──────────┬──────────┬───────────────┬──────────┐
/// │ Start (1B) │ Type     │ Length   │ Payload        │ Checksum │
/// │ 0xAA       │ (1B)     │ (1B)     │ (Length bytes) │ (1B XOR) │
/// └────────────┴──────────┴──────────┴───────────────┴──────────┘
/// ```
pub fn encode_frame(msg_type: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD_LEN,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len() + 1);
    dst.put_u8(START_BYTE);
    dst.put_u8(msg_type);
    dst.put_u8(payload.len() as u8);
    dst.put_slice(payload);
    dst.put_u8(checksum(msg_type, payload));
    Ok(())
}

/// Configuration for frame stream adapters.
#[derive(Debug, Clone, Default)]
pub struct FrameConfig {
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}

/// Running counters for the receive path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Frames that passed checksum validation.
    pub frames_decoded: u64,
    /// Frames discarded because the checksum byte did not match.
    pub checksum_mismatches: u64,
    /// In-progress frames abandoned because the length byte exceeded
    /// [`MAX_PAYLOAD_LEN`].
    pub length_overflows: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    WaitStart,
    ReadType,
    ReadLen,
    ReadPayload,
    ReadChecksum,
}

/// Persistent byte-level frame decoder.
///
/// Feed it arbitrary chunks of the incoming byte stream; it emits validated
/// frames in order. Corrupt input (bad checksum, oversized length) discards
/// the in-progress frame and resumes scanning for the next start byte, so
/// the decoder survives any split points and any garbage between frames.
/// The start byte is only matched while scanning, so payload bytes equal to
/// 0xAA never confuse it.
#[derive(Debug)]
pub struct FrameDecoder {
    state: DecodeState,
    msg_type: u8,
    len: u8,
    running_checksum: u8,
    payload: BytesMut,
    stats: DecoderStats,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    /// Create a decoder in the scanning state.
    pub fn new() -> Self {
        Self {
            state: DecodeState::WaitStart,
            msg_type: 0,
            len: 0,
            running_checksum: 0,
            payload: BytesMut::with_capacity(MAX_PAYLOAD_LEN),
            stats: DecoderStats::default(),
        }
    }

    /// Feed a chunk of bytes, returning every frame completed by it.
    pub fn feed(&mut self, data: &[u8]) -> Vec<Frame> {
        let mut frames = Vec::new();
        for &b in data {
            if let Some(frame) = self.push_byte(b) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Abandon any in-progress frame and resume scanning.
    pub fn reset(&mut self) {
        self.state = DecodeState::WaitStart;
        self.len = 0;
        self.running_checksum = 0;
        self.payload.clear();
    }

    /// Receive-path counters since construction.
    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    fn push_byte(&mut self, b: u8) -> Option<Frame> {
        match self.state {
            DecodeState::WaitStart => {
                if b == START_BYTE {
                    self.state = DecodeState::ReadType;
                }
                None
            }
            DecodeState::ReadType => {
                self.msg_type = b;
                self.running_checksum = b;
                self.state = DecodeState::ReadLen;
                None
            }
            DecodeState::ReadLen => {
                self.len = b;
                self.running_checksum ^= b;
                if usize::from(b) > MAX_PAYLOAD_LEN {
                    debug!(len = b, "length byte exceeds max payload, resyncing");
                    self.stats.length_overflows += 1;
                    self.reset();
                } else if b == 0 {
                    self.state = DecodeState::ReadChecksum;
                } else {
                    self.payload.clear();
                    self.state = DecodeState::ReadPayload;
                }
                None
            }
            DecodeState::ReadPayload => {
                self.payload.put_u8(b);
                self.running_checksum ^= b;
                if self.payload.len() >= usize::from(self.len) {
                    self.state = DecodeState::ReadChecksum;
                }
                None
            }
            DecodeState::ReadChecksum => {
                let frame = if b == self.running_checksum {
                    self.stats.frames_decoded += 1;
                    Some(Frame {
                        msg_type: self.msg_type,
                        payload: self.payload.split().freeze(),
                    })
                } else {
                    debug!(
                        expected = self.running_checksum,
                        got = b,
                        "checksum mismatch, discarding frame"
                    );
                    self.stats.checksum_mismatches += 1;
                    None
                };
                self.reset();
                frame
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(msg_type: u8, payload: &[u8]) -> BytesMut {
        let mut buf = BytesMut::new();
        encode_frame(msg_type, payload, &mut buf).unwrap();
        buf
    }

    #[test]
    fn encode_decode_roundtrip() {
        let wire = encode(0x01, b"hello, reactor!");
        assert_eq!(wire.len(), HEADER_SIZE + 15 + 1);

        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(&wire);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].msg_type, 0x01);
        assert_eq!(frames[0].payload.as_ref(), b"hello, reactor!");
    }

    #[test]
    fn roundtrip_all_payload_lengths() {
        let mut decoder = FrameDecoder::new();
        for len in 0..=MAX_PAYLOAD_LEN {
            let payload: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let wire = encode(0x10, &payload);

            let frames = decoder.feed(&wire);
            assert_eq!(frames.len(), 1, "length {len}");
            assert_eq!(frames[0].payload.as_ref(), payload.as_slice());
        }
        assert_eq!(decoder.stats().frames_decoded, MAX_PAYLOAD_LEN as u64 + 1);
    }

    #[test]
    fn encode_rejects_oversized_payload() {
        let payload = vec![0u8; MAX_PAYLOAD_LEN + 1];
        let mut buf = BytesMut::new();
        let err = encode_frame(0x01, &payload, &mut buf).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { size: 65, max: 64 }));
        assert!(buf.is_empty());
    }

    #[test]
    fn oversized_length_byte_resyncs() {
        let mut wire = BytesMut::new();
        wire.put_u8(START_BYTE);
        wire.put_u8(0x01);
        wire.put_u8(200); // corrupt length
        wire.extend_from_slice(&encode(0x10, b"next"));

        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(&wire);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].msg_type, 0x10);
        assert_eq!(frames[0].payload.as_ref(), b"next");
        assert_eq!(decoder.stats().length_overflows, 1);
    }

    #[test]
    fn flipped_checksum_discards_then_next_frame_parses() {
        let mut wire = encode(0x01, b"corrupt me");
        let last = wire.len() - 1;
        wire[last] ^= 0xFF;
        wire.extend_from_slice(&encode(0x10, b"clean"));

        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(&wire);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload.as_ref(), b"clean");
        assert_eq!(decoder.stats().checksum_mismatches, 1);
        assert_eq!(decoder.stats().frames_decoded, 1);
    }

    #[test]
    fn chunk_independence_at_every_split_point() {
        let mut wire = encode(0x01, b"first frame");
        wire.extend_from_slice(&encode(0x10, b"second"));

        for split in 0..=wire.len() {
            let mut decoder = FrameDecoder::new();
            let mut frames = decoder.feed(&wire[..split]);
            frames.extend(decoder.feed(&wire[split..]));

            assert_eq!(frames.len(), 2, "split at {split}");
            assert_eq!(frames[0].payload.as_ref(), b"first frame");
            assert_eq!(frames[1].payload.as_ref(), b"second");
        }
    }

    #[test]
    fn byte_by_byte_feeding() {
        let wire = encode(0x01, &[0xAA, 0xAA, 0x00, 0xFF]);
        let mut decoder = FrameDecoder::new();
        let mut frames = Vec::new();
        for &b in wire.iter() {
            frames.extend(decoder.feed(&[b]));
        }
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload.as_ref(), &[0xAA, 0xAA, 0x00, 0xFF]);
    }

    #[test]
    fn garbage_before_start_byte_is_skipped() {
        let mut wire = BytesMut::from(&[0x00, 0x13, 0x37, 0xFE][..]);
        wire.extend_from_slice(&encode(0x01, b"ok"));

        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(&wire);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload.as_ref(), b"ok");
    }

    #[test]
    fn start_byte_in_payload_does_not_resync() {
        let payload = [START_BYTE; 8];
        let wire = encode(0x01, &payload);

        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(&wire);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload.as_ref(), &payload);
    }

    #[test]
    fn empty_payload_frame() {
        let wire = encode(0x10, b"");
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(&wire);
        assert_eq!(frames.len(), 1);
        assert!(frames[0].payload.is_empty());
    }

    #[test]
    fn reset_abandons_partial_frame() {
        let wire = encode(0x01, b"partial");
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(&wire[..5]).is_empty());

        decoder.reset();
        // A fresh complete frame parses cleanly after the reset.
        let frames = decoder.feed(&encode(0x10, b"fresh"));
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload.as_ref(), b"fresh");
    }

    #[test]
    fn checksum_matches_reference() {
        // msg_type ^ len ^ payload bytes
        assert_eq!(checksum(0x01, &[]), 0x01);
        assert_eq!(checksum(0x10, &[0x03]), 0x10 ^ 0x01 ^ 0x03);
        assert_eq!(checksum(0x01, &[0xAA, 0x55]), 0x01 ^ 0x02 ^ 0xAA ^ 0x55);
    }

    #[test]
    fn frame_wire_size() {
        let frame = Frame::new(0x01, Bytes::from_static(b"test"));
        assert_eq!(frame.wire_size(), HEADER_SIZE + 4 + 1);
    }
}
