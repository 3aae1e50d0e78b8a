//! Byte-level framing for MAVLink-style telemetry streams.
//!
//! Frames arrive over lossy links with no boundary alignment. This crate turns
//! an arbitrarily chunked byte stream back into validated frames:
//! - a start marker (`0xFE` v1, `0xFD` v2) for synchronization
//! - a 1-byte payload length, header fields and the payload
//! - an X.25 checksum seeded with a per-message CRC_EXTRA byte
//!
//! Corruption never surfaces as an error. The parser drops bad frames,
//! rescans for the next marker and keeps going.

pub mod channel;
pub mod codec;
pub mod crc;
pub mod error;
pub mod parser;
pub mod reader;
pub mod sequence;
#[cfg(feature = "async")]
pub mod tokio_codec;

pub use channel::{Channel, ChannelEvent, DEFAULT_CHANNEL, MAX_CHANNELS};
pub use codec::{
    encode_frame, Frame, FrameConfig, FrameHeader, ProtocolVersion, CHECKSUM_SIZE,
    HEADER_SIZE_V1, HEADER_SIZE_V2, INCOMPAT_FLAG_SIGNED, MARKER_V1, MARKER_V2, MAX_FRAME_SIZE,
    MAX_PAYLOAD_LEN, SIGNATURE_SIZE,
};
pub use error::{FrameError, Result};
pub use parser::{FrameParser, ParseEvent, ParseState};
pub use reader::FrameReader;
pub use sequence::{LossTracker, SequenceScope, SequenceTracker};
#[cfg(feature = "async")]
pub use tokio_codec::MavCodec;
