use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::crc::X25;
use crate::error::{FrameError, Result};

/// Start-of-frame marker for protocol v1.
pub const MARKER_V1: u8 = 0xFE;

/// Start-of-frame marker for protocol v2.
pub const MARKER_V2: u8 = 0xFD;

/// v1 header: marker, length, sequence, system, component, message id.
pub const HEADER_SIZE_V1: usize = 6;

/// v2 header: marker, length, incompat flags, compat flags, sequence,
/// system, component, 3-byte message id.
pub const HEADER_SIZE_V2: usize = 10;

/// Trailing checksum size.
pub const CHECKSUM_SIZE: usize = 2;

/// Signature block appended to signed v2 frames.
pub const SIGNATURE_SIZE: usize = 13;

/// Largest payload a length byte can declare.
pub const MAX_PAYLOAD_LEN: usize = 255;

/// Largest possible frame on the wire (signed v2 with a full payload).
pub const MAX_FRAME_SIZE: usize = HEADER_SIZE_V2 + MAX_PAYLOAD_LEN + CHECKSUM_SIZE + SIGNATURE_SIZE;

/// Incompatibility flag: frame carries a signature block.
pub const INCOMPAT_FLAG_SIGNED: u8 = 0x01;

/// Incompatibility flags this parser understands. Frames with any other bit
/// set are rejected.
pub const SUPPORTED_INCOMPAT_FLAGS: u8 = INCOMPAT_FLAG_SIGNED;

/// Largest message identifier a v2 header can carry (24 bits).
pub const MAX_MESSAGE_ID_V2: u32 = 0x00FF_FFFF;

/// Wire protocol generation, selected by the start marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolVersion {
    V1,
    V2,
}

impl ProtocolVersion {
    /// Resolve a start marker byte.
    pub fn from_marker(byte: u8) -> Option<Self> {
        match byte {
            MARKER_V1 => Some(Self::V1),
            MARKER_V2 => Some(Self::V2),
            _ => None,
        }
    }

    /// Start marker byte for this version.
    pub fn marker(self) -> u8 {
        match self {
            Self::V1 => MARKER_V1,
            Self::V2 => MARKER_V2,
        }
    }

    /// Header size including the marker.
    pub fn header_size(self) -> usize {
        match self {
            Self::V1 => HEADER_SIZE_V1,
            Self::V2 => HEADER_SIZE_V2,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => f.write_str("v1"),
            Self::V2 => f.write_str("v2"),
        }
    }
}

/// Header fields of a frame, everything between the marker and the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: ProtocolVersion,
    pub payload_len: u8,
    /// Always zero for v1.
    pub incompat_flags: u8,
    /// Always zero for v1.
    pub compat_flags: u8,
    pub sequence: u8,
    pub system_id: u8,
    pub component_id: u8,
    pub message_id: u32,
}

impl FrameHeader {
    /// Header for a v1 frame. `payload_len` is filled in by the encoder.
    pub fn v1(sequence: u8, system_id: u8, component_id: u8, message_id: u32) -> Self {
        Self {
            version: ProtocolVersion::V1,
            payload_len: 0,
            incompat_flags: 0,
            compat_flags: 0,
            sequence,
            system_id,
            component_id,
            message_id,
        }
    }

    /// Header for an unsigned v2 frame. `payload_len` is filled in by the encoder.
    pub fn v2(sequence: u8, system_id: u8, component_id: u8, message_id: u32) -> Self {
        Self {
            version: ProtocolVersion::V2,
            ..Self::v1(sequence, system_id, component_id, message_id)
        }
    }

    /// True when a signature block follows the checksum.
    pub fn is_signed(&self) -> bool {
        self.version == ProtocolVersion::V2 && self.incompat_flags & INCOMPAT_FLAG_SIGNED != 0
    }

    /// Bytes on the wire for a frame with this header.
    pub fn wire_size(&self) -> usize {
        let signature = if self.is_signed() { SIGNATURE_SIZE } else { 0 };
        self.version.header_size() + usize::from(self.payload_len) + CHECKSUM_SIZE + signature
    }

    /// Parse header fields from the start of a captured frame.
    ///
    /// `raw` must hold at least `version.header_size()` bytes, marker first.
    pub(crate) fn from_raw(version: ProtocolVersion, raw: &[u8]) -> Self {
        match version {
            ProtocolVersion::V1 => Self {
                version,
                payload_len: raw[1],
                incompat_flags: 0,
                compat_flags: 0,
                sequence: raw[2],
                system_id: raw[3],
                component_id: raw[4],
                message_id: u32::from(raw[5]),
            },
            ProtocolVersion::V2 => Self {
                version,
                payload_len: raw[1],
                incompat_flags: raw[2],
                compat_flags: raw[3],
                sequence: raw[4],
                system_id: raw[5],
                component_id: raw[6],
                message_id: u32::from_le_bytes([raw[7], raw[8], raw[9], 0]),
            },
        }
    }
}

/// One complete, checksum-validated wire unit prior to payload interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub header: FrameHeader,
    /// Raw payload bytes, exactly `header.payload_len` long.
    pub payload: Bytes,
    /// Trailing checksum as received.
    pub checksum: u16,
    /// Signature block of a signed v2 frame (captured, not verified).
    pub signature: Option<[u8; SIGNATURE_SIZE]>,
}

impl Frame {
    pub fn version(&self) -> ProtocolVersion {
        self.header.version
    }

    pub fn sequence(&self) -> u8 {
        self.header.sequence
    }

    pub fn system_id(&self) -> u8 {
        self.header.system_id
    }

    pub fn component_id(&self) -> u8 {
        self.header.component_id
    }

    pub fn message_id(&self) -> u32 {
        self.header.message_id
    }

    /// The total wire size of this frame.
    pub fn wire_size(&self) -> usize {
        self.header.wire_size()
    }
}

/// Encode a frame into the wire format.
///
/// `header.payload_len` is ignored and taken from `payload`. When
/// `header.incompat_flags` marks the frame as signed, the caller appends the
/// signature block after this returns.
///
/// Wire format (v2; v1 omits both flag bytes and uses a 1-byte message id):
/// ```text
/// ┌────────┬─────┬────────┬────────┬─────┬────────┬────────┬───────────┬─────────┬──────────┐
/// │ Marker │ Len │ Incomp │ Compat │ Seq │ SysId  │ CompId │ MsgId     │ Payload │ Checksum │
/// │ 0xFD   │ 1B  │ 1B     │ 1B     │ 1B  │ 1B     │ 1B     │ 3B LE     │ Len B   │ 2B LE    │
/// └────────┴─────┴────────┴────────┴─────┴────────┴────────┴───────────┴─────────┴──────────┘
/// ```
pub fn encode_frame(
    header: &FrameHeader,
    payload: &[u8],
    crc_extra: u8,
    dst: &mut BytesMut,
) -> Result<()> {
    let payload_len = u8::try_from(payload.len()).map_err(|_| FrameError::PayloadTooLarge {
        size: payload.len(),
        max: MAX_PAYLOAD_LEN,
    })?;

    let max_id = match header.version {
        ProtocolVersion::V1 => u32::from(u8::MAX),
        ProtocolVersion::V2 => MAX_MESSAGE_ID_V2,
    };
    if header.message_id > max_id {
        return Err(FrameError::MessageIdOutOfRange {
            id: header.message_id,
            version: header.version,
        });
    }

    let start = dst.len();
    dst.reserve(header.version.header_size() + payload.len() + CHECKSUM_SIZE);
    dst.put_u8(header.version.marker());
    dst.put_u8(payload_len);
    if header.version == ProtocolVersion::V2 {
        dst.put_u8(header.incompat_flags);
        dst.put_u8(header.compat_flags);
    }
    dst.put_u8(header.sequence);
    dst.put_u8(header.system_id);
    dst.put_u8(header.component_id);
    match header.version {
        ProtocolVersion::V1 => dst.put_u8(header.message_id as u8),
        ProtocolVersion::V2 => dst.put_slice(&header.message_id.to_le_bytes()[..3]),
    }
    dst.put_slice(payload);

    let mut crc = X25::new();
    crc.accumulate_slice(&dst[start + 1..]);
    crc.accumulate(crc_extra);
    dst.put_u16_le(crc.value());
    Ok(())
}

/// Configuration for the frame parser.
#[derive(Debug, Clone, Copy)]
pub struct FrameConfig {
    /// Length bytes above this value are treated as desync. Default: 255.
    pub max_payload_len: usize,
    /// CRC_EXTRA seed lookup by message id. Unknown ids seed with `0`.
    pub crc_extra: fn(u32) -> Option<u8>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_len: MAX_PAYLOAD_LEN,
            crc_extra: no_crc_extra,
        }
    }
}

fn no_crc_extra(_message_id: u32) -> Option<u8> {
    None
}
