use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;

use crate::codec::{Frame, FrameConfig};
use crate::error::FrameError;
use crate::parser::FrameParser;

/// `tokio_util` codec yielding validated frames from an async byte stream.
///
/// Every byte handed to `decode` is consumed; partial frames live in the
/// parser between calls, so `decode_eof` never sees leftover bytes.
#[derive(Debug, Default)]
pub struct MavCodec {
    parser: FrameParser,
}

impl MavCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            parser: FrameParser::with_config(config),
        }
    }
}

impl Decoder for MavCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        loop {
            if let Some(frame) = self.parser.next_frame() {
                return Ok(Some(frame));
            }
            if !src.has_remaining() {
                return Ok(None);
            }
            self.parser.push(src.get_u8());
        }
    }
}
