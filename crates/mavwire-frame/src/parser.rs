use std::collections::VecDeque;

use bytes::Bytes;
use tracing::trace;

use crate::codec::{
    Frame, FrameConfig, FrameHeader, ProtocolVersion, CHECKSUM_SIZE, MAX_FRAME_SIZE,
    SIGNATURE_SIZE, SUPPORTED_INCOMPAT_FLAGS,
};
use crate::crc::X25;

/// Position of the framing state machine within the current frame.
///
/// Each state names what has been fully captured so far. The state only moves
/// forward within one frame and drops back to `Idle` when the frame completes
/// or is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Scanning for a start marker.
    Idle,
    /// Marker seen, length byte next.
    GotMarker,
    /// Length seen, reading the remaining header fields.
    GotLength,
    /// Header complete, reading payload bytes.
    GotHeader,
    /// Payload complete, reading checksum bytes.
    GotPayload,
    /// Checksum matched on a signed frame, reading the signature block.
    GotChecksum,
}

/// Outcome of a frame capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEvent {
    /// Checksum matched.
    Frame(Frame),
    /// Every byte arrived but the checksum did not match.
    BadChecksum(FrameHeader),
    /// The frame was abandoned unfinished because a valid frame started and
    /// completed inside it. Usually a corrupted length byte.
    Superseded(FrameHeader),
}

enum Step {
    Continue,
    Complete(Frame),
    Reject(Rejection),
}

enum Rejection {
    Length(u8),
    Flags(u8),
    Checksum {
        header: FrameHeader,
        expected: u16,
        received: u16,
    },
}

/// One frame being assembled: the bytes seen since its marker and the running
/// checksum over them.
#[derive(Debug)]
struct Capture {
    state: ParseState,
    version: ProtocolVersion,
    buf: Vec<u8>,
    crc: X25,
}

impl Capture {
    fn new(capacity: usize) -> Self {
        Self {
            state: ParseState::Idle,
            version: ProtocolVersion::V1,
            buf: Vec::with_capacity(capacity),
            crc: X25::new(),
        }
    }

    fn clear(&mut self) {
        self.state = ParseState::Idle;
        self.buf.clear();
    }

    fn step(&mut self, byte: u8, config: &FrameConfig) -> Step {
        match self.state {
            ParseState::Idle => {
                if let Some(version) = ProtocolVersion::from_marker(byte) {
                    self.version = version;
                    self.buf.clear();
                    self.buf.push(byte);
                    self.crc = X25::new();
                    self.state = ParseState::GotMarker;
                }
                Step::Continue
            }
            ParseState::GotMarker => {
                self.capture(byte);
                if usize::from(byte) > config.max_payload_len {
                    return Step::Reject(Rejection::Length(byte));
                }
                self.state = ParseState::GotLength;
                Step::Continue
            }
            ParseState::GotLength => {
                self.capture(byte);
                if self.buf.len() < self.version.header_size() {
                    return Step::Continue;
                }
                let header = self.header();
                if header.incompat_flags & !SUPPORTED_INCOMPAT_FLAGS != 0 {
                    return Step::Reject(Rejection::Flags(header.incompat_flags));
                }
                if header.payload_len == 0 {
                    self.seal_payload(header.message_id, config);
                    self.state = ParseState::GotPayload;
                } else {
                    self.state = ParseState::GotHeader;
                }
                Step::Continue
            }
            ParseState::GotHeader => {
                self.capture(byte);
                if self.buf.len() == self.payload_end() {
                    let message_id = self.header().message_id;
                    self.seal_payload(message_id, config);
                    self.state = ParseState::GotPayload;
                }
                Step::Continue
            }
            ParseState::GotPayload => {
                self.buf.push(byte);
                let end = self.payload_end();
                if self.buf.len() < end + CHECKSUM_SIZE {
                    return Step::Continue;
                }
                let header = self.header();
                let received = u16::from_le_bytes([self.buf[end], self.buf[end + 1]]);
                if received != self.crc.value() {
                    return Step::Reject(Rejection::Checksum {
                        header,
                        expected: self.crc.value(),
                        received,
                    });
                }
                if header.is_signed() {
                    self.state = ParseState::GotChecksum;
                    return Step::Continue;
                }
                Step::Complete(self.finish(header, received, None))
            }
            ParseState::GotChecksum => {
                self.buf.push(byte);
                let end = self.payload_end() + CHECKSUM_SIZE;
                if self.buf.len() < end + SIGNATURE_SIZE {
                    return Step::Continue;
                }
                let header = self.header();
                let received = u16::from_le_bytes([self.buf[end - 2], self.buf[end - 1]]);
                let mut signature = [0u8; SIGNATURE_SIZE];
                signature.copy_from_slice(&self.buf[end..end + SIGNATURE_SIZE]);
                Step::Complete(self.finish(header, received, Some(signature)))
            }
        }
    }

    fn capture(&mut self, byte: u8) {
        self.buf.push(byte);
        self.crc.accumulate(byte);
    }

    fn seal_payload(&mut self, message_id: u32, config: &FrameConfig) {
        let extra = (config.crc_extra)(message_id).unwrap_or(0);
        self.crc.accumulate(extra);
    }

    fn header(&self) -> FrameHeader {
        FrameHeader::from_raw(self.version, &self.buf)
    }

    /// Header fields, once all of them have arrived.
    fn complete_header(&self) -> Option<FrameHeader> {
        matches!(
            self.state,
            ParseState::GotHeader | ParseState::GotPayload | ParseState::GotChecksum
        )
        .then(|| self.header())
    }

    /// Offset one past the last payload byte. Valid once the length is known.
    fn payload_end(&self) -> usize {
        self.version.header_size() + usize::from(self.buf[1])
    }

    fn finish(
        &mut self,
        header: FrameHeader,
        checksum: u16,
        signature: Option<[u8; SIGNATURE_SIZE]>,
    ) -> Frame {
        let start = self.version.header_size();
        let payload = Bytes::copy_from_slice(&self.buf[start..self.payload_end()]);
        self.clear();
        Frame {
            header,
            payload,
            checksum,
            signature,
        }
    }
}

/// Byte-at-a-time frame decoder for one stream.
///
/// Every start marker that arrives inside an unfinished frame opens a nested
/// capture. If one of those completes with a valid checksum and a message id
/// the configured catalog knows, it is emitted at once and the enclosing frame
/// is abandoned as [`ParseEvent::Superseded`]. A corrupted length byte
/// therefore cannot hide the frames behind it. Marker bytes inside a valid
/// frame's payload open captures that never validate, and are dropped when
/// the enclosing frame completes.
///
/// On rejection the bytes captured after the rejected marker are rescanned.
/// One input byte can therefore complete more than one frame; extra frames
/// wait in an internal queue in arrival order.
#[derive(Debug)]
pub struct FrameParser {
    config: FrameConfig,
    current: Capture,
    nested: Vec<Capture>,
    backlog: VecDeque<u8>,
    events: VecDeque<ParseEvent>,
}

impl FrameParser {
    /// Create a parser with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create a parser with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            config,
            current: Capture::new(MAX_FRAME_SIZE),
            nested: Vec::new(),
            backlog: VecDeque::new(),
            events: VecDeque::new(),
        }
    }

    /// Consume one byte and return the next validated frame, if any.
    ///
    /// Checksum failures return `None`. Frames recovered by resynchronization
    /// beyond the first are returned by later calls, or by [`Self::next_frame`].
    pub fn ingest(&mut self, byte: u8) -> Option<Frame> {
        self.push(byte);
        self.next_frame()
    }

    /// Pop the next queued frame, skipping corrupt-frame events.
    pub fn next_frame(&mut self) -> Option<Frame> {
        while let Some(event) = self.events.pop_front() {
            if let ParseEvent::Frame(frame) = event {
                return Some(frame);
            }
        }
        None
    }

    /// Consume one byte, queueing completed frames and corrupt-frame events.
    pub fn push(&mut self, byte: u8) {
        self.backlog.push_back(byte);
        while let Some(byte) = self.backlog.pop_front() {
            self.consume(byte);
        }
    }

    /// Pop the next queued event.
    pub fn next_event(&mut self) -> Option<ParseEvent> {
        self.events.pop_front()
    }

    /// Current state machine position.
    pub fn state(&self) -> ParseState {
        self.current.state
    }

    /// Parser configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Drop any partial frame and queued events.
    pub fn reset(&mut self) {
        self.current.clear();
        self.nested.clear();
        self.backlog.clear();
        self.events.clear();
    }

    fn consume(&mut self, byte: u8) {
        let inside = self.current.state != ParseState::Idle;
        match self.current.step(byte, &self.config) {
            Step::Continue => {}
            Step::Complete(frame) => {
                self.nested.clear();
                self.events.push_back(ParseEvent::Frame(frame));
                return;
            }
            Step::Reject(rejection) => {
                self.reject(rejection);
                return;
            }
        }

        if let Some(frame) = self.advance_nested(byte) {
            trace!(
                message_id = frame.message_id(),
                sequence = frame.sequence(),
                "valid frame inside an unfinished one, abandoning the outer frame"
            );
            if let Some(header) = self.current.complete_header() {
                self.events.push_back(ParseEvent::Superseded(header));
            }
            self.current.clear();
            self.events.push_back(ParseEvent::Frame(frame));
        } else if inside && ProtocolVersion::from_marker(byte).is_some() {
            let mut capture = Capture::new(0);
            capture.step(byte, &self.config);
            self.nested.push(capture);
        }
    }

    /// Feed `byte` to every nested capture. Returns the first one that
    /// completed with a catalog id; all nested captures are dropped then.
    fn advance_nested(&mut self, byte: u8) -> Option<Frame> {
        let config = &self.config;
        let mut winner = None;
        self.nested.retain_mut(|capture| match capture.step(byte, config) {
            Step::Continue => true,
            Step::Complete(frame) => {
                if winner.is_none() && (config.crc_extra)(frame.message_id()).is_some() {
                    winner = Some(frame);
                }
                false
            }
            Step::Reject(_) => false,
        });
        if winner.is_some() {
            self.nested.clear();
        }
        winner
    }

    fn reject(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::Length(len) => trace!(
                len,
                max = self.config.max_payload_len,
                "declared payload length over limit, resynchronizing"
            ),
            Rejection::Flags(flags) => {
                trace!(flags, "unsupported incompatibility flags, resynchronizing")
            }
            Rejection::Checksum {
                header,
                expected,
                received,
            } => {
                trace!(
                    message_id = header.message_id,
                    sequence = header.sequence,
                    expected,
                    received,
                    "checksum mismatch, resynchronizing"
                );
                self.events.push_back(ParseEvent::BadChecksum(header));
            }
        }
        self.nested.clear();
        for byte in self.current.buf.iter().skip(1).rev() {
            self.backlog.push_front(*byte);
        }
        self.current.clear();
    }
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}
