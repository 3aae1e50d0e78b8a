//! Per-stream decoding state.
//!
//! A channel pairs one framing state machine with one loss tracker. Decoders
//! that read several links (e.g. a serial port and a UDP socket) keep one
//! channel per link so frames never interleave across streams.

use crate::codec::{Frame, FrameConfig, FrameHeader};
use crate::parser::{FrameParser, ParseEvent, ParseState};
use crate::sequence::{LossTracker, SequenceScope};

/// Channel used by single-stream decoders.
pub const DEFAULT_CHANNEL: usize = 0;

/// Upper bound on channels per decoder.
pub const MAX_CHANNELS: usize = 16;

/// What a channel produced from its input so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// A checksum-valid frame and the number of frames lost just before it.
    Frame { frame: Frame, lost: u32 },
    /// A frame whose checksum did not match, or that was abandoned because a
    /// valid frame started inside it.
    Corrupt(FrameHeader),
}

/// Framing and loss state of one logical byte stream.
#[derive(Debug)]
pub struct Channel {
    id: usize,
    parser: FrameParser,
    loss: LossTracker,
}

impl Channel {
    pub fn new(id: usize, config: FrameConfig, scope: SequenceScope) -> Self {
        Self {
            id,
            parser: FrameParser::with_config(config),
            loss: LossTracker::new(scope),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Consume one byte. Completed frames are available from [`Self::next_event`].
    pub fn push(&mut self, byte: u8) {
        self.parser.push(byte);
    }

    /// Next event in byte-arrival order. Valid frames pass through loss
    /// accounting here.
    pub fn next_event(&mut self) -> Option<ChannelEvent> {
        match self.parser.next_event()? {
            ParseEvent::Frame(frame) => {
                let lost = self.loss.observe(&frame.header);
                Some(ChannelEvent::Frame { frame, lost })
            }
            ParseEvent::BadChecksum(header) | ParseEvent::Superseded(header) => {
                Some(ChannelEvent::Corrupt(header))
            }
        }
    }

    /// Feed a chunk and collect every resulting event.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<ChannelEvent> {
        let mut events = Vec::new();
        for byte in bytes {
            self.push(*byte);
            while let Some(event) = self.next_event() {
                events.push(event);
            }
        }
        events
    }

    pub fn state(&self) -> ParseState {
        self.parser.state()
    }

    pub fn last_sequence(&self) -> Option<u8> {
        self.loss.last_sequence()
    }

    /// Drop partial frame state and the sequence baseline.
    pub fn reset(&mut self) {
        self.parser.reset();
        self.loss.reset();
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::codec::encode_frame;

    fn frame_bytes(sequence: u8) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(&FrameHeader::v1(sequence, 1, 1, 42), &[1, 2, 3, 4], 0, &mut buf).unwrap();
        buf.to_vec()
    }

    fn channel() -> Channel {
        Channel::new(DEFAULT_CHANNEL, FrameConfig::default(), SequenceScope::Channel)
    }

    fn lost(events: &[ChannelEvent]) -> Vec<u32> {
        events
            .iter()
            .filter_map(|event| match event {
                ChannelEvent::Frame { lost, .. } => Some(*lost),
                ChannelEvent::Corrupt(_) => None,
            })
            .collect()
    }

    #[test]
    fn reports_gap_on_next_valid_frame() {
        let mut channel = channel();
        let mut wire = Vec::new();
        for sequence in [250, 251, 252, 255] {
            wire.extend(frame_bytes(sequence));
        }
        let events = channel.feed(&wire);
        assert_eq!(lost(&events), vec![0, 0, 0, 2]);
        assert_eq!(channel.last_sequence(), Some(255));
    }

    #[test]
    fn corrupt_frame_does_not_move_sequence_baseline() {
        let mut channel = channel();
        let mut corrupt = frame_bytes(7);
        corrupt[7] ^= 0x01;

        let mut wire = frame_bytes(5);
        wire.extend(corrupt);
        wire.extend(frame_bytes(6));
        let events = channel.feed(&wire);

        assert!(matches!(events[1], ChannelEvent::Corrupt(header) if header.sequence == 7));
        assert_eq!(lost(&events), vec![0, 0]);
    }

    #[test]
    fn reset_forgets_baseline() {
        let mut channel = channel();
        channel.feed(&frame_bytes(1));
        channel.reset();
        let events = channel.feed(&frame_bytes(100));
        assert_eq!(lost(&events), vec![0]);
        assert_eq!(channel.id(), DEFAULT_CHANNEL);
    }
}
