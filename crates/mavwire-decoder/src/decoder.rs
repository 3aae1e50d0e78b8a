use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use mavwire_frame::{Channel, ChannelEvent, Frame, ParseState, DEFAULT_CHANNEL, MAX_CHANNELS};
use mavwire_message::catalog::{self, Decoded};
use mavwire_message::{Message, MessageHandler, Source};
use tracing::{debug, info, trace};

use crate::config::DecoderConfig;
use crate::error::{DecoderError, Result};
use crate::link::{HeartbeatInfo, LinkMonitor};
use crate::order::DeliveryOrder;
use crate::slot::HandlerSlot;
use crate::stats::{Statistics, StatisticsTracker};

/// Unknown message ids remembered for first-seen logging. Frames that pass the
/// zero-seeded checksum can carry any 24-bit id, so this set is capped.
pub const MAX_TRACKED_UNKNOWN_IDS: usize = 256;

/// Message ids observed so far.
#[derive(Debug, Default)]
struct SeenIds {
    known: HashSet<u32>,
    unknown: HashSet<u32>,
}

impl SeenIds {
    /// True the first time `id` is recorded.
    fn insert(&mut self, id: u32, in_catalog: bool) -> bool {
        if in_catalog {
            return self.known.insert(id);
        }
        if self.unknown.len() >= MAX_TRACKED_UNKNOWN_IDS {
            return false;
        }
        self.unknown.insert(id)
    }

    fn sorted(&self) -> Vec<u32> {
        let all: BTreeSet<u32> = self.known.iter().chain(&self.unknown).copied().collect();
        all.into_iter().collect()
    }
}

#[derive(Debug)]
struct DecoderState {
    channels: Vec<Channel>,
    seen: SeenIds,
    stats: StatisticsTracker,
    link: LinkMonitor,
}

/// Thread-safe stream decoder.
///
/// One lock covers every channel, the statistics and the link status for the
/// whole framing pass of an `ingest` call, so a concurrent
/// [`get_statistics`](Self::get_statistics) never sees half of a chunk.
/// Handlers run after the lock is released, in the order frames were
/// consumed, also across concurrent callers. A handler may read statistics or
/// swap handlers, but must not feed bytes back into the decoder that called it.
#[derive(Debug)]
pub struct MavDecoder {
    state: Mutex<DecoderState>,
    delivery: DeliveryOrder,
    handler: HandlerSlot,
}

impl MavDecoder {
    /// Single-channel decoder with the default catalog.
    pub fn new() -> Self {
        Self::build(DecoderConfig::default())
    }

    /// Decoder with explicit configuration.
    pub fn with_config(config: DecoderConfig) -> Result<Self> {
        if config.channels == 0 || config.channels > MAX_CHANNELS {
            return Err(DecoderError::InvalidChannelCount(config.channels));
        }
        Ok(Self::build(config))
    }

    fn build(config: DecoderConfig) -> Self {
        let channels = (0..config.channels)
            .map(|id| Channel::new(id, config.frame, config.sequence_scope))
            .collect();
        Self {
            state: Mutex::new(DecoderState {
                channels,
                seen: SeenIds::default(),
                stats: StatisticsTracker::new(),
                link: LinkMonitor::new(config.link_timeout),
            }),
            delivery: DeliveryOrder::default(),
            handler: HandlerSlot::default(),
        }
    }

    /// Feed bytes from the default channel.
    ///
    /// Returns the number of checksum-valid frames this chunk completed.
    pub fn ingest(&self, bytes: &[u8]) -> usize {
        self.ingest_inner(DEFAULT_CHANNEL, bytes).unwrap_or_default()
    }

    /// Feed bytes from a specific channel.
    pub fn ingest_on(&self, channel: usize, bytes: &[u8]) -> Result<usize> {
        self.ingest_inner(channel, bytes)
    }

    fn ingest_inner(&self, channel: usize, bytes: &[u8]) -> Result<usize> {
        let (frames, deliveries, ticket) = {
            let mut state = self.lock();
            let DecoderState {
                channels,
                seen,
                stats,
                link,
            } = &mut *state;
            let count = channels.len();
            let chan = channels
                .get_mut(channel)
                .ok_or(DecoderError::UnknownChannel { channel, count })?;

            stats.record_bytes(bytes.len());
            let mut frames = 0;
            let mut deliveries = Vec::new();
            for byte in bytes {
                chan.push(*byte);
                while let Some(event) = chan.next_event() {
                    stats.record_received();
                    match event {
                        ChannelEvent::Corrupt(header) => {
                            stats.record_parse_error();
                            debug!(
                                channel,
                                message_id = header.message_id,
                                sequence = header.sequence,
                                "discarded corrupt frame"
                            );
                        }
                        ChannelEvent::Frame { frame, lost } => {
                            frames += 1;
                            if lost > 0 {
                                stats.record_dropped(lost);
                                debug!(channel, lost, sequence = frame.sequence(), "sequence gap");
                            }
                            let entry = catalog::lookup(frame.message_id());
                            if seen.insert(frame.message_id(), entry.is_some()) {
                                info!(
                                    message_id = frame.message_id(),
                                    name = entry.map_or("unknown", |entry| entry.name),
                                    "first message of this kind"
                                );
                            }
                            if let Some(message) = dispatchable(channel, &frame, stats) {
                                let source = Source::from(&frame.header);
                                if let Message::Heartbeat(heartbeat) = &message {
                                    link.observe(source, heartbeat, Instant::now());
                                }
                                deliveries.push((source, message));
                            }
                        }
                    }
                }
            }
            let ticket = (!deliveries.is_empty()).then(|| self.delivery.ticket());
            (frames, deliveries, ticket)
        };

        if let Some(ticket) = ticket {
            let _turn = self.delivery.wait(ticket);
            match self.handler.current() {
                Some(handler) => {
                    for (source, message) in deliveries {
                        message.deliver(source, handler.as_ref());
                    }
                }
                None => debug!(
                    count = deliveries.len(),
                    "no handler registered, decoded messages discarded"
                ),
            }
        }
        Ok(frames)
    }

    /// Register `handler` without taking ownership, replacing any previous one.
    ///
    /// `None` clears the slot. Dropping the last `Arc` elsewhere also ends
    /// delivery.
    pub fn set_handler<H>(&self, handler: Option<&Arc<H>>)
    where
        H: MessageHandler + 'static,
    {
        let weak = handler.map(|handler| {
            let handler: Arc<dyn MessageHandler> = handler.clone();
            Arc::downgrade(&handler)
        });
        self.handler.replace(weak);
    }

    /// Remove the registered handler.
    pub fn clear_handler(&self) {
        self.handler.replace(None);
    }

    /// Whether a live handler is registered.
    pub fn has_handler(&self) -> bool {
        self.handler.current().is_some()
    }

    pub fn get_statistics(&self) -> Statistics {
        self.lock().stats.snapshot()
    }

    /// Zero every counter. Framing state and the seen set are kept.
    pub fn reset_statistics(&self) {
        self.lock().stats.reset();
    }

    /// Every message id observed so far, in ascending order. Ids outside the
    /// catalog are listed up to [`MAX_TRACKED_UNKNOWN_IDS`].
    pub fn seen_message_ids(&self) -> Vec<u32> {
        self.lock().seen.sorted()
    }

    /// Framing state of `channel`.
    pub fn parse_state(&self, channel: usize) -> Result<ParseState> {
        let state = self.lock();
        state
            .channels
            .get(channel)
            .map(Channel::state)
            .ok_or(DecoderError::UnknownChannel {
                channel,
                count: state.channels.len(),
            })
    }

    /// Drop partial frames and sequence baselines on every channel.
    pub fn reset_channels(&self) {
        for channel in &mut self.lock().channels {
            channel.reset();
        }
    }

    pub fn channel_count(&self) -> usize {
        self.lock().channels.len()
    }

    /// The last heartbeat received on any channel.
    pub fn last_heartbeat(&self) -> Option<HeartbeatInfo> {
        self.lock().link.last()
    }

    /// True while the last heartbeat is younger than the configured timeout.
    pub fn is_vehicle_connected(&self) -> bool {
        self.lock().link.is_connected(Instant::now())
    }

    fn lock(&self) -> MutexGuard<'_, DecoderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MavDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a valid frame, applying the payload length policy.
fn dispatchable(channel: usize, frame: &Frame, stats: &mut StatisticsTracker) -> Option<Message> {
    let Some(Decoded { message, fit }) = catalog::decode(frame) else {
        trace!(
            channel,
            message_id = frame.message_id(),
            "message id not in catalog, discarded"
        );
        return None;
    };
    if fit.is_error_for(frame.version()) {
        stats.record_parse_error();
        debug!(
            channel,
            message_id = frame.message_id(),
            len = frame.payload.len(),
            ?fit,
            "payload length does not match catalog"
        );
    }
    Some(message)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bytes::BytesMut;
    use mavwire_frame::{encode_frame, FrameHeader};
    use mavwire_message::Heartbeat;

    use super::*;

    const HEARTBEAT_V1: [u8; 17] = [
        0xFE, 0x09, 0x01, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x03, 0x51, 0x04, 0x03,
        0x97, 0xA3,
    ];

    #[derive(Default)]
    struct Recorder {
        heartbeats: Mutex<Vec<(Source, Heartbeat)>>,
    }

    impl MessageHandler for Recorder {
        fn on_heartbeat(&self, source: Source, msg: Heartbeat) {
            self.heartbeats.lock().unwrap().push((source, msg));
        }
    }

    fn heartbeat_frame(sequence: u8) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(
            &FrameHeader::v1(sequence, 1, 1, 0),
            &HEARTBEAT_V1[6..15],
            50,
            &mut buf,
        )
        .unwrap();
        buf.to_vec()
    }

    #[test]
    fn heartbeat_end_to_end() {
        let decoder = MavDecoder::new();
        let recorder = Arc::new(Recorder::default());
        decoder.set_handler(Some(&recorder));

        assert_eq!(decoder.ingest(&HEARTBEAT_V1), 1);

        let heartbeats = recorder.heartbeats.lock().unwrap();
        assert_eq!(heartbeats.len(), 1);
        assert_eq!(heartbeats[0].0, Source::new(1, 1));
        assert_eq!(heartbeats[0].1.mav_type, 2);
        assert_eq!(heartbeats[0].1.base_mode, 0x51);

        let stats = decoder.get_statistics();
        assert_eq!((stats.received, stats.dropped, stats.parse_errors), (1, 0, 0));
        assert_eq!(stats.bytes_received, 17);
    }

    #[test]
    fn set_handler_none_clears() {
        let decoder = MavDecoder::new();
        let recorder = Arc::new(Recorder::default());
        decoder.set_handler(Some(&recorder));
        assert!(decoder.has_handler());

        decoder.set_handler::<Recorder>(None);
        assert!(!decoder.has_handler());
        decoder.ingest(&HEARTBEAT_V1);
        assert!(recorder.heartbeats.lock().unwrap().is_empty());
    }

    #[test]
    fn rejects_bad_channel_counts() {
        for channels in [0, MAX_CHANNELS + 1] {
            let err = MavDecoder::with_config(DecoderConfig::default().with_channels(channels))
                .unwrap_err();
            assert!(matches!(err, DecoderError::InvalidChannelCount(n) if n == channels));
        }
    }

    #[test]
    fn unknown_channel_is_an_error() {
        let decoder = MavDecoder::new();
        let err = decoder.ingest_on(3, &HEARTBEAT_V1).unwrap_err();
        assert!(matches!(err, DecoderError::UnknownChannel { channel: 3, count: 1 }));
        assert!(decoder.parse_state(1).is_err());
        assert_eq!(decoder.get_statistics(), Statistics::default());
    }

    #[test]
    fn parse_state_reports_partial_frame() {
        let decoder = MavDecoder::new();
        decoder.ingest(&HEARTBEAT_V1[..8]);
        assert_eq!(decoder.parse_state(0).unwrap(), ParseState::GotHeader);

        decoder.reset_channels();
        assert_eq!(decoder.parse_state(0).unwrap(), ParseState::Idle);
    }

    #[test]
    fn link_status_follows_heartbeats() {
        let decoder = MavDecoder::new();
        assert!(!decoder.is_vehicle_connected());
        assert!(decoder.last_heartbeat().is_none());

        decoder.ingest(&heartbeat_frame(0));
        assert!(decoder.is_vehicle_connected());
        let info = decoder.last_heartbeat().unwrap();
        assert_eq!(info.source, Source::new(1, 1));
        assert_eq!(info.autopilot, 3);
        assert!(!info.is_armed());
    }

    #[test]
    fn zero_link_timeout_never_connects() {
        let config = DecoderConfig::default().with_link_timeout(std::time::Duration::ZERO);
        let decoder = MavDecoder::with_config(config).unwrap();
        decoder.ingest(&heartbeat_frame(0));
        assert!(decoder.last_heartbeat().is_some());
        assert!(!decoder.is_vehicle_connected());
    }

    #[test]
    fn unknown_ids_are_tracked_up_to_cap() {
        let decoder = MavDecoder::new();
        let mut wire = BytesMut::new();
        for (sequence, id) in (1000u32..1300).enumerate() {
            encode_frame(&FrameHeader::v2(sequence as u8, 1, 1, id), &[], 0, &mut wire).unwrap();
        }
        assert_eq!(decoder.ingest(&wire), 300);
        decoder.ingest(&heartbeat_frame(0));

        let ids = decoder.seen_message_ids();
        assert_eq!(ids.len(), MAX_TRACKED_UNKNOWN_IDS + 1);
        assert_eq!(ids[0], 0);
        let expected: Vec<u32> = (1000..1000 + MAX_TRACKED_UNKNOWN_IDS as u32).collect();
        assert_eq!(ids[1..], expected[..]);
        assert_eq!(decoder.get_statistics().received, 301);
    }
}
