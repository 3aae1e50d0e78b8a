use std::time::Duration;

use mavwire_frame::{FrameConfig, SequenceScope};

/// Default window after the last heartbeat during which the vehicle is
/// considered connected.
pub const DEFAULT_LINK_TIMEOUT: Duration = Duration::from_secs(3);

/// Configuration for a [`crate::MavDecoder`].
#[derive(Debug, Clone, Copy)]
pub struct DecoderConfig {
    /// Independent byte streams decoded by one instance. Default: 1.
    pub channels: usize,
    /// Framing limits and CRC_EXTRA lookup. Default: the message catalog.
    pub frame: FrameConfig,
    /// How sequence gaps are attributed. Default: per channel.
    pub sequence_scope: SequenceScope,
    /// Heartbeat age after which the vehicle counts as disconnected.
    pub link_timeout: Duration,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            channels: 1,
            frame: mavwire_message::catalog::frame_config(),
            sequence_scope: SequenceScope::default(),
            link_timeout: DEFAULT_LINK_TIMEOUT,
        }
    }
}

impl DecoderConfig {
    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_max_payload_len(mut self, max: usize) -> Self {
        self.frame.max_payload_len = max;
        self
    }

    pub fn with_sequence_scope(mut self, scope: SequenceScope) -> Self {
        self.sequence_scope = scope;
        self
    }

    pub fn with_link_timeout(mut self, timeout: Duration) -> Self {
        self.link_timeout = timeout;
        self
    }
}
