use serde::Serialize;

/// Point-in-time copy of a decoder's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    /// Structurally complete frames, including checksum failures.
    pub received: u64,
    /// Frames inferred lost from sequence gaps since the last reset.
    pub dropped: u64,
    /// Checksum failures plus v1 payloads whose length disagrees with the catalog.
    pub parse_errors: u64,
    /// Raw bytes fed to the decoder.
    pub bytes_received: u64,
}

impl From<Statistics> for (u64, u64, u64) {
    fn from(stats: Statistics) -> Self {
        (stats.received, stats.dropped, stats.parse_errors)
    }
}

/// Counter set mutated under the decoder lock.
#[derive(Debug, Default)]
pub struct StatisticsTracker {
    current: Statistics,
}

impl StatisticsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_received(&mut self) {
        self.current.received = self.current.received.saturating_add(1);
    }

    pub fn record_dropped(&mut self, count: u32) {
        self.current.dropped = self.current.dropped.saturating_add(u64::from(count));
    }

    pub fn record_parse_error(&mut self) {
        self.current.parse_errors = self.current.parse_errors.saturating_add(1);
    }

    pub fn record_bytes(&mut self, count: usize) {
        let count = u64::try_from(count).unwrap_or(u64::MAX);
        self.current.bytes_received = self.current.bytes_received.saturating_add(count);
    }

    pub fn snapshot(&self) -> Statistics {
        self.current
    }

    pub fn reset(&mut self) {
        self.current = Statistics::default();
    }
}
