//! Sequence-gap loss accounting.
//!
//! Every sender increments an 8-bit sequence number per frame. A jump larger
//! than one between consecutive valid frames means frames were lost in
//! transit. Only checksum-valid frames may be observed: a corrupt frame has no
//! trustworthy sequence field.

use std::collections::HashMap;

use crate::codec::FrameHeader;

/// Gap detector for one sequence stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceTracker {
    last: Option<u8>,
}

impl SequenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sequence number and return how many frames were skipped.
    ///
    /// The first observation sets the baseline and reports no loss. Wraparound
    /// from 255 to 0 is a normal step. A repeated number reports no loss.
    pub fn observe(&mut self, sequence: u8) -> u32 {
        let lost = match self.last {
            None => 0,
            Some(last) => match sequence.wrapping_sub(last) {
                0 => 0,
                step => u32::from(step - 1),
            },
        };
        self.last = Some(sequence);
        lost
    }

    /// Last observed sequence number.
    pub fn last_sequence(&self) -> Option<u8> {
        self.last
    }

    /// Forget the baseline; the next observation reports no loss.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Which frames share a sequence counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SequenceScope {
    /// One counter per channel, regardless of sender.
    #[default]
    Channel,
    /// One counter per (system id, component id) within a channel.
    Source,
}

/// Loss accounting for one channel.
#[derive(Debug, Clone, Default)]
pub struct LossTracker {
    scope: SequenceScope,
    channel: SequenceTracker,
    sources: HashMap<(u8, u8), SequenceTracker>,
}

impl LossTracker {
    pub fn new(scope: SequenceScope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    /// Observe a checksum-valid frame and return the number of frames lost
    /// before it.
    pub fn observe(&mut self, header: &FrameHeader) -> u32 {
        let channel_lost = self.channel.observe(header.sequence);
        match self.scope {
            SequenceScope::Channel => channel_lost,
            SequenceScope::Source => self
                .sources
                .entry((header.system_id, header.component_id))
                .or_default()
                .observe(header.sequence),
        }
    }

    /// Sequence number of the last valid frame on this channel.
    pub fn last_sequence(&self) -> Option<u8> {
        self.channel.last_sequence()
    }

    pub fn scope(&self) -> SequenceScope {
        self.scope
    }

    pub fn reset(&mut self) {
        self.channel.reset();
        self.sources.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lost_over(sequence: &[u8]) -> u32 {
        let mut tracker = SequenceTracker::new();
        sequence.iter().map(|seq| tracker.observe(*seq)).sum()
    }

    #[test]
    fn first_frame_sets_baseline() {
        let mut tracker = SequenceTracker::new();
        assert_eq!(tracker.observe(200), 0);
        assert_eq!(tracker.last_sequence(), Some(200));
    }

    #[test]
    fn consecutive_sequence_has_no_loss() {
        assert_eq!(lost_over(&[0, 1, 2, 3, 4]), 0);
    }

    #[test]
    fn gap_counts_skipped_frames() {
        assert_eq!(lost_over(&[250, 251, 252, 255]), 2);
    }

    #[test]
    fn wraparound_is_not_a_gap() {
        assert_eq!(lost_over(&[254, 255, 0, 1]), 0);
    }

    #[test]
    fn gap_across_wraparound() {
        assert_eq!(lost_over(&[254, 2]), 3);
    }

    #[test]
    fn repeated_sequence_is_not_loss() {
        assert_eq!(lost_over(&[10, 10, 11]), 0);
    }

    #[test]
    fn reset_clears_baseline() {
        let mut tracker = SequenceTracker::new();
        tracker.observe(10);
        tracker.reset();
        assert_eq!(tracker.observe(50), 0);
    }

    fn header(system_id: u8, sequence: u8) -> FrameHeader {
        FrameHeader::v2(sequence, system_id, 1, 0)
    }

    #[test]
    fn channel_scope_mixes_senders() {
        let mut loss = LossTracker::new(SequenceScope::Channel);
        assert_eq!(loss.observe(&header(1, 10)), 0);
        assert_eq!(loss.observe(&header(2, 100)), 89);
    }

    #[test]
    fn source_scope_tracks_senders_independently() {
        let mut loss = LossTracker::new(SequenceScope::Source);
        assert_eq!(loss.observe(&header(1, 10)), 0);
        assert_eq!(loss.observe(&header(2, 100)), 0);
        assert_eq!(loss.observe(&header(1, 11)), 0);
        assert_eq!(loss.observe(&header(2, 103)), 2);
        assert_eq!(loss.last_sequence(), Some(103));
    }
}
