//! Vehicle link status derived from heartbeats.

use std::time::{Duration, Instant};

use mavwire_message::{Heartbeat, Source, MODE_FLAG_SAFETY_ARMED};
use tracing::info;

/// The most recent heartbeat and when it arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatInfo {
    pub source: Source,
    pub mav_type: u8,
    pub autopilot: u8,
    pub base_mode: u8,
    pub custom_mode: u32,
    pub system_status: u8,
    pub received_at: Instant,
}

impl HeartbeatInfo {
    pub fn is_armed(&self) -> bool {
        self.base_mode & MODE_FLAG_SAFETY_ARMED != 0
    }

    pub fn age(&self) -> Duration {
        self.received_at.elapsed()
    }
}

#[derive(Debug)]
pub(crate) struct LinkMonitor {
    last: Option<HeartbeatInfo>,
    timeout: Duration,
}

impl LinkMonitor {
    pub(crate) fn new(timeout: Duration) -> Self {
        Self {
            last: None,
            timeout,
        }
    }

    /// Record a heartbeat. Logs once whenever the link comes up.
    pub(crate) fn observe(&mut self, source: Source, heartbeat: &Heartbeat, now: Instant) {
        if !self.is_connected(now) {
            info!(
                system_id = source.system_id,
                component_id = source.component_id,
                mav_type = heartbeat.mav_type,
                autopilot = heartbeat.autopilot,
                "vehicle connected"
            );
        }
        self.last = Some(HeartbeatInfo {
            source,
            mav_type: heartbeat.mav_type,
            autopilot: heartbeat.autopilot,
            base_mode: heartbeat.base_mode,
            custom_mode: heartbeat.custom_mode,
            system_status: heartbeat.system_status,
            received_at: now,
        });
    }

    pub(crate) fn last(&self) -> Option<HeartbeatInfo> {
        self.last
    }

    pub(crate) fn is_connected(&self, now: Instant) -> bool {
        self.last
            .is_some_and(|hb| now.saturating_duration_since(hb.received_at) < self.timeout)
    }
}
