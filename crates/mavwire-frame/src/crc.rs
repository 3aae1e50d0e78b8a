//! CRC-16/MCRF4XX (X.25) checksum used by the frame trailer.

/// Seed value of a fresh accumulator.
pub const X25_INIT: u16 = 0xFFFF;

/// Incremental X.25 accumulator.
///
/// The parser feeds bytes one at a time as they arrive, so there is no
/// second pass over the buffered frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct X25(u16);

impl X25 {
    /// Start a new accumulation.
    pub fn new() -> Self {
        Self(X25_INIT)
    }

    /// Fold one byte into the running value.
    pub fn accumulate(&mut self, byte: u8) {
        let mut tmp = byte ^ (self.0 & 0xFF) as u8;
        tmp ^= tmp << 4;
        let tmp = u16::from(tmp);
        self.0 = (self.0 >> 8) ^ (tmp << 8) ^ (tmp << 3) ^ (tmp >> 4);
    }

    /// Fold a slice of bytes into the running value.
    pub fn accumulate_slice(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.accumulate(*byte);
        }
    }

    /// Current checksum value.
    pub fn value(self) -> u16 {
        self.0
    }
}

impl Default for X25 {
    fn default() -> Self {
        Self::new()
    }
}

/// Checksum of `bytes` followed by the message's CRC_EXTRA seed.
pub fn checksum(bytes: &[u8], crc_extra: u8) -> u16 {
    let mut crc = X25::new();
    crc.accumulate_slice(bytes);
    crc.accumulate(crc_extra);
    crc.value()
}
