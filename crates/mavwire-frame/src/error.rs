use crate::codec::ProtocolVersion;

/// Errors that can occur during frame encoding or blocking reads.
///
/// Malformed input never produces an error: the parser resynchronizes on its
/// own. These variants cover caller mistakes and I/O only.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload exceeds what a length byte can describe.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The message identifier does not fit the header of the chosen version.
    #[error("message id {id} does not fit a {version} frame")]
    MessageIdOutOfRange { id: u32, version: ProtocolVersion },

    /// An I/O error occurred while reading frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream reached EOF before another complete frame was received.
    #[error("stream closed (no further complete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
