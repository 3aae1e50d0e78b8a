use mavwire_frame::MAX_CHANNELS;

/// Errors that can occur in decoder operations.
///
/// Stream content never produces an error; corrupt input is counted in
/// [`crate::Statistics`] instead.
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    /// The channel index is not configured on this decoder.
    #[error("channel {channel} out of range (decoder has {count})")]
    UnknownChannel { channel: usize, count: usize },

    /// The configured channel count is zero or above the supported maximum.
    #[error("invalid channel count {0} (expected 1..={max})", max = MAX_CHANNELS)]
    InvalidChannelCount(usize),
}

pub type Result<T> = std::result::Result<T, DecoderError>;
