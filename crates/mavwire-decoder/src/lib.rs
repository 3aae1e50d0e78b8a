//! Stream decoder: the layer applications hold on to.
//!
//! A [`MavDecoder`] owns per-channel framing state, loss accounting,
//! statistics and a non-owning handler slot. Feed it bytes from any thread;
//! decoded messages reach the registered [`MessageHandler`] synchronously.
//!
//! [`MessageHandler`]: mavwire_message::MessageHandler

pub mod config;
pub mod decoder;
pub mod error;
pub mod link;
mod order;
mod slot;
pub mod stats;

pub use config::DecoderConfig;
pub use decoder::{MavDecoder, MAX_TRACKED_UNKNOWN_IDS};
pub use error::{DecoderError, Result};
pub use link::HeartbeatInfo;
pub use stats::{Statistics, StatisticsTracker};
