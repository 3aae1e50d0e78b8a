//! MAVLink telemetry stream decoding.
//!
//! mavwire turns a noisy, arbitrarily chunked byte stream from a UDP socket or
//! serial link back into typed telemetry records and routes each one to a
//! consumer-supplied handler.
//!
//! # Crate Structure
//!
//! - [`frame`]: framing state machine, X.25 checksum, sequence loss tracking
//! - [`message`]: closed message catalog, typed records, handler trait
//! - [`decoder`]: thread-safe decoder with statistics and handler slot
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use mavwire::message::{Heartbeat, MessageHandler, Source};
//! use mavwire::MavDecoder;
//!
//! struct Printer;
//!
//! impl MessageHandler for Printer {
//!     fn on_heartbeat(&self, source: Source, msg: Heartbeat) {
//!         println!("{source:?} armed={}", msg.is_armed());
//!     }
//! }
//!
//! let decoder = MavDecoder::new();
//! let printer = Arc::new(Printer);
//! decoder.set_handler(Some(&printer));
//! decoder.ingest(&[0xFE, 0x09, 0x01, 0x01, 0x01, 0x00]);
//! ```

/// Re-export frame types.
pub mod frame {
    pub use mavwire_frame::*;
}

/// Re-export message types.
pub mod message {
    pub use mavwire_message::*;
}

/// Re-export decoder types.
pub mod decoder {
    pub use mavwire_decoder::*;
}

pub use mavwire_decoder::{MavDecoder, Statistics};
