//! Typed message records and dispatch for validated frames.
//!
//! The catalog is closed: every supported message id maps to one record type,
//! its base payload length and its CRC_EXTRA seed. Frames with ids outside the
//! catalog decode to nothing.

pub mod catalog;
pub mod handler;
pub mod messages;

pub use catalog::{CatalogEntry, Decoded, Message, PayloadFit, CATALOG};
pub use handler::{FnHandler, MessageHandler, Source};
pub use messages::*;
