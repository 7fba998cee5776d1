//! Decode-service adapter.
//!
//! Pixel decoding belongs to the host. The surface only needs the final
//! bitmap size and whether the decode succeeded, so this module provides:
//! - [`probe_image`] for hosts that hand over encoded bytes
//! - [`DecodeTracker`] which enforces the progress/terminal contract of an
//!   asynchronous decode service

mod probe;
mod tracker;
mod types;

pub use probe::probe_image;
pub use tracker::DecodeTracker;
pub use types::{DecodeError, DecodeEvent, ImageInfo, Orientation};
