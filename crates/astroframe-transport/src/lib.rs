//! Blocking serial transport for Astronode modems.
//!
//! This is the lowest layer of astroframe. It knows nothing about frames:
//! it writes byte sequences and reads back a bounded response window.
//!
//! A response window closes when the first of these happens:
//! - `max_bytes` have arrived
//! - the line stays silent for the inter-byte timeout after the first byte
//! - the overall read timeout expires
//!
//! Everything above this crate talks to the [`Link`] trait, so the codec and
//! session layers can be driven by in-memory links in tests.

pub mod error;
pub mod serial;
pub mod stream;
pub mod traits;

pub use error::{Result, TransportError};
pub use serial::{available_ports, SerialConfig, SerialLink, DEFAULT_BAUD_RATE, DEFAULT_PORT};
pub use stream::{read_window, write_all, ReadWindow, TimedRead};
pub use traits::{Link, ReadEnd, ReadOutcome};
