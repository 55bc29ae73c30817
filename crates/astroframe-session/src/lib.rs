//! Command sessions with an Astronode modem.
//!
//! A [`Session`] owns one link and one frame codec. Each call encodes a
//! request, writes it, and returns the response window undecoded. Parsing
//! the response is a separate, explicit step ([`Session::decode`]).

pub mod config;
pub mod connector;
pub mod error;
pub mod session;

pub use config::{SessionConfig, DEFAULT_RESPONSE_MAX_BYTES};
pub use connector::{connect, connect_with_config};
pub use error::{Result, SessionError};
pub use session::{Exchange, Session};
