//! Command framing and serial sessions for Astronode satellite modems.
//!
//! # Crate Structure
//!
//! - [`transport`]: Blocking serial link with windowed response reads
//! - [`frame`]: CRC, field encoders, opcode table, legacy and raw codecs
//! - [`session`]: Send commands over a link and collect responses

/// Re-export transport types.
pub mod transport {
    pub use astroframe_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use astroframe_frame::*;
}

/// Re-export session types.
pub mod session {
    pub use astroframe_session::*;
}
