//! Command framing for Astronode satellite modems.
//!
//! This is the core of astroframe. It turns typed command intent into the
//! exact bytes the modem expects, and splits response frames back into
//! their parts. It performs no I/O.
//!
//! Two frame layouts exist, both behind the [`FrameCodec`] trait:
//! - [`LegacyCodec`]: STX, ASCII hex of opcode/payload/CRC, ETX
//! - [`RawCodec`]: `0x7f`, opcode, 2-byte parameter field, payload, CRC
//!
//! They share the CRC engine ([`crc`]), the field encoders ([`field`]) and
//! the operation table ([`opcode`]).

pub mod codec;
pub mod crc;
pub mod error;
pub mod field;
pub mod legacy;
pub mod opcode;
pub mod raw;

pub use codec::{FrameCodec, Request, ResponseFrame, Variant};
pub use crc::{compute_crc, crc_field, crc_of_hex, ASTRONODE_CRC16};
pub use error::{FrameError, Result};
pub use field::{
    encode_datetime, encode_geolocation, encode_length, encode_payload_message, encode_wifi_config,
    pair_swap, GeoOrder, HexField, MAX_UPLINK_PAYLOAD,
};
pub use legacy::LegacyCodec;
pub use opcode::{DebugCommand, OpCode, ParamRule};
pub use raw::RawCodec;
