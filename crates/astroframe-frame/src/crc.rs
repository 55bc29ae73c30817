//! Frame checksum.
//!
//! CRC-16 with polynomial 0x1021, no reflection, initial register 0xFFFF and
//! no output XOR (catalogued as CRC-16/IBM-3740, often called CCITT-FALSE).
//! On the wire the two CRC bytes are pair-swapped like every other integer
//! field.

use crc::{Algorithm, Crc};

use crate::error::Result;
use crate::field::HexField;

/// The Astronode frame checksum algorithm.
pub const ASTRONODE_CRC16: Algorithm<u16> = crc::CRC_16_IBM_3740;

const CRC16: Crc<u16> = Crc::<u16>::new(&ASTRONODE_CRC16);

/// Checksum of `bytes` as an integer.
pub fn compute_crc(bytes: &[u8]) -> u16 {
    CRC16.checksum(bytes)
}

/// Checksum of `bytes` as its 2-byte wire field.
pub fn crc_field(bytes: &[u8]) -> HexField {
    HexField::from_u16(compute_crc(bytes))
}

/// Checksum of a hex string as its wire field.
///
/// Fails when the string is not whole bytes of hex.
pub fn crc_of_hex(hex: &str) -> Result<HexField> {
    let field = HexField::parse(hex)?;
    Ok(crc_field(field.as_bytes()))
}
