//! Delimiter-framed variant used by early Astronode firmware.
//!
//! ```text
//! ┌──────┬──────────────────────────────────────────────┬──────┐
//! │ STX  │ ASCII hex of: opcode │ payload │ crc (swapped) │ ETX  │
//! │ 0x02 │ 2 chars  │ 2n chars │ 4 chars                 │ 0x03 │
//! └──────┴──────────────────────────────────────────────┴──────┘
//! ```
//!
//! The frame body is sent as the characters of its lowercase hex rendering,
//! so every body byte costs two bytes on the wire. The CRC covers the body
//! bytes (opcode and payload), not the ASCII text or the delimiters.
//!
//! Debug requests carry the sub-operation byte ahead of its payload.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::codec::{resolve, FrameCodec, Request, ResponseFrame, Variant};
use crate::crc::compute_crc;
use crate::error::{FrameError, Result};
use crate::field::GeoOrder;

pub const STX: u8 = 0x02;
pub const ETX: u8 = 0x03;

/// Opcode and CRC, before hex expansion.
const MIN_BODY: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyCodec;

impl FrameCodec for LegacyCodec {
    fn variant(&self) -> Variant {
        Variant::Legacy
    }

    fn geo_order(&self) -> GeoOrder {
        GeoOrder::LatLon
    }

    fn encode(&self, request: &Request) -> Result<Bytes> {
        let resolved = resolve(request)?;

        let mut body = Vec::with_capacity(MIN_BODY + 1 + resolved.payload.byte_len());
        body.push(resolved.opcode.code());
        if let Some(sub) = resolved.sub_opcode {
            body.push(sub);
        }
        body.extend_from_slice(resolved.payload.as_bytes());
        let crc = compute_crc(&body);
        body.extend_from_slice(&crc.to_le_bytes());

        let text = hex::encode(&body);
        let mut wire = BytesMut::with_capacity(text.len() + 2);
        wire.put_u8(STX);
        wire.put_slice(text.as_bytes());
        wire.put_u8(ETX);

        debug!(
            opcode = %resolved.opcode,
            body = %text,
            len = wire.len(),
            "legacy frame encoded"
        );
        Ok(wire.freeze())
    }

    fn decode(&self, frame: &[u8]) -> Result<ResponseFrame> {
        let min = MIN_BODY * 2 + 2;
        if frame.len() < min {
            return Err(FrameError::Truncated {
                len: frame.len(),
                min,
            });
        }
        if frame[0] != STX || frame[frame.len() - 1] != ETX {
            return Err(FrameError::BadDelimiter);
        }

        let body = hex::decode(&frame[1..frame.len() - 1])?;
        let split = body.len() - 2;
        let received = u16::from_le_bytes([body[split], body[split + 1]]);
        let computed = compute_crc(&body[..split]);
        if received != computed {
            return Err(FrameError::BadCrc { received, computed });
        }

        Ok(ResponseFrame {
            opcode: body[0],
            param: None,
            payload: Bytes::copy_from_slice(&body[1..split]),
        })
    }
}
