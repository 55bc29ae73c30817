//! Raw-byte variant used by current Astronode firmware.
//!
//! ```text
//! ┌────────┬────────┬──────────────┬──────────┬─────────────┐
//! │ Header │ Opcode │ Param (2B)   │ Payload  │ CRC (2B)    │
//! │ 0x7f   │        │ pair-swapped │          │ pair-swapped│
//! └────────┴────────┴──────────────┴──────────┴─────────────┘
//! ```
//!
//! The CRC covers opcode, parameter field and payload.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::codec::{resolve, FrameCodec, Request, ResponseFrame, Variant};
use crate::crc::compute_crc;
use crate::error::{FrameError, Result};
use crate::field::{GeoOrder, HexField};

pub const HEADER: u8 = 0x7f;

/// Header, opcode, parameter field and CRC.
pub const MIN_FRAME: usize = 6;

#[derive(Debug, Clone, Copy, Default)]
pub struct RawCodec;

impl FrameCodec for RawCodec {
    fn variant(&self) -> Variant {
        Variant::Raw
    }

    fn geo_order(&self) -> GeoOrder {
        GeoOrder::LonLat
    }

    fn encode(&self, request: &Request) -> Result<Bytes> {
        let resolved = resolve(request)?;

        let mut wire = BytesMut::with_capacity(MIN_FRAME + resolved.payload.byte_len());
        wire.put_u8(HEADER);
        wire.put_u8(resolved.opcode.code());
        wire.put_slice(resolved.param.as_bytes());
        wire.put_slice(resolved.payload.as_bytes());
        let crc = compute_crc(&wire[1..]);
        wire.put_u16_le(crc);

        debug!(
            opcode = %resolved.opcode,
            param = %resolved.param,
            len = wire.len(),
            "raw frame encoded"
        );
        Ok(wire.freeze())
    }

    fn decode(&self, frame: &[u8]) -> Result<ResponseFrame> {
        if frame.len() < MIN_FRAME {
            return Err(FrameError::Truncated {
                len: frame.len(),
                min: MIN_FRAME,
            });
        }
        if frame[0] != HEADER {
            return Err(FrameError::BadHeader(frame[0]));
        }

        let split = frame.len() - 2;
        let received = u16::from_le_bytes([frame[split], frame[split + 1]]);
        let computed = compute_crc(&frame[1..split]);
        if received != computed {
            return Err(FrameError::BadCrc { received, computed });
        }

        Ok(ResponseFrame {
            opcode: frame[1],
            param: Some(HexField::from_bytes(&frame[2..4])),
            payload: Bytes::copy_from_slice(&frame[4..split]),
        })
    }
}
