use std::fmt;
use std::str::FromStr;

use bytes::Bytes;

use crate::error::{FrameError, Result};
use crate::field::{length_of, GeoOrder, HexField};
use crate::legacy::LegacyCodec;
use crate::opcode::{DebugCommand, OpCode, ParamRule};
use crate::raw::RawCodec;

/// A command to send: operation, optional debug sub-operation, payload.
///
/// The opcode is kept as a raw byte so that requests built from user input
/// are checked against the operation table when they are encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub opcode: u8,
    pub debug: Option<DebugCommand>,
    pub payload: HexField,
}

impl Request {
    pub fn new(opcode: OpCode, payload: HexField) -> Self {
        Self::raw(opcode.code(), payload)
    }

    /// An operation with no payload.
    pub fn bare(opcode: OpCode) -> Self {
        Self::new(opcode, HexField::empty())
    }

    /// An operation given by number.
    pub fn raw(opcode: u8, payload: HexField) -> Self {
        Self {
            opcode,
            debug: None,
            payload,
        }
    }

    pub fn debug(command: DebugCommand) -> Self {
        Self {
            opcode: OpCode::Debug.code(),
            debug: Some(command),
            payload: HexField::empty(),
        }
    }
}

/// A request checked against the operation table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Resolved {
    pub opcode: OpCode,
    pub param: HexField,
    pub sub_opcode: Option<u8>,
    pub payload: HexField,
}

/// Validate `request` and derive its parameter field.
///
/// Shared by both codecs so that a request is accepted or rejected the same
/// way whichever variant sends it.
pub(crate) fn resolve(request: &Request) -> Result<Resolved> {
    let opcode = OpCode::try_from(request.opcode)?;

    match (opcode.param_rule(), request.debug) {
        (ParamRule::Debug, Some(command)) => {
            if !request.payload.is_empty() {
                return Err(FrameError::invalid(
                    "debug payload is derived from the sub-operation",
                ));
            }
            Ok(Resolved {
                opcode,
                param: HexField::from_u16(command.param()),
                sub_opcode: Some(command.sub_opcode()),
                payload: command.payload(),
            })
        }
        (ParamRule::Debug, None) => {
            Err(FrameError::invalid("debug operation needs a sub-operation"))
        }
        (_, Some(command)) => Err(FrameError::invalid(format!(
            "{} takes no debug sub-operation (got {})",
            opcode,
            command.name()
        ))),
        (ParamRule::Length, None) => Ok(Resolved {
            opcode,
            param: length_of(&request.payload)?,
            sub_opcode: None,
            payload: request.payload.clone(),
        }),
        (ParamRule::Fixed(len), None) => {
            if request.payload.byte_len() != usize::from(len) {
                return Err(FrameError::PayloadLength {
                    opcode: opcode.mnemonic(),
                    expected: usize::from(len),
                    actual: request.payload.byte_len(),
                });
            }
            Ok(Resolved {
                opcode,
                param: HexField::from_u16(len),
                sub_opcode: None,
                payload: request.payload.clone(),
            })
        }
    }
}

/// A response frame split into its parts. Only structure and CRC are
/// checked; the payload is not interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFrame {
    pub opcode: u8,
    /// Parameter field, raw frames only.
    pub param: Option<HexField>,
    pub payload: Bytes,
}

/// The two frame layouts spoken by Astronode firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// STX, ASCII hex of opcode/payload/CRC, ETX.
    Legacy,
    /// `0x7f`, opcode, parameter field, payload, CRC as raw bytes.
    #[default]
    Raw,
}

impl Variant {
    pub fn name(self) -> &'static str {
        match self {
            Variant::Legacy => "legacy",
            Variant::Raw => "raw",
        }
    }

    pub fn codec(self) -> Box<dyn FrameCodec> {
        match self {
            Variant::Legacy => Box::new(LegacyCodec),
            Variant::Raw => Box::new(RawCodec),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" | "a" => Ok(Variant::Legacy),
            "raw" | "b" => Ok(Variant::Raw),
            other => {
                let msg = format!("unknown frame variant {other:?}");
                Err(FrameError::invalid(msg))
            }
        }
    }
}

/// Builds request frames and parses response frames for one variant.
pub trait FrameCodec: Send + Sync {
    fn variant(&self) -> Variant;

    /// Coordinate order this variant uses in geolocation payloads.
    fn geo_order(&self) -> GeoOrder;

    /// Assemble the on-wire bytes for `request`.
    ///
    /// Fails before producing any bytes when the opcode is unknown or the
    /// payload does not fit the operation.
    fn encode(&self, request: &Request) -> Result<Bytes>;

    /// Split a received frame into its parts and verify its CRC.
    fn decode(&self, frame: &[u8]) -> Result<ResponseFrame>;
}
