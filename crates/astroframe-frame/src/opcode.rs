//! Operation codes.
//!
//! Every request names one operation. The operation decides how the 2-byte
//! parameter field of a raw frame is filled and what payload it accepts.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::{FrameError, Result};
use crate::field::{encode_datetime, HexField};

/// Operations understood by the modem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    /// Debug actions, see [`DebugCommand`].
    Debug = 0x01,
    /// Write configuration flags.
    ConfigWrite = 0x05,
    /// Write Wi-Fi credentials (Wi-Fi dev kit only).
    WifiWrite = 0x06,
    /// Read configuration.
    ConfigRead = 0x15,
    /// Queue an uplink payload.
    PayloadEnqueue = 0x25,
    /// Drop the oldest queued payload.
    PayloadDequeue = 0x26,
    /// Drop every queued payload.
    PayloadFree = 0x27,
    /// Write the asset geolocation.
    GeolocationWrite = 0x35,
    /// Read the acknowledgment key of the last delivered payload.
    AckKeyRead = 0x45,
    /// Clear the acknowledgment key.
    AckKeyClear = 0x46,
    /// Read pending events and downlink status.
    EventRead = 0x65,
}

/// How the parameter field of a raw frame is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamRule {
    /// Byte count of the payload.
    Length,
    /// A fixed value; the payload must be exactly that many bytes.
    Fixed(u16),
    /// Taken from the debug sub-operation.
    Debug,
}

impl OpCode {
    pub const ALL: [OpCode; 11] = [
        OpCode::Debug,
        OpCode::ConfigWrite,
        OpCode::WifiWrite,
        OpCode::ConfigRead,
        OpCode::PayloadEnqueue,
        OpCode::PayloadDequeue,
        OpCode::PayloadFree,
        OpCode::GeolocationWrite,
        OpCode::AckKeyRead,
        OpCode::AckKeyClear,
        OpCode::EventRead,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Short protocol name, e.g. `PLD_ER`.
    pub fn mnemonic(self) -> &'static str {
        match self {
            OpCode::Debug => "DBG",
            OpCode::ConfigWrite => "CFG_WR",
            OpCode::WifiWrite => "WIF_WR",
            OpCode::ConfigRead => "CFG_RR",
            OpCode::PayloadEnqueue => "PLD_ER",
            OpCode::PayloadDequeue => "PLD_DR",
            OpCode::PayloadFree => "PLD_FR",
            OpCode::GeolocationWrite => "GEO_WR",
            OpCode::AckKeyRead => "SAK_RR",
            OpCode::AckKeyClear => "SAK_CR",
            OpCode::EventRead => "EVT_RR",
        }
    }

    /// Look an operation up by mnemonic, ignoring case.
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(name))
    }

    pub fn param_rule(self) -> ParamRule {
        match self {
            OpCode::PayloadEnqueue | OpCode::ConfigWrite | OpCode::WifiWrite => ParamRule::Length,
            OpCode::GeolocationWrite => ParamRule::Fixed(8),
            OpCode::Debug => ParamRule::Debug,
            OpCode::PayloadDequeue
            | OpCode::PayloadFree
            | OpCode::ConfigRead
            | OpCode::EventRead
            | OpCode::AckKeyRead
            | OpCode::AckKeyClear => ParamRule::Fixed(0),
        }
    }
}

impl TryFrom<u8> for OpCode {
    type Error = FrameError;

    fn try_from(code: u8) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.code() == code)
            .ok_or(FrameError::UnsupportedOpcode(code))
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Debug sub-operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugCommand {
    /// Set the modem real-time clock.
    SetRtc(DateTime<Utc>),
    /// Raise a fake alarm event.
    FakeAlarm,
}

impl DebugCommand {
    pub const SET_RTC: u8 = 0x01;
    pub const FAKE_ALARM: u8 = 0x03;

    /// Set the clock to the current UTC time.
    pub fn set_rtc_now() -> Self {
        DebugCommand::SetRtc(Utc::now())
    }

    pub fn sub_opcode(&self) -> u8 {
        match self {
            DebugCommand::SetRtc(_) => Self::SET_RTC,
            DebugCommand::FakeAlarm => Self::FAKE_ALARM,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DebugCommand::SetRtc(_) => "set-rtc",
            DebugCommand::FakeAlarm => "fake-alarm",
        }
    }

    /// Parameter field value for raw frames.
    pub fn param(&self) -> u16 {
        match self {
            DebugCommand::SetRtc(_) => 7,
            DebugCommand::FakeAlarm => 1,
        }
    }

    pub fn payload(&self) -> HexField {
        match self {
            DebugCommand::SetRtc(now) => encode_datetime(now),
            DebugCommand::FakeAlarm => HexField::empty(),
        }
    }
}
