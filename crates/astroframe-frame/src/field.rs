//! Field encoders.
//!
//! Integer fields go on the wire pair-swapped: the big-endian hex rendering
//! with its digit pairs reversed, so `0x0001` becomes `0100` and
//! `0x03ebd4de` becomes `ded4eb03`. This is exactly the little-endian byte
//! order of the integer, which is how the encoders below produce it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::error::{FrameError, Result};

/// Scale between degrees and the fixed-point wire value.
pub const GEO_SCALE: f64 = 1e7;

/// Largest user payload accepted by the modem in one uplink.
pub const MAX_UPLINK_PAYLOAD: usize = 160;

/// Wi-Fi credential slot sizes in bytes (SSID, password, token).
pub const WIFI_SSID_LEN: usize = 33;
pub const WIFI_PASSWORD_LEN: usize = 64;
pub const WIFI_TOKEN_LEN: usize = 97;

/// A run of whole bytes, rendered as lowercase hex.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct HexField(Vec<u8>);

impl HexField {
    /// Parse a hex string. Upper and lower case digits are accepted.
    pub fn parse(hex: &str) -> Result<Self> {
        Ok(Self(hex::decode(hex)?))
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// A 16-bit integer as a pair-swapped 4-digit field.
    pub fn from_u16(value: u16) -> Self {
        Self(value.to_le_bytes().to_vec())
    }

    /// A 32-bit signed integer as a pair-swapped 8-digit field.
    pub fn from_i32(value: i32) -> Self {
        Self(value.to_le_bytes().to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Number of bytes (half the digit count).
    pub fn byte_len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append another field.
    pub fn push(&mut self, other: &HexField) {
        self.0.extend_from_slice(&other.0);
    }
}

impl fmt::Display for HexField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl FromStr for HexField {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<[u8]> for HexField {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Reverse the digit pairs of a hex string: `abcd` becomes `cdab`.
///
/// Applying it twice gives back the input.
pub fn pair_swap(digits: &str) -> Result<String> {
    if digits.len() % 2 != 0 || !digits.is_ascii() {
        return Err(FrameError::invalid(format!(
            "pair swap needs an even number of ascii digits, got {digits:?}"
        )));
    }
    let pairs: Vec<&str> = (0..digits.len())
        .step_by(2)
        .map(|i| &digits[i..i + 2])
        .collect();
    Ok(pairs.into_iter().rev().collect())
}

/// Length field for a payload: its byte count, pair-swapped.
pub fn encode_length(payload_hex: &str) -> Result<HexField> {
    length_of(&HexField::parse(payload_hex)?)
}

/// Length field for an already decoded payload.
pub fn length_of(payload: &HexField) -> Result<HexField> {
    let len = u16::try_from(payload.byte_len()).map_err(|_| {
        FrameError::invalid(format!(
            "payload of {} bytes does not fit a length field",
            payload.byte_len()
        ))
    })?;
    Ok(HexField::from_u16(len))
}

/// Which coordinate comes first in a geolocation field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoOrder {
    LatLon,
    LonLat,
}

/// Degrees to the fixed-point wire value, truncated toward zero.
pub fn to_fixed_point(degrees: f64, limit: f64, what: &str) -> Result<i32> {
    if !degrees.is_finite() || degrees.abs() > limit {
        return Err(FrameError::invalid(format!(
            "{what} {degrees} outside [-{limit}, {limit}]"
        )));
    }
    Ok((degrees * GEO_SCALE) as i32)
}

/// Geolocation field: two pair-swapped 32-bit fixed-point words in `order`.
pub fn encode_geolocation(order: GeoOrder, lon: f64, lat: f64) -> Result<HexField> {
    let lon = HexField::from_i32(to_fixed_point(lon, 180.0, "longitude")?);
    let lat = HexField::from_i32(to_fixed_point(lat, 90.0, "latitude")?);
    let (first, second) = match order {
        GeoOrder::LatLon => (lat, lon),
        GeoOrder::LonLat => (lon, lat),
    };
    let mut field = first;
    field.push(&second);
    Ok(field)
}

/// Clock field: year within the century, month, day, hour, minute, second,
/// one byte each, in that order.
pub fn encode_datetime(now: &DateTime<Utc>) -> HexField {
    HexField::from_bytes(vec![
        now.year().rem_euclid(100) as u8,
        now.month() as u8,
        now.day() as u8,
        now.hour() as u8,
        now.minute() as u8,
        now.second() as u8,
    ])
}

/// Uplink payload: pair-swapped 16-bit payload id followed by the data.
pub fn encode_payload_message(id: u16, data: &[u8]) -> Result<HexField> {
    if data.len() > MAX_UPLINK_PAYLOAD {
        return Err(FrameError::invalid(format!(
            "uplink payload of {} bytes exceeds {MAX_UPLINK_PAYLOAD}",
            data.len()
        )));
    }
    let mut field = HexField::from_u16(id);
    field.push(&HexField::from_bytes(data));
    Ok(field)
}

/// Wi-Fi credentials: each value zero-padded into its fixed slot.
pub fn encode_wifi_config(ssid: &str, password: &str, token: &str) -> Result<HexField> {
    let mut field = HexField::empty();
    for (value, slot, what) in [
        (ssid, WIFI_SSID_LEN, "ssid"),
        (password, WIFI_PASSWORD_LEN, "password"),
        (token, WIFI_TOKEN_LEN, "token"),
    ] {
        if value.len() > slot {
            return Err(FrameError::invalid(format!(
                "{what} of {} bytes exceeds its {slot}-byte slot",
                value.len()
            )));
        }
        let mut bytes = value.as_bytes().to_vec();
        bytes.resize(slot, 0);
        field.push(&HexField::from_bytes(bytes));
    }
    Ok(field)
}
