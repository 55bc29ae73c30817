use astroframe_frame::{
    encode_geolocation, encode_payload_message, encode_wifi_config, DebugCommand, FrameCodec,
    HexField, OpCode, Request, ResponseFrame, Variant,
};
use astroframe_transport::{Link, ReadOutcome};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::config::DEFAULT_RESPONSE_MAX_BYTES;
use crate::error::Result;

/// One command and the response window that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// Bytes handed to the link.
    pub sent: Bytes,
    /// Bytes read back, undecoded.
    pub response: ReadOutcome,
}

impl Exchange {
    /// True when the read window expired on its overall timeout.
    pub fn timed_out(&self) -> bool {
        self.response.timed_out()
    }
}

/// A command session with one modem.
///
/// The session owns its link exclusively; `send` takes `&mut self`, so one
/// exchange completes before the next can start.
pub struct Session<L> {
    link: L,
    codec: Box<dyn FrameCodec>,
    response_max_bytes: usize,
}

impl<L: Link> Session<L> {
    /// Speak `variant` over `link`.
    pub fn new(link: L, variant: Variant) -> Self {
        Self::with_codec(link, variant.codec(), DEFAULT_RESPONSE_MAX_BYTES)
    }

    pub fn with_codec(link: L, codec: Box<dyn FrameCodec>, response_max_bytes: usize) -> Self {
        Self {
            link,
            codec,
            response_max_bytes,
        }
    }

    pub fn codec(&self) -> &dyn FrameCodec {
        self.codec.as_ref()
    }

    pub fn variant(&self) -> Variant {
        self.codec.variant()
    }

    pub fn response_max_bytes(&self) -> usize {
        self.response_max_bytes
    }

    pub fn set_response_max_bytes(&mut self, max: usize) {
        self.response_max_bytes = max;
    }

    /// Encode `request`, write it, and read the response window.
    ///
    /// Encoding errors are returned before anything is written. The response
    /// is not validated; see [`Session::decode`].
    pub fn send(&mut self, request: &Request) -> Result<Exchange> {
        let sent = self.codec.encode(request)?;
        debug!(
            link = self.link.describe(),
            variant = %self.codec.variant(),
            frame = %hex::encode(&sent),
            "sending frame"
        );

        self.link.write_frame(&sent)?;
        let response = self.link.read_response(self.response_max_bytes)?;

        if response.is_empty() {
            warn!(
                link = self.link.describe(),
                end = response.end.as_str(),
                "no response from modem"
            );
        } else {
            debug!(
                link = self.link.describe(),
                end = response.end.as_str(),
                response = %hex::encode(&response.bytes),
                "response received"
            );
        }

        Ok(Exchange { sent, response })
    }

    /// Parse the response of an exchange with this session's codec.
    pub fn decode(&self, exchange: &Exchange) -> Result<ResponseFrame> {
        Ok(self.codec.decode(&exchange.response.bytes)?)
    }

    /// Queue an uplink payload under `id`.
    pub fn enqueue_payload(&mut self, id: u16, data: &[u8]) -> Result<Exchange> {
        let payload = encode_payload_message(id, data)?;
        self.send(&Request::new(OpCode::PayloadEnqueue, payload))
    }

    pub fn dequeue_payload(&mut self) -> Result<Exchange> {
        self.send(&Request::bare(OpCode::PayloadDequeue))
    }

    pub fn free_payloads(&mut self) -> Result<Exchange> {
        self.send(&Request::bare(OpCode::PayloadFree))
    }

    /// Write the asset position, in the coordinate order of this variant.
    pub fn write_geolocation(&mut self, lon: f64, lat: f64) -> Result<Exchange> {
        let payload = encode_geolocation(self.codec.geo_order(), lon, lat)?;
        self.send(&Request::new(OpCode::GeolocationWrite, payload))
    }

    pub fn write_configuration(&mut self, config: HexField) -> Result<Exchange> {
        self.send(&Request::new(OpCode::ConfigWrite, config))
    }

    pub fn write_wifi(&mut self, ssid: &str, password: &str, token: &str) -> Result<Exchange> {
        let payload = encode_wifi_config(ssid, password, token)?;
        self.send(&Request::new(OpCode::WifiWrite, payload))
    }

    pub fn read_configuration(&mut self) -> Result<Exchange> {
        self.send(&Request::bare(OpCode::ConfigRead))
    }

    pub fn read_event(&mut self) -> Result<Exchange> {
        self.send(&Request::bare(OpCode::EventRead))
    }

    pub fn read_ack_key(&mut self) -> Result<Exchange> {
        self.send(&Request::bare(OpCode::AckKeyRead))
    }

    pub fn clear_ack_key(&mut self) -> Result<Exchange> {
        self.send(&Request::bare(OpCode::AckKeyClear))
    }

    pub fn set_rtc(&mut self, now: DateTime<Utc>) -> Result<Exchange> {
        self.send(&Request::debug(DebugCommand::SetRtc(now)))
    }

    pub fn fake_alarm(&mut self) -> Result<Exchange> {
        self.send(&Request::debug(DebugCommand::FakeAlarm))
    }

    /// Borrow the underlying link.
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Mutably borrow the underlying link.
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Consume the session and return the link.
    pub fn into_link(self) -> L {
        self.link
    }
}

impl<L: Link> std::fmt::Debug for Session<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("link", &self.link.describe())
            .field("variant", &self.codec.variant())
            .field("response_max_bytes", &self.response_max_bytes)
            .finish()
    }
}
