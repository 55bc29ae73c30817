use std::time::Duration;

use astroframe_frame::{
    encode_geolocation, encode_payload_message, encode_wifi_config, DebugCommand, GeoOrder,
    HexField, OpCode, Request, Variant,
};
use astroframe_session::{SessionConfig, DEFAULT_RESPONSE_MAX_BYTES};
use astroframe_transport::{SerialConfig, DEFAULT_BAUD_RATE, DEFAULT_PORT};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};

use crate::exit::{frame_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod frame;
pub mod ports;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send one command to the modem and print the exchange.
    Send(SendArgs),
    /// Print the frame a command encodes to, without opening a port.
    Frame(FrameArgs),
    /// Split a response frame given as hex and check its CRC.
    Decode(DecodeArgs),
    /// List serial ports.
    Ports(PortsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, variant: Variant, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, variant, format),
        Command::Frame(args) => frame::run(args, variant, format),
        Command::Decode(args) => decode::run(args, variant, format),
        Command::Ports(args) => ports::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Parse the response frame and check its CRC.
    #[arg(long)]
    pub decode: bool,
    #[command(subcommand)]
    pub request: RequestCommand,
}

#[derive(Args, Debug)]
pub struct FrameArgs {
    #[command(subcommand)]
    pub request: RequestCommand,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Response frame as hex (whitespace allowed).
    #[arg(required = true, num_args = 1..)]
    pub frame: Vec<String>,
}

#[derive(Args, Debug, Default)]
pub struct PortsArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Serial line and response window settings.
#[derive(Args, Debug, Clone)]
pub struct LinkArgs {
    /// Serial port the modem is attached to.
    #[arg(long, short = 'p', env = "ASTRONODE_PORT", default_value = DEFAULT_PORT)]
    pub port: String,
    /// Line speed.
    #[arg(long, env = "ASTRONODE_BAUD", default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Overall response window (e.g. 3s, 500ms).
    #[arg(long, env = "ASTRONODE_TIMEOUT", default_value = "3s")]
    pub timeout: String,
    /// Silence that ends a response once bytes have arrived.
    #[arg(long, env = "ASTRONODE_INTER_BYTE_TIMEOUT", default_value = "1ms")]
    pub inter_byte_timeout: String,
    /// Maximum response bytes to collect.
    #[arg(
        long,
        env = "ASTRONODE_MAX_BYTES",
        default_value_t = DEFAULT_RESPONSE_MAX_BYTES
    )]
    pub max_bytes: usize,
}

impl LinkArgs {
    pub fn session_config(&self, variant: Variant) -> CliResult<SessionConfig> {
        if self.max_bytes == 0 {
            return Err(CliError::new(
                USAGE,
                "--max-bytes must be greater than zero",
            ));
        }
        Ok(SessionConfig {
            serial: SerialConfig {
                port: self.port.clone(),
                baud_rate: self.baud,
                read_timeout: parse_duration(&self.timeout)?,
                inter_byte_timeout: parse_duration(&self.inter_byte_timeout)?,
                ..SerialConfig::default()
            },
            variant,
            response_max_bytes: self.max_bytes,
        })
    }
}

/// The command to encode.
#[derive(Subcommand, Debug, Clone)]
pub enum RequestCommand {
    /// Any operation by opcode with a hex payload.
    Raw(RawArgs),
    /// Queue an uplink payload (PLD_ER).
    Enqueue(EnqueueArgs),
    /// Drop the oldest queued payload (PLD_DR).
    Dequeue,
    /// Drop every queued payload (PLD_FR).
    Free,
    /// Write the asset position (GEO_WR).
    Geo(GeoArgs),
    /// Write the configuration byte (CFG_WR).
    ConfigWrite(ConfigWriteArgs),
    /// Read the configuration (CFG_RR).
    ConfigRead,
    /// Write Wi-Fi credentials and access token (WIF_WR).
    Wifi(WifiArgs),
    /// Read the pending event (EVT_RR).
    EventRead,
    /// Read the acknowledgement key (SAK_RR).
    AckRead,
    /// Clear the acknowledgement key (SAK_CR).
    AckClear,
    /// Set the modem clock (DBG, set-rtc).
    SetRtc(SetRtcArgs),
    /// Raise a fake alarm (DBG, fake-alarm).
    FakeAlarm,
}

#[derive(Args, Debug, Clone)]
pub struct RawArgs {
    /// Opcode as hex (25, 0x25) or mnemonic (PLD_ER).
    #[arg(long, value_parser = parse_opcode)]
    pub opcode: u8,
    /// Payload as hex.
    #[arg(long, default_value = "")]
    pub payload: String,
}

#[derive(Args, Debug, Clone)]
pub struct EnqueueArgs {
    /// Payload id (decimal or 0x-prefixed hex). Derived from the clock when omitted.
    #[arg(long, value_parser = parse_u16)]
    pub id: Option<u16>,
    /// Payload as text.
    #[arg(long, conflicts_with = "hex", required_unless_present = "hex")]
    pub data: Option<String>,
    /// Payload as hex.
    #[arg(long)]
    pub hex: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct GeoArgs {
    /// Latitude in degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,
    /// Longitude in degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigWriteArgs {
    /// Configuration as hex.
    #[arg(long)]
    pub payload: String,
}

#[derive(Args, Debug, Clone)]
pub struct WifiArgs {
    #[arg(long)]
    pub ssid: String,
    #[arg(long, env = "ASTRONODE_WIFI_PASSWORD", hide_env_values = true)]
    pub password: String,
    /// Astrocast access token.
    #[arg(long, env = "ASTRONODE_TOKEN", hide_env_values = true)]
    pub token: String,
}

#[derive(Args, Debug, Clone)]
pub struct SetRtcArgs {
    /// RFC 3339 time to set. Defaults to now.
    #[arg(long, value_parser = parse_datetime)]
    pub at: Option<DateTime<Utc>>,
}

impl RequestCommand {
    /// Build the request, laying out coordinates in `order`.
    pub fn to_request(&self, order: GeoOrder) -> CliResult<Request> {
        let request = match self {
            RequestCommand::Raw(args) => Request::raw(args.opcode, parse_hex(&args.payload)?),
            RequestCommand::Enqueue(args) => {
                let data = match (&args.data, &args.hex) {
                    (Some(text), _) => text.as_bytes().to_vec(),
                    (None, Some(hex)) => parse_hex(hex)?.into_bytes(),
                    (None, None) => Vec::new(),
                };
                let id = args.id.unwrap_or_else(clock_payload_id);
                let payload = encode_payload_message(id, &data)
                    .map_err(|err| frame_error("invalid payload", err))?;
                Request::new(OpCode::PayloadEnqueue, payload)
            }
            RequestCommand::Dequeue => Request::bare(OpCode::PayloadDequeue),
            RequestCommand::Free => Request::bare(OpCode::PayloadFree),
            RequestCommand::Geo(args) => {
                let payload = encode_geolocation(order, args.lon, args.lat)
                    .map_err(|err| frame_error("invalid position", err))?;
                Request::new(OpCode::GeolocationWrite, payload)
            }
            RequestCommand::ConfigWrite(args) => {
                Request::new(OpCode::ConfigWrite, parse_hex(&args.payload)?)
            }
            RequestCommand::ConfigRead => Request::bare(OpCode::ConfigRead),
            RequestCommand::Wifi(args) => {
                let payload = encode_wifi_config(&args.ssid, &args.password, &args.token)
                    .map_err(|err| frame_error("invalid wifi settings", err))?;
                Request::new(OpCode::WifiWrite, payload)
            }
            RequestCommand::EventRead => Request::bare(OpCode::EventRead),
            RequestCommand::AckRead => Request::bare(OpCode::AckKeyRead),
            RequestCommand::AckClear => Request::bare(OpCode::AckKeyClear),
            RequestCommand::SetRtc(args) => Request::debug(match args.at {
                Some(at) => DebugCommand::SetRtc(at),
                None => DebugCommand::set_rtc_now(),
            }),
            RequestCommand::FakeAlarm => Request::debug(DebugCommand::FakeAlarm),
        };
        Ok(request)
    }
}

/// Human-readable name of the operation a request carries.
pub fn operation_label(request: &Request) -> String {
    match (OpCode::try_from(request.opcode), &request.debug) {
        (Ok(op), Some(debug)) => format!("{op} {}", debug.name()),
        (Ok(op), None) => op.mnemonic().to_string(),
        (Err(_), _) => format!("0x{:02x}", request.opcode),
    }
}

pub(crate) fn parse_hex(input: &str) -> CliResult<HexField> {
    let compact: String = input.split_whitespace().collect();
    HexField::parse(&compact).map_err(|err| frame_error("invalid hex", err))
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
    }
}

fn parse_opcode(input: &str) -> Result<u8, String> {
    if let Some(op) = OpCode::from_mnemonic(input) {
        return Ok(op.code());
    }
    let digits = strip_hex_prefix(input).unwrap_or(input);
    u8::from_str_radix(digits, 16)
        .map_err(|_| format!("expected a hex byte or a mnemonic, got {input:?}"))
}

fn parse_u16(input: &str) -> Result<u16, String> {
    let parsed = match strip_hex_prefix(input) {
        Some(digits) => u16::from_str_radix(digits, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("expected a number from 0 to 65535, got {input:?}"))
}

fn strip_hex_prefix(input: &str) -> Option<&str> {
    input.strip_prefix("0x").or(input.strip_prefix("0X"))
}

fn parse_datetime(input: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(input)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|err| format!("expected an RFC 3339 time: {err}"))
}

fn clock_payload_id() -> u16 {
    (Utc::now().timestamp_millis() & 0xffff) as u16
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert_eq!(parse_duration("").unwrap_err().code, USAGE);
    }

    #[test]
    fn opcode_accepts_hex_and_mnemonics() {
        assert_eq!(parse_opcode("25").unwrap(), 0x25);
        assert_eq!(parse_opcode("0x65").unwrap(), 0x65);
        assert_eq!(parse_opcode("GEO_WR").unwrap(), 0x35);
        assert!(parse_opcode("0x100").is_err());
        assert!(parse_opcode("nope").is_err());
    }

    #[test]
    fn payload_id_accepts_decimal_and_hex() {
        assert_eq!(parse_u16("4660").unwrap(), 0x1234);
        assert_eq!(parse_u16("0x1234").unwrap(), 0x1234);
        assert!(parse_u16("70000").is_err());
    }

    #[test]
    fn hex_input_ignores_whitespace() {
        assert_eq!(
            parse_hex("34 12\n48").unwrap().as_bytes(),
            &[0x34, 0x12, 0x48]
        );
        assert!(parse_hex("3").is_err());
    }

    #[test]
    fn enqueue_uses_given_id() {
        let cmd = RequestCommand::Enqueue(EnqueueArgs {
            id: Some(0x1234),
            data: Some("Hello world".to_string()),
            hex: None,
        });
        let request = cmd.to_request(GeoOrder::LonLat).unwrap();
        assert_eq!(request.opcode, 0x25);
        assert_eq!(request.payload.to_string(), "341248656c6c6f20776f726c64");
    }

    #[test]
    fn set_rtc_uses_given_time() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 12, 30, 45).unwrap();
        let cmd = RequestCommand::SetRtc(SetRtcArgs { at: Some(at) });
        let request = cmd.to_request(GeoOrder::LonLat).unwrap();
        assert_eq!(request.debug, Some(DebugCommand::SetRtc(at)));
        assert_eq!(operation_label(&request), "DBG set-rtc");
    }

    #[test]
    fn out_of_range_position_is_rejected() {
        let cmd = RequestCommand::Geo(GeoArgs {
            lat: 95.0,
            lon: 6.5,
        });
        let err = cmd.to_request(GeoOrder::LonLat).unwrap_err();
        assert_eq!(err.code, crate::exit::DATA_INVALID);
    }

    #[test]
    fn unknown_opcode_label_is_hex() {
        let request = Request::raw(0x99, HexField::empty());
        assert_eq!(operation_label(&request), "0x99");
    }

    #[test]
    fn link_args_build_session_config() {
        let link = LinkArgs {
            port: "/dev/ttyACM0".to_string(),
            baud: 9600,
            timeout: "500ms".to_string(),
            inter_byte_timeout: "2ms".to_string(),
            max_bytes: 64,
        };
        let config = link.session_config(Variant::Legacy).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyACM0");
        assert_eq!(config.serial.read_timeout, Duration::from_millis(500));
        assert_eq!(config.serial.inter_byte_timeout, Duration::from_millis(2));
        assert_eq!(config.variant, Variant::Legacy);
        assert_eq!(config.response_max_bytes, 64);
    }
}
