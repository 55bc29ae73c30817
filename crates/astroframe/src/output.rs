use std::io::{IsTerminal, Write};

use astroframe_frame::{ResponseFrame, Variant};
use astroframe_session::Exchange;
use chrono::{SecondsFormat, Utc};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DecodedOutput {
    pub opcode: String,
    pub param: Option<String>,
    pub payload: String,
}

impl From<&ResponseFrame> for DecodedOutput {
    fn from(frame: &ResponseFrame) -> Self {
        Self {
            opcode: format!("{:02x}", frame.opcode),
            param: frame.param.as_ref().map(ToString::to_string),
            payload: hex::encode(&frame.payload),
        }
    }
}

#[derive(Serialize)]
struct ExchangeOutput<'a> {
    variant: &'static str,
    operation: &'a str,
    port: &'a str,
    sent: String,
    received: String,
    received_size: usize,
    window_end: &'static str,
    timed_out: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    decoded: Option<&'a DecodedOutput>,
    timestamp: String,
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    variant: &'static str,
    operation: &'a str,
    frame: String,
    frame_size: usize,
}

#[derive(Serialize)]
struct PortsOutput<'a> {
    ports: &'a [String],
}

/// What one `send` produced.
pub struct ExchangeReport<'a> {
    pub variant: Variant,
    pub operation: &'a str,
    pub port: &'a str,
    pub exchange: &'a Exchange,
    pub decoded: Option<DecodedOutput>,
}

pub fn print_exchange(report: &ExchangeReport<'_>, format: OutputFormat) {
    let sent = report.exchange.sent.as_ref();
    let received = report.exchange.response.bytes.as_ref();
    match format {
        OutputFormat::Json => {
            let out = ExchangeOutput {
                variant: report.variant.name(),
                operation: report.operation,
                port: report.port,
                sent: hex::encode(sent),
                received: hex::encode(received),
                received_size: received.len(),
                window_end: report.exchange.response.end.as_str(),
                timed_out: report.exchange.timed_out(),
                decoded: report.decoded.as_ref(),
                timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = field_table();
            table
                .add_row(vec!["VARIANT".to_string(), report.variant.to_string()])
                .add_row(vec!["OPERATION".to_string(), report.operation.to_string()])
                .add_row(vec!["PORT".to_string(), report.port.to_string()])
                .add_row(vec!["SENT".to_string(), spaced_hex(sent)])
                .add_row(vec!["RECEIVED".to_string(), spaced_hex(received)])
                .add_row(vec![
                    "WINDOW END".to_string(),
                    report.exchange.response.end.as_str().to_string(),
                ]);
            if let Some(decoded) = &report.decoded {
                add_decoded_rows(&mut table, decoded);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("[sent]      -->  {}", spaced_hex(sent));
            if received.is_empty() {
                println!(
                    "[received]  <--  (nothing, window {})",
                    report.exchange.response.end.as_str()
                );
            } else {
                println!("[received]  <--  {}", spaced_hex(received));
            }
            if let Some(decoded) = &report.decoded {
                print_decoded_line(decoded);
            }
        }
        OutputFormat::Raw => print_raw(received),
    }
}

pub fn print_frame(variant: Variant, operation: &str, frame: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&FrameOutput {
            variant: variant.name(),
            operation,
            frame: hex::encode(frame),
            frame_size: frame.len(),
        }),
        OutputFormat::Table => {
            let mut table = field_table();
            table
                .add_row(vec!["VARIANT".to_string(), variant.to_string()])
                .add_row(vec!["OPERATION".to_string(), operation.to_string()])
                .add_row(vec!["FRAME".to_string(), spaced_hex(frame)])
                .add_row(vec!["SIZE".to_string(), frame.len().to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("[{variant}] {operation}  {}", spaced_hex(frame)),
        OutputFormat::Raw => print_raw(frame),
    }
}

pub fn print_decoded(decoded: &DecodedOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(decoded),
        OutputFormat::Table => {
            let mut table = field_table();
            add_decoded_rows(&mut table, decoded);
            println!("{table}");
        }
        OutputFormat::Pretty => print_decoded_line(decoded),
        OutputFormat::Raw => {
            // Payload bytes only.
            match hex::decode(&decoded.payload) {
                Ok(bytes) => print_raw(&bytes),
                Err(_) => print_raw(decoded.payload.as_bytes()),
            }
        }
    }
}

pub fn print_ports(ports: &[String], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&PortsOutput { ports }),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PORT"]);
            for port in ports {
                table.add_row(vec![port.clone()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for port in ports {
                println!("{port}");
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// Lowercase hex, one space between bytes.
pub fn spaced_hex(data: &[u8]) -> String {
    data.iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn field_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["FIELD", "VALUE"]);
    table
}

fn add_decoded_rows(table: &mut Table, decoded: &DecodedOutput) {
    table
        .add_row(vec!["OPCODE".to_string(), decoded.opcode.clone()])
        .add_row(vec![
            "PARAM".to_string(),
            decoded.param.clone().unwrap_or_else(|| "-".to_string()),
        ])
        .add_row(vec!["PAYLOAD".to_string(), decoded.payload.clone()]);
}

fn print_decoded_line(decoded: &DecodedOutput) {
    match &decoded.param {
        Some(param) => println!(
            "[decoded]   opcode={} param={} payload={}",
            decoded.opcode, param, decoded.payload
        ),
        None => println!(
            "[decoded]   opcode={} payload={}",
            decoded.opcode, decoded.payload
        ),
    }
}

#[cfg(test)]
mod tests {
    use astroframe_frame::HexField;
    use bytes::Bytes;

    use super::*;

    #[test]
    fn spaced_hex_separates_bytes() {
        assert_eq!(spaced_hex(&[0x7f, 0x05, 0x01]), "7f 05 01");
        assert_eq!(spaced_hex(&[]), "");
    }

    #[test]
    fn decoded_output_renders_hex() {
        let frame = ResponseFrame {
            opcode: 0xa5,
            param: Some(HexField::from_bytes(vec![0x02, 0x00])),
            payload: Bytes::from_static(&[0x34, 0x12]),
        };
        let out = DecodedOutput::from(&frame);
        assert_eq!(out.opcode, "a5");
        assert_eq!(out.param.as_deref(), Some("0200"));
        assert_eq!(out.payload, "3412");
    }
}
