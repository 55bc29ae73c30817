//! Queue one uplink payload on a modem and print the raw response.
//!
//! Run with:
//!   cargo run --example enqueue -- /dev/ttyUSB0 "Hello world"

use astroframe::frame::Variant;
use astroframe::session::{connect_with_config, SessionConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let port = args.next().unwrap_or_else(|| "/dev/ttyUSB0".to_string());
    let message = args.next().unwrap_or_else(|| "Hello world".to_string());

    let config = SessionConfig {
        variant: Variant::Raw,
        ..SessionConfig::new(port)
    };
    let mut session = connect_with_config(&config)?;

    let exchange = session.enqueue_payload(0x0001, message.as_bytes())?;
    eprintln!("sent     {}", hex::encode(&exchange.sent));

    if exchange.response.is_empty() {
        eprintln!("no response ({})", exchange.response.end.as_str());
        return Ok(());
    }
    eprintln!("received {}", hex::encode(&exchange.response.bytes));

    let frame = session.decode(&exchange)?;
    eprintln!(
        "opcode 0x{:02x}, payload {}",
        frame.opcode,
        hex::encode(&frame.payload)
    );
    Ok(())
}
