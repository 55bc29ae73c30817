//! Print the frames both firmware variants expect for a few commands.
//!
//! Run with:
//!   cargo run --example frames

use astroframe::frame::{
    encode_geolocation, encode_payload_message, DebugCommand, HexField, OpCode, Request, Variant,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    for variant in [Variant::Legacy, Variant::Raw] {
        let codec = variant.codec();
        let requests = [
            (
                "config write",
                Request::new(OpCode::ConfigWrite, HexField::parse("00")?),
            ),
            (
                "geolocation",
                Request::new(
                    OpCode::GeolocationWrite,
                    encode_geolocation(codec.geo_order(), 6.578710272772917, 46.534363896181624)?,
                ),
            ),
            (
                "enqueue",
                Request::new(
                    OpCode::PayloadEnqueue,
                    encode_payload_message(0x1234, b"Hello world")?,
                ),
            ),
            ("fake alarm", Request::debug(DebugCommand::FakeAlarm)),
        ];

        println!("{variant}:");
        for (label, request) in &requests {
            let wire = codec.encode(request)?;
            println!("  {label:<14} {}", hex::encode(&wire));
        }
    }
    Ok(())
}
