use astroframe_frame::Variant;
use astroframe_session::connect_with_config;
use tracing::info;

use crate::cmd::{operation_label, SendArgs};
use crate::exit::{frame_error, session_error, CliResult, SUCCESS};
use crate::output::{print_exchange, DecodedOutput, ExchangeReport, OutputFormat};

pub fn run(args: SendArgs, variant: Variant, format: OutputFormat) -> CliResult<i32> {
    let config = args.link.session_config(variant)?;
    let codec = variant.codec();
    let request = args.request.to_request(codec.geo_order())?;
    let operation = operation_label(&request);

    // Reject bad requests before the port is touched.
    codec
        .encode(&request)
        .map_err(|err| frame_error("encode failed", err))?;

    let mut session =
        connect_with_config(&config).map_err(|err| session_error("connect failed", err))?;
    let exchange = session
        .send(&request)
        .map_err(|err| session_error("send failed", err))?;

    info!(
        operation = %operation,
        sent = exchange.sent.len(),
        received = exchange.response.bytes.len(),
        end = exchange.response.end.as_str(),
        "exchange complete"
    );

    let mut decoded = None;
    let mut rejected = None;
    if args.decode && !exchange.response.is_empty() {
        match session.decode(&exchange) {
            Ok(frame) => decoded = Some(DecodedOutput::from(&frame)),
            Err(err) => rejected = Some(err),
        }
    }

    print_exchange(
        &ExchangeReport {
            variant,
            operation: &operation,
            port: &config.serial.port,
            exchange: &exchange,
            decoded,
        },
        format,
    );

    match rejected {
        Some(err) => Err(session_error("response rejected", err)),
        None => Ok(SUCCESS),
    }
}
