use astroframe_frame::Variant;

use crate::cmd::{parse_hex, DecodeArgs};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_decoded, DecodedOutput, OutputFormat};

pub fn run(args: DecodeArgs, variant: Variant, format: OutputFormat) -> CliResult<i32> {
    let frame = parse_hex(&args.frame.join(" "))?;
    let response = variant
        .codec()
        .decode(frame.as_bytes())
        .map_err(|err| frame_error("decode failed", err))?;

    print_decoded(&DecodedOutput::from(&response), format);
    Ok(SUCCESS)
}
